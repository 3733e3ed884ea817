//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `resolve_state_path` / `load_config` - Shared startup helpers
//! - `Workspace` - Loaded state plus the ledger built from it
//! - `cmd_status` - Check the generative backend

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tally_core::{store, AIBackend, AIClient, AppState, BackendKind, Category, Config, Ledger};
use tracing::debug;

/// Use the explicit path, else the platform data directory
pub fn resolve_state_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => store::default_state_path()
            .context("Could not determine a data directory; pass --state"),
    }
}

/// Load config from an explicit file, else the default resolution
///
/// Environment overrides apply in both cases.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    match explicit {
        Some(path) => {
            let mut config = Config::from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?;
            config.apply_env();
            Ok(config)
        }
        None => Config::load().context("Failed to load config"),
    }
}

/// Persisted state opened for one command
pub struct Workspace {
    path: PathBuf,
    pub state: AppState,
    pub ledger: Ledger,
}

impl Workspace {
    /// Load the state file; a new file takes its currency from config
    pub fn open(path: &Path, config: &Config) -> Result<Self> {
        let is_new = !path.exists();
        let mut state = store::load(path)
            .with_context(|| format!("Failed to load state {}", path.display()))?;
        if is_new {
            state.currency = config.display.currency.clone();
        }
        let ledger = Ledger::from_state(&state);
        debug!(path = %path.display(), transactions = ledger.len(), "Opened workspace");

        Ok(Self {
            path: path.to_path_buf(),
            state,
            ledger,
        })
    }

    pub fn currency(&self) -> &str {
        &self.state.currency
    }

    /// Write the ledger back and persist
    pub fn save(&mut self) -> Result<()> {
        self.ledger.write_to(&mut self.state);
        store::save(&self.path, &self.state)
            .with_context(|| format!("Failed to save state {}", self.path.display()))
    }
}

/// Parse a category name, listing valid names on failure
pub fn parse_category(name: &str) -> Result<Category> {
    name.parse::<Category>().map_err(|e| {
        let valid: Vec<&str> = Category::all().iter().map(|c| c.as_str()).collect();
        anyhow::anyhow!("{} (valid: {})", e, valid.join(", "))
    })
}

pub async fn cmd_status(config: &Config) -> Result<()> {
    println!();
    println!("🤖 Generative Backend");
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Backend:  {}", config.ai.backend.as_str());

    if config.ai.backend == BackendKind::None {
        println!("   Chat runs offline with local rules only.");
        println!("   Set AI_BACKEND=ollama and OLLAMA_HOST to enable the assistant.");
        return Ok(());
    }

    let Some(client) = AIClient::from_config(&config.ai) else {
        println!("   ⚠️  Backend is not fully configured (missing host).");
        return Ok(());
    };

    println!("   Host:     {}", client.host());
    println!("   Model:    {}", client.model());

    if client.health_check().await {
        println!("   ✅ Reachable");
    } else {
        println!("   ❌ Not reachable");
    }

    Ok(())
}
