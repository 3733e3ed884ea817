//! Persisted application state
//!
//! Everything lives in one JSON file (`~/.local/share/tally/state.json` by
//! default). Writes go to a temp file in the same directory and are renamed
//! into place, so a crash never leaves a half-written state file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::models::{Budget, ChatTurn, Transaction};

/// The serialized application blob
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub budgets: Vec<Budget>,
    /// Currency symbol used when recording
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub chat_history: Vec<ChatTurn>,
}

fn default_currency() -> String {
    "$".to_string()
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            transactions: Vec::new(),
            budgets: Vec::new(),
            currency: default_currency(),
            chat_history: Vec::new(),
        }
    }
}

/// Default state file location
pub fn default_state_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("tally").join("state.json"))
}

/// Load state from `path`, returning the default state if the file is missing
pub fn load(path: &Path) -> Result<AppState> {
    if !path.exists() {
        debug!(path = %path.display(), "No state file, starting fresh");
        return Ok(AppState::default());
    }

    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(AppState::default());
    }

    let state: AppState = serde_json::from_str(&content)
        .map_err(|e| Error::InvalidData(format!("Invalid state file {}: {}", path.display(), e)))?;
    debug!(
        transactions = state.transactions.len(),
        budgets = state.budgets.len(),
        "Loaded state"
    );
    Ok(state)
}

/// Atomically replace the state file at `path`
pub fn save(path: &Path, state: &AppState) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)?;

    let json = serde_json::to_string_pretty(state)?;
    let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
    tmp.write_all(json.as_bytes())?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| Error::Io(e.error))?;

    info!(
        path = %path.display(),
        transactions = state.transactions.len(),
        "Saved state"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{Ledger, NewTransaction};
    use crate::models::Category;

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let state = load(&dir.path().join("missing.json")).unwrap();
        assert_eq!(state, AppState::default());
        assert_eq!(state.currency, "$");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        let mut ledger = Ledger::new();
        ledger
            .add_transaction(NewTransaction::expense(12.0, Category::Food).with_description("tacos"))
            .unwrap();
        ledger.set_budget(Category::Food, 200.0).unwrap();

        let mut state = AppState {
            currency: "₹".into(),
            chat_history: vec![ChatTurn::user("spent 12 on tacos")],
            ..AppState::default()
        };
        ledger.write_to(&mut state);
        save(&path, &state).unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn test_accepts_partial_blob() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, r#"{"currency":"€"}"#).unwrap();

        let state = load(&path).unwrap();
        assert_eq!(state.currency, "€");
        assert!(state.transactions.is_empty());
    }

    #[test]
    fn test_corrupt_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(load(&path), Err(Error::InvalidData(_))));
    }
}
