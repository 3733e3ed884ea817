//! Application configuration
//!
//! Configuration is loaded with a two-layer resolution:
//! 1. Check for an override at `~/.local/share/tally/config.toml`
//! 2. Fall back to the embedded default (`config/tally.toml`)
//!
//! Environment variables are applied on top of whichever file was used.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/tally.toml");

/// Which generative backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    Ollama,
    OpenaiCompatible,
    Mock,
    /// Rule-based chat only
    #[default]
    None,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ollama => "ollama",
            Self::OpenaiCompatible => "openai_compatible",
            Self::Mock => "mock",
            Self::None => "none",
        }
    }

    /// Parse a backend name, accepting the usual aliases
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "ollama" => Some(Self::Ollama),
            "openai_compatible" | "openai" | "groq" | "vllm" | "localai" | "llamacpp" => {
                Some(Self::OpenaiCompatible)
            }
            "mock" => Some(Self::Mock),
            "none" | "off" | "" => Some(Self::None),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub backend: BackendKind,
    /// Server URL; required for ollama and openai_compatible
    pub host: Option<String>,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub temperature: f32,
    pub max_tokens: u32,
    pub import_temperature: f32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::None,
            host: None,
            model: "llama3.2".to_string(),
            api_key: None,
            timeout_secs: 30,
            temperature: 0.7,
            max_tokens: 400,
            import_temperature: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub history_turns: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self { history_turns: 10 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub currency: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            currency: "$".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ai: AiConfig,
    pub chat: ChatConfig,
    pub display: DisplayConfig,
}

impl Config {
    /// Load config from the override file or embedded default, then apply env
    pub fn load() -> Result<Self> {
        let mut config = match default_config_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::embedded()?,
        };
        config.apply_env();
        Ok(config)
    }

    /// Load from a specific file (no env overrides)
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "Loading config override");
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// The embedded default configuration
    pub fn embedded() -> Result<Self> {
        Self::from_toml_str(DEFAULT_CONFIG)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply environment variable overrides
    pub fn apply_env(&mut self) {
        self.apply_vars(|key| std::env::var(key).ok());
    }

    fn apply_vars(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(name) = var("AI_BACKEND") {
            self.ai.backend = BackendKind::parse(&name).unwrap_or_else(|| {
                warn!(backend = %name, "Unknown AI_BACKEND, falling back to ollama");
                BackendKind::Ollama
            });
        }

        let (host_key, model_key) = match self.ai.backend {
            BackendKind::Ollama => ("OLLAMA_HOST", "OLLAMA_MODEL"),
            BackendKind::OpenaiCompatible => ("OPENAI_COMPATIBLE_HOST", "OPENAI_COMPATIBLE_MODEL"),
            BackendKind::Mock | BackendKind::None => return,
        };

        if let Some(host) = var(host_key) {
            self.ai.host = Some(host);
        }
        if let Some(model) = var(model_key) {
            self.ai.model = model;
        }
        if self.ai.backend == BackendKind::OpenaiCompatible {
            if let Some(key) = var("OPENAI_COMPATIBLE_API_KEY") {
                self.ai.api_key = Some(key);
            }
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.ai.timeout_secs.max(1))
    }
}

/// Default config override location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("tally").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_embedded_config_parses() {
        let config = Config::embedded().unwrap();
        assert_eq!(config.ai.backend, BackendKind::None);
        assert_eq!(config.ai.timeout_secs, 30);
        assert_eq!(config.chat.history_turns, 10);
        assert_eq!(config.display.currency, "$");
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
[ai]
backend = "openai_compatible"
host = "https://api.groq.com/openai"
model = "llama-3.1-8b-instant"
"#,
        )
        .unwrap();
        assert_eq!(config.ai.backend, BackendKind::OpenaiCompatible);
        assert_eq!(config.ai.max_tokens, 400);
        assert_eq!(config.display.currency, "$");
    }

    #[test]
    fn test_invalid_toml_is_error() {
        assert!(Config::from_toml_str("[ai\nbackend=").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("AI_BACKEND", "ollama"),
            ("OLLAMA_HOST", "http://localhost:11434"),
            ("OLLAMA_MODEL", "gemma3"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_vars(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.ai.backend, BackendKind::Ollama);
        assert_eq!(config.ai.host.as_deref(), Some("http://localhost:11434"));
        assert_eq!(config.ai.model, "gemma3");
    }

    #[test]
    fn test_unknown_backend_falls_back_to_ollama() {
        let mut config = Config::default();
        config.apply_vars(|k| (k == "AI_BACKEND").then(|| "carrier-pigeon".to_string()));
        assert_eq!(config.ai.backend, BackendKind::Ollama);
    }

    #[test]
    fn test_backend_aliases() {
        assert_eq!(BackendKind::parse("groq"), Some(BackendKind::OpenaiCompatible));
        assert_eq!(BackendKind::parse("MOCK"), Some(BackendKind::Mock));
        assert_eq!(BackendKind::parse("nope"), None);
    }
}
