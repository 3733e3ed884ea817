//! Pluggable generative backend abstraction
//!
//! The conversational interpreter falls back to a generative assistant for
//! messages no local rule understands, and bulk import asks one to pull
//! transactions out of pasted text. Both go through this module.
//!
//! # Architecture
//!
//! - `AIBackend` trait: the interface every backend implements
//! - `AIClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `OllamaBackend`, `OpenAICompatibleBackend`, `MockBackend`
//!
//! # Configuration
//!
//! Backends are built from [`crate::config::AiConfig`], which already has
//! environment overrides applied:
//! - `AI_BACKEND`: ollama, openai_compatible (alias groq), mock or none
//! - `OLLAMA_HOST` / `OLLAMA_MODEL`
//! - `OPENAI_COMPATIBLE_HOST` / `OPENAI_COMPATIBLE_MODEL` / `OPENAI_COMPATIBLE_API_KEY`

mod mock;
mod ollama;
mod openai_compatible;
pub mod parsing;
pub mod types;

pub use mock::MockBackend;
pub use ollama::OllamaBackend;
pub use openai_compatible::OpenAICompatibleBackend;
pub use types::*;

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tracing::warn;

use crate::config::{AiConfig, BackendKind};
use crate::error::{Error, Result};
use crate::prompts::{PromptId, PromptLibrary};

/// Trait defining the interface for all generative backends
#[async_trait]
pub trait AIBackend: Send + Sync {
    /// Free-text reply to a conversational request
    async fn chat(&self, request: &ChatRequest) -> Result<String>;

    /// Extract transactions from pasted text; `today` is YYYY-MM-DD
    async fn extract_transactions(&self, text: &str, today: &str) -> Result<Vec<ExtractedTransaction>>;

    /// Check if the backend is available
    async fn health_check(&self) -> bool;

    /// Get the model name (for logging)
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete AI client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum AIClient {
    /// Ollama backend (native chat API)
    Ollama(OllamaBackend),
    /// OpenAI-compatible backend (Groq, vLLM, LocalAI, llama-server, etc.)
    OpenAICompatible(OpenAICompatibleBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl AIClient {
    /// Build a client from configuration
    ///
    /// Returns None when the backend is disabled or its host is missing.
    pub fn from_config(config: &AiConfig) -> Option<Self> {
        match config.backend {
            BackendKind::None => None,
            BackendKind::Mock => Some(AIClient::Mock(MockBackend::new())),
            BackendKind::Ollama => match &config.host {
                Some(host) => Some(AIClient::Ollama(OllamaBackend::from_config(host, config))),
                None => {
                    warn!("AI backend is ollama but no host is configured (set OLLAMA_HOST)");
                    None
                }
            },
            BackendKind::OpenaiCompatible => match &config.host {
                Some(host) => Some(AIClient::OpenAICompatible(
                    OpenAICompatibleBackend::from_config(host, config),
                )),
                None => {
                    warn!("AI backend is openai_compatible but no host is configured (set OPENAI_COMPATIBLE_HOST)");
                    None
                }
            },
        }
    }
}

// Implement AIBackend for AIClient by delegating to the inner backend
#[async_trait]
impl AIBackend for AIClient {
    async fn chat(&self, request: &ChatRequest) -> Result<String> {
        match self {
            AIClient::Ollama(b) => b.chat(request).await,
            AIClient::OpenAICompatible(b) => b.chat(request).await,
            AIClient::Mock(b) => b.chat(request).await,
        }
    }

    async fn extract_transactions(&self, text: &str, today: &str) -> Result<Vec<ExtractedTransaction>> {
        match self {
            AIClient::Ollama(b) => b.extract_transactions(text, today).await,
            AIClient::OpenAICompatible(b) => b.extract_transactions(text, today).await,
            AIClient::Mock(b) => b.extract_transactions(text, today).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            AIClient::Ollama(b) => b.health_check().await,
            AIClient::OpenAICompatible(b) => b.health_check().await,
            AIClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            AIClient::Ollama(b) => b.model(),
            AIClient::OpenAICompatible(b) => b.model(),
            AIClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            AIClient::Ollama(b) => b.host(),
            AIClient::OpenAICompatible(b) => b.host(),
            AIClient::Mock(b) => b.host(),
        }
    }
}

/// Build the message list for a chat request: system, history, then the user turn
pub(crate) fn chat_messages(
    prompts: &Arc<RwLock<PromptLibrary>>,
    request: &ChatRequest,
) -> Result<Vec<Message>> {
    let mut prompts = prompts
        .write()
        .map_err(|_| Error::InvalidData("Failed to acquire prompt library lock".into()))?;
    let template = prompts.get(PromptId::FinanceChat)?;

    let mut vars = HashMap::new();
    vars.insert("snapshot", request.snapshot.as_str());
    vars.insert("message", request.message.as_str());

    let mut messages = vec![Message::system(template.render_system(&vars))];
    messages.extend(request.history.iter().map(Message::from));
    messages.push(Message::user(template.render_user(&vars)));
    Ok(messages)
}

/// Build the (system, user) pair for a bulk-import request
pub(crate) fn import_messages(
    prompts: &Arc<RwLock<PromptLibrary>>,
    text: &str,
    today: &str,
) -> Result<Vec<Message>> {
    let mut prompts = prompts
        .write()
        .map_err(|_| Error::InvalidData("Failed to acquire prompt library lock".into()))?;
    let template = prompts.get(PromptId::BulkImport)?;

    let mut vars = HashMap::new();
    vars.insert("text", text);
    vars.insert("today", today);

    Ok(vec![
        Message::system(template.render_system(&vars)),
        Message::user(template.render_user(&vars)),
    ])
}
