//! Ollama backend implementation
//!
//! HTTP client for the Ollama chat API. Prompts come from the prompt
//! library so they can be overridden on disk.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AiConfig;
use crate::error::{Error, Result};
use crate::prompts::PromptLibrary;

use super::parsing::parse_extracted_transactions;
use super::types::{ChatRequest, ExtractedTransaction, GenerationOptions, Message};
use super::{chat_messages, import_messages, AIBackend};

/// Ollama backend
pub struct OllamaBackend {
    http_client: Client,
    base_url: String,
    model: String,
    chat_options: GenerationOptions,
    import_options: GenerationOptions,
    prompts: Arc<RwLock<PromptLibrary>>,
}

impl Clone for OllamaBackend {
    fn clone(&self) -> Self {
        Self {
            http_client: self.http_client.clone(),
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            chat_options: self.chat_options,
            import_options: self.import_options,
            prompts: self.prompts.clone(),
        }
    }
}

impl OllamaBackend {
    /// Create a new Ollama backend with default sampling options
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            chat_options: GenerationOptions::default(),
            import_options: GenerationOptions {
                temperature: 0.1,
                max_tokens: None,
            },
            prompts: Arc::new(RwLock::new(PromptLibrary::new())),
        }
    }

    /// Create from resolved configuration
    pub fn from_config(host: &str, config: &AiConfig) -> Self {
        let mut backend = Self::new(host, &config.model);
        backend.chat_options = GenerationOptions {
            temperature: config.temperature,
            max_tokens: Some(config.max_tokens),
        };
        backend.import_options.temperature = config.import_temperature;
        backend
    }

    /// Use a specific prompt library (embedded-only in tests)
    pub fn with_prompts(mut self, prompts: PromptLibrary) -> Self {
        self.prompts = Arc::new(RwLock::new(prompts));
        self
    }

    async fn chat_completion(&self, messages: Vec<Message>, options: GenerationOptions) -> Result<String> {
        let request = OllamaChatRequest {
            model: self.model.clone(),
            messages,
            stream: false,
            options: OllamaOptions {
                temperature: options.temperature,
                num_predict: options.max_tokens,
            },
        };

        let response = self
            .http_client
            .post(format!("{}/api/chat", self.base_url))
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let ollama_response: OllamaChatResponse = response.json().await?;
        let content = ollama_response.message.content;
        if content.trim().is_empty() {
            return Err(Error::Ai("Empty response from Ollama".into()));
        }
        Ok(content)
    }
}

#[derive(Debug, Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<Message>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: Message,
}

#[async_trait]
impl AIBackend for OllamaBackend {
    async fn chat(&self, request: &ChatRequest) -> Result<String> {
        let messages = chat_messages(&self.prompts, request)?;
        let response = self.chat_completion(messages, self.chat_options).await?;
        debug!("Ollama chat response: {}", response);
        Ok(response)
    }

    async fn extract_transactions(&self, text: &str, today: &str) -> Result<Vec<ExtractedTransaction>> {
        let messages = import_messages(&self.prompts, text, today)?;
        let response = self.chat_completion(messages, self.import_options).await?;
        debug!("Ollama import response: {}", response);
        parse_extracted_transactions(&response)
    }

    async fn health_check(&self) -> bool {
        self.http_client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}
