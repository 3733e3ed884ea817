//! OpenAI-compatible backend implementation
//!
//! Works with any server that implements the OpenAI chat completions API:
//! - Groq (https://api.groq.com/openai)
//! - vLLM (http://localhost:8000)
//! - LocalAI (http://localhost:8080)
//! - llama-server / llama.cpp (http://localhost:8080)
//!
//! # Configuration
//!
//! Environment variables:
//! - `OPENAI_COMPATIBLE_HOST`: Server URL (required)
//! - `OPENAI_COMPATIBLE_MODEL`: Model name (default: llama3.2)
//! - `OPENAI_COMPATIBLE_API_KEY`: API key if required (optional)

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

/// OpenAI-compatible backend
///
/// # Example
///
/// ```rust,ignore
/// // Groq
/// export OPENAI_COMPATIBLE_HOST="https://api.groq.com/openai"
/// export OPENAI_COMPATIBLE_MODEL="llama-3.3-70b-versatile"
/// export OPENAI_COMPATIBLE_API_KEY="gsk_..."
///
/// // vLLM
/// export OPENAI_COMPATIBLE_HOST="http://192.168.1.100:8000"
/// export OPENAI_COMPATIBLE_MODEL="meta-llama/Llama-3.2-3B-Instruct"
/// ```
pub struct OpenAICompatibleBackend {
    http_client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    chat_options: GenerationOptions,
    import_options: GenerationOptions,
    prompts: Arc<RwLock<PromptLibrary>>,
}

impl Clone for OpenAICompatibleBackend {
    fn clone(&self) -> Self {
        Self {
            http_client: self.http_client.clone(),
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            api_key: self.api_key.clone(),
            chat_options: self.chat_options,
            import_options: self.import_options,
            prompts: self.prompts.clone(),
        }
    }
}

impl OpenAICompatibleBackend {
    /// Create a new OpenAI-compatible backend
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: None,
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
        backend.api_key = config.api_key.clone();
        backend.chat_options = GenerationOptions {
            temperature: config.temperature,
            max_tokens: Some(config.max_tokens),
        };
        backend.import_options.temperature = config.import_temperature;
        backend
    }

    /// Make a chat completion request
    async fn chat_completion(&self, messages: Vec<Message>, options: GenerationOptions) -> Result<String> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            temperature: Some(options.temperature),
            max_tokens: options.max_tokens,
            stream: false,
        };

        let mut req_builder = self
            .http_client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .json(&request);

        if let Some(ref api_key) = self.api_key {
            req_builder = req_builder.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = req_builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::InvalidData(format!(
                "OpenAI API error {}: {}",
                status, body
            )));
        }

        let chat_response: ChatCompletionResponse = response.json().await?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| Error::Ai("No response from OpenAI API".into()))
    }
}

/// OpenAI chat completion request
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: String,
}

#[async_trait]
impl AIBackend for OpenAICompatibleBackend {
    async fn chat(&self, request: &ChatRequest) -> Result<String> {
        let messages = chat_messages(&self.prompts, request)?;
        let response = self.chat_completion(messages, self.chat_options).await?;
        debug!("OpenAI-compatible chat response: {}", response);
        Ok(response)
    }

    async fn extract_transactions(&self, text: &str, today: &str) -> Result<Vec<ExtractedTransaction>> {
        let messages = import_messages(&self.prompts, text, today)?;
        let response = self.chat_completion(messages, self.import_options).await?;
        debug!("OpenAI-compatible import response: {}", response);
        parse_extracted_transactions(&response)
    }

    async fn health_check(&self) -> bool {
        let mut req_builder = self.http_client.get(format!("{}/v1/models", self.base_url));
        if let Some(ref api_key) = self.api_key {
            req_builder = req_builder.header("Authorization", format!("Bearer {}", api_key));
        }

        if let Ok(resp) = req_builder.send().await {
            if resp.status().is_success() {
                return true;
            }
        }

        // Some local servers only expose /health
        self.http_client
            .get(format!("{}/health", self.base_url))
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_creation() {
        let backend = OpenAICompatibleBackend::new("https://api.groq.com/openai/", "llama3.2");
        assert_eq!(backend.host(), "https://api.groq.com/openai");
        assert_eq!(backend.model(), "llama3.2");
        assert!(backend.api_key.is_none());
    }

    #[test]
    fn test_backend_clone() {
        let backend = OpenAICompatibleBackend::new("http://localhost:8000", "llama3.2");
        let cloned = backend.clone();
        assert_eq!(cloned.model(), backend.model());
        assert_eq!(cloned.host(), backend.host());
    }

    #[test]
    fn test_from_config_copies_key() {
        let config = AiConfig {
            api_key: Some("gsk_test".into()),
            max_tokens: 256,
            ..AiConfig::default()
        };
        let backend = OpenAICompatibleBackend::from_config("http://localhost:8000", &config);
        assert_eq!(backend.api_key.as_deref(), Some("gsk_test"));
        assert_eq!(backend.chat_options.max_tokens, Some(256));
    }

    #[test]
    fn test_chat_completion_request_serialization() {
        let request = ChatCompletionRequest {
            model: "llama3.2".to_string(),
            messages: vec![Message::user("Hello")],
            temperature: Some(0.7),
            max_tokens: None,
            stream: false,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "llama3.2");
        assert_eq!(json["messages"][0]["content"], "Hello");
        let temp = json["temperature"].as_f64().unwrap();
        assert!((temp - 0.7).abs() < 0.001);
        // max_tokens should be omitted when None
        assert!(json.get("max_tokens").is_none());
    }

    #[test]
    fn test_chat_completion_response_deserialization() {
        let raw = r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"Hi there"}}]}"#;
        let response: ChatCompletionResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.choices[0].message.content, "Hi there");
    }

    #[tokio::test]
    async fn test_health_check_unreachable() {
        let backend = OpenAICompatibleBackend::new("http://localhost:99999", "llama3.2");
        assert!(!backend.health_check().await);
    }
}
