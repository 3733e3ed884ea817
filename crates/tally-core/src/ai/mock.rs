//! Mock backend for testing
//!
//! Provides scripted responses for chat and import. Useful for unit tests
//! and development without a running LLM server.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::extract::parse_transaction;

use super::parsing::parse_extracted_transactions;
use super::types::{ChatRequest, ExtractedTransaction};
use super::AIBackend;

/// Reply used when no scripted response is queued
pub const MOCK_CHAT_REPLY: &str =
    "Tracking every expense is the first step. Try setting a monthly budget for your biggest category.";

/// Mock AI backend for testing
///
/// Clones share the response queue and the request log.
#[derive(Clone, Default)]
pub struct MockBackend {
    /// Whether health_check should return true
    pub healthy: bool,
    /// Whether chat and import calls fail
    pub failing: bool,
    /// Artificial latency applied to every call
    pub delay: Option<Duration>,
    responses: Arc<Mutex<VecDeque<String>>>,
    import_response: Option<String>,
    requests: Arc<Mutex<Vec<ChatRequest>>>,
}

impl MockBackend {
    /// Create a new mock backend (healthy by default)
    pub fn new() -> Self {
        Self {
            healthy: true,
            ..Self::default()
        }
    }

    /// Create an unhealthy mock backend
    pub fn unhealthy() -> Self {
        Self::default()
    }

    /// Create a backend whose calls always error
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::new()
        }
    }

    /// Queue chat replies, returned in order
    pub fn with_responses<I, S>(self, responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Ok(mut queue) = self.responses.lock() {
            queue.extend(responses.into_iter().map(Into::into));
        }
        self
    }

    /// Delay every call (for timeout tests)
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Raw model output returned by `extract_transactions`
    pub fn with_import_response(mut self, raw: impl Into<String>) -> Self {
        self.import_response = Some(raw.into());
        self
    }

    /// Chat requests received so far
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    async fn simulate(&self) -> Result<()> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing {
            return Err(Error::Ai("mock backend failure".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl AIBackend for MockBackend {
    async fn chat(&self, request: &ChatRequest) -> Result<String> {
        if let Ok(mut log) = self.requests.lock() {
            log.push(request.clone());
        }
        self.simulate().await?;

        let scripted = self.responses.lock().ok().and_then(|mut q| q.pop_front());
        Ok(scripted.unwrap_or_else(|| MOCK_CHAT_REPLY.to_string()))
    }

    async fn extract_transactions(&self, text: &str, today: &str) -> Result<Vec<ExtractedTransaction>> {
        self.simulate().await?;

        if let Some(raw) = &self.import_response {
            return parse_extracted_transactions(raw);
        }

        // One transaction per line, using the local parser
        Ok(text
            .lines()
            .filter_map(parse_transaction)
            .map(|parsed| ExtractedTransaction {
                amount: parsed.amount,
                tx_type: Some(parsed.tx_type.to_string()),
                category: Some(parsed.category.to_string()),
                description: parsed.description,
                date: Some(today.to_string()),
            })
            .collect())
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}
