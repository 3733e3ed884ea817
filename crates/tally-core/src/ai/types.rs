//! Request and response types shared by the AI backends

use serde::{Deserialize, Serialize};

use crate::models::{ChatTurn, Sender};

/// A conversational request to the assistant
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    /// The current user message
    pub message: String,
    /// Trailing conversation turns, oldest first
    pub history: Vec<ChatTurn>,
    /// Rendered financial snapshot
    pub snapshot: String,
}

/// Role-tagged message in the wire format used by chat APIs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".into(),
            content: content.into(),
        }
    }
}

impl From<&ChatTurn> for Message {
    fn from(turn: &ChatTurn) -> Self {
        match turn.sender {
            Sender::User => Message::user(turn.text.clone()),
            Sender::Bot => Message::assistant(turn.text.clone()),
        }
    }
}

/// Sampling options for one call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: Some(400),
        }
    }
}

/// One transaction as returned by the bulk-import extraction
///
/// Fields are loose strings; [`crate::import`] maps them into the closed
/// category set and validates amounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedTransaction {
    pub amount: f64,
    #[serde(rename = "type", default)]
    pub tx_type: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// YYYY-MM-DD
    #[serde(default)]
    pub date: Option<String>,
}
