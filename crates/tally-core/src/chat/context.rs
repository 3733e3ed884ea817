//! Per-session conversation state
//!
//! The interpreter never stores this itself: each turn takes the current
//! context by value and hands back the next one.

use crate::extract::ParsedTransaction;

/// Interpreter state between turns
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ConversationState {
    #[default]
    Idle,
    /// A bare amount was given; waiting for "expense" or "income"
    AwaitingTypeClarification(f64),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConversationContext {
    pub state: ConversationState,
    /// Most recent transaction committed this session
    pub last_transaction: Option<ParsedTransaction>,
    pub last_transaction_id: Option<String>,
}

impl ConversationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn awaiting(amount: f64) -> Self {
        Self {
            state: ConversationState::AwaitingTypeClarification(amount),
            ..Self::default()
        }
    }

    /// Idle context remembering a freshly committed transaction
    pub fn committed(parsed: ParsedTransaction, id: impl Into<String>) -> Self {
        Self {
            state: ConversationState::Idle,
            last_transaction: Some(parsed),
            last_transaction_id: Some(id.into()),
        }
    }

    pub fn pending_amount(&self) -> Option<f64> {
        match self.state {
            ConversationState::AwaitingTypeClarification(amount) => Some(amount),
            ConversationState::Idle => None,
        }
    }

    pub fn is_awaiting_type(&self) -> bool {
        self.pending_amount().is_some()
    }
}
