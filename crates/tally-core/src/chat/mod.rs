//! Conversational transaction entry
//!
//! - `interpreter`: the per-turn state machine
//! - `context`: explicit state threaded between turns
//! - `intent`: keyword checks that route a message
//! - `payload`: structured blocks inside assistant replies
//! - `responses`: reply templates
//! - `insights`: nudges appended to confirmations

mod context;
mod insights;
mod intent;
mod interpreter;
mod payload;
mod responses;

pub use context::{ConversationContext, ConversationState};
pub use insights::smart_insight;
pub use intent::{
    is_analytics_query, is_balance_query, is_confirmation, is_denial, is_help_request,
    is_undo_request,
};
pub use interpreter::{Interpreter, InterpreterConfig, TurnReply};
pub use payload::{
    parse_assistant_reply, AssistantPayload, AssistantReply, BudgetPlanItem, TransactionProposal,
};
pub use responses::{analytics_response, balance_response, greeting_text, help_text, FALLBACK_RESPONSES};
