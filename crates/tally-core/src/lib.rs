//! Tally Core Library
//!
//! Shared functionality for the Tally conversational expense tracker:
//! - Natural-language transaction extraction and keyword categorization
//! - Ledger with a derived running balance and monthly budgets
//! - Conversational interpreter with clarification and undo
//! - Pluggable generative backends (Ollama, OpenAI-compatible, mock)
//! - Spending analytics, subscription detection, health score and forecast
//! - Bulk import of pasted statements
//! - JSON state persistence and TOML configuration

pub mod ai;
pub mod analytics;
pub mod chat;
pub mod classify;
pub mod config;
pub mod detect;
pub mod error;
pub mod extract;
pub mod forecast;
pub mod health;
pub mod import;
pub mod ledger;
pub mod models;
pub mod prompts;
pub mod snapshot;
pub mod store;

pub use ai::{AIBackend, AIClient, ChatRequest, ExtractedTransaction, MockBackend, OllamaBackend, OpenAICompatibleBackend};
pub use analytics::{BudgetLevel, BudgetStatus, CategoryBreakdown, Period, SpendingSummary, Totals};
pub use chat::{ConversationContext, ConversationState, Interpreter, InterpreterConfig, TurnReply};
pub use classify::{detect_category, CategoryMatch};
pub use config::{AiConfig, BackendKind, Config};
pub use detect::{detect_subscriptions, DetectionConfig, SubscriptionDetector};
pub use error::{Error, Result};
pub use extract::{is_ambiguous_amount, parse_multiple_transactions, parse_transaction, AmbiguousAmount, ParsedTransaction};
pub use forecast::{burn_rate, predict_future_balance};
pub use health::financial_health;
pub use import::{commit_imported, import_text, ImportedTransaction};
pub use ledger::{Ledger, NewTransaction};
pub use models::{
    Budget, Category, ChatTurn, FinancialHealth, Frequency, HealthStatus, Prediction, RiskLevel,
    Sender, Subscription, SubscriptionStatus, Transaction, TransactionType,
};
pub use prompts::{Prompt, PromptId, PromptLibrary};
pub use store::AppState;
