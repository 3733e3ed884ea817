//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared utilities (state path, config, `Workspace`) and status
//! - `transactions` - Manual entry, deletion, listing and balance
//! - `chat` - Interactive and single-shot conversation
//! - `import` - Bulk import from pasted text
//! - `budgets` - Budget management commands
//! - `reports` - Spending report, subscriptions, health and forecast

pub mod budgets;
pub mod chat;
pub mod core;
pub mod import;
pub mod reports;
pub mod transactions;

// Re-export command functions for main.rs
pub use budgets::*;
pub use chat::*;
pub use core::*;
pub use import::*;
pub use reports::*;
pub use transactions::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
