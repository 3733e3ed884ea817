//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Tally - Log spending by talking about it
#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Conversational expense tracker", long_about = None)]
#[command(version)]
pub struct Cli {
    /// State file path (defaults to the platform data directory)
    #[arg(long, global = true)]
    pub state: Option<PathBuf>,

    /// Config file path (defaults to the platform data directory, then built-in)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Record a transaction manually
    Add {
        /// Amount (positive)
        amount: f64,

        /// Transaction type: expense or income
        #[arg(short = 't', long = "type", default_value = "expense")]
        tx_type: String,

        /// Category (inferred from the description if omitted)
        #[arg(short, long)]
        category: Option<String>,

        /// Description
        #[arg(short, long)]
        description: Option<String>,

        /// Date (YYYY-MM-DD), defaults to now
        #[arg(long)]
        date: Option<String>,
    },

    /// Delete a transaction by ID
    Delete {
        /// Transaction ID
        id: String,
    },

    /// List recent transactions
    List {
        /// Maximum number to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Show the current balance
    Balance,

    /// Start an interactive chat session
    Chat,

    /// Send a single chat message
    Say {
        /// Message text
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },

    /// Import transactions from pasted text (bank SMS, statements)
    Import {
        /// Text file to read (stdin if omitted)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Show what would be imported without saving
        #[arg(long)]
        dry_run: bool,
    },

    /// Spending report
    Report {
        /// Period: today, week, month, all
        #[arg(short, long, default_value = "month")]
        period: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage monthly budgets
    Budget {
        #[command(subcommand)]
        action: Option<BudgetAction>,
    },

    /// Show detected recurring payments
    Subscriptions,

    /// Show the financial health score
    Health {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Predict the balance a number of days ahead
    Forecast {
        /// Days ahead
        #[arg(short, long, default_value = "30")]
        days: u32,
    },

    /// Check the configured generative backend
    Status,
}

#[derive(Subcommand)]
pub enum BudgetAction {
    /// List budgets with this month's usage
    List,

    /// Set a category budget
    Set {
        /// Category name
        category: String,

        /// Monthly limit
        limit: f64,
    },

    /// Remove a category budget
    Delete {
        /// Category name
        category: String,
    },
}
