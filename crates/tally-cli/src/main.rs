//! Tally CLI - Conversational expense tracker
//!
//! Usage:
//!   tally add 12.50 -d lunch   Record a transaction
//!   tally chat                 Interactive chat session
//!   tally say spent 40 on fuel Single chat message
//!   tally report -p week       Spending report

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = commands::load_config(cli.config.as_deref())?;
    let state_path = commands::resolve_state_path(cli.state.as_deref())?;
    let mut ws = commands::Workspace::open(&state_path, &config)?;

    match cli.command {
        Commands::Add {
            amount,
            tx_type,
            category,
            description,
            date,
        } => commands::cmd_add(
            &mut ws,
            amount,
            &tx_type,
            category.as_deref(),
            description.as_deref(),
            date.as_deref(),
        ),
        Commands::Delete { id } => commands::cmd_delete(&mut ws, &id),
        Commands::List { limit } => commands::cmd_list(&ws, limit),
        Commands::Balance => commands::cmd_balance(&ws),
        Commands::Chat => commands::cmd_chat(&mut ws, &config).await,
        Commands::Say { message } => commands::cmd_say(&mut ws, &config, &message.join(" ")).await,
        Commands::Import { file, dry_run } => {
            commands::cmd_import(&mut ws, &config, file.as_deref(), dry_run).await
        }
        Commands::Report { period, json } => commands::cmd_report(&ws, &period, json),
        Commands::Budget { action } => match action {
            None | Some(BudgetAction::List) => commands::cmd_budget_list(&ws),
            Some(BudgetAction::Set { category, limit }) => {
                commands::cmd_budget_set(&mut ws, &category, limit)
            }
            Some(BudgetAction::Delete { category }) => {
                commands::cmd_budget_delete(&mut ws, &category)
            }
        },
        Commands::Subscriptions => commands::cmd_subscriptions(&ws),
        Commands::Health { json } => commands::cmd_health(&ws, json),
        Commands::Forecast { days } => commands::cmd_forecast(&ws, days),
        Commands::Status => commands::cmd_status(&config).await,
    }
}
