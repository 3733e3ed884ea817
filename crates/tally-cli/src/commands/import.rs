//! Bulk import command implementation

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use tally_core::{
    commit_imported, import_text, models::display_date_time, AIBackend, AIClient, Category, Config,
    ImportedTransaction,
};
use tracing::warn;

use super::{truncate, Workspace};

pub async fn cmd_import(ws: &mut Workspace, config: &Config, file: Option<&Path>, dry_run: bool) -> Result<()> {
    let text = match file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };

    let client = AIClient::from_config(&config.ai).ok_or_else(|| {
        anyhow::anyhow!(
            "Bulk import needs a generative backend.\n\
             Set AI_BACKEND=ollama with OLLAMA_HOST, or AI_BACKEND=openai_compatible with OPENAI_COMPATIBLE_HOST"
        )
    })?;

    println!("📥 Extracting transactions with {}...", client.model());
    let items = import_with_timeout(&client, &text, config).await;
    run_import(ws, &items, dry_run)
}

async fn import_with_timeout(client: &AIClient, text: &str, config: &Config) -> Vec<ImportedTransaction> {
    match tokio::time::timeout(config.timeout(), import_text(client, text, Local::now())).await {
        Ok(items) => items,
        Err(_) => {
            warn!(timeout_secs = config.ai.timeout_secs, "Bulk import timed out");
            Vec::new()
        }
    }
}

/// Show the extracted records and commit them unless `dry_run`
pub fn run_import(ws: &mut Workspace, items: &[ImportedTransaction], dry_run: bool) -> Result<()> {
    if items.is_empty() {
        println!("   No transactions found.");
        return Ok(());
    }

    println!("   Found {} transactions", items.len());
    println!("   ─────────────────────────────────────────────────────────────");
    for item in items {
        let (date, _) = display_date_time(item.timestamp);
        let category = item.transaction.category.unwrap_or(Category::Other);
        println!(
            "   {} │ {:>7} {}{:>9.2} │ {} {:<14} │ {}",
            date,
            item.transaction.tx_type.as_str(),
            ws.currency(),
            item.transaction.amount,
            category.emoji(),
            category.as_str(),
            truncate(item.transaction.description.as_deref().unwrap_or(""), 30)
        );
    }

    if dry_run {
        println!();
        println!("   Dry run: nothing saved.");
        return Ok(());
    }

    let committed = commit_imported(&mut ws.ledger, items)?;
    ws.save()?;

    println!();
    println!("✅ Imported {} transactions", committed.len());
    println!("   Balance: {}{:.2}", ws.currency(), ws.ledger.balance());

    Ok(())
}
