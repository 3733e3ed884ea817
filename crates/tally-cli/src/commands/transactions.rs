//! Transaction command implementations

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, TimeZone};
use tally_core::{detect_category, NewTransaction, Transaction, TransactionType};

use super::{parse_category, truncate, Workspace};

pub fn cmd_add(
    ws: &mut Workspace,
    amount: f64,
    tx_type: &str,
    category: Option<&str>,
    description: Option<&str>,
    date: Option<&str>,
) -> Result<()> {
    let tx_type: TransactionType = tx_type.parse().map_err(anyhow::Error::msg)?;
    let category = match category {
        Some(name) => parse_category(name)?,
        None => detect_category(description.unwrap_or_default()).category,
    };

    let new = NewTransaction {
        amount,
        tx_type,
        category: Some(category),
        description: description.map(String::from),
    };

    let tx = match date {
        Some(date) => {
            let timestamp = local_noon(date)?;
            ws.ledger.add_transaction_at(new, timestamp)?
        }
        None => ws.ledger.add_transaction(new)?,
    };
    ws.save()?;

    println!("✅ Recorded {} [{}]", tx.id, tx.tx_type);
    print_row(&tx, ws.currency());
    println!("   Balance: {}{:.2}", ws.currency(), ws.ledger.balance());

    Ok(())
}

fn local_noon(date: &str) -> Result<i64> {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .context("Invalid --date format (use YYYY-MM-DD)")?;
    let noon = date
        .and_hms_opt(12, 0, 0)
        .context("Invalid time of day")?;
    Local
        .from_local_datetime(&noon)
        .earliest()
        .map(|dt| dt.timestamp_millis())
        .context("Date does not exist in the local timezone")
}

pub fn cmd_delete(ws: &mut Workspace, id: &str) -> Result<()> {
    let tx = ws
        .ledger
        .delete_transaction(id)
        .with_context(|| format!("Transaction {} not found", id))?;
    ws.save()?;

    println!("🗑️  Deleted transaction {}:", tx.id);
    print_row(&tx, ws.currency());
    println!("   Balance: {}{:.2}", ws.currency(), ws.ledger.balance());

    Ok(())
}

pub fn cmd_list(ws: &Workspace, limit: usize) -> Result<()> {
    if ws.ledger.is_empty() {
        println!("No transactions yet. Record one with:");
        println!("  tally add 12.50 --description lunch");
        println!("  tally say spent 12.50 on lunch");
        return Ok(());
    }

    // Display by time, newest first; the log itself is in recording order
    let mut transactions: Vec<&Transaction> = ws.ledger.transactions().iter().collect();
    transactions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    println!();
    println!("📝 Recent Transactions");
    println!("   ─────────────────────────────────────────────────────────────");

    for tx in transactions.into_iter().take(limit) {
        print_row(tx, ws.currency());
    }

    Ok(())
}

pub fn cmd_balance(ws: &Workspace) -> Result<()> {
    let balance = ws.ledger.balance();
    let amount_str = if balance < 0.0 {
        format!("\x1b[31m-{}{:.2}\x1b[0m", ws.currency(), balance.abs())
    } else {
        format!("\x1b[32m{}{:.2}\x1b[0m", ws.currency(), balance)
    };

    println!();
    println!("💰 Balance: {}", amount_str);
    println!("   Income:   {}{:.2}", ws.currency(), ws.ledger.total_income());
    println!("   Expenses: {}{:.2}", ws.currency(), ws.ledger.total_expenses());
    println!("   Transactions: {}", ws.ledger.len());

    Ok(())
}

fn print_row(tx: &Transaction, currency: &str) {
    let amount_str = match tx.tx_type {
        TransactionType::Expense => format!("\x1b[31m{}{:.2}\x1b[0m", currency, tx.amount), // Red for expenses
        TransactionType::Income => format!("\x1b[32m+{}{:.2}\x1b[0m", currency, tx.amount), // Green for income
    };
    let what = tx
        .description
        .clone()
        .unwrap_or_else(|| tx.category_or_other().label().to_string());

    println!(
        "   {} │ {:>12} │ {} {:<14} │ {} [{}]",
        tx.date,
        amount_str,
        tx.category_or_other().emoji(),
        tx.category_or_other().as_str(),
        truncate(&what, 30),
        tx.id
    );
}
