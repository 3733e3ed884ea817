//! Budget command implementations

use anyhow::Result;
use chrono::Local;
use tally_core::analytics::all_budget_statuses;
use tally_core::BudgetLevel;

use super::{parse_category, Workspace};

pub fn cmd_budget_list(ws: &Workspace) -> Result<()> {
    if ws.ledger.budgets().is_empty() {
        println!("No budgets set. Add one with:");
        println!("  tally budget set food 400");
        return Ok(());
    }

    let statuses = all_budget_statuses(ws.ledger.transactions(), ws.ledger.budgets(), Local::now());
    let cur = ws.currency();

    println!();
    println!("🎯 Monthly Budgets");
    println!("   ─────────────────────────────────────────────────────────────");

    for status in statuses {
        let icon = match status.level {
            BudgetLevel::Ok => "✅",
            BudgetLevel::Warning => "⚠️",
            BudgetLevel::Exceeded => "🚨",
        };
        let category = status.budget.category;
        println!(
            "   {} {} {:<18} │ {}{:>9.2} of {}{:<9.2} │ {:>5.1}%",
            icon,
            category.emoji(),
            category.label(),
            cur,
            status.spent,
            cur,
            status.budget.limit,
            status.percent
        );
    }

    Ok(())
}

pub fn cmd_budget_set(ws: &mut Workspace, category: &str, limit: f64) -> Result<()> {
    let category = parse_category(category)?;
    let budget = ws.ledger.set_budget(category, limit)?;
    ws.save()?;

    println!(
        "✅ Budget for {} {} set to {}{:.2}/month",
        category.emoji(),
        category.label(),
        ws.currency(),
        budget.limit
    );
    Ok(())
}

pub fn cmd_budget_delete(ws: &mut Workspace, category: &str) -> Result<()> {
    let category = parse_category(category)?;
    let id = ws
        .ledger
        .budget_for(category)
        .map(|b| b.id.clone())
        .ok_or_else(|| anyhow::anyhow!("No budget set for {}", category))?;
    ws.ledger.delete_budget(&id)?;
    ws.save()?;

    println!("🗑️  Removed the {} budget", category.label());
    Ok(())
}
