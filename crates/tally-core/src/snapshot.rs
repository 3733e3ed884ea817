//! Plain-text financial snapshot handed to the assistant as context

use chrono::{DateTime, Local};

use crate::analytics::{breakdown, Totals};
use crate::models::{display_date_time, Transaction};

const TOP_CATEGORIES: usize = 5;
const RECENT_TRANSACTIONS: usize = 10;

/// Render the snapshot for a most-recent-first transaction log
pub fn render_snapshot(transactions: &[Transaction], currency: &str, now: DateTime<Local>) -> String {
    let totals = Totals::of(transactions);
    let savings_rate = totals
        .savings_rate()
        .map(|r| format!("{:.1}", r))
        .unwrap_or_else(|| "0".to_string());

    let (today, _) = display_date_time(now.timestamp_millis());
    let today_spent: f64 = transactions
        .iter()
        .filter(|t| t.is_expense() && t.date == today)
        .map(|t| t.amount)
        .sum();

    let top_categories = breakdown(transactions)
        .iter()
        .take(TOP_CATEGORIES)
        .map(|row| format!("{}: {}{:.0}", row.category, currency, row.total))
        .collect::<Vec<_>>()
        .join(", ");

    let recent = transactions
        .iter()
        .take(RECENT_TRANSACTIONS)
        .map(|t| {
            let what = t
                .description
                .clone()
                .or_else(|| t.category.map(|c| c.to_string()))
                .unwrap_or_else(|| "uncategorized".to_string());
            format!("- {} of {}{} for {} on {}", t.tx_type, currency, t.amount, what, t.date)
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "FINANCIAL SNAPSHOT:\n\
         - Balance: {cur}{balance:.2}\n\
         - Total Income: {cur}{income:.2}\n\
         - Total Expenses: {cur}{expenses:.2}\n\
         - Savings Rate: {rate}%\n\
         - Today's spending: {cur}{spent_today:.2}\n\
         - Top categories: {top}\n\
         - Total transactions: {count}\n\
         \n\
         RECENT TRANSACTIONS:\n\
         {recent}",
        cur = currency,
        balance = totals.net(),
        income = totals.income,
        expenses = totals.expenses,
        rate = savings_rate,
        spent_today = today_spent,
        top = if top_categories.is_empty() { "None yet" } else { top_categories.as_str() },
        count = transactions.len(),
        recent = if recent.is_empty() { "No transactions yet." } else { recent.as_str() },
    )
}
