//! Short nudges appended to a transaction confirmation

use crate::analytics::Totals;
use crate::extract::ParsedTransaction;
use crate::models::{Transaction, TransactionType};

const MAX_INSIGHTS: usize = 2;

/// Up to two insights about a just-committed transaction
///
/// `previous` is the log before the commit and `today` the local
/// `YYYY-MM-DD` date. Returns `None` when nothing is worth saying, otherwise
/// a suffix starting with a blank line.
pub fn smart_insight(
    parsed: &ParsedTransaction,
    previous: &[Transaction],
    currency: &str,
    balance: f64,
    today: &str,
) -> Option<String> {
    let category = parsed.category;
    let is_expense = parsed.tx_type == TransactionType::Expense;
    let is_income = !is_expense;

    let same_category_today = previous
        .iter()
        .filter(|t| t.is_expense() && t.category == Some(category) && t.date == today)
        .count();

    let mut totals = Totals::of(previous);
    match parsed.tx_type {
        TransactionType::Expense => totals.expenses += parsed.amount,
        TransactionType::Income => totals.income += parsed.amount,
    }
    let category_total: f64 = previous
        .iter()
        .filter(|t| t.is_expense() && t.category == Some(category))
        .map(|t| t.amount)
        .sum::<f64>()
        + if is_expense { parsed.amount } else { 0.0 };

    let mut insights = Vec::new();

    if is_expense && same_category_today >= 2 {
        insights.push(format!(
            "That's {} {} {} expenses today!",
            same_category_today + 1,
            category.emoji(),
            category.label()
        ));
    }

    if is_expense && totals.income > 0.0 && parsed.amount > totals.income * 0.2 {
        insights.push(format!(
            "⚠️ That's {:.0}% of your total income in one go!",
            parsed.amount / totals.income * 100.0
        ));
    }

    if let Some(rate) = totals.savings_rate() {
        if rate >= 50.0 && is_income {
            insights.push(format!("🔥 Savings rate at {:.0}%, you're a saving machine!", rate));
        } else if rate < 10.0 && is_expense {
            insights.push(format!(
                "💡 Savings rate dropped to {:.0}%, consider slowing down spending.",
                rate
            ));
        }
    }

    if balance < 0.0 {
        insights.push(format!(
            "🚨 You're in deficit! Balance: {}{:.2} in the red.",
            currency,
            balance.abs()
        ));
    } else if balance > 0.0 && balance < 100.0 && is_expense {
        insights.push(format!(
            "⚡ Balance getting low, only {}{:.2} remaining.",
            currency, balance
        ));
    }

    if is_income && parsed.amount >= 1000.0 {
        insights.push("💪 Nice income! Keep stacking!".to_string());
    }

    if is_expense && category_total >= 5000.0 {
        insights.push(format!(
            "{} Total {} spending has crossed {}{:.0}!",
            category.emoji(),
            category.label(),
            currency,
            category_total
        ));
    }

    if insights.is_empty() {
        return None;
    }
    insights.truncate(MAX_INSIGHTS);
    Some(format!("\n\n💡 {}", insights.join("\n💡 ")))
}
