//! Reply templates for the conversational interpreter

use chrono::{DateTime, Local};

use crate::analytics::{
    breakdown, category_spending, detect_period, detect_query_category, filter_by_window,
    period_label, spending_summary, Totals,
};
use crate::extract::ParsedTransaction;
use crate::models::{Category, Transaction, TransactionType};

use super::intent::wants_breakdown;

/// Canned replies used when the assistant is unavailable
pub const FALLBACK_RESPONSES: [&str; 3] = [
    "🤔 I couldn't quite understand that. Try something like \"spent 500 on groceries\" or \"earned 2000 salary\".",
    "💭 Hmm, I'm not sure what to do with that. Could you tell me about an expense or income? For example: \"paid 300 for electricity\".",
    "🤖 I work best with transaction messages! Try: \"bought lunch for 150\" or \"received 1000 refund\". Type help for more examples!",
];

pub const CANCELLED: &str = "👍 No problem! Cancelled. What else would you like to do?";

pub const NOTHING_TO_UNDO: &str = "📭 No transactions to undo!";

const HELP_TEXT: &str = "🤖 Tally Assistant Help

I can help you track expenses and income using natural language! Here's how:

💸 Log an Expense:
• \"Spent 500 on groceries\"
• \"Paid 200 for electricity\"
• \"Bought coffee for 5\"

💰 Log Income:
• \"Received salary 50000\"
• \"Earned 1000 from freelance\"
• \"Got refund of 300\"

📊 Check Balance:
• \"What's my balance?\"
• \"How much do I have?\"

📂 Spending Analytics:
• \"Spending on food this month\"
• \"What are my top expenses?\"
• \"Spending this week\"
• \"Category breakdown\"

↩️ Undo & Edit:
• \"Undo that\" reverts the last transaction
• Just type a number and I'll ask for details

💡 Tips:
• Categories are auto-detected! (food, transport, bills, etc.)
• Log several at once: \"uber 18.50, coffee 4\"";

const GREETING_TEXT: &str = "👋 Hey there!

I'm your finance assistant with smart category detection and spending analytics!

💡 Try saying:
• \"Spent 200 on groceries\" → auto-detects 🍔 Food
• \"Paid 150 for uber\" → auto-detects 🚗 Transport
• \"Spending on food this month\"
• \"What are my top expenses?\"";

pub fn help_text() -> &'static str {
    HELP_TEXT
}

pub fn greeting_text() -> &'static str {
    GREETING_TEXT
}

/// `$12.00`, or `$12.00 (deficit)` for negative values
fn signed_balance(currency: &str, balance: f64) -> String {
    let deficit = if balance < 0.0 { " (deficit)" } else { "" };
    format!("{}{:.2}{}", currency, balance.abs(), deficit)
}

/// Confirmation for a single committed transaction
pub fn transaction_response(parsed: &ParsedTransaction, currency: &str, balance: f64) -> String {
    let (emoji, action) = match parsed.tx_type {
        TransactionType::Expense => ("💸", "Expense"),
        TransactionType::Income => ("💰", "Income"),
    };
    let desc = parsed
        .description
        .as_deref()
        .map(|d| format!(" for {}", d))
        .unwrap_or_default();
    let category = if parsed.category == Category::Other {
        String::new()
    } else {
        format!("\n{} Category: {}", parsed.category.emoji(), parsed.category.label())
    };
    let balance_emoji = if balance >= 0.0 { "📊" } else { "⚠️" };

    format!(
        "{} {} of {}{:.2}{} recorded!{}\n\n{} Current balance: {}",
        emoji,
        action,
        currency,
        parsed.amount,
        desc,
        category,
        balance_emoji,
        signed_balance(currency, balance)
    )
}

/// Overall financial summary with the top three categories
pub fn balance_response(currency: &str, balance: f64, transactions: &[Transaction]) -> String {
    let totals = Totals::of(transactions);
    let balance_emoji = if balance >= 0.0 { "✅" } else { "🔴" };

    let mut response = String::from("📊 Financial Summary\n\n");
    response += &format!("{} Balance: {}\n", balance_emoji, signed_balance(currency, balance));
    response += &format!("💰 Total Income: {}{:.2}\n", currency, totals.income);
    response += &format!("💸 Total Expenses: {}{:.2}\n", currency, totals.expenses);
    response += &format!("📝 Transactions: {}", transactions.len());

    if let Some(rate) = totals.savings_rate() {
        response += &format!("\n📈 Savings Rate: {:.1}%", rate);
    }

    let rows = breakdown(transactions);
    if !rows.is_empty() {
        response += "\n\n📂 Top Categories:";
        for row in rows.iter().take(3) {
            response += &format!(
                "\n{} {}: {}{:.2}",
                row.category.emoji(),
                row.category.label(),
                currency,
                row.total
            );
        }
    }

    response
}

/// Prompt asking whether a bare amount is an expense or income
pub fn ambiguous_response(amount: f64, currency: &str) -> String {
    format!(
        "💭 Got {}{:.2}, is this an expense or income?\n\nJust reply with \"expense\" or \"income\", or give me more context like \"spent {:.0} on food\".",
        currency, amount, amount
    )
}

pub fn clarification_reprompt(amount: f64, currency: &str) -> String {
    format!(
        "Please reply with \"expense\" or \"income\" for the {}{:.2}, or say \"cancel\" to discard.",
        currency, amount
    )
}

/// Reply for a reversed transaction; `balance` is after the reversal
pub fn undo_response(reversed: &Transaction, currency: &str, balance: f64) -> String {
    let emoji = if reversed.is_expense() { "💸" } else { "💰" };
    let category = reversed
        .category
        .map(|c| format!(" ({} {})", c.emoji(), c.label()))
        .unwrap_or_default();

    format!(
        "↩️ Transaction reversed!\n\n{} {}{:.2} {}{} has been undone.\n\n📊 Updated balance: {}",
        emoji,
        currency,
        reversed.amount,
        reversed.tx_type,
        category,
        signed_balance(currency, balance)
    )
}

/// Summary after committing several transactions from one message
pub fn multi_transaction_summary(parsed: &[ParsedTransaction], currency: &str, balance: f64) -> String {
    let mut summary = format!("✅ Processed {} transactions:\n", parsed.len());
    for t in parsed {
        summary += &format!(
            "\n• {} {}{} for {}",
            t.category.emoji(),
            currency,
            t.amount,
            t.category
        );
    }
    summary + &format!("\n\n📊 New Balance: {}{:.2}", currency, balance)
}

/// Answer an analytics question about the log
///
/// A named category gets a category report, breakdown words get the top
/// six categories, anything else gets the general spending report.
pub fn analytics_response(
    text: &str,
    transactions: &[Transaction],
    currency: &str,
    now: DateTime<Local>,
) -> String {
    let lower = text.to_lowercase();
    let period = detect_period(&lower);
    let label = period_label(period);
    let in_window = filter_by_window(transactions, period, now);

    if let Some(category) = detect_query_category(&lower) {
        let spending = category_spending(&in_window, category);
        if spending.count == 0 {
            return format!(
                "{} No {} expenses found {}. Start tracking by saying \"spent [amount] on {}\"!",
                category.emoji(),
                category.label(),
                label,
                category
            );
        }
        return format!(
            "{} {} Spending ({}):\n\n💰 Total: {}{:.2}\n📝 Transactions: {}\n📊 Average: {}{:.2} per transaction",
            category.emoji(),
            category.label(),
            label,
            currency,
            spending.total,
            spending.count,
            currency,
            spending.average
        );
    }

    if wants_breakdown(&lower) {
        let rows = breakdown(&in_window);
        if rows.is_empty() {
            return format!(
                "📊 No categorized expenses found {}. Start tracking with sentences like \"spent 200 on groceries\"!",
                label
            );
        }

        let mut response = format!("📊 Spending Breakdown ({}):\n", label);
        for row in rows.iter().take(6) {
            let bar = "█".repeat(((row.percentage / 10.0).round() as usize).max(1));
            response += &format!(
                "\n{} {}\n   {}{:.2} ({:.0}%) {} [{} txns]",
                row.category.emoji(),
                row.category.label(),
                currency,
                row.total,
                row.percentage,
                bar,
                row.count
            );
        }
        let total_spent: f64 = rows.iter().map(|r| r.total).sum();
        response += &format!("\n\n💸 Total spent: {}{:.2}", currency, total_spent);
        return response;
    }

    let summary = spending_summary(&in_window, transactions, period, now);
    let totals = summary.totals;
    let mut response = format!("📊 Spending Report ({}):\n\n", label);
    response += &format!(
        "💸 Expenses: {}{:.2} ({} transactions)\n",
        currency, totals.expenses, totals.expense_count
    );
    response += &format!(
        "💰 Income: {}{:.2} ({} transactions)\n",
        currency, totals.income, totals.income_count
    );
    response += &format!("📈 Daily avg: {}{:.2}", currency, summary.daily_average);
    if let Some(rate) = summary.savings_rate {
        response += &format!("\n💎 Savings rate: {:.1}%", rate);
    }
    response
}
