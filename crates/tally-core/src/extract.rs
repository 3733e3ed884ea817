//! Transaction extraction from free text
//!
//! Turns short messages like "spent 200 on food" or "Uber 18.50, Coffee 4.00"
//! into structured transactions. Every function here is pure.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::classify::detect_category;
use crate::models::{Category, TransactionType};

const INCOME_TRIGGERS: &[&str] = &[
    "received", "receive", "earned", "earn", "salary", "income", "got paid", "credited",
    "credit", "won", "bonus", "refund", "reimbursed", "reimbursement", "deposited", "deposit",
    "payment received", "freelance", "dividend", "interest",
];

const EXPENSE_TRIGGERS: &[&str] = &[
    "spent", "spend", "paid", "pay", "bought", "buy", "cost", "expense", "purchase",
    "purchased", "charged", "charge", "debited", "debit", "lost", "gave", "give", "used",
    "shopping", "shopped", "owe", "owed",
];

fn pattern(src: &str) -> Regex {
    Regex::new(src).expect("valid regex")
}

/// Amount patterns in priority order; group 1 is the number
static AMOUNT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"[$₹€£¥₩₽]\s*([\d,]+\.?\d*)",
        r"(?i)([\d,]+\.?\d*)\s*(?:dollars?|rupees?|euros?|pounds?|yen)",
        r"(?i)(?:rs\.?|inr)\s*([\d,]+\.?\d*)",
        r"(?i)(?:spent|paid|bought|earned|received|got|cost|spend|pay|buy|gave|give|lost|deposited|deposit|credited|credit)\s+(?:about\s+|around\s+|approximately\s+|nearly\s+)?([\d,]+\.?\d*)",
        r"(?i)([\d,]+\.?\d*)\s*(?:spent|paid|bought|earned|received|for|on|towards)",
        r"\b([\d,]+\.?\d+)\b",
        r"\b([\d,]{2,})\b",
        r"\b(\d+)\b",
    ]
    .iter()
    .map(|src| pattern(src))
    .collect()
});

static DESCRIPTION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(?:on|for|towards|at|from)\s+(.+?)(?:\s*$)",
        r"(?i)(?:bought|purchased)\s+(?:a\s+|an\s+|some\s+)?(.+?)(?:\s+for\s+|\s*$)",
    ]
    .iter()
    .map(|src| pattern(src))
    .collect()
});

static SYMBOL_AMOUNT: Lazy<Regex> = Lazy::new(|| pattern(r"[$₹€£¥₩₽]\s*[\d,]+\.?\d*"));
static WORD_AMOUNT: Lazy<Regex> =
    Lazy::new(|| pattern(r"(?i)[\d,]+\.?\d*\s*(?:dollars?|rupees?|euros?|pounds?)"));
static BARE_INTEGER: Lazy<Regex> = Lazy::new(|| pattern(r"\b\d+\b"));
static ANY_DIGIT: Lazy<Regex> = Lazy::new(|| pattern(r"\d"));
static AMBIGUOUS: Lazy<Regex> = Lazy::new(|| pattern(r"^[$₹€£¥₩₽]?\s*(\d[\d,]*\.?\d*)$"));
static SEGMENT_SPLIT: Lazy<Regex> = Lazy::new(|| pattern(r"(?i),|\s+and\s+|\s+&\s+"));

/// Minimum trimmed length for a multi-transaction segment
const MIN_SEGMENT_LEN: usize = 5;

/// A transaction recognized in free text but not yet committed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedTransaction {
    pub amount: f64,
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: Category,
}

/// Whether a message is a bare number with no context
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbiguousAmount {
    pub is_ambiguous: bool,
    pub amount: Option<f64>,
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.replace(',', "").parse::<f64>().ok()
}

/// Extract the first positive amount, trying patterns in priority order
pub fn extract_amount(text: &str) -> Option<f64> {
    AMOUNT_PATTERNS.iter().find_map(|re| {
        re.captures(text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| parse_number(m.as_str()))
            .filter(|n| *n > 0.0)
    })
}

/// Decide whether a message describes income or an expense
///
/// Income triggers are checked first. A message with a number but no
/// trigger is treated as an expense.
pub fn determine_type(text: &str) -> Option<TransactionType> {
    let lower = text.to_lowercase();
    if INCOME_TRIGGERS.iter().any(|t| lower.contains(t)) {
        return Some(TransactionType::Income);
    }
    if EXPENSE_TRIGGERS.iter().any(|t| lower.contains(t)) {
        return Some(TransactionType::Expense);
    }
    if ANY_DIGIT.is_match(&lower) {
        return Some(TransactionType::Expense);
    }
    None
}

/// Pull a short description out of the message
pub fn extract_description(text: &str) -> Option<String> {
    DESCRIPTION_PATTERNS.iter().find_map(|re| {
        let span = re.captures(text)?.get(1)?.as_str();
        let cleaned = SYMBOL_AMOUNT.replace_all(span, "");
        let cleaned = WORD_AMOUNT.replace_all(&cleaned, "");
        let cleaned = BARE_INTEGER.replace_all(&cleaned, "");
        let cleaned = cleaned.trim();
        (cleaned.chars().count() > 1).then(|| cleaned.to_string())
    })
}

/// Parse a single transaction from a message
pub fn parse_transaction(text: &str) -> Option<ParsedTransaction> {
    let lower = text.trim().to_lowercase();
    let amount = extract_amount(&lower)?;
    let tx_type = determine_type(&lower)?;
    let description = extract_description(&lower);

    let mut category = detect_category(&lower).category;
    if category == Category::Other {
        if let Some(desc) = &description {
            category = detect_category(desc).category;
        }
    }

    Some(ParsedTransaction {
        amount,
        tx_type,
        description,
        category,
    })
}

/// Split a message into transaction segments
///
/// Commas between two digits are thousands separators and never split.
fn split_segments(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut segments = Vec::new();
    let mut start = 0;

    for m in SEGMENT_SPLIT.find_iter(text) {
        if m.as_str() == "," {
            let before = m.start().checked_sub(1).map(|i| bytes[i]);
            let after = bytes.get(m.end()).copied();
            let in_number = matches!((before, after), (Some(b), Some(a)) if b.is_ascii_digit() && a.is_ascii_digit());
            if in_number {
                continue;
            }
        }
        segments.push(&text[start..m.start()]);
        start = m.end();
    }
    segments.push(&text[start..]);
    segments
}

/// Parse every transaction in a message such as "uber 18.50, coffee 4.00"
///
/// Segments shorter than five characters or without a recognizable
/// transaction are dropped.
pub fn parse_multiple_transactions(text: &str) -> Vec<ParsedTransaction> {
    split_segments(text)
        .into_iter()
        .map(str::trim)
        .filter(|s| s.chars().count() >= MIN_SEGMENT_LEN)
        .filter_map(parse_transaction)
        .collect()
}

/// Check whether the message is only an amount, e.g. "500" or "$12.50"
pub fn is_ambiguous_amount(text: &str) -> AmbiguousAmount {
    let amount = AMBIGUOUS
        .captures(text.trim())
        .and_then(|caps| caps.get(1))
        .and_then(|m| parse_number(m.as_str()))
        .filter(|n| *n > 0.0);

    AmbiguousAmount {
        is_ambiguous: amount.is_some(),
        amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patterns_compile() {
        assert_eq!(AMOUNT_PATTERNS.len(), 8);
        assert_eq!(DESCRIPTION_PATTERNS.len(), 2);
        Lazy::force(&SEGMENT_SPLIT);
        Lazy::force(&AMBIGUOUS);
    }

    #[test]
    fn test_extract_amount_currency_symbol() {
        assert_eq!(extract_amount("lunch ₹250 today"), Some(250.0));
        assert_eq!(extract_amount("$1,299.99 laptop"), Some(1299.99));
    }

    #[test]
    fn test_extract_amount_currency_word_and_prefix() {
        assert_eq!(extract_amount("40 dollars on books"), Some(40.0));
        assert_eq!(extract_amount("rs. 120 auto"), Some(120.0));
        assert_eq!(extract_amount("INR 999"), Some(999.0));
    }

    #[test]
    fn test_extract_amount_after_verb() {
        assert_eq!(extract_amount("spent about 75 at the mall"), Some(75.0));
        assert_eq!(extract_amount("received 50000"), Some(50000.0));
    }

    #[test]
    fn test_extract_amount_skips_zero() {
        assert_eq!(extract_amount("spent 0 on nothing"), None);
        assert_eq!(extract_amount("no numbers here"), None);
    }

    #[test]
    fn test_determine_type() {
        assert_eq!(determine_type("got a refund of 20"), Some(TransactionType::Income));
        assert_eq!(determine_type("paid 20 for parking"), Some(TransactionType::Expense));
        assert_eq!(determine_type("coffee 4"), Some(TransactionType::Expense));
        assert_eq!(determine_type("hello there"), None);
    }

    #[test]
    fn test_income_checked_before_expense() {
        // "pay" is an expense trigger but "got paid" is income
        assert_eq!(determine_type("got paid 300"), Some(TransactionType::Income));
    }

    #[test]
    fn test_extract_description() {
        assert_eq!(extract_description("spent 200 on food"), Some("food".to_string()));
        assert_eq!(
            extract_description("bought a new keyboard for 80"),
            Some("new keyboard".to_string())
        );
        assert_eq!(extract_description("paid 50 for $50"), None);
        assert_eq!(extract_description("received 500"), None);
    }

    #[test]
    fn test_parse_transaction_expense() {
        let parsed = parse_transaction("Spent 200 on food").unwrap();
        assert_eq!(parsed.amount, 200.0);
        assert_eq!(parsed.tx_type, TransactionType::Expense);
        assert_eq!(parsed.category, Category::Food);
        assert_eq!(parsed.description.as_deref(), Some("food"));
    }

    #[test]
    fn test_parse_transaction_income() {
        let parsed = parse_transaction("Received salary 50000").unwrap();
        assert_eq!(parsed.amount, 50000.0);
        assert_eq!(parsed.tx_type, TransactionType::Income);
        assert_eq!(parsed.category, Category::Salary);
    }

    #[test]
    fn test_parse_transaction_requires_amount() {
        assert!(parse_transaction("spent a lot on food").is_none());
    }

    #[test]
    fn test_parse_multiple() {
        let parsed = parse_multiple_transactions("Uber 18.50, Coffee 4.00");
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].amount, 18.5);
        assert_eq!(parsed[0].category, Category::Transport);
        assert_eq!(parsed[1].amount, 4.0);
        assert_eq!(parsed[1].category, Category::Food);
    }

    #[test]
    fn test_parse_multiple_with_and() {
        let parsed = parse_multiple_transactions("spent 30 on lunch and paid 15 for parking");
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1].category, Category::Transport);
    }

    #[test]
    fn test_parse_multiple_keeps_thousands_separator() {
        let parsed = parse_multiple_transactions("spent 1,500 on rent");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].amount, 1500.0);
        assert_eq!(parsed[0].category, Category::Housing);
    }

    #[test]
    fn test_parse_multiple_drops_short_and_unparsed() {
        let parsed = parse_multiple_transactions("ok, hello world, coffee 3");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].amount, 3.0);
    }

    #[test]
    fn test_ambiguous_amount() {
        let bare = is_ambiguous_amount("500");
        assert!(bare.is_ambiguous);
        assert_eq!(bare.amount, Some(500.0));

        assert_eq!(is_ambiguous_amount("$12.50").amount, Some(12.5));
        assert!(!is_ambiguous_amount("spent 500").is_ambiguous);
        assert!(!is_ambiguous_amount("0").is_ambiguous);
    }
}
