//! Bulk import of pasted text (bank SMS, statements, notes)
//!
//! The generative backend extracts loose transaction records; this module
//! validates them and maps them onto the closed category set before they
//! reach the ledger.

use chrono::{DateTime, Local, NaiveDate, TimeZone};
use tracing::{debug, info, warn};

use crate::ai::{AIBackend, ExtractedTransaction};
use crate::error::Result;
use crate::ledger::{Ledger, NewTransaction};
use crate::models::{Category, Millis, Transaction, TransactionType};

/// Inputs shorter than this are not worth a backend call
const MIN_IMPORT_LEN: usize = 5;

/// A validated record ready for the ledger
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedTransaction {
    pub transaction: NewTransaction,
    pub timestamp: Millis,
}

/// Extract transactions from pasted text
///
/// Backend errors are logged and yield an empty list.
pub async fn import_text<B: AIBackend + ?Sized>(
    ai: &B,
    text: &str,
    now: DateTime<Local>,
) -> Vec<ImportedTransaction> {
    let text = text.trim();
    if text.chars().count() < MIN_IMPORT_LEN {
        debug!("Import text too short, skipping backend call");
        return Vec::new();
    }

    let today = now.format("%Y-%m-%d").to_string();
    let extracted = match ai.extract_transactions(text, &today).await {
        Ok(extracted) => extracted,
        Err(e) => {
            warn!("Bulk import extraction failed: {}", e);
            return Vec::new();
        }
    };

    let total = extracted.len();
    let imported: Vec<ImportedTransaction> = extracted
        .iter()
        .filter_map(|e| map_extracted(e, now))
        .collect();

    info!(
        extracted = total,
        valid = imported.len(),
        model = ai.model(),
        "Extracted transactions from text"
    );
    imported
}

/// Validate one extracted record
///
/// Non-positive amounts are rejected. Unknown types become expenses and
/// unknown categories become `Other`. A missing or unparseable date is
/// replaced by `now`; otherwise the record lands at local noon of its date.
pub fn map_extracted(extracted: &ExtractedTransaction, now: DateTime<Local>) -> Option<ImportedTransaction> {
    if !extracted.amount.is_finite() || extracted.amount <= 0.0 {
        return None;
    }

    let tx_type = extracted
        .tx_type
        .as_deref()
        .and_then(|t| t.parse().ok())
        .unwrap_or(TransactionType::Expense);
    let category = extracted
        .category
        .as_deref()
        .map(Category::from_loose)
        .unwrap_or(Category::Other);
    let description = extracted
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(String::from);

    let timestamp = extracted
        .date
        .as_deref()
        .and_then(local_noon)
        .unwrap_or_else(|| now.timestamp_millis());

    Some(ImportedTransaction {
        transaction: NewTransaction {
            amount: extracted.amount,
            tx_type,
            category: Some(category),
            description,
        },
        timestamp,
    })
}

fn local_noon(date: &str) -> Option<Millis> {
    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok()?;
    let noon = date.and_hms_opt(12, 0, 0)?;
    Local
        .from_local_datetime(&noon)
        .earliest()
        .map(|dt| dt.timestamp_millis())
}

/// Add imported records to the ledger, keeping their original timestamps
pub fn commit_imported(ledger: &mut Ledger, items: &[ImportedTransaction]) -> Result<Vec<Transaction>> {
    let committed = items
        .iter()
        .map(|item| ledger.add_transaction_at(item.transaction.clone(), item.timestamp))
        .collect::<Result<Vec<_>>>()?;
    info!(count = committed.len(), "Committed imported transactions");
    Ok(committed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockBackend;
    use crate::models::display_date_time;

    fn extracted(amount: f64, tx_type: Option<&str>, category: Option<&str>, date: Option<&str>) -> ExtractedTransaction {
        ExtractedTransaction {
            amount,
            tx_type: tx_type.map(String::from),
            category: category.map(String::from),
            description: Some("  Shell  ".into()),
            date: date.map(String::from),
        }
    }

    #[test]
    fn test_map_extracted_defaults() {
        let now = Local::now();
        let item = map_extracted(&extracted(40.0, None, Some("fuel stuff"), None), now).unwrap();
        assert_eq!(item.transaction.tx_type, TransactionType::Expense);
        assert_eq!(item.transaction.category, Some(Category::Other));
        assert_eq!(item.transaction.description.as_deref(), Some("Shell"));
        assert_eq!(item.timestamp, now.timestamp_millis());
    }

    #[test]
    fn test_map_extracted_date_and_type() {
        let now = Local::now();
        let item = map_extracted(&extracted(900.0, Some("Income"), Some("salary"), Some("2024-03-05")), now).unwrap();
        assert_eq!(item.transaction.tx_type, TransactionType::Income);
        assert_eq!(item.transaction.category, Some(Category::Salary));

        let (date, time) = display_date_time(item.timestamp);
        assert_eq!(date, "2024-03-05");
        assert_eq!(time, "12:00:00");

        let bad_date = map_extracted(&extracted(1.0, None, None, Some("05/03/2024")), now).unwrap();
        assert_eq!(bad_date.timestamp, now.timestamp_millis());
    }

    #[test]
    fn test_map_extracted_rejects_non_positive() {
        let now = Local::now();
        assert!(map_extracted(&extracted(0.0, None, None, None), now).is_none());
        assert!(map_extracted(&extracted(-3.0, None, None, None), now).is_none());
    }

    #[tokio::test]
    async fn test_import_text_short_input() {
        let mock = MockBackend::new();
        assert!(import_text(&mock, "hi", Local::now()).await.is_empty());
    }

    #[tokio::test]
    async fn test_import_text_backend_failure_is_empty() {
        let mock = MockBackend::failing();
        assert!(import_text(&mock, "Paid 40 at Shell", Local::now()).await.is_empty());
    }

    #[tokio::test]
    async fn test_import_and_commit_past_dated() {
        let mock = MockBackend::new().with_import_response(
            r#"```json
[
  {"amount": 40, "type": "expense", "category": "transport", "description": "Shell", "date": "2024-01-10"},
  {"amount": 0, "type": "expense", "category": "food"},
  {"amount": 2500, "type": "income", "category": "salary", "description": "Acme payroll", "date": "2024-01-01"}
]
```"#,
        );

        let items = import_text(&mock, "bank statement text", Local::now()).await;
        assert_eq!(items.len(), 2);

        let mut ledger = Ledger::new();
        ledger.add_transaction(NewTransaction::expense(10.0, Category::Food)).unwrap();
        let committed = commit_imported(&mut ledger, &items).unwrap();

        assert_eq!(committed.len(), 2);
        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger.balance(), 2450.0);
        assert_eq!(committed[0].date, "2024-01-10");
    }
}
