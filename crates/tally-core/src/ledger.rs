//! Transaction log and budget store
//!
//! The ledger is the only writer of transactions and budgets. Every mutation
//! updates the log and the derived balance inside a single `&mut self` call,
//! so `balance == Σincome − Σexpense` holds between any two calls.

use chrono::Local;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::extract::ParsedTransaction;
use crate::models::{
    display_date_time, Budget, BudgetPeriod, Category, Millis, Transaction, TransactionType,
};
use crate::store::AppState;

/// Input for recording a transaction
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub amount: f64,
    pub tx_type: TransactionType,
    pub category: Option<Category>,
    pub description: Option<String>,
}

impl NewTransaction {
    pub fn expense(amount: f64, category: Category) -> Self {
        Self {
            amount,
            tx_type: TransactionType::Expense,
            category: Some(category),
            description: None,
        }
    }

    pub fn income(amount: f64, category: Category) -> Self {
        Self {
            amount,
            tx_type: TransactionType::Income,
            category: Some(category),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl From<&ParsedTransaction> for NewTransaction {
    fn from(parsed: &ParsedTransaction) -> Self {
        Self {
            amount: parsed.amount,
            tx_type: parsed.tx_type,
            category: Some(parsed.category),
            description: parsed.description.clone(),
        }
    }
}

/// Numeric counter suffix of a generated id (`"{timestamp}-{seq}"`)
fn id_suffix(id: &str) -> Option<u64> {
    id.rsplit('-').next()?.parse().ok()
}

/// In-memory transaction log with budgets
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    /// Most recently recorded first
    transactions: Vec<Transaction>,
    budgets: Vec<Budget>,
    balance: f64,
    seq: u64,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a ledger from persisted state
    ///
    /// The balance is recomputed from the log. The id counter resumes after
    /// the highest suffix already in use, so deletions never cause reuse.
    pub fn from_state(state: &AppState) -> Self {
        let balance = state.transactions.iter().map(Transaction::signed_amount).sum();
        let seq = state
            .transactions
            .iter()
            .map(|t| t.id.as_str())
            .chain(state.budgets.iter().map(|b| b.id.as_str()))
            .filter_map(id_suffix)
            .max()
            .unwrap_or(0);
        Self {
            transactions: state.transactions.clone(),
            budgets: state.budgets.clone(),
            balance,
            seq,
        }
    }

    /// Write the transaction and budget lists back into `state`
    pub fn write_to(&self, state: &mut AppState) {
        state.transactions = self.transactions.clone();
        state.budgets = self.budgets.clone();
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn budgets(&self) -> &[Budget] {
        &self.budgets
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    /// The most recently recorded transaction
    pub fn last_recorded(&self) -> Option<&Transaction> {
        self.transactions.first()
    }

    pub fn get(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    /// Record a transaction timestamped now
    pub fn add_transaction(&mut self, new: NewTransaction) -> Result<Transaction> {
        let now = Local::now().timestamp_millis();
        self.add_transaction_at(new, now)
    }

    /// Record a transaction with an explicit timestamp (past-dated imports)
    pub fn add_transaction_at(&mut self, new: NewTransaction, timestamp: Millis) -> Result<Transaction> {
        if !new.amount.is_finite() || new.amount <= 0.0 {
            return Err(Error::InvalidData(format!(
                "Transaction amount must be positive, got {}",
                new.amount
            )));
        }

        self.seq += 1;
        let (date, time) = display_date_time(timestamp);
        let description = new
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        let tx = Transaction {
            id: format!("{}-{}", timestamp, self.seq),
            amount: new.amount,
            tx_type: new.tx_type,
            category: new.category,
            description,
            date,
            time,
            timestamp,
        };

        self.balance += tx.signed_amount();
        self.transactions.insert(0, tx.clone());

        info!(
            id = %tx.id,
            amount = tx.amount,
            tx_type = %tx.tx_type,
            "Recorded transaction"
        );
        Ok(tx)
    }

    /// Remove a transaction, reversing its effect on the balance
    pub fn delete_transaction(&mut self, id: &str) -> Result<Transaction> {
        let pos = self
            .transactions
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| Error::NotFound(format!("transaction {}", id)))?;

        let tx = self.transactions.remove(pos);
        self.balance -= tx.signed_amount();
        info!(id = %tx.id, "Deleted transaction");
        Ok(tx)
    }

    pub fn total_income(&self) -> f64 {
        self.transactions
            .iter()
            .filter(|t| t.is_income())
            .map(|t| t.amount)
            .sum()
    }

    pub fn total_expenses(&self) -> f64 {
        self.transactions
            .iter()
            .filter(|t| t.is_expense())
            .map(|t| t.amount)
            .sum()
    }

    /// Set the monthly budget for a category, replacing any existing one
    pub fn set_budget(&mut self, category: Category, limit: f64) -> Result<Budget> {
        if !limit.is_finite() || limit <= 0.0 {
            return Err(Error::InvalidData(format!(
                "Budget limit must be positive, got {}",
                limit
            )));
        }

        if let Some(existing) = self.budgets.iter_mut().find(|b| b.category == category) {
            existing.limit = limit;
            debug!(category = %category, limit, "Updated budget");
            return Ok(existing.clone());
        }

        self.seq += 1;
        let budget = Budget {
            id: format!("budget-{}-{}", category, self.seq),
            category,
            limit,
            period: BudgetPeriod::Monthly,
        };
        self.budgets.push(budget.clone());
        debug!(category = %category, limit, "Created budget");
        Ok(budget)
    }

    pub fn delete_budget(&mut self, id: &str) -> Result<Budget> {
        let pos = self
            .budgets
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| Error::NotFound(format!("budget {}", id)))?;
        Ok(self.budgets.remove(pos))
    }

    pub fn budget_for(&self, category: Category) -> Option<&Budget> {
        self.budgets.iter().find(|b| b.category == category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_updates_balance() {
        let mut ledger = Ledger::new();
        ledger.add_transaction(NewTransaction::income(1000.0, Category::Salary)).unwrap();
        ledger.add_transaction(NewTransaction::expense(250.0, Category::Food)).unwrap();

        assert_eq!(ledger.balance(), 750.0);
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.total_income(), 1000.0);
        assert_eq!(ledger.total_expenses(), 250.0);
    }

    #[test]
    fn test_most_recent_first() {
        let mut ledger = Ledger::new();
        let first = ledger.add_transaction(NewTransaction::expense(1.0, Category::Food)).unwrap();
        let second = ledger.add_transaction(NewTransaction::expense(2.0, Category::Food)).unwrap();

        assert_eq!(ledger.last_recorded().unwrap().id, second.id);
        assert_eq!(ledger.transactions()[1].id, first.id);
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn test_delete_restores_balance() {
        let mut ledger = Ledger::new();
        ledger.add_transaction(NewTransaction::income(500.0, Category::Salary)).unwrap();
        let tx = ledger.add_transaction(NewTransaction::expense(120.0, Category::Bills)).unwrap();

        let removed = ledger.delete_transaction(&tx.id).unwrap();
        assert_eq!(removed.amount, 120.0);
        assert_eq!(ledger.balance(), 500.0);
        assert!(ledger.get(&tx.id).is_none());
    }

    #[test]
    fn test_delete_unknown_is_not_found() {
        let mut ledger = Ledger::new();
        assert!(matches!(ledger.delete_transaction("nope"), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_rejects_non_positive_amount() {
        let mut ledger = Ledger::new();
        assert!(ledger.add_transaction(NewTransaction::expense(0.0, Category::Food)).is_err());
        assert!(ledger.add_transaction(NewTransaction::expense(-5.0, Category::Food)).is_err());
        assert!(ledger.add_transaction(NewTransaction::expense(f64::NAN, Category::Food)).is_err());
        assert_eq!(ledger.balance(), 0.0);
    }

    #[test]
    fn test_blank_description_dropped() {
        let mut ledger = Ledger::new();
        let tx = ledger
            .add_transaction(NewTransaction::expense(3.0, Category::Food).with_description("   "))
            .unwrap();
        assert!(tx.description.is_none());
    }

    #[test]
    fn test_past_dated_insert_keeps_timestamp() {
        let mut ledger = Ledger::new();
        let tx = ledger
            .add_transaction_at(NewTransaction::expense(10.0, Category::Food), 1_700_000_000_000)
            .unwrap();
        assert_eq!(tx.timestamp, 1_700_000_000_000);
        assert_eq!(tx.date.len(), 10);
    }

    #[test]
    fn test_set_budget_upserts() {
        let mut ledger = Ledger::new();
        let first = ledger.set_budget(Category::Food, 300.0).unwrap();
        let second = ledger.set_budget(Category::Food, 450.0).unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(ledger.budgets().len(), 1);
        assert_eq!(ledger.budget_for(Category::Food).unwrap().limit, 450.0);
    }

    #[test]
    fn test_delete_budget() {
        let mut ledger = Ledger::new();
        let budget = ledger.set_budget(Category::Shopping, 100.0).unwrap();
        ledger.delete_budget(&budget.id).unwrap();
        assert!(ledger.budgets().is_empty());
        assert!(ledger.delete_budget(&budget.id).is_err());
    }

    #[test]
    fn test_from_state_recomputes_balance() {
        let mut ledger = Ledger::new();
        ledger.add_transaction(NewTransaction::income(80.0, Category::Salary)).unwrap();
        ledger.add_transaction(NewTransaction::expense(30.0, Category::Food)).unwrap();

        let mut state = AppState::default();
        ledger.write_to(&mut state);

        let restored = Ledger::from_state(&state);
        assert_eq!(restored.balance(), 50.0);
        assert_eq!(restored.len(), 2);
    }

    #[test]
    fn test_ids_stay_unique_after_delete_and_reload() {
        let ts = 1_704_110_400_000;
        let mut ledger = Ledger::new();
        let a = ledger.add_transaction_at(NewTransaction::expense(1.0, Category::Food), ts).unwrap();
        let b = ledger.add_transaction_at(NewTransaction::expense(2.0, Category::Food), ts).unwrap();
        ledger.delete_transaction(&a.id).unwrap();

        let mut state = AppState::default();
        ledger.write_to(&mut state);
        let mut restored = Ledger::from_state(&state);

        let c = restored.add_transaction_at(NewTransaction::expense(3.0, Category::Food), ts).unwrap();
        assert_ne!(b.id, c.id);

        // Deleting the new record leaves the older one in place
        restored.delete_transaction(&c.id).unwrap();
        assert_eq!(restored.get(&b.id).unwrap().amount, 2.0);
    }

    #[test]
    fn test_id_suffix() {
        assert_eq!(id_suffix("1704110400000-7"), Some(7));
        assert_eq!(id_suffix("budget-food-12"), Some(12));
        assert_eq!(id_suffix("imported"), None);
    }
}
