//! Spending analytics over the transaction log
//!
//! All functions are pure: they read a slice of transactions and a `now`
//! and never touch the ledger. Windows are computed from `timestamp` only,
//! so insertion order does not matter.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Local, NaiveDate, TimeZone};
use serde::Serialize;

use crate::classify::detect_category;
use crate::models::{Budget, Category, Millis, Transaction, DAY_MS};

/// Time window for analytics queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// Since local midnight
    Today,
    /// Trailing seven days
    Week,
    /// Since the first of the current month
    Month,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Week => "week",
            Self::Month => "month",
        }
    }

    /// Start of the window in epoch millis
    pub fn start(&self, now: DateTime<Local>) -> Millis {
        match self {
            Self::Today => local_midnight(now.date_naive()).unwrap_or(now.timestamp_millis()),
            Self::Week => now.timestamp_millis() - 7 * DAY_MS,
            Self::Month => now
                .date_naive()
                .with_day(1)
                .and_then(local_midnight)
                .unwrap_or(now.timestamp_millis()),
        }
    }
}

fn local_midnight(date: NaiveDate) -> Option<Millis> {
    let naive = date.and_hms_opt(0, 0, 0)?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.timestamp_millis())
}

/// Display label for an optional period
pub fn period_label(period: Option<Period>) -> &'static str {
    match period {
        Some(Period::Today) => "today",
        Some(Period::Week) => "this week",
        Some(Period::Month) => "this month",
        None => "all time",
    }
}

/// Find a time period mentioned in a query
pub fn detect_period(text: &str) -> Option<Period> {
    let lower = text.to_lowercase();
    if lower.contains("today") {
        Some(Period::Today)
    } else if lower.contains("week") {
        Some(Period::Week)
    } else if lower.contains("month") {
        Some(Period::Month)
    } else {
        None
    }
}

/// Find a specific category mentioned in a query
pub fn detect_query_category(text: &str) -> Option<Category> {
    let m = detect_category(&text.to_lowercase());
    (m.confidence > 0.0 && m.category != Category::Other).then_some(m.category)
}

/// Transactions inside `period`, or all of them when `period` is `None`
pub fn filter_by_window(
    transactions: &[Transaction],
    period: Option<Period>,
    now: DateTime<Local>,
) -> Vec<Transaction> {
    match period {
        None => transactions.to_vec(),
        Some(p) => {
            let start = p.start(now);
            transactions
                .iter()
                .filter(|t| t.timestamp >= start)
                .cloned()
                .collect()
        }
    }
}

/// Transactions with `timestamp >= now - days`
pub fn trailing_days(transactions: &[Transaction], days: i64, now: Millis) -> Vec<&Transaction> {
    let start = now - days * DAY_MS;
    transactions.iter().filter(|t| t.timestamp >= start).collect()
}

/// Expense total for one category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBreakdown {
    pub category: Category,
    pub total: f64,
    pub count: usize,
    /// Share of all expenses, 0-100
    pub percentage: f64,
}

/// Expense totals per category, largest first
pub fn breakdown(transactions: &[Transaction]) -> Vec<CategoryBreakdown> {
    let mut order: Vec<Category> = Vec::new();
    let mut totals: HashMap<Category, (f64, usize)> = HashMap::new();
    let mut total_expenses = 0.0;

    for t in transactions.iter().filter(|t| t.is_expense()) {
        let category = t.category_or_other();
        let entry = totals.entry(category).or_insert_with(|| {
            order.push(category);
            (0.0, 0)
        });
        entry.0 += t.amount;
        entry.1 += 1;
        total_expenses += t.amount;
    }

    let mut rows: Vec<CategoryBreakdown> = order
        .into_iter()
        .map(|category| {
            let (total, count) = totals[&category];
            CategoryBreakdown {
                category,
                total,
                count,
                percentage: if total_expenses > 0.0 {
                    total / total_expenses * 100.0
                } else {
                    0.0
                },
            }
        })
        .collect();

    // Stable sort keeps first-seen order for equal totals
    rows.sort_by(|a, b| b.total.total_cmp(&a.total));
    rows
}

/// Income and expense totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Totals {
    pub income: f64,
    pub expenses: f64,
    pub income_count: usize,
    pub expense_count: usize,
}

impl Totals {
    pub fn of<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> Self {
        transactions.into_iter().fold(Self::default(), |mut acc, t| {
            if t.is_income() {
                acc.income += t.amount;
                acc.income_count += 1;
            } else {
                acc.expenses += t.amount;
                acc.expense_count += 1;
            }
            acc
        })
    }

    pub fn net(&self) -> f64 {
        self.income - self.expenses
    }

    /// (income − expenses) / income × 100, or `None` without income
    pub fn savings_rate(&self) -> Option<f64> {
        (self.income > 0.0).then(|| self.net() / self.income * 100.0)
    }
}

/// Spending on a single category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySpending {
    pub category: Category,
    pub total: f64,
    pub count: usize,
    pub average: f64,
}

pub fn category_spending(transactions: &[Transaction], category: Category) -> CategorySpending {
    let (total, count) = transactions
        .iter()
        .filter(|t| t.is_expense() && t.category_or_other() == category)
        .fold((0.0, 0usize), |(sum, n), t| (sum + t.amount, n + 1));

    CategorySpending {
        category,
        total,
        count,
        average: if count > 0 { total / count as f64 } else { 0.0 },
    }
}

/// Summary report for a period
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpendingSummary {
    pub totals: Totals,
    pub daily_average: f64,
    pub savings_rate: Option<f64>,
}

/// Summarize `in_window`; `all` supplies the log span for the all-time average
pub fn spending_summary(
    in_window: &[Transaction],
    all: &[Transaction],
    period: Option<Period>,
    now: DateTime<Local>,
) -> SpendingSummary {
    let totals = Totals::of(in_window);
    let days = match period {
        Some(Period::Week) => 7.0,
        Some(Period::Month) => 30.0,
        _ => {
            let oldest = all
                .iter()
                .map(|t| t.timestamp)
                .min()
                .unwrap_or(now.timestamp_millis());
            let span = (now.timestamp_millis() - oldest).max(0) as f64 / DAY_MS as f64;
            span.ceil().max(1.0)
        }
    };

    SpendingSummary {
        totals,
        daily_average: totals.expenses / days,
        savings_rate: totals.savings_rate(),
    }
}

/// Current-calendar-month expenses per category
pub fn monthly_spending(transactions: &[Transaction], now: DateTime<Local>) -> HashMap<Category, f64> {
    let start = Period::Month.start(now);
    let mut spending = HashMap::new();
    for t in transactions
        .iter()
        .filter(|t| t.is_expense() && t.timestamp >= start)
    {
        *spending.entry(t.category_or_other()).or_insert(0.0) += t.amount;
    }
    spending
}

/// How close a category is to its budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetLevel {
    Ok,
    /// 80% or more used
    Warning,
    /// Over the limit
    Exceeded,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetStatus {
    pub budget: Budget,
    pub spent: f64,
    pub percent: f64,
    pub is_exceeded: bool,
    pub level: BudgetLevel,
}

/// Budget usage for a category, `None` when no budget is set
pub fn budget_status(category: Category, spent: f64, budgets: &[Budget]) -> Option<BudgetStatus> {
    let budget = budgets.iter().find(|b| b.category == category)?;
    let percent = spent / budget.limit * 100.0;
    let is_exceeded = spent > budget.limit;
    let level = if percent >= 100.0 {
        BudgetLevel::Exceeded
    } else if percent >= 80.0 {
        BudgetLevel::Warning
    } else {
        BudgetLevel::Ok
    };

    Some(BudgetStatus {
        budget: budget.clone(),
        spent,
        percent,
        is_exceeded,
        level,
    })
}

/// Budget status for every budget against this month's spending
pub fn all_budget_statuses(
    transactions: &[Transaction],
    budgets: &[Budget],
    now: DateTime<Local>,
) -> Vec<BudgetStatus> {
    let spending = monthly_spending(transactions, now);
    budgets
        .iter()
        .filter_map(|b| {
            let spent = spending.get(&b.category).copied().unwrap_or(0.0);
            budget_status(b.category, spent, budgets)
        })
        .collect()
}
