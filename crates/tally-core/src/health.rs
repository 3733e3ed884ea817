//! Financial health score
//!
//! Scores the trailing 30 days on a 0-100 scale from the savings rate and
//! the needs/wants split of income.

use crate::analytics::trailing_days;
use crate::models::{
    FinancialHealth, HealthStatus, Millis, Subscription, SubscriptionStatus, Transaction,
};

const WINDOW_DAYS: i64 = 30;
const BASE_SCORE: f64 = 50.0;

/// Compute the health score for the trailing 30 days before `now`
pub fn financial_health(
    transactions: &[Transaction],
    subscriptions: &[Subscription],
    now: Millis,
) -> FinancialHealth {
    let recent = trailing_days(transactions, WINDOW_DAYS, now);

    let mut income = 0.0;
    let mut expenses = 0.0;
    let mut needs = 0.0;
    let mut wants = 0.0;
    for t in recent {
        if t.is_income() {
            income += t.amount;
            continue;
        }
        expenses += t.amount;
        if t.category_or_other().is_need() {
            needs += t.amount;
        } else {
            wants += t.amount;
        }
    }

    if income <= 0.0 {
        return FinancialHealth {
            score: 0,
            savings_rate: 0.0,
            needs_ratio: 0.0,
            wants_ratio: 0.0,
            status: HealthStatus::NeedsAttention,
            insights: vec!["Log some income to get a health score.".to_string()],
        };
    }

    let savings_rate = (income - expenses) / income * 100.0;
    let needs_ratio = needs / income * 100.0;
    let wants_ratio = wants / income * 100.0;

    let mut score = BASE_SCORE;

    if savings_rate >= 20.0 {
        score += 20.0;
    } else if savings_rate >= 10.0 {
        score += 10.0;
    } else if savings_rate < 0.0 {
        score -= 10.0;
    }

    if needs_ratio <= 50.0 {
        score += 15.0;
    } else if needs_ratio > 80.0 {
        score -= 10.0;
    }

    if wants_ratio <= 30.0 {
        score += 15.0;
    } else if wants_ratio > 50.0 {
        score -= 5.0;
    }

    let score = score.clamp(0.0, 100.0).round() as u8;

    let mut insights = Vec::new();
    if savings_rate < 20.0 {
        insights.push("Savings rate is below 20%. Try to cut 'Wants'.".to_string());
    }
    if needs_ratio > 50.0 {
        insights.push("Needs are taking up >50% of income.".to_string());
    }
    if subscriptions
        .iter()
        .any(|s| s.status == SubscriptionStatus::Missed)
    {
        insights.push("You have missed subscription payments!".to_string());
    }

    FinancialHealth {
        score,
        savings_rate,
        needs_ratio,
        wants_ratio,
        status: HealthStatus::from_score(score),
        insights,
    }
}
