//! Short-horizon balance prediction
//!
//! `burn_rate` is a plain 30-day average of expenses; large one-off
//! purchases are not excluded. Each subscription contributes at most one
//! charge to a prediction window.

use crate::analytics::trailing_days;
use crate::models::{Millis, Prediction, RiskLevel, Subscription, Transaction, DAY_MS};

const BURN_WINDOW_DAYS: i64 = 30;

/// Average daily expense over the trailing 30 days
pub fn burn_rate(transactions: &[Transaction], now: Millis) -> f64 {
    let spent: f64 = trailing_days(transactions, BURN_WINDOW_DAYS, now)
        .into_iter()
        .filter(|t| t.is_expense())
        .map(|t| t.amount)
        .sum();
    spent / BURN_WINDOW_DAYS as f64
}

/// Project the balance `days` into the future; `currency` prefixes the amounts in `analysis`
pub fn predict_future_balance(
    current_balance: f64,
    transactions: &[Transaction],
    subscriptions: &[Subscription],
    days: u32,
    now: Millis,
    currency: &str,
) -> Prediction {
    let burn = burn_rate(transactions, now);
    let projected_living_cost = burn * days as f64;

    let window_end = now + days as Millis * DAY_MS;
    let projected_bills: f64 = subscriptions
        .iter()
        .filter(|s| s.next_due >= now && s.next_due <= window_end)
        .map(|s| s.amount)
        .sum();

    let predicted_balance = current_balance - projected_living_cost - projected_bills;

    let risk_level = if predicted_balance < 0.0 {
        RiskLevel::High
    } else if predicted_balance < current_balance * 0.2 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };

    let outlook = if predicted_balance < 0.0 {
        "you are projected to run out of money."
    } else if predicted_balance < current_balance {
        "your balance will likely drop."
    } else {
        "you are on track."
    };
    let analysis = format!(
        "Based on your daily spend of {cur}{:.2} and {cur}{:.2} in upcoming bills, {}",
        burn,
        projected_bills,
        outlook,
        cur = currency
    );

    Prediction {
        days,
        current_balance,
        burn_rate: burn,
        projected_living_cost,
        projected_bills,
        predicted_balance,
        risk_level,
        analysis,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Frequency, SubscriptionStatus, TransactionType};

    const NOW: Millis = 1_750_000_000_000;

    fn expense(amount: f64, days_ago: i64) -> Transaction {
        Transaction {
            id: format!("e{}", days_ago),
            amount,
            tx_type: TransactionType::Expense,
            category: Some(Category::Food),
            description: None,
            date: String::new(),
            time: String::new(),
            timestamp: NOW - days_ago * DAY_MS,
        }
    }

    fn sub(amount: f64, due_in_days: i64) -> Subscription {
        Subscription {
            id: format!("sub-{}", due_in_days),
            name: "Sub".into(),
            amount,
            frequency: Frequency::Monthly,
            last_paid: NOW - 20 * DAY_MS,
            next_due: NOW + due_in_days * DAY_MS,
            status: SubscriptionStatus::Active,
            confidence: 0.9,
        }
    }

    #[test]
    fn test_burn_rate_includes_outliers() {
        let txs = vec![expense(30.0, 1), expense(870.0, 10), expense(5000.0, 40)];
        assert_eq!(burn_rate(&txs, NOW), 30.0);
        assert_eq!(burn_rate(&[], NOW), 0.0);
    }

    #[test]
    fn test_prediction_low_risk() {
        let txs = vec![expense(300.0, 5)];
        let p = predict_future_balance(1000.0, &txs, &[], 7, NOW, "$");
        assert!((p.predicted_balance - 930.0).abs() < 1e-9);
        assert_eq!(p.risk_level, RiskLevel::Low);
        assert!(p.analysis.ends_with("your balance will likely drop."));
    }

    #[test]
    fn test_prediction_counts_bills_in_window_once() {
        let subs = vec![sub(50.0, 3), sub(80.0, 20), sub(10.0, -2)];
        let p = predict_future_balance(500.0, &[], &subs, 7, NOW, "$");
        assert_eq!(p.projected_bills, 50.0);
        assert_eq!(p.predicted_balance, 450.0);

        // A 90-day window still counts each subscription once
        let long = predict_future_balance(500.0, &[], &subs, 90, NOW, "$");
        assert_eq!(long.projected_bills, 130.0);
    }

    #[test]
    fn test_prediction_risk_levels() {
        let txs = vec![expense(3000.0, 1)];
        let high = predict_future_balance(500.0, &txs, &[], 30, NOW, "$");
        assert_eq!(high.risk_level, RiskLevel::High);
        assert!(high.analysis.contains("run out of money"));

        let medium = predict_future_balance(3500.0, &txs, &[], 30, NOW, "$");
        assert_eq!(medium.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn test_prediction_on_track_without_spending() {
        let p = predict_future_balance(200.0, &[], &[], 30, NOW, "$");
        assert_eq!(p.risk_level, RiskLevel::Low);
        assert!(p.analysis.ends_with("you are on track."));
        assert!(p.analysis.starts_with("Based on your daily spend of $0.00 and $0.00"));
    }

    #[test]
    fn test_analysis_uses_currency() {
        let txs = vec![expense(300.0, 5)];
        let subs = vec![sub(50.0, 3)];
        let p = predict_future_balance(1000.0, &txs, &subs, 7, NOW, "₹");
        assert!(p
            .analysis
            .starts_with("Based on your daily spend of ₹10.00 and ₹50.00 in upcoming bills"));
        assert!(!p.analysis.contains('$'));
    }
}
