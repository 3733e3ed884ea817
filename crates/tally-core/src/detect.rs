//! Recurring payment detection
//!
//! Groups recent expenses by normalized description (or category when the
//! description is missing) and flags groups with a steady amount and a
//! roughly monthly cadence. Only monthly cadences are detected.

use std::collections::HashMap;

use tracing::debug;

use crate::models::{Frequency, Millis, Subscription, SubscriptionStatus, Transaction, DAY_MS};

/// Detection configuration
#[derive(Debug, Clone)]
pub struct DetectionConfig {
    /// Only expenses this recent are considered
    pub lookback_days: i64,
    /// Every amount must be within this fraction of the group mean
    pub amount_variance: f64,
    /// Mean interval bounds (in days) for a monthly cadence
    pub monthly_min_days: f64,
    pub monthly_max_days: f64,
    /// Grace period after the due date before a payment counts as missed
    pub missed_grace_days: i64,
    /// Window before the due date that counts as due soon
    pub due_soon_days: i64,
    /// Confidence attached to every detected subscription
    pub confidence: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            lookback_days: 60,
            amount_variance: 0.05, // 5%
            monthly_min_days: 25.0,
            monthly_max_days: 35.0,
            missed_grace_days: 1,
            due_soon_days: 3,
            confidence: 0.9,
        }
    }
}

/// Detect subscriptions with the default configuration
pub fn detect_subscriptions(transactions: &[Transaction], now: Millis) -> Vec<Subscription> {
    SubscriptionDetector::new().detect(transactions, now)
}

pub struct SubscriptionDetector {
    config: DetectionConfig,
}

impl SubscriptionDetector {
    pub fn new() -> Self {
        Self {
            config: DetectionConfig::default(),
        }
    }

    pub fn with_config(config: DetectionConfig) -> Self {
        Self { config }
    }

    pub fn detect(&self, transactions: &[Transaction], now: Millis) -> Vec<Subscription> {
        let since = now - self.config.lookback_days * DAY_MS;
        let mut groups: HashMap<String, Vec<&Transaction>> = HashMap::new();

        for t in transactions
            .iter()
            .filter(|t| t.is_expense() && t.timestamp >= since)
        {
            groups.entry(group_key(t)).or_default().push(t);
        }

        let mut found: Vec<Subscription> = groups
            .into_iter()
            .filter_map(|(key, mut txs)| self.evaluate(&key, &mut txs, now))
            .collect();

        found.sort_by(|a, b| a.next_due.cmp(&b.next_due).then_with(|| a.name.cmp(&b.name)));
        debug!(count = found.len(), "Detected subscriptions");
        found
    }

    fn evaluate(&self, key: &str, txs: &mut [&Transaction], now: Millis) -> Option<Subscription> {
        if txs.len() < 2 {
            return None;
        }

        txs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        let latest = txs[0];

        let mean_amount = txs.iter().map(|t| t.amount).sum::<f64>() / txs.len() as f64;
        let steady = txs
            .iter()
            .all(|t| (t.amount - mean_amount).abs() / mean_amount < self.config.amount_variance);
        if !steady {
            return None;
        }

        let intervals: Vec<Millis> = txs
            .windows(2)
            .map(|pair| (pair[0].timestamp - pair[1].timestamp).abs())
            .collect();
        let mean_interval = intervals.iter().sum::<Millis>() as f64 / intervals.len() as f64;
        let interval_days = mean_interval / DAY_MS as f64;

        if interval_days < self.config.monthly_min_days || interval_days > self.config.monthly_max_days {
            return None;
        }

        let next_due = latest.timestamp + mean_interval.round() as Millis;

        Some(Subscription {
            id: format!("sub-{}-{}", key, latest.id),
            name: capitalize(key),
            amount: mean_amount,
            frequency: Frequency::Monthly,
            last_paid: latest.timestamp,
            next_due,
            status: self.status(next_due, now),
            confidence: self.config.confidence,
        })
    }

    fn status(&self, next_due: Millis, now: Millis) -> SubscriptionStatus {
        if now > next_due + self.config.missed_grace_days * DAY_MS {
            SubscriptionStatus::Missed
        } else if now > next_due - self.config.due_soon_days * DAY_MS {
            SubscriptionStatus::DueSoon
        } else {
            SubscriptionStatus::Active
        }
    }
}

impl Default for SubscriptionDetector {
    fn default() -> Self {
        Self::new()
    }
}

fn group_key(t: &Transaction) -> String {
    t.description
        .as_deref()
        .map(|d| d.trim().to_lowercase())
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| t.category_or_other().as_str().to_string())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, TransactionType};

    const NOW: Millis = 1_750_000_000_000;

    fn charge(id: &str, amount: f64, days_ago: f64, description: Option<&str>) -> Transaction {
        Transaction {
            id: id.into(),
            amount,
            tx_type: TransactionType::Expense,
            category: Some(Category::Entertainment),
            description: description.map(String::from),
            date: String::new(),
            time: String::new(),
            timestamp: NOW - (days_ago * DAY_MS as f64) as Millis,
        }
    }

    #[test]
    fn test_detects_monthly_subscription() {
        let txs = vec![
            charge("a", 499.0, 2.0, Some("Netflix")),
            charge("b", 505.0, 32.0, Some("netflix ")),
            charge("c", 495.0, 58.0, Some("NETFLIX")),
        ];
        let subs = detect_subscriptions(&txs, NOW);

        assert_eq!(subs.len(), 1);
        let sub = &subs[0];
        assert_eq!(sub.name, "Netflix");
        assert_eq!(sub.id, "sub-netflix-a");
        assert_eq!(sub.frequency, Frequency::Monthly);
        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert!((sub.amount - 499.666).abs() < 0.01);
        assert_eq!(sub.last_paid, txs[0].timestamp);
    }

    #[test]
    fn test_status_relative_to_now() {
        let txs = vec![
            charge("a", 10.0, 29.0, Some("gym")),
            charge("b", 10.0, 58.0, Some("gym")),
        ];
        // Due in ~0 days
        let subs = detect_subscriptions(&txs, NOW);
        assert_eq!(subs[0].status, SubscriptionStatus::DueSoon);

        // Two days past due
        let later = NOW + 2 * DAY_MS;
        let detector = SubscriptionDetector::with_config(DetectionConfig {
            lookback_days: 62,
            ..DetectionConfig::default()
        });
        let subs = detector.detect(&txs, later);
        assert_eq!(subs[0].status, SubscriptionStatus::Missed);
    }

    #[test]
    fn test_unsteady_amount_rejected() {
        let txs = vec![
            charge("a", 100.0, 1.0, Some("groceries")),
            charge("b", 130.0, 31.0, Some("groceries")),
        ];
        assert!(detect_subscriptions(&txs, NOW).is_empty());
    }

    #[test]
    fn test_weekly_cadence_not_flagged() {
        let txs = vec![
            charge("a", 5.0, 1.0, Some("coffee")),
            charge("b", 5.0, 8.0, Some("coffee")),
            charge("c", 5.0, 15.0, Some("coffee")),
        ];
        assert!(detect_subscriptions(&txs, NOW).is_empty());
    }

    #[test]
    fn test_single_charge_ignored() {
        let txs = vec![charge("a", 15.0, 3.0, Some("spotify"))];
        assert!(detect_subscriptions(&txs, NOW).is_empty());
        assert!(detect_subscriptions(&[], NOW).is_empty());
    }

    #[test]
    fn test_groups_by_category_without_description() {
        let txs = vec![charge("a", 20.0, 5.0, None), charge("b", 20.0, 35.0, None)];
        let subs = detect_subscriptions(&txs, NOW);
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].name, "Entertainment");
    }

    #[test]
    fn test_out_of_order_input() {
        let txs = vec![
            charge("old", 9.99, 40.0, Some("icloud")),
            charge("new", 9.99, 10.0, Some("icloud")),
        ];
        let subs = detect_subscriptions(&txs, NOW);
        assert_eq!(subs[0].id, "sub-icloud-new");
    }
}
