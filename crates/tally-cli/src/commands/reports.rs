//! Report command implementations

use anyhow::Result;
use chrono::Local;
use tally_core::analytics::{breakdown, filter_by_window, period_label, spending_summary};
use tally_core::models::display_date_time;
use tally_core::{
    detect_subscriptions, financial_health, predict_future_balance, Period, RiskLevel,
    SubscriptionStatus,
};

use super::{truncate, Workspace};

/// Resolve a period string; `all` means no window
pub fn resolve_period(period: &str) -> Result<Option<Period>> {
    match period.to_lowercase().as_str() {
        "today" => Ok(Some(Period::Today)),
        "week" | "this-week" => Ok(Some(Period::Week)),
        "month" | "this-month" => Ok(Some(Period::Month)),
        "all" | "all-time" => Ok(None),
        other => anyhow::bail!("Unknown period: {} (use today, week, month, all)", other),
    }
}

pub fn cmd_report(ws: &Workspace, period: &str, json: bool) -> Result<()> {
    let now = Local::now();
    let period = resolve_period(period)?;
    let all = ws.ledger.transactions();
    let window = filter_by_window(all, period, now);
    let summary = spending_summary(&window, all, period, now);
    let rows = breakdown(&window);

    if json {
        let report = serde_json::json!({
            "period": period_label(period),
            "summary": summary,
            "categories": rows,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let cur = ws.currency();
    println!();
    println!("📊 Spending Report ({})", period_label(period));
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Income:        {}{:.2}", cur, summary.totals.income);
    println!("   Expenses:      {}{:.2}", cur, summary.totals.expenses);
    println!("   Net:           {}{:.2}", cur, summary.totals.net());
    println!("   Daily average: {}{:.2}", cur, summary.daily_average);
    if let Some(rate) = summary.savings_rate {
        println!("   Savings rate:  {:.1}%", rate);
    }

    if rows.is_empty() {
        println!();
        println!("   No expenses in this period.");
        return Ok(());
    }

    println!();
    println!("   By category:");
    for row in &rows {
        println!(
            "   {} {:<18} │ {}{:>10.2} │ {:>5.1}% │ {} txns",
            row.category.emoji(),
            row.category.label(),
            cur,
            row.total,
            row.percentage,
            row.count
        );
    }

    Ok(())
}

pub fn cmd_subscriptions(ws: &Workspace) -> Result<()> {
    let now = Local::now().timestamp_millis();
    let subscriptions = detect_subscriptions(ws.ledger.transactions(), now);

    if subscriptions.is_empty() {
        println!("No recurring payments detected yet.");
        println!("   Subscriptions show up after two similar monthly charges.");
        return Ok(());
    }

    println!();
    println!("📋 Detected Subscriptions");
    println!("   ─────────────────────────────────────────────────────────────");

    for sub in subscriptions {
        let status_icon = match sub.status {
            SubscriptionStatus::Active => "✅",
            SubscriptionStatus::DueSoon => "⏰",
            SubscriptionStatus::Missed => "⚠️",
        };
        let (next_due, _) = display_date_time(sub.next_due);

        println!(
            "   {} {:20} │ {}{:>8.2}/{:<7} │ next {} ({})",
            status_icon,
            truncate(&sub.name, 20),
            ws.currency(),
            sub.amount,
            sub.frequency.as_str(),
            next_due,
            sub.status.as_str()
        );
    }

    Ok(())
}

pub fn cmd_health(ws: &Workspace, json: bool) -> Result<()> {
    let now = Local::now().timestamp_millis();
    let transactions = ws.ledger.transactions();
    let subscriptions = detect_subscriptions(transactions, now);
    let health = financial_health(transactions, &subscriptions, now);

    if json {
        println!("{}", serde_json::to_string_pretty(&health)?);
        return Ok(());
    }

    println!();
    println!("❤️  Financial Health: {}/100 ({})", health.score, health.status.as_str());
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Savings rate: {:.1}%", health.savings_rate);
    println!("   Needs:        {:.1}% of income", health.needs_ratio);
    println!("   Wants:        {:.1}% of income", health.wants_ratio);

    if !health.insights.is_empty() {
        println!();
        for insight in &health.insights {
            println!("   💡 {}", insight);
        }
    }

    Ok(())
}

pub fn cmd_forecast(ws: &Workspace, days: u32) -> Result<()> {
    let now = Local::now().timestamp_millis();
    let transactions = ws.ledger.transactions();
    let subscriptions = detect_subscriptions(transactions, now);
    let prediction = predict_future_balance(
        ws.ledger.balance(),
        transactions,
        &subscriptions,
        days,
        now,
        ws.currency(),
    );

    let risk_icon = match prediction.risk_level {
        RiskLevel::Low => "🟢",
        RiskLevel::Medium => "🟡",
        RiskLevel::High => "🔴",
    };
    let cur = ws.currency();

    println!();
    println!("🔮 Balance Forecast ({} days)", prediction.days);
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Current balance:  {}{:.2}", cur, prediction.current_balance);
    println!("   Daily burn rate:  {}{:.2}", cur, prediction.burn_rate);
    println!("   Living costs:     {}{:.2}", cur, prediction.projected_living_cost);
    println!("   Upcoming bills:   {}{:.2}", cur, prediction.projected_bills);
    println!("   Predicted:        {}{:.2}", cur, prediction.predicted_balance);
    println!("   {} Risk: {}", risk_icon, prediction.risk_level.as_str());
    println!("   {}", prediction.analysis);

    Ok(())
}
