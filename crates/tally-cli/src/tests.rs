//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::io::Cursor;
use std::path::PathBuf;

use tally_core::{
    AIClient, Category, Config, ImportedTransaction, Interpreter, InterpreterConfig, MockBackend,
    NewTransaction, TransactionType,
};
use tempfile::TempDir;

use crate::commands::{self, truncate, Workspace};

fn setup_workspace() -> (TempDir, PathBuf, Workspace) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    let ws = Workspace::open(&path, &Config::default()).unwrap();
    (dir, path, ws)
}

fn reopen(path: &PathBuf) -> Workspace {
    Workspace::open(path, &Config::default()).unwrap()
}

// ========== Workspace Tests ==========

#[test]
fn test_new_workspace_takes_config_currency() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    let mut config = Config::default();
    config.display.currency = "₹".to_string();

    let mut ws = Workspace::open(&path, &config).unwrap();
    assert_eq!(ws.currency(), "₹");
    ws.save().unwrap();

    // Existing state keeps its own currency
    let ws = Workspace::open(&path, &Config::default()).unwrap();
    assert_eq!(ws.currency(), "₹");
}

#[test]
fn test_resolve_state_path_explicit() {
    let path = commands::resolve_state_path(Some(std::path::Path::new("/tmp/x.json"))).unwrap();
    assert_eq!(path, PathBuf::from("/tmp/x.json"));
}

#[test]
fn test_load_config_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tally.toml");
    std::fs::write(&path, "[display]\ncurrency = \"€\"\n").unwrap();

    let config = commands::load_config(Some(&path)).unwrap();
    assert_eq!(config.display.currency, "€");
    assert!(commands::load_config(Some(&dir.path().join("missing.toml"))).is_err());
}

// ========== Transaction Command Tests ==========

#[test]
fn test_cmd_add_and_delete() {
    let (_dir, path, mut ws) = setup_workspace();

    commands::cmd_add(&mut ws, 45.0, "expense", None, Some("pizza night"), None).unwrap();
    commands::cmd_add(&mut ws, 1000.0, "income", Some("salary"), None, Some("2024-01-31")).unwrap();

    let ws2 = reopen(&path);
    assert_eq!(ws2.ledger.len(), 2);
    assert_eq!(ws2.ledger.balance(), 955.0);

    let pizza = ws2
        .ledger
        .transactions()
        .iter()
        .find(|t| t.amount == 45.0)
        .unwrap()
        .clone();
    assert_eq!(pizza.category, Some(Category::Food));

    let salary = ws2.ledger.transactions().iter().find(|t| t.amount == 1000.0).unwrap();
    assert_eq!(salary.date, "2024-01-31");

    commands::cmd_delete(&mut ws, &pizza.id).unwrap();
    assert_eq!(reopen(&path).ledger.balance(), 1000.0);
}

#[test]
fn test_cmd_add_rejects_bad_input() {
    let (_dir, _path, mut ws) = setup_workspace();

    assert!(commands::cmd_add(&mut ws, 10.0, "refund", None, None, None).is_err());
    assert!(commands::cmd_add(&mut ws, 10.0, "expense", Some("gadgets"), None, None).is_err());
    assert!(commands::cmd_add(&mut ws, 10.0, "expense", None, None, Some("31/01/2024")).is_err());
    assert!(commands::cmd_add(&mut ws, -10.0, "expense", None, None, None).is_err());
    assert!(ws.ledger.is_empty());
}

#[test]
fn test_cmd_delete_unknown() {
    let (_dir, _path, mut ws) = setup_workspace();
    assert!(commands::cmd_delete(&mut ws, "missing").is_err());
}

#[test]
fn test_cmd_list_and_balance() {
    let (_dir, _path, mut ws) = setup_workspace();
    assert!(commands::cmd_list(&ws, 10).is_ok());

    ws.ledger
        .add_transaction(NewTransaction::expense(12.0, Category::Food))
        .unwrap();
    assert!(commands::cmd_list(&ws, 10).is_ok());
    assert!(commands::cmd_balance(&ws).is_ok());
}

// ========== Budget Command Tests ==========

#[test]
fn test_cmd_budget_set_and_delete() {
    let (_dir, path, mut ws) = setup_workspace();

    commands::cmd_budget_set(&mut ws, "food", 300.0).unwrap();
    commands::cmd_budget_set(&mut ws, "Food", 350.0).unwrap();
    assert!(commands::cmd_budget_list(&ws).is_ok());

    let ws2 = reopen(&path);
    assert_eq!(ws2.ledger.budgets().len(), 1);
    assert_eq!(ws2.ledger.budget_for(Category::Food).unwrap().limit, 350.0);

    commands::cmd_budget_delete(&mut ws, "food").unwrap();
    assert!(reopen(&path).ledger.budgets().is_empty());
    assert!(commands::cmd_budget_delete(&mut ws, "food").is_err());
}

#[test]
fn test_cmd_budget_set_rejects_bad_limit() {
    let (_dir, _path, mut ws) = setup_workspace();
    assert!(commands::cmd_budget_set(&mut ws, "food", 0.0).is_err());
    assert!(commands::cmd_budget_set(&mut ws, "nope", 10.0).is_err());
}

// ========== Report Tests ==========

#[test]
fn test_resolve_period() {
    assert_eq!(commands::resolve_period("week").unwrap(), Some(tally_core::Period::Week));
    assert_eq!(commands::resolve_period("ALL").unwrap(), None);
    assert!(commands::resolve_period("fortnight").is_err());
}

#[test]
fn test_reports_on_empty_state() {
    let (_dir, _path, ws) = setup_workspace();
    assert!(commands::cmd_report(&ws, "month", false).is_ok());
    assert!(commands::cmd_report(&ws, "all", true).is_ok());
    assert!(commands::cmd_subscriptions(&ws).is_ok());
    assert!(commands::cmd_health(&ws, false).is_ok());
    assert!(commands::cmd_forecast(&ws, 30).is_ok());
}

#[test]
fn test_reports_with_data() {
    let (_dir, _path, mut ws) = setup_workspace();
    ws.ledger
        .add_transaction(NewTransaction::income(2000.0, Category::Salary))
        .unwrap();
    ws.ledger
        .add_transaction(NewTransaction::expense(150.0, Category::Shopping))
        .unwrap();

    assert!(commands::cmd_report(&ws, "today", false).is_ok());
    assert!(commands::cmd_health(&ws, true).is_ok());
    assert!(commands::cmd_forecast(&ws, 7).is_ok());
}

// ========== Chat Command Tests ==========

#[tokio::test]
async fn test_run_chat_clarification_flow() {
    let (_dir, path, mut ws) = setup_workspace();
    let mut interpreter = Interpreter::new(None, InterpreterConfig::default());
    let input = Cursor::new("spent 12 on lunch\n500\nincome\nexit\nspent 99 on food\n");
    let mut output = Vec::new();

    commands::run_chat(&mut ws, &mut interpreter, input, &mut output)
        .await
        .unwrap();

    let text = String::from_utf8(output).unwrap();
    assert!(text.contains("Expense of $12.00"));
    assert!(text.contains("Got $500.00, is this an expense or income?"));

    let ws2 = reopen(&path);
    assert_eq!(ws2.ledger.len(), 2);
    assert_eq!(ws2.ledger.balance(), 488.0);
    assert_eq!(ws2.state.chat_history.len(), 6);
}

#[tokio::test]
async fn test_run_chat_accepts_budget_plan() {
    let (_dir, path, mut ws) = setup_workspace();
    let mock = MockBackend::new().with_responses([
        r#"Try this. :::BUDGET_PLAN:::[{"category":"food","limit":250,"reason":"groceries"}]:::END:::"#,
    ]);
    let mut interpreter = Interpreter::new(Some(AIClient::Mock(mock)), InterpreterConfig::default());
    let input = Cursor::new("plan my budget please\nyes\n");
    let mut output = Vec::new();

    commands::run_chat(&mut ws, &mut interpreter, input, &mut output)
        .await
        .unwrap();

    let text = String::from_utf8(output).unwrap();
    assert!(text.contains("Apply this plan?"));
    assert!(text.contains("Applied 1 budgets"));
    assert_eq!(reopen(&path).ledger.budget_for(Category::Food).unwrap().limit, 250.0);
}

#[tokio::test]
async fn test_run_chat_declines_budget_plan() {
    let (_dir, _path, mut ws) = setup_workspace();
    let mock = MockBackend::new().with_responses([
        r#":::BUDGET_PLAN:::[{"category":"food","limit":250}]:::END:::"#,
    ]);
    let mut interpreter = Interpreter::new(Some(AIClient::Mock(mock)), InterpreterConfig::default());
    let input = Cursor::new("plan my budget please\nno thanks\n");
    let mut output = Vec::new();

    commands::run_chat(&mut ws, &mut interpreter, input, &mut output)
        .await
        .unwrap();
    assert!(ws.ledger.budgets().is_empty());
}

#[tokio::test]
async fn test_run_chat_message_while_plan_pending() {
    let (_dir, path, mut ws) = setup_workspace();
    let mock = MockBackend::new().with_responses([
        r#":::BUDGET_PLAN:::[{"category":"food","limit":250}]:::END:::"#,
    ]);
    let mut interpreter = Interpreter::new(Some(AIClient::Mock(mock)), InterpreterConfig::default());
    let input = Cursor::new("plan my budget please
spent 40 on lunch
yes
");
    let mut output = Vec::new();

    commands::run_chat(&mut ws, &mut interpreter, input, &mut output)
        .await
        .unwrap();

    let text = String::from_utf8(output).unwrap();
    assert!(!text.contains("Applied"));

    let ws2 = reopen(&path);
    assert_eq!(ws2.ledger.len(), 1);
    assert_eq!(ws2.ledger.balance(), -40.0);
    assert!(ws2.ledger.budgets().is_empty());
}

#[tokio::test]
async fn test_say_persists_turn() {
    let (_dir, path, mut ws) = setup_workspace();
    let mut interpreter = Interpreter::new(None, InterpreterConfig::default());

    let reply = commands::say(&mut ws, &mut interpreter, "uber 18.50").await.unwrap();
    assert_eq!(reply.transactions.len(), 1);
    assert_eq!(reply.transactions[0].tx_type, TransactionType::Expense);

    let ws2 = reopen(&path);
    assert_eq!(ws2.ledger.balance(), -18.5);
    assert_eq!(ws2.state.chat_history.len(), 2);
}

// ========== Import Command Tests ==========

fn imported(amount: f64, timestamp: i64) -> ImportedTransaction {
    ImportedTransaction {
        transaction: NewTransaction::expense(amount, Category::Transport).with_description("Shell"),
        timestamp,
    }
}

#[test]
fn test_run_import_commits() {
    let (_dir, path, mut ws) = setup_workspace();
    let items = vec![imported(40.0, 1_700_000_000_000), imported(35.0, 1_702_000_000_000)];

    commands::run_import(&mut ws, &items, false).unwrap();

    let ws2 = reopen(&path);
    assert_eq!(ws2.ledger.len(), 2);
    assert_eq!(ws2.ledger.balance(), -75.0);
}

#[test]
fn test_run_import_dry_run_saves_nothing() {
    let (_dir, path, mut ws) = setup_workspace();
    commands::run_import(&mut ws, &[imported(40.0, 1_700_000_000_000)], true).unwrap();
    assert!(ws.ledger.is_empty());
    assert!(!path.exists());
}

// ========== Helper Function Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("a much longer description", 10), "a much ...");
    assert_eq!(truncate("ñandú ñandú", 8), "ñandú...");
}

#[test]
fn test_parse_category() {
    assert_eq!(commands::parse_category("bills").unwrap(), Category::Bills);
    let err = commands::parse_category("gizmos").unwrap_err().to_string();
    assert!(err.contains("valid:"));
}
