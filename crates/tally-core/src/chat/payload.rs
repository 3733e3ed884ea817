//! Structured payloads embedded in assistant replies
//!
//! The assistant may append one JSON block delimited by a start marker and
//! `:::END:::`. Two shapes are recognized: a budget plan and a transaction
//! proposal. Anything else, including a block whose JSON does not parse,
//! leaves the raw reply untouched.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::{Category, TransactionType};

const BUDGET_PLAN_MARKER: &str = ":::BUDGET_PLAN:::";
const TRANSACTION_MARKER: &str = ":::TRANSACTION:::";
const END_MARKER: &str = ":::END:::";

/// One proposed monthly limit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetPlanItem {
    pub category: Category,
    pub limit: f64,
    pub reason: Option<String>,
}

/// A transaction the assistant wants recorded
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionProposal {
    pub amount: f64,
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
    pub category: Category,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AssistantPayload {
    None,
    BudgetPlan(Vec<BudgetPlanItem>),
    Transaction(TransactionProposal),
}

/// Assistant reply split into display text and payload
#[derive(Debug, Clone, PartialEq)]
pub struct AssistantReply {
    pub free_text: String,
    pub payload: AssistantPayload,
}

impl AssistantReply {
    fn plain(raw: &str) -> Self {
        Self {
            free_text: raw.trim().to_string(),
            payload: AssistantPayload::None,
        }
    }
}

#[derive(Deserialize)]
struct WireBudgetItem {
    category: String,
    limit: f64,
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Deserialize)]
struct WireTransaction {
    amount: f64,
    #[serde(rename = "type", default)]
    tx_type: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Clone, Copy)]
enum Kind {
    BudgetPlan,
    Transaction,
}

/// Locate the earliest marker of either kind
fn find_marker(raw: &str) -> Option<(Kind, usize, usize)> {
    let budget = raw
        .find(BUDGET_PLAN_MARKER)
        .map(|i| (Kind::BudgetPlan, i, i + BUDGET_PLAN_MARKER.len()));
    let transaction = raw
        .find(TRANSACTION_MARKER)
        .map(|i| (Kind::Transaction, i, i + TRANSACTION_MARKER.len()));

    match (budget, transaction) {
        (Some(b), Some(t)) => Some(if b.1 <= t.1 { b } else { t }),
        (b, t) => b.or(t),
    }
}

/// Split an assistant reply into free text and an optional payload
pub fn parse_assistant_reply(raw: &str) -> AssistantReply {
    let Some((kind, start, body_start)) = find_marker(raw) else {
        return AssistantReply::plain(raw);
    };

    let after = &raw[body_start..];
    let (json, rest) = match after.find(END_MARKER) {
        Some(end) => (&after[..end], &after[end + END_MARKER.len()..]),
        None => (after, ""),
    };

    let payload = match kind {
        Kind::BudgetPlan => parse_budget_plan(json).map(AssistantPayload::BudgetPlan),
        Kind::Transaction => parse_transaction_proposal(json).map(AssistantPayload::Transaction),
    };

    let Some(payload) = payload else {
        warn!("Malformed assistant payload, showing raw reply");
        return AssistantReply::plain(raw);
    };

    // Models sometimes repeat the end marker
    let trailing = rest.replace(END_MARKER, "");
    let free_text = format!("{} {}", raw[..start].trim(), trailing.trim())
        .trim()
        .to_string();

    AssistantReply { free_text, payload }
}

fn parse_budget_plan(json: &str) -> Option<Vec<BudgetPlanItem>> {
    let items: Vec<WireBudgetItem> = serde_json::from_str(json.trim()).ok()?;
    let plan: Vec<BudgetPlanItem> = items
        .into_iter()
        .filter(|item| item.limit.is_finite() && item.limit > 0.0)
        .map(|item| BudgetPlanItem {
            category: Category::from_loose(&item.category),
            limit: item.limit,
            reason: item.reason.filter(|r| !r.trim().is_empty()),
        })
        .collect();
    (!plan.is_empty()).then_some(plan)
}

fn parse_transaction_proposal(json: &str) -> Option<TransactionProposal> {
    let wire: WireTransaction = serde_json::from_str(json.trim()).ok()?;
    if !wire.amount.is_finite() || wire.amount <= 0.0 {
        return None;
    }

    let tx_type = wire
        .tx_type
        .as_deref()
        .and_then(|t| t.parse().ok())
        .unwrap_or(TransactionType::Expense);

    Some(TransactionProposal {
        amount: wire.amount,
        tx_type,
        category: wire.category.as_deref().map(Category::from_loose).unwrap_or(Category::Other),
        description: wire.description.filter(|d| !d.trim().is_empty()),
    })
}
