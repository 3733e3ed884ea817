//! Turn-by-turn conversational interpreter
//!
//! Each turn runs the intent checks in a fixed order and stops at the first
//! match:
//!
//! 1. pending expense/income clarification
//! 2. undo
//! 3. help
//! 4. balance
//! 5. analytics (unless phrased as advice)
//! 6. bare amount, which starts a clarification
//! 7. one or more transactions parsed from the text
//! 8. the generative assistant
//!
//! Every commit goes through the [`Ledger`]. Backend failures and timeouts
//! degrade to canned replies.

use std::time::Duration;

use chrono::Local;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::ai::{AIBackend, AIClient, ChatRequest};
use crate::classify::detect_category;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::extract::{is_ambiguous_amount, parse_multiple_transactions, ParsedTransaction};
use crate::ledger::{Ledger, NewTransaction};
use crate::models::{display_date_time, Budget, Category, ChatTurn, Transaction, TransactionType};
use crate::snapshot::render_snapshot;

use super::context::ConversationContext;
use super::insights::smart_insight;
use super::intent::{
    is_analytics_query, is_balance_query, is_confirmation, is_denial, is_help_request,
    is_undo_request,
};
use super::payload::{parse_assistant_reply, AssistantPayload, BudgetPlanItem};
use super::responses::{
    ambiguous_response, analytics_response, balance_response, clarification_reprompt,
    greeting_text, help_text, multi_transaction_summary, transaction_response, undo_response,
    CANCELLED, FALLBACK_RESPONSES, NOTHING_TO_UNDO,
};

/// Settings the interpreter needs from [`Config`]
#[derive(Debug, Clone, PartialEq)]
pub struct InterpreterConfig {
    pub currency: String,
    /// Trailing turns sent to the assistant
    pub history_turns: usize,
    pub timeout: Duration,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            currency: "$".to_string(),
            history_turns: 10,
            timeout: Duration::from_secs(30),
        }
    }
}

impl From<&Config> for InterpreterConfig {
    fn from(config: &Config) -> Self {
        Self {
            currency: config.display.currency.clone(),
            history_turns: config.chat.history_turns,
            timeout: config.timeout(),
        }
    }
}

/// Output of one conversational turn
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TurnReply {
    pub text: String,
    /// Transactions committed during this turn
    pub transactions: Vec<Transaction>,
    /// Budget proposal awaiting the user's confirmation
    pub budget_plan: Option<Vec<BudgetPlanItem>>,
}

impl TurnReply {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

pub struct Interpreter {
    ai: Option<AIClient>,
    config: InterpreterConfig,
    history: Vec<ChatTurn>,
    /// Mirror of the ledger balance, refreshed after every mutation
    balance: f64,
    turns: u64,
}

impl Interpreter {
    pub fn new(ai: Option<AIClient>, config: InterpreterConfig) -> Self {
        Self {
            ai,
            config,
            history: Vec::new(),
            balance: 0.0,
            turns: 0,
        }
    }

    /// Build from loaded configuration, connecting the configured backend
    pub fn from_config(config: &Config) -> Self {
        Self::new(AIClient::from_config(&config.ai), InterpreterConfig::from(config))
    }

    /// Resume with previously persisted chat history, oldest first
    pub fn with_history(mut self, history: Vec<ChatTurn>) -> Self {
        self.history = history;
        self
    }

    pub fn history(&self) -> &[ChatTurn] {
        &self.history
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn has_assistant(&self) -> bool {
        self.ai.is_some()
    }

    pub fn greeting(&self) -> &'static str {
        greeting_text()
    }

    /// Handle one user message
    ///
    /// Takes the current context and returns the next one with the reply.
    /// Blank input leaves the context untouched and produces an empty reply.
    pub async fn handle_turn(
        &mut self,
        ctx: ConversationContext,
        input: &str,
        ledger: &mut Ledger,
    ) -> (ConversationContext, TurnReply) {
        let message = input.trim();
        if message.is_empty() {
            return (ctx, TurnReply::default());
        }

        self.turns += 1;
        self.balance = ledger.balance();

        let prior = self.recent_history();
        self.history.push(ChatTurn::user(message));

        let (next, reply) = self.route(ctx, message, ledger, prior).await;

        self.history.push(ChatTurn::bot(reply.text.clone()));
        (next, reply)
    }

    /// Apply an accepted budget proposal through the budget store
    pub fn accept_budget_plan(plan: &[BudgetPlanItem], ledger: &mut Ledger) -> Result<Vec<Budget>> {
        let budgets = plan
            .iter()
            .map(|item| ledger.set_budget(item.category, item.limit))
            .collect::<Result<Vec<_>>>()?;
        info!(count = budgets.len(), "Applied budget plan");
        Ok(budgets)
    }

    fn recent_history(&self) -> Vec<ChatTurn> {
        let skip = self.history.len().saturating_sub(self.config.history_turns);
        self.history[skip..].to_vec()
    }

    async fn route(
        &mut self,
        ctx: ConversationContext,
        message: &str,
        ledger: &mut Ledger,
        prior: Vec<ChatTurn>,
    ) -> (ConversationContext, TurnReply) {
        if let Some(amount) = ctx.pending_amount() {
            debug!(amount, "Resolving pending clarification");
            return self.clarify(ctx, amount, message, ledger);
        }

        if is_undo_request(message) {
            debug!("Intent: undo");
            return self.undo(ctx, ledger);
        }

        if is_help_request(message) {
            debug!("Intent: help");
            return (ConversationContext::new(), TurnReply::text(help_text()));
        }

        if is_balance_query(message) {
            debug!("Intent: balance");
            let text = balance_response(&self.config.currency, self.balance, ledger.transactions());
            return (ConversationContext::new(), TurnReply::text(text));
        }

        if is_analytics_query(message) {
            debug!("Intent: analytics");
            let text = analytics_response(message, ledger.transactions(), &self.config.currency, Local::now());
            return (ConversationContext::new(), TurnReply::text(text));
        }

        if let Some(amount) = is_ambiguous_amount(message).amount {
            debug!(amount, "Intent: bare amount");
            return (
                ConversationContext::awaiting(amount),
                TurnReply::text(ambiguous_response(amount, &self.config.currency)),
            );
        }

        let parsed = parse_multiple_transactions(message);
        debug!(count = parsed.len(), "Parsed transactions");
        match parsed.len() {
            0 => self.ask_assistant(message, ledger, prior).await,
            1 => self.commit_single(parsed.into_iter().next(), ledger),
            _ => self.commit_many(parsed, ledger),
        }
    }

    fn clarify(
        &mut self,
        ctx: ConversationContext,
        amount: f64,
        message: &str,
        ledger: &mut Ledger,
    ) -> (ConversationContext, TurnReply) {
        let lower = message.to_lowercase();

        if lower.contains("expense") || lower.contains("spent") || is_confirmation(&lower) {
            let parsed = ParsedTransaction {
                amount,
                tx_type: TransactionType::Expense,
                description: None,
                category: detect_category(&lower).category,
            };
            return self.commit_single(Some(parsed), ledger);
        }

        if lower.contains("income") || lower.contains("earn") || lower.contains("receiv") {
            let category = match detect_category(&lower).category {
                Category::Other => Category::Salary,
                other => other,
            };
            let parsed = ParsedTransaction {
                amount,
                tx_type: TransactionType::Income,
                description: None,
                category,
            };
            return self.commit_single(Some(parsed), ledger);
        }

        if is_denial(message) {
            return (ConversationContext::new(), TurnReply::text(CANCELLED));
        }

        let text = clarification_reprompt(amount, &self.config.currency);
        (ctx, TurnReply::text(text))
    }

    /// Reverse the most recently recorded transaction with a compensating entry
    fn undo(&mut self, ctx: ConversationContext, ledger: &mut Ledger) -> (ConversationContext, TurnReply) {
        let Some(last) = ledger.last_recorded().cloned() else {
            return (ctx, TurnReply::text(NOTHING_TO_UNDO));
        };

        let reversal = NewTransaction {
            amount: last.amount,
            tx_type: last.tx_type.opposite(),
            category: last.category,
            description: Some(format!(
                "Undo: {}",
                last.description.as_deref().unwrap_or(last.tx_type.as_str())
            )),
        };

        match ledger.add_transaction(reversal) {
            Ok(tx) => {
                self.balance = ledger.balance();
                let text = undo_response(&last, &self.config.currency, self.balance);
                let reply = TurnReply {
                    text,
                    transactions: vec![tx],
                    budget_plan: None,
                };
                (ConversationContext::new(), reply)
            }
            Err(e) => {
                warn!("Failed to record undo: {}", e);
                (ConversationContext::new(), TurnReply::text(self.fallback()))
            }
        }
    }

    fn commit_single(
        &mut self,
        parsed: Option<ParsedTransaction>,
        ledger: &mut Ledger,
    ) -> (ConversationContext, TurnReply) {
        let Some(parsed) = parsed else {
            return (ConversationContext::new(), TurnReply::text(self.fallback()));
        };

        let (text, tx) = match self.record(&parsed, ledger) {
            Ok(committed) => committed,
            Err(e) => {
                warn!("Failed to record transaction: {}", e);
                return (ConversationContext::new(), TurnReply::text(self.fallback()));
            }
        };

        let ctx = ConversationContext::committed(parsed, tx.id.clone());
        let reply = TurnReply {
            text,
            transactions: vec![tx],
            budget_plan: None,
        };
        (ctx, reply)
    }

    /// Commit one transaction and build its confirmation with insights
    fn record(&mut self, parsed: &ParsedTransaction, ledger: &mut Ledger) -> Result<(String, Transaction)> {
        let (today, _) = display_date_time(Local::now().timestamp_millis());
        let signed = match parsed.tx_type {
            TransactionType::Income => parsed.amount,
            TransactionType::Expense => -parsed.amount,
        };
        let insight = smart_insight(
            parsed,
            ledger.transactions(),
            &self.config.currency,
            ledger.balance() + signed,
            &today,
        );

        let tx = ledger.add_transaction(NewTransaction::from(parsed))?;
        self.balance = ledger.balance();

        let mut text = transaction_response(parsed, &self.config.currency, self.balance);
        if let Some(insight) = insight {
            text.push_str(&insight);
        }
        Ok((text, tx))
    }

    fn commit_many(
        &mut self,
        parsed: Vec<ParsedTransaction>,
        ledger: &mut Ledger,
    ) -> (ConversationContext, TurnReply) {
        let mut committed = Vec::new();
        let mut transactions = Vec::new();

        for p in parsed {
            match ledger.add_transaction(NewTransaction::from(&p)) {
                Ok(tx) => {
                    transactions.push(tx);
                    committed.push(p);
                }
                Err(e) => warn!("Skipping transaction: {}", e),
            }
        }
        self.balance = ledger.balance();

        if committed.is_empty() {
            return (ConversationContext::new(), TurnReply::text(self.fallback()));
        }

        let text = multi_transaction_summary(&committed, &self.config.currency, self.balance);
        let reply = TurnReply {
            text,
            transactions,
            budget_plan: None,
        };
        (ConversationContext::new(), reply)
    }

    async fn ask_assistant(
        &mut self,
        message: &str,
        ledger: &mut Ledger,
        history: Vec<ChatTurn>,
    ) -> (ConversationContext, TurnReply) {
        let Some(ai) = self.ai.clone() else {
            debug!("No assistant configured, using canned reply");
            return (ConversationContext::new(), TurnReply::text(self.fallback()));
        };

        let request = ChatRequest {
            message: message.to_string(),
            history,
            snapshot: render_snapshot(ledger.transactions(), &self.config.currency, Local::now()),
        };

        let raw = match tokio::time::timeout(self.config.timeout, ai.chat(&request)).await {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => {
                warn!("Assistant request failed: {}", e);
                return (ConversationContext::new(), TurnReply::text(self.fallback()));
            }
            Err(_) => {
                warn!("{}", Error::Timeout(self.config.timeout.as_secs()));
                return (ConversationContext::new(), TurnReply::text(self.fallback()));
            }
        };

        let reply = parse_assistant_reply(&raw);
        match reply.payload {
            AssistantPayload::None if reply.free_text.is_empty() => {
                (ConversationContext::new(), TurnReply::text(self.fallback()))
            }
            AssistantPayload::None => (ConversationContext::new(), TurnReply::text(reply.free_text)),
            AssistantPayload::BudgetPlan(plan) => {
                let text = self.budget_plan_text(&reply.free_text, &plan);
                let reply = TurnReply {
                    text,
                    transactions: Vec::new(),
                    budget_plan: Some(plan),
                };
                (ConversationContext::new(), reply)
            }
            AssistantPayload::Transaction(proposal) => {
                let parsed = ParsedTransaction {
                    amount: proposal.amount,
                    tx_type: proposal.tx_type,
                    description: proposal.description,
                    category: proposal.category,
                };
                let (ctx, mut turn) = self.commit_single(Some(parsed), ledger);
                if !reply.free_text.is_empty() && !turn.transactions.is_empty() {
                    turn.text = format!("{}\n\n{}", reply.free_text, turn.text);
                }
                (ctx, turn)
            }
        }
    }

    fn budget_plan_text(&self, free_text: &str, plan: &[BudgetPlanItem]) -> String {
        let mut text = if free_text.is_empty() {
            "📋 Here's a monthly budget plan based on your spending:".to_string()
        } else {
            free_text.to_string()
        };
        for item in plan {
            text += &format!(
                "\n• {} {}: {}{:.2}",
                item.category.emoji(),
                item.category.label(),
                self.config.currency,
                item.limit
            );
            if let Some(reason) = &item.reason {
                text += &format!(" ({})", reason);
            }
        }
        text
    }

    /// Canned reply, rotating with the turn count
    fn fallback(&self) -> &'static str {
        FALLBACK_RESPONSES[(self.turns as usize) % FALLBACK_RESPONSES.len()]
    }
}
