//! Chat command implementations
//!
//! `cmd_chat` runs a line-oriented session on stdin; `cmd_say` handles one
//! message. Both persist the ledger and the chat transcript after every turn.

use std::io::{self, BufRead, Write};

use anyhow::Result;
use tally_core::chat::{is_confirmation, is_denial, BudgetPlanItem};
use tally_core::{AIClient, Config, ConversationContext, Interpreter, InterpreterConfig, TurnReply};
use tracing::info;

use super::Workspace;

const EXIT_WORDS: &[&str] = &["exit", "quit", "bye", ":q"];

/// Interpreter for this workspace, resuming its saved transcript
pub fn interpreter_for(ws: &Workspace, config: &Config) -> Interpreter {
    let mut settings = InterpreterConfig::from(config);
    settings.currency = ws.currency().to_string();
    let ai = AIClient::from_config(&config.ai);
    Interpreter::new(ai, settings).with_history(ws.state.chat_history.clone())
}

pub async fn cmd_chat(ws: &mut Workspace, config: &Config) -> Result<()> {
    let mut interpreter = interpreter_for(ws, config);
    if !interpreter.has_assistant() {
        info!("No generative backend configured, chat runs on local rules only");
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    run_chat(ws, &mut interpreter, stdin.lock(), stdout.lock()).await
}

/// Drive a chat session from `input` until EOF or an exit word
pub async fn run_chat<R: BufRead, W: Write>(
    ws: &mut Workspace,
    interpreter: &mut Interpreter,
    input: R,
    mut out: W,
) -> Result<()> {
    writeln!(out, "{}", interpreter.greeting())?;
    writeln!(out, "   (type 'exit' to leave)")?;

    let mut ctx = ConversationContext::new();
    let mut pending_plan: Option<Vec<BudgetPlanItem>> = None;
    let mut lines = input.lines();

    loop {
        write!(out, "> ")?;
        out.flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let message = line.trim();
        if EXIT_WORDS.contains(&message.to_lowercase().as_str()) {
            break;
        }

        // Anything other than a yes/no drops the plan and is handled as a normal turn
        if let Some(plan) = pending_plan.take() {
            if is_confirmation(message) {
                let budgets = Interpreter::accept_budget_plan(&plan, &mut ws.ledger)?;
                ws.save()?;
                writeln!(out, "✅ Applied {} budgets.", budgets.len())?;
                continue;
            }
            if is_denial(message) {
                writeln!(out, "Okay, I won't set those budgets.")?;
                continue;
            }
        }

        let (next, reply) = interpreter.handle_turn(ctx, message, &mut ws.ledger).await;
        ctx = next;
        if reply.text.is_empty() {
            continue;
        }

        writeln!(out, "{}", reply.text)?;
        if reply.budget_plan.is_some() {
            writeln!(out, "Apply this plan? (yes/no)")?;
        }
        pending_plan = reply.budget_plan;

        ws.state.chat_history = interpreter.history().to_vec();
        ws.save()?;
    }

    Ok(())
}

pub async fn cmd_say(ws: &mut Workspace, config: &Config, message: &str) -> Result<()> {
    let mut interpreter = interpreter_for(ws, config);
    let reply = say(ws, &mut interpreter, message).await?;

    println!("{}", reply.text);
    if reply.budget_plan.is_some() {
        println!();
        println!("   Apply it with 'tally budget set <category> <limit>' or accept it in 'tally chat'.");
    }

    Ok(())
}

/// One turn from a fresh context, persisted
pub async fn say(ws: &mut Workspace, interpreter: &mut Interpreter, message: &str) -> Result<TurnReply> {
    let (_, reply) = interpreter
        .handle_turn(ConversationContext::new(), message, &mut ws.ledger)
        .await;
    ws.state.chat_history = interpreter.history().to_vec();
    ws.save()?;
    Ok(reply)
}
