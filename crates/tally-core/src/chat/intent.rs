//! Keyword intent checks for the conversational interpreter
//!
//! Every check lowercases and trims its input. Balance, help, analytics and
//! undo match a trigger anywhere in the message; confirmation and denial
//! only match at the start.

const BALANCE_TRIGGERS: &[&str] = &[
    "balance", "how much", "total", "remaining", "left", "net", "savings", "saved", "have i",
];

const HELP_TRIGGERS: &[&str] = &[
    "help", "how to", "what can", "commands", "guide", "instructions", "tutorial", "usage",
];

const ANALYTICS_TRIGGERS: &[&str] = &[
    "how much on", "how much for", "how much did i spend on", "spending on", "spent on",
    "category", "categories", "breakdown", "top expense", "top expenses", "biggest expense",
    "biggest expenses", "most spent", "spending this week", "spending this month",
    "spending today", "summary", "analyze", "analyse", "analysis", "report", "insights",
    "trend", "trends", "compare", "average spending",
];

/// Phrasing that asks for advice rather than numbers
const ADVICE_TRIGGERS: &[&str] = &[
    "tips", "advice", "suggest", "recommend", "how to", "how can", "how do", "manage",
    "save money",
];

const UNDO_TRIGGERS: &[&str] = &[
    "undo", "undo that", "cancel", "cancel that", "revert", "reverse", "delete that",
    "remove that", "take that back", "wrong", "mistake", "oops",
];

const CONFIRMATION_TRIGGERS: &[&str] = &[
    "yes", "yeah", "yep", "yup", "sure", "ok", "okay", "correct", "right", "confirm", "do it",
    "go ahead",
];

const DENIAL_TRIGGERS: &[&str] = &[
    "no", "nah", "nope", "cancel", "never mind", "nevermind", "forget it", "stop", "don't",
];

/// Words that keep the category table from matching breakdown-style queries
const BREAKDOWN_WORDS: &[&str] = &["top", "biggest", "most", "breakdown", "categories"];

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

fn contains_any(text: &str, triggers: &[&str]) -> bool {
    let lower = normalize(text);
    triggers.iter().any(|t| lower.contains(t))
}

fn starts_with_any(text: &str, triggers: &[&str]) -> bool {
    let lower = normalize(text);
    triggers.iter().any(|t| lower.starts_with(t))
}

pub fn is_balance_query(text: &str) -> bool {
    contains_any(text, BALANCE_TRIGGERS)
}

pub fn is_help_request(text: &str) -> bool {
    contains_any(text, HELP_TRIGGERS)
}

/// Analytics question, unless it is phrased as a request for advice
pub fn is_analytics_query(text: &str) -> bool {
    !contains_any(text, ADVICE_TRIGGERS) && contains_any(text, ANALYTICS_TRIGGERS)
}

pub fn is_undo_request(text: &str) -> bool {
    contains_any(text, UNDO_TRIGGERS)
}

pub fn is_confirmation(text: &str) -> bool {
    starts_with_any(text, CONFIRMATION_TRIGGERS)
}

pub fn is_denial(text: &str) -> bool {
    starts_with_any(text, DENIAL_TRIGGERS)
}

/// Whether an analytics query asks for a category breakdown
pub fn wants_breakdown(text: &str) -> bool {
    contains_any(text, BREAKDOWN_WORDS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balance_and_help() {
        assert!(is_balance_query("What's my BALANCE?"));
        assert!(is_balance_query("how much do I have"));
        assert!(!is_balance_query("spent 20 on lunch"));
        assert!(is_help_request("help"));
        assert!(is_help_request("what can you do"));
    }

    #[test]
    fn test_analytics_excludes_advice() {
        assert!(is_analytics_query("show my spending breakdown"));
        assert!(is_analytics_query("Spending this week"));
        assert!(!is_analytics_query("any tips on my food category?"));
        assert!(!is_analytics_query("how do I manage my categories"));
        assert!(!is_analytics_query("bought a hat"));
    }

    #[test]
    fn test_undo() {
        assert!(is_undo_request("undo that"));
        assert!(is_undo_request("oops, that was wrong"));
        assert!(!is_undo_request("spent 5 on tea"));
    }

    #[test]
    fn test_confirmation_and_denial_are_prefix_matches() {
        assert!(is_confirmation("yes please"));
        assert!(is_confirmation("  OK "));
        assert!(!is_confirmation("i guess yes"));
        assert!(is_denial("nope"));
        assert!(is_denial("never mind"));
        assert!(!is_denial("I said no"));
    }

    #[test]
    fn test_wants_breakdown() {
        assert!(wants_breakdown("what are my top expenses"));
        assert!(!wants_breakdown("spending this week"));
    }
}
