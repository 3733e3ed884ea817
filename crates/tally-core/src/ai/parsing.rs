//! JSON parsing helpers for AI backend responses
//!
//! Models often wrap JSON in prose or markdown code fences; these helpers
//! locate the payload before handing it to serde.

use serde::{Deserialize, Deserializer};
use tracing::debug;

use crate::error::{Error, Result};

use super::types::ExtractedTransaction;

/// Remove a surrounding ```json ... ``` fence if present
pub fn strip_code_fences(response: &str) -> &str {
    let trimmed = response.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the language tag on the opening line
    let rest = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

fn truncate_raw(raw: &str) -> String {
    if raw.chars().count() > 200 {
        format!("{}...", raw.chars().take(200).collect::<String>())
    } else {
        raw.to_string()
    }
}

/// Parse the transaction array from a bulk-import response
///
/// Entries that do not fit the expected shape are skipped. A response with
/// no array at all is an error unless it is empty.
pub fn parse_extracted_transactions(response: &str) -> Result<Vec<ExtractedTransaction>> {
    let body = strip_code_fences(response);
    if body.is_empty() {
        return Ok(Vec::new());
    }

    let start = body.find('[');
    let end = body.rfind(']');

    let json_str = match (start, end) {
        (Some(s), Some(e)) if s < e => &body[s..=e],
        _ => {
            return Err(Error::InvalidData(format!(
                "No JSON array found in AI import response | Raw: {}",
                truncate_raw(body)
            )))
        }
    };

    let values: Vec<serde_json::Value> = serde_json::from_str(json_str).map_err(|e| {
        Error::InvalidData(format!(
            "Invalid import JSON from AI: {} | Raw: {}",
            e,
            truncate_raw(json_str)
        ))
    })?;

    Ok(values
        .into_iter()
        .filter_map(|v| match serde_json::from_value::<LenientExtracted>(v) {
            Ok(entry) => Some(entry.into()),
            Err(e) => {
                debug!("Skipping malformed import entry: {}", e);
                None
            }
        })
        .collect())
}

/// Accepts amounts given as strings like "1,250.00"
#[derive(Deserialize)]
struct LenientExtracted {
    #[serde(deserialize_with = "lenient_amount")]
    amount: f64,
    #[serde(rename = "type", default)]
    tx_type: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    date: Option<String>,
}

impl From<LenientExtracted> for ExtractedTransaction {
    fn from(e: LenientExtracted) -> Self {
        Self {
            amount: e.amount,
            tx_type: e.tx_type,
            category: e.category,
            description: e.description,
            date: e.date,
        }
    }
}

fn lenient_amount<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<f64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s
            .trim()
            .trim_start_matches(|c: char| !c.is_ascii_digit() && c != '.')
            .replace(',', "")
            .parse()
            .map_err(serde::de::Error::custom),
    }
}
