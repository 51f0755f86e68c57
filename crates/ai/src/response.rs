//! Tolerant parsing of model output.

use serde::Deserialize;
use serde_json::Value;

use cryptodash_core::signals::{AdvisorOpinion, Direction};
use cryptodash_market_data::de_opt_f64;

use crate::error::AiError;

#[derive(Deserialize)]
struct RawOpinion {
    direction: String,
    confidence: Value,
    #[serde(default, alias = "stopLoss", deserialize_with = "de_opt_f64")]
    stop_loss: Option<f64>,
    #[serde(default, alias = "takeProfit", deserialize_with = "de_opt_f64")]
    take_profit: Option<f64>,
    #[serde(default)]
    rationale: String,
}

const ELLIPSIS: &str = "...";

/// The balanced `{...}` object that `text` starts with, if any.
fn balanced_object(text: &str) -> Option<&str> {
    if !text.starts_with('{') {
        return None;
    }
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[..offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Bodies of the ``` fenced blocks in `raw`, in order.
fn fenced_blocks(raw: &str) -> Vec<&str> {
    let mut blocks = Vec::new();
    let mut rest = raw;
    while let Some(open) = rest.find("```") {
        let after = &rest[open + 3..];
        let Some(close) = after.find("```") else {
            break;
        };
        blocks.push(&after[..close]);
        rest = &after[close + 3..];
    }
    blocks
}

/// Every balanced `{...}` object in `raw`: fenced blocks first, then the
/// whole text from each opening brace.
fn json_candidates(raw: &str) -> impl Iterator<Item = &str> {
    fenced_blocks(raw)
        .into_iter()
        .chain(std::iter::once(raw))
        .flat_map(|text| {
            text.match_indices('{')
                .filter_map(move |(idx, _)| balanced_object(&text[idx..]))
        })
}

fn parse_confidence(value: &Value) -> Result<u8, AiError> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(|| AiError::invalid_response(format!("confidence is not a number: {}", value)))?;

    if !(0.0..=100.0).contains(&number) {
        return Err(AiError::invalid_response(format!(
            "confidence {} outside 0-100",
            number
        )));
    }
    Ok(number.round() as u8)
}

/// Parse an advisor answer into an [`AdvisorOpinion`].
///
/// The first object that has the opinion's shape wins, so braces in
/// surrounding prose are skipped.
pub fn parse_opinion(raw: &str) -> Result<AdvisorOpinion, AiError> {
    let mut last_error = None;
    let opinion = json_candidates(raw).find_map(|json| {
        serde_json::from_str::<RawOpinion>(json)
            .map_err(|e| last_error = Some(e.to_string()))
            .ok()
    });
    let opinion = opinion.ok_or_else(|| {
        AiError::invalid_response(
            last_error.unwrap_or_else(|| "no JSON object in model output".to_string()),
        )
    })?;

    let direction: Direction = opinion
        .direction
        .parse()
        .map_err(|_| AiError::invalid_response(format!("unknown direction '{}'", opinion.direction)))?;
    let confidence = parse_confidence(&opinion.confidence)?;

    Ok(AdvisorOpinion {
        direction,
        confidence,
        stop_loss: opinion.stop_loss,
        take_profit: opinion.take_profit,
        rationale: opinion.rationale.trim().to_string(),
    })
}

/// Trim and cut `text` to at most `max_chars` characters, ellipsis
/// included, preferring a word boundary in the last half.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars <= ELLIPSIS.len() {
        return text.chars().take(max_chars).collect();
    }

    let budget = max_chars - ELLIPSIS.len();
    let end = text
        .char_indices()
        .nth(budget)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len());
    let cut = &text[..end];
    let cut = match cut.rfind(char::is_whitespace) {
        Some(space) if cut[..space].chars().count() > budget / 2 => &cut[..space],
        _ => cut,
    };
    format!("{}{}", cut.trim_end(), ELLIPSIS)
}
