//! System prompts and prompt builders for the advisor and the analyst.

use cryptodash_core::signals::AdvisorRequest;

use crate::analyst::AnalysisContext;
use crate::error::AiError;

// ============================================================================
// Trade signal advisor
// ============================================================================

pub const SIGNAL_SYSTEM_PROMPT: &str = "\
You are a disciplined crypto derivatives analyst. You receive a technical \
snapshot, derivatives positioning and a rule-based score for one market.
Decide whether to go LONG, SHORT or stay NEUTRAL over the next few bars.

Rules:
- Respond with ONE JSON object and nothing else.
- Keys: direction (\"LONG\" | \"SHORT\" | \"NEUTRAL\"), confidence (integer 0-100), \
stop_loss (number or null), take_profit (number or null), rationale (string, max 3 sentences).
- For LONG, stop_loss < current close < take_profit. For SHORT, the reverse.
- For NEUTRAL, stop_loss and take_profit are null.
- Prefer NEUTRAL when the inputs disagree.";

/// Prompt for one advisor call. Inputs are embedded as JSON.
pub fn signal_prompt(request: &AdvisorRequest) -> Result<String, AiError> {
    let context = serde_json::to_string_pretty(request)
        .map_err(|e| AiError::Internal(format!("could not encode advisor request: {}", e)))?;
    Ok(format!(
        "Market: {} on the {} chart.\n\nInputs:\n{}\n\nReturn the JSON object now.",
        request.symbol, request.interval, context
    ))
}

// ============================================================================
// Natural-language analysis
// ============================================================================

pub const ANALYSIS_SYSTEM_PROMPT: &str = "\
You are a crypto market analyst writing for active traders. Answer the user's \
question using only the market context provided. Cite concrete numbers from the \
context (price, EMA, RSI, MACD, funding, open interest, long/short ratio). \
Say plainly when the context does not contain what is needed. \
Use short paragraphs, no markdown headings, no investment advice disclaimers.";

pub fn analysis_prompt(context: &AnalysisContext) -> Result<String, AiError> {
    let encoded = serde_json::to_string_pretty(context)
        .map_err(|e| AiError::Internal(format!("could not encode analysis context: {}", e)))?;
    Ok(format!(
        "Question: {}\n\nMarket context for {} ({}):\n{}",
        context.question.trim(),
        context.symbol,
        context.interval,
        encoded
    ))
}
