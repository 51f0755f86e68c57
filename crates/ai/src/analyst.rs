//! LLM-backed trade signal advisor and market analyst.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use cryptodash_core::indicators::TechnicalSnapshot;
use cryptodash_core::signals::{AdvisorOpinion, AdvisorRequest, DerivativesContext, SignalAdvisor};
use cryptodash_market_data::Interval;

use crate::client::LlmClient;
use crate::config::AiConfig;
use crate::error::AiError;
use crate::prompt::{analysis_prompt, signal_prompt, ANALYSIS_SYSTEM_PROMPT, SIGNAL_SYSTEM_PROMPT};
use crate::response::{parse_opinion, truncate_chars};

pub const MAX_QUESTION_CHARS: usize = 1000;

/// What the analyst sees for one question.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisContext {
    pub symbol: String,
    pub interval: Interval,
    pub question: String,
    pub price: Option<f64>,
    pub snapshot: Option<TechnicalSnapshot>,
    pub derivatives: DerivativesContext,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub symbol: String,
    pub interval: Interval,
    pub question: String,
    pub answer: String,
    pub model: String,
    pub generated_at: DateTime<Utc>,
}

pub struct MarketAnalyst<C: LlmClient> {
    client: C,
    max_output_chars: usize,
}

impl<C: LlmClient> MarketAnalyst<C> {
    pub fn new(client: C, max_output_chars: usize) -> Self {
        Self {
            client,
            max_output_chars,
        }
    }

    /// Analyst bounded by the gateway settings' output limit.
    pub fn from_config(client: C, config: &AiConfig) -> Self {
        Self::new(client, config.max_output_chars)
    }

    pub fn model(&self) -> &str {
        self.client.model()
    }

    /// Ask for a structured opinion on a technical read.
    pub async fn opinion(&self, request: &AdvisorRequest) -> Result<AdvisorOpinion, AiError> {
        let prompt = signal_prompt(request)?;
        let raw = self.client.complete(SIGNAL_SYSTEM_PROMPT, &prompt).await?;
        match parse_opinion(&raw) {
            Ok(opinion) => Ok(opinion),
            Err(e) => {
                warn!(
                    "Unparseable advisor answer for {}: {}",
                    request.symbol,
                    truncate_chars(&raw, 200)
                );
                Err(e)
            }
        }
    }

    /// Answer a free-form question about one market.
    pub async fn analyze(&self, context: &AnalysisContext) -> Result<Analysis, AiError> {
        let question = context.question.trim();
        if question.is_empty() {
            return Err(AiError::invalid_input("question must not be empty"));
        }
        if question.chars().count() > MAX_QUESTION_CHARS {
            return Err(AiError::invalid_input(format!(
                "question longer than {} characters",
                MAX_QUESTION_CHARS
            )));
        }

        let prompt = analysis_prompt(context)?;
        let raw = self.client.complete(ANALYSIS_SYSTEM_PROMPT, &prompt).await?;
        let answer = truncate_chars(&raw, self.max_output_chars);
        if answer.is_empty() {
            return Err(AiError::invalid_response("empty analysis"));
        }
        debug!("Analysis for {} {}: {} chars", context.symbol, context.interval, answer.len());

        Ok(Analysis {
            symbol: context.symbol.clone(),
            interval: context.interval,
            question: question.to_string(),
            answer,
            model: self.client.model().to_string(),
            generated_at: Utc::now(),
        })
    }
}

#[async_trait]
impl<C: LlmClient + 'static> SignalAdvisor for MarketAnalyst<C> {
    async fn advise(&self, request: &AdvisorRequest) -> cryptodash_core::Result<AdvisorOpinion> {
        self.opinion(request).await.map_err(Into::into)
    }
}

#[async_trait]
impl<T: LlmClient + ?Sized> LlmClient for Arc<T> {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, AiError> {
        (**self).complete(system, prompt).await
    }

    fn model(&self) -> &str {
        (**self).model()
    }
}
