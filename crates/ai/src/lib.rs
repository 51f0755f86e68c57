//! Cryptodash AI - LLM gateway access for trade signals and market analysis.
//!
//! - `client`: [`LlmClient`] seam and the rig-core backed [`RigLlmClient`]
//! - `analyst`: [`MarketAnalyst`], which plugs into the core signal service as
//!   a [`cryptodash_core::signals::SignalAdvisor`] and answers free-form questions
//! - `prompt`: system prompts and prompt builders
//! - `response`: tolerant parsing of model output

pub mod analyst;
pub mod client;
pub mod config;
pub mod error;
pub mod prompt;
pub mod response;

pub use analyst::{Analysis, AnalysisContext, MarketAnalyst, MAX_QUESTION_CHARS};
pub use client::{LlmClient, RigLlmClient};
pub use config::{AiConfig, DEFAULT_MAX_OUTPUT_CHARS, DEFAULT_MODEL};
pub use error::AiError;
