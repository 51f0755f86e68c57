//! LLM client abstraction and the rig-core implementation.

use async_trait::async_trait;
use log::debug;
use reqwest::Client as HttpClient;
use rig::{client::CompletionClient, completion::Prompt, providers::openai};

use crate::config::AiConfig;
use crate::error::AiError;

/// A single-turn completion: system preamble plus one user prompt.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, AiError>;

    /// Model id, for attribution in responses.
    fn model(&self) -> &str;
}

/// [`LlmClient`] over an OpenAI-compatible gateway via rig-core.
pub struct RigLlmClient {
    client: openai::CompletionsClient<HttpClient>,
    model: String,
    temperature: f64,
}

impl RigLlmClient {
    pub fn new(config: &AiConfig) -> Result<Self, AiError> {
        if config.api_key.trim().is_empty() {
            return Err(AiError::MissingApiKey("LLM gateway".to_string()));
        }

        let mut builder = openai::CompletionsClient::builder().api_key(&config.api_key);
        if let Some(url) = &config.base_url {
            builder = builder.base_url(url);
        }
        let client = builder.build().map_err(|e| AiError::Provider(e.to_string()))?;

        Ok(Self {
            client,
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }
}

#[async_trait]
impl LlmClient for RigLlmClient {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, AiError> {
        debug!("LLM request to {} ({} prompt chars)", self.model, prompt.len());
        self.client
            .agent(&self.model)
            .preamble(system)
            .temperature(self.temperature)
            .build()
            .prompt(prompt)
            .await
            .map_err(|e| AiError::Provider(e.to_string()))
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_api_key() {
        let result = RigLlmClient::new(&AiConfig::new("  "));
        assert!(matches!(result, Err(AiError::MissingApiKey(_))));
    }
}
