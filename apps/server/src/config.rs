use std::{net::SocketAddr, str::FromStr, time::Duration};

use anyhow::{anyhow, bail, Context};
use axum::http::HeaderValue;

use cryptodash_ai::{AiConfig, DEFAULT_MAX_OUTPUT_CHARS, DEFAULT_MODEL};

#[derive(Clone, Debug)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub json_logs: bool,
    pub cache_purge_interval: Duration,
    pub coinglass_api_key: Option<String>,
    pub cmc_api_key: Option<String>,
    pub tatum_api_key: Option<String>,
    pub ai_base_url: Option<String>,
    pub ai_api_key: Option<String>,
    pub ai_model: String,
    pub ai_max_output_chars: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            db_path: "./db/cryptodash.db".to_string(),
            cors_allow: vec!["*".to_string()],
            request_timeout: Duration::from_millis(30_000),
            json_logs: false,
            cache_purge_interval: Duration::from_secs(900),
            coinglass_api_key: None,
            cmc_api_key: None,
            tatum_api_key: None,
            ai_base_url: None,
            ai_api_key: None,
            ai_model: DEFAULT_MODEL.to_string(),
            ai_max_output_chars: DEFAULT_MAX_OUTPUT_CHARS,
        }
    }
}

impl Config {
    /// Load `.env` (if present) and read the `CD_*` and provider key variables.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from any variable source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let listen_addr = parse_or(&var, "CD_LISTEN_ADDR", defaults.listen_addr)?;
        let db_path = var("CD_DB_PATH").unwrap_or(defaults.db_path);

        let cors_allow: Vec<String> = match var("CD_CORS_ALLOW_ORIGINS") {
            Some(raw) => raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            None => defaults.cors_allow,
        };
        for origin in cors_allow.iter().filter(|o| o.as_str() != "*") {
            HeaderValue::from_str(origin)
                .map_err(|_| anyhow!("Invalid origin '{}' in CD_CORS_ALLOW_ORIGINS", origin))?;
        }

        let timeout_ms: u64 = parse_or(&var, "CD_REQUEST_TIMEOUT_MS", 30_000)?;
        if timeout_ms == 0 {
            bail!("CD_REQUEST_TIMEOUT_MS must be greater than zero");
        }

        let json_logs = match var("CD_LOG_FORMAT") {
            None => false,
            Some(format) if format.eq_ignore_ascii_case("text") => false,
            Some(format) if format.eq_ignore_ascii_case("json") => true,
            Some(other) => bail!("Invalid CD_LOG_FORMAT '{}': expected 'text' or 'json'", other),
        };

        let purge_secs: u64 = parse_or(&var, "CD_CACHE_PURGE_INTERVAL_SECS", 900)?;
        if purge_secs == 0 {
            bail!("CD_CACHE_PURGE_INTERVAL_SECS must be greater than zero");
        }

        let ai_max_output_chars: usize =
            parse_or(&var, "CD_AI_MAX_OUTPUT_CHARS", defaults.ai_max_output_chars)?;
        if ai_max_output_chars == 0 {
            bail!("CD_AI_MAX_OUTPUT_CHARS must be greater than zero");
        }

        Ok(Self {
            listen_addr,
            db_path,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            json_logs,
            cache_purge_interval: Duration::from_secs(purge_secs),
            coinglass_api_key: var("COINGLASS_API_KEY"),
            cmc_api_key: var("CMC_API_KEY"),
            tatum_api_key: var("TATUM_API_KEY"),
            ai_base_url: var("CD_AI_BASE_URL"),
            ai_api_key: var("CD_AI_API_KEY"),
            ai_model: var("CD_AI_MODEL").unwrap_or(defaults.ai_model),
            ai_max_output_chars,
        })
    }

    pub fn ai_enabled(&self) -> bool {
        self.ai_api_key.is_some()
    }

    /// Gateway settings for the LLM client and analyst. The key is empty
    /// when AI is disabled.
    pub fn ai_config(&self) -> AiConfig {
        let mut ai_config = AiConfig::new(self.ai_api_key.clone().unwrap_or_default())
            .with_model(self.ai_model.clone())
            .with_max_output_chars(self.ai_max_output_chars);
        if let Some(url) = &self.ai_base_url {
            ai_config = ai_config.with_base_url(url.clone());
        }
        ai_config
    }
}

fn parse_or<T, V>(var: &V, name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    V: Fn(&str) -> Option<String>,
{
    match var(name) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("Invalid {} '{}'", name, raw)),
        None => Ok(default),
    }
}
