use std::sync::Arc;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use cryptodash_ai::{LlmClient, MarketAnalyst, RigLlmClient};
use cryptodash_core::{
    cache::{CacheTtls, TtlCache},
    market::{MarketService, MarketServiceTrait},
    signals::{SignalAdvisor, SignalService, SignalServiceTrait},
};
use cryptodash_market_data::{
    CoinGlassProvider, CoinMarketCapProvider, KrakenProvider, MarketDataProvider, ProviderRegistry,
    TatumProvider,
};
use cryptodash_storage_sqlite::{
    db::{self, write_actor},
    SignalRepository, SqliteCacheRepository,
};

use crate::config::Config;

pub type Analyst = MarketAnalyst<Arc<dyn LlmClient>>;

pub struct AppState {
    pub market_service: Arc<dyn MarketServiceTrait>,
    pub signal_service: Arc<dyn SignalServiceTrait>,
    /// `None` when no LLM gateway key is configured.
    pub analyst: Option<Arc<Analyst>>,
    /// Shared with the market service; analysis answers are cached here too.
    pub cache: TtlCache,
    pub cache_ttls: CacheTtls,
}

pub fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

/// Providers enabled by the configured keys. Kraken needs none and is always present.
pub fn configured_providers(config: &Config) -> Vec<Arc<dyn MarketDataProvider>> {
    let mut providers: Vec<Arc<dyn MarketDataProvider>> = vec![Arc::new(KrakenProvider::new())];
    if let Some(key) = &config.coinglass_api_key {
        providers.push(Arc::new(CoinGlassProvider::new(key.clone())));
    }
    if let Some(key) = &config.cmc_api_key {
        providers.push(Arc::new(CoinMarketCapProvider::new(key.clone())));
    }
    if let Some(key) = &config.tatum_api_key {
        providers.push(Arc::new(TatumProvider::new(key.clone())));
    }
    providers
}

fn configured_llm(config: &Config) -> anyhow::Result<Option<Arc<dyn LlmClient>>> {
    if !config.ai_enabled() {
        tracing::info!("CD_AI_API_KEY not set; signals will be technical-only");
        return Ok(None);
    }
    let client = RigLlmClient::new(&config.ai_config())?;
    Ok(Some(Arc::new(client)))
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let providers = configured_providers(config);
    let llm = configured_llm(config)?;
    build_state_with(config, providers, llm).await
}

/// Wire storage, registry and services around the given providers and LLM client.
pub async fn build_state_with(
    config: &Config,
    providers: Vec<Arc<dyn MarketDataProvider>>,
    llm: Option<Arc<dyn LlmClient>>,
) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = write_actor::spawn_writer((*pool).clone());

    let cache_repository = Arc::new(SqliteCacheRepository::new(pool.clone(), writer.clone()));
    let cache = TtlCache::new(cache_repository);
    let cache_ttls = CacheTtls::default();

    let registry = Arc::new(ProviderRegistry::new(providers));
    let market_service: Arc<dyn MarketServiceTrait> = Arc::new(
        MarketService::new(registry, cache.clone()).with_ttls(cache_ttls.clone()),
    );

    let ai_config = config.ai_config();
    let analyst = llm.map(|client| Arc::new(MarketAnalyst::from_config(client, &ai_config)));
    let advisor = analyst
        .clone()
        .map(|analyst| analyst as Arc<dyn SignalAdvisor>);
    if let Some(analyst) = &analyst {
        tracing::info!("AI analysis enabled with model {}", analyst.model());
    }

    let signal_repository = Arc::new(SignalRepository::new(pool.clone(), writer.clone()));
    let signal_service: Arc<dyn SignalServiceTrait> = Arc::new(SignalService::new(
        market_service.clone(),
        signal_repository,
        advisor,
    ));

    Ok(Arc::new(AppState {
        market_service,
        signal_service,
        analyst,
        cache,
        cache_ttls,
    }))
}
