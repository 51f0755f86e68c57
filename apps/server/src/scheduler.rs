//! Background purge of expired cache rows.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::main_lib::AppState;

/// Starts the periodic cache purge. The first purge runs one full period after startup.
pub fn start_cache_purge_scheduler(state: Arc<AppState>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Cache purge scheduler started ({}s interval)", period.as_secs());

        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            run_purge(&state).await;
        }
    })
}

async fn run_purge(state: &AppState) {
    match state.market_service.purge_cache().await {
        Ok(0) => debug!("Scheduled cache purge: nothing expired"),
        Ok(purged) => info!("Scheduled cache purge removed {} entries", purged),
        Err(e) => warn!("Scheduled cache purge failed: {}", e),
    }
}
