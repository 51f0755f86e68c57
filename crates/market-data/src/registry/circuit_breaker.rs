//! Per-provider circuit breaker.
//!
//! - **Closed**: calls go through; consecutive penalised failures are counted.
//! - **Open**: calls are skipped until the recovery timeout elapses.
//! - **HalfOpen**: trial calls go through; enough successes close the
//!   circuit, any failure opens it again.
//!
//! State is in-memory and starts Closed on every boot.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use serde::Serialize;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Closed => "Closed",
            Self::Open => "Open",
            Self::HalfOpen => "HalfOpen",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that open a Closed circuit.
    pub failure_threshold: u32,
    /// How long an Open circuit waits before allowing trial calls.
    pub recovery_timeout: Duration,
    /// Successes in HalfOpen needed to close again.
    pub half_open_successes: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            recovery_timeout: Duration::from_secs(60),
            half_open_successes: 2,
        }
    }
}

#[derive(Debug)]
struct Circuit {
    state: CircuitState,
    failures: u32,
    trial_successes: u32,
    opened_at: Option<Instant>,
}

impl Default for Circuit {
    fn default() -> Self {
        Self {
            state: CircuitState::Closed,
            failures: 0,
            trial_successes: 0,
            opened_at: None,
        }
    }
}

impl Circuit {
    fn open(&mut self, now: Instant) {
        self.state = CircuitState::Open;
        self.opened_at = Some(now);
        self.trial_successes = 0;
    }

    /// Open circuits whose timeout has passed move to HalfOpen.
    fn poll(&mut self, now: Instant, recovery_timeout: Duration) -> CircuitState {
        if self.state == CircuitState::Open {
            let elapsed = self
                .opened_at
                .map(|at| now.saturating_duration_since(at))
                .unwrap_or(recovery_timeout);
            if elapsed >= recovery_timeout {
                self.state = CircuitState::HalfOpen;
                self.trial_successes = 0;
            }
        }
        self.state
    }
}

/// Point-in-time view of one provider's circuit, for diagnostics.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CircuitSnapshot {
    pub provider: String,
    pub state: CircuitState,
    pub consecutive_failures: u32,
    /// Seconds since the circuit last opened, if it has.
    pub opened_secs_ago: Option<u64>,
}

pub struct CircuitBreaker {
    circuits: Mutex<HashMap<String, Circuit>>,
    config: CircuitBreakerConfig,
}

impl CircuitBreaker {
    pub fn new() -> Self {
        Self::with_config(CircuitBreakerConfig::default())
    }

    pub fn with_config(config: CircuitBreakerConfig) -> Self {
        Self {
            circuits: Mutex::new(HashMap::new()),
            config,
        }
    }

    fn circuits(&self) -> MutexGuard<'_, HashMap<String, Circuit>> {
        self.circuits.lock().unwrap_or_else(|poisoned| {
            warn!("Circuit breaker lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Whether a call to `provider` may proceed. May move Open to HalfOpen.
    pub fn is_allowed(&self, provider: &str) -> bool {
        let mut circuits = self.circuits();
        let circuit = circuits.entry(provider.to_string()).or_default();
        let before = circuit.state;
        let now = circuit.poll(Instant::now(), self.config.recovery_timeout);

        if before == CircuitState::Open && now == CircuitState::HalfOpen {
            info!("Circuit breaker: '{}' Open -> HalfOpen", provider);
        }
        now != CircuitState::Open
    }

    pub fn record_success(&self, provider: &str) {
        let mut circuits = self.circuits();
        let circuit = circuits.entry(provider.to_string()).or_default();

        match circuit.state {
            CircuitState::Closed => circuit.failures = 0,
            CircuitState::HalfOpen => {
                circuit.trial_successes += 1;
                if circuit.trial_successes >= self.config.half_open_successes {
                    info!("Circuit breaker: '{}' recovered, closing", provider);
                    *circuit = Circuit::default();
                }
            }
            CircuitState::Open => {
                debug!("Circuit breaker: late success for open '{}' ignored", provider);
            }
        }
    }

    pub fn record_failure(&self, provider: &str) {
        let mut circuits = self.circuits();
        let circuit = circuits.entry(provider.to_string()).or_default();
        let now = Instant::now();
        circuit.failures += 1;

        match circuit.state {
            CircuitState::Closed if circuit.failures >= self.config.failure_threshold => {
                warn!(
                    "Circuit breaker: opening '{}' after {} consecutive failures",
                    provider, circuit.failures
                );
                circuit.open(now);
            }
            CircuitState::Closed => debug!(
                "Circuit breaker: '{}' failure {}/{}",
                provider, circuit.failures, self.config.failure_threshold
            ),
            CircuitState::HalfOpen => {
                warn!("Circuit breaker: trial call to '{}' failed, reopening", provider);
                circuit.open(now);
            }
            CircuitState::Open => {}
        }
    }

    pub fn state(&self, provider: &str) -> CircuitState {
        self.circuits()
            .get(provider)
            .map(|c| c.state)
            .unwrap_or(CircuitState::Closed)
    }

    pub fn failure_count(&self, provider: &str) -> u32 {
        self.circuits().get(provider).map(|c| c.failures).unwrap_or(0)
    }

    pub fn reset(&self, provider: &str) {
        if self.circuits().remove(provider).is_some() {
            info!("Circuit breaker: '{}' reset", provider);
        }
    }

    pub fn snapshot(&self, provider: &str) -> CircuitSnapshot {
        let circuits = self.circuits();
        let circuit = circuits.get(provider);
        CircuitSnapshot {
            provider: provider.to_string(),
            state: circuit.map(|c| c.state).unwrap_or(CircuitState::Closed),
            consecutive_failures: circuit.map(|c| c.failures).unwrap_or(0),
            opened_secs_ago: circuit
                .and_then(|c| c.opened_at)
                .map(|at| at.elapsed().as_secs()),
        }
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new()
    }
}
