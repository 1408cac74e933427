//! Circuit breaker for the embedding service.
//!
//! Stops calling a failing provider for a while so that a dead service costs
//! one fast rejection per chunk instead of one timeout per chunk. Recovery
//! attempts back off exponentially.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::{info, warn};

/// Circuit breaker states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Normal operation - requests pass through
    Closed,
    /// Failure threshold exceeded - requests blocked
    Open,
    /// Testing if service recovered - limited requests allowed
    HalfOpen,
}

/// Circuit breaker configuration
#[derive(Debug, Clone)]
pub struct CircuitConfig {
    /// Consecutive failures before opening the circuit
    pub failure_threshold: u32,
    /// Base recovery timeout
    pub recovery_timeout: Duration,
    /// Calls admitted in half-open state; all must succeed to close again
    pub half_open_max_calls: u32,
    /// Upper bound for the backoff
    pub max_backoff: Duration,
    /// Double the timeout on every consecutive opening
    pub exponential_backoff: bool,
}

impl Default for CircuitConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            recovery_timeout: Duration::from_secs(30),
            half_open_max_calls: 3,
            max_backoff: Duration::from_secs(300),
            exponential_backoff: true,
        }
    }
}

#[derive(Debug)]
struct BreakerState {
    state: CircuitState,
    failures: u32,
    half_open_calls: u32,
    half_open_successes: u32,
    retry_count: u32,
    next_retry_time: Option<Instant>,
}

/// Thread-safe circuit breaker
#[derive(Debug)]
pub struct CircuitBreaker {
    config: CircuitConfig,
    inner: Mutex<BreakerState>,
}

impl CircuitBreaker {
    /// Create a new circuit breaker
    pub fn new(config: CircuitConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(BreakerState {
                state: CircuitState::Closed,
                failures: 0,
                half_open_calls: 0,
                half_open_successes: 0,
                retry_count: 0,
                next_retry_time: None,
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BreakerState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Check if request should be allowed
    pub fn allow_request(&self) -> bool {
        let mut inner = self.lock();
        let state = inner.state;
        let next_retry_time = inner.next_retry_time;

        match state {
            CircuitState::Closed => true,
            CircuitState::Open => match next_retry_time {
                Some(time) if Instant::now() >= time => {
                    self.transition_to(&mut inner, CircuitState::HalfOpen);
                    inner.half_open_calls = 1;
                    true
                }
                _ => false,
            },
            CircuitState::HalfOpen => {
                if inner.half_open_calls < self.config.half_open_max_calls {
                    inner.half_open_calls += 1;
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Record a successful call
    pub fn record_success(&self) {
        let mut inner = self.lock();
        let state = inner.state;

        match state {
            CircuitState::HalfOpen => {
                inner.half_open_successes += 1;
                if inner.half_open_successes >= self.config.half_open_max_calls {
                    self.transition_to(&mut inner, CircuitState::Closed);
                }
            }
            CircuitState::Closed => inner.failures = 0,
            CircuitState::Open => {}
        }
    }

    /// Record a failed call
    pub fn record_failure(&self) {
        let mut inner = self.lock();
        inner.failures += 1;
        let state = inner.state;
        let failures = inner.failures;

        match state {
            // A single failure while probing reopens the circuit.
            CircuitState::HalfOpen => self.transition_to(&mut inner, CircuitState::Open),
            CircuitState::Closed if failures >= self.config.failure_threshold => {
                self.transition_to(&mut inner, CircuitState::Open)
            }
            _ => {}
        }
    }

    fn transition_to(&self, inner: &mut BreakerState, new_state: CircuitState) {
        inner.state = new_state;

        match new_state {
            CircuitState::Open => {
                let backoff = self.calculate_backoff(inner.retry_count);
                inner.next_retry_time = Some(Instant::now() + backoff);
                inner.retry_count += 1;
                warn!(
                    failures = inner.failures,
                    retry_in = ?backoff,
                    "Embedding circuit opened"
                );
            }
            CircuitState::HalfOpen => {
                inner.half_open_calls = 0;
                inner.half_open_successes = 0;
                info!("Embedding circuit half-open, testing recovery");
            }
            CircuitState::Closed => {
                inner.retry_count = 0;
                inner.failures = 0;
                info!("Embedding circuit closed, normal operation resumed");
            }
        }
    }

    fn calculate_backoff(&self, retry_count: u32) -> Duration {
        if !self.config.exponential_backoff {
            return self.config.recovery_timeout;
        }

        let factor = 2_u32.saturating_pow(retry_count.min(16));
        self.config
            .recovery_timeout
            .saturating_mul(factor)
            .min(self.config.max_backoff)
    }

    /// Execute a future with circuit breaker protection
    pub async fn execute<F, T, E>(&self, f: F) -> Result<T, CircuitError<E>>
    where
        F: std::future::Future<Output = Result<T, E>>,
    {
        if !self.allow_request() {
            return Err(CircuitError::CircuitOpen);
        }

        match f.await {
            Ok(result) => {
                self.record_success();
                Ok(result)
            }
            Err(e) => {
                self.record_failure();
                Err(CircuitError::Inner(e))
            }
        }
    }

    /// Get current state
    pub fn state(&self) -> CircuitState {
        self.lock().state
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(CircuitConfig::default())
    }
}

/// Error type for circuit breaker
#[derive(Debug)]
pub enum CircuitError<E> {
    CircuitOpen,
    Inner(E),
}
