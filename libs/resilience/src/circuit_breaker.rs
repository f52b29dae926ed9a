//! Circuit Breaker with sliding window error-rate and slow-call tracking
//!
//! State transitions:
//! - Closed → Open: consecutive failures reach the limit, or the error rate
//!   or slow-call rate over the sliding window crosses its threshold
//! - Open → HalfOpen: after the cooldown duration
//! - HalfOpen → Closed: when the success count reaches the threshold
//! - HalfOpen → Open: on any failure

use parking_lot::RwLock;
use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Normal operation, requests pass through
    Closed,
    /// Circuit is open, requests fail fast
    Open,
    /// Testing if the dependency recovered, limited requests allowed
    HalfOpen,
}

#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Consecutive failure count to trigger circuit open
    pub failure_threshold: u32,
    /// Success count in HalfOpen to close the circuit
    pub success_threshold: u32,
    /// Duration to wait before transitioning from Open to HalfOpen
    pub open_wait: Duration,
    /// Error rate threshold (0.0 - 1.0) to trigger circuit open
    pub error_rate_threshold: f64,
    /// Slow-call rate threshold (0.0 - 1.0) to trigger circuit open
    pub slow_call_rate_threshold: f64,
    /// Calls taking longer than this count as slow
    pub slow_call_duration_threshold: Duration,
    /// Sliding window size for rate calculations
    pub window_size: usize,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            success_threshold: 2,
            open_wait: Duration::from_secs(60),
            error_rate_threshold: 0.5,
            slow_call_rate_threshold: 0.6,
            slow_call_duration_threshold: Duration::from_secs(2),
            window_size: 100,
        }
    }
}

/// Outcome of one guarded call, as tracked by the sliding window.
#[derive(Debug, Clone, Copy)]
struct CallOutcome {
    ok: bool,
    slow: bool,
}

#[derive(Clone)]
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    state: Arc<RwLock<CircuitBreakerState>>,
}

struct CircuitBreakerState {
    current: CircuitState,
    consecutive_failures: u32,
    consecutive_successes: u32,
    opened_at: Option<Instant>,
    window: VecDeque<CallOutcome>,
}

#[derive(Debug, thiserror::Error)]
pub enum CircuitBreakerError {
    #[error("Circuit breaker is open - failing fast")]
    Open,
    #[error("Call failed: {0}")]
    CallFailed(String),
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            state: Arc::new(RwLock::new(CircuitBreakerState {
                current: CircuitState::Closed,
                consecutive_failures: 0,
                consecutive_successes: 0,
                opened_at: None,
                window: VecDeque::with_capacity(config.window_size),
            })),
            config,
        }
    }

    /// Execute a future with circuit breaker protection.
    ///
    /// The call's duration is measured against `slow_call_duration_threshold`
    /// regardless of whether it succeeds, so a dependency that answers
    /// correctly but slowly still trips the breaker eventually.
    pub async fn call<F, Fut, T, E>(&self, f: F) -> Result<T, CircuitBreakerError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        // Fast path: check if circuit is open
        if self.should_reject_call() {
            return Err(CircuitBreakerError::Open);
        }

        let started = Instant::now();
        match f().await {
            Ok(result) => {
                self.record_success(started.elapsed());
                Ok(result)
            }
            Err(e) => {
                self.record_failure(started.elapsed());
                Err(CircuitBreakerError::CallFailed(e.to_string()))
            }
        }
    }

    fn should_reject_call(&self) -> bool {
        let mut state = self.state.write();

        match state.current {
            CircuitState::Open => {
                // Check if the cooldown elapsed, transition to HalfOpen
                if let Some(opened_at) = state.opened_at {
                    if opened_at.elapsed() >= self.config.open_wait {
                        info!("Circuit breaker: Open → HalfOpen");
                        state.current = CircuitState::HalfOpen;
                        state.consecutive_successes = 0;
                        state.consecutive_failures = 0;
                        false
                    } else {
                        true // Still open, reject
                    }
                } else {
                    true
                }
            }
            CircuitState::HalfOpen | CircuitState::Closed => false,
        }
    }

    fn record_success(&self, elapsed: Duration) {
        let slow = elapsed >= self.config.slow_call_duration_threshold;
        let mut state = self.state.write();

        state.consecutive_successes += 1;
        state.consecutive_failures = 0;
        self.add_to_window(&mut state, CallOutcome { ok: true, slow });

        match state.current {
            CircuitState::HalfOpen => {
                if state.consecutive_successes >= self.config.success_threshold {
                    info!("Circuit breaker: HalfOpen → Closed");
                    state.current = CircuitState::Closed;
                }
            }
            CircuitState::Closed => {
                // A run of slow-but-successful calls can still open the circuit
                if slow && self.slow_call_rate_of(&state) >= self.config.slow_call_rate_threshold {
                    warn!(
                        "Circuit breaker: Closed → Open (slow-call rate {:.2}%)",
                        self.slow_call_rate_of(&state) * 100.0
                    );
                    state.current = CircuitState::Open;
                    state.opened_at = Some(Instant::now());
                }
            }
            CircuitState::Open => {}
        }
    }

    fn record_failure(&self, elapsed: Duration) {
        let slow = elapsed >= self.config.slow_call_duration_threshold;
        let mut state = self.state.write();

        state.consecutive_failures += 1;
        state.consecutive_successes = 0;
        self.add_to_window(&mut state, CallOutcome { ok: false, slow });

        match state.current {
            CircuitState::Closed => {
                let error_rate = self.error_rate_of(&state);
                let slow_rate = self.slow_call_rate_of(&state);

                if state.consecutive_failures >= self.config.failure_threshold
                    || error_rate >= self.config.error_rate_threshold
                    || slow_rate >= self.config.slow_call_rate_threshold
                {
                    warn!(
                        "Circuit breaker: Closed → Open (failures: {}, error_rate: {:.2}%, slow_rate: {:.2}%)",
                        state.consecutive_failures,
                        error_rate * 100.0,
                        slow_rate * 100.0
                    );
                    state.current = CircuitState::Open;
                    state.opened_at = Some(Instant::now());
                }
            }
            CircuitState::HalfOpen => {
                warn!("Circuit breaker: HalfOpen → Open (test failed)");
                state.current = CircuitState::Open;
                state.opened_at = Some(Instant::now());
            }
            CircuitState::Open => {
                // Already open, nothing to do
            }
        }
    }

    fn add_to_window(&self, state: &mut CircuitBreakerState, outcome: CallOutcome) {
        if state.window.len() >= self.config.window_size {
            state.window.pop_front();
        }
        state.window.push_back(outcome);
    }

    fn error_rate_of(&self, state: &CircuitBreakerState) -> f64 {
        if state.window.is_empty() {
            return 0.0;
        }
        let failures = state.window.iter().filter(|o| !o.ok).count();
        failures as f64 / state.window.len() as f64
    }

    fn slow_call_rate_of(&self, state: &CircuitBreakerState) -> f64 {
        if state.window.is_empty() {
            return 0.0;
        }
        let slow = state.window.iter().filter(|o| o.slow).count();
        slow as f64 / state.window.len() as f64
    }

    /// Get current circuit state (for monitoring)
    pub fn state(&self) -> CircuitState {
        self.state.read().current
    }

    /// Get current error rate (for monitoring)
    pub fn error_rate(&self) -> f64 {
        let state = self.state.read();
        self.error_rate_of(&state)
    }

    /// Get current slow-call rate (for monitoring)
    pub fn slow_call_rate(&self) -> f64 {
        let state = self.state.read();
        self.slow_call_rate_of(&state)
    }
}
