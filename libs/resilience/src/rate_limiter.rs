//! Fixed-window in-process rate limiter
//!
//! Caps the number of calls admitted per time window. State is a single
//! counter plus the window start, shared across callers behind a
//! `parking_lot::Mutex`; there is no cross-instance coordination.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::warn;

#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Maximum calls admitted per window
    pub max_calls: u32,
    /// Window length
    pub window: Duration,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            max_calls: 50,
            window: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RateLimiterError {
    #[error("Rate limit exceeded: {max_calls} calls per {window:?}")]
    Exceeded { max_calls: u32, window: Duration },
}

#[derive(Clone)]
pub struct RateLimiter {
    config: RateLimiterConfig,
    state: Arc<Mutex<WindowState>>,
}

struct WindowState {
    window_start: Instant,
    count: u32,
}

impl RateLimiter {
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(WindowState {
                window_start: Instant::now(),
                count: 0,
            })),
            config,
        }
    }

    /// Try to admit one call. Never blocks; callers that are shed decide
    /// for themselves whether to degrade or propagate the error.
    pub fn try_acquire(&self) -> Result<(), RateLimiterError> {
        let mut state = self.state.lock();

        if state.window_start.elapsed() >= self.config.window {
            state.window_start = Instant::now();
            state.count = 0;
        }

        if state.count >= self.config.max_calls {
            warn!(
                "Rate limiter shed a call ({} per {:?} exhausted)",
                self.config.max_calls, self.config.window
            );
            return Err(RateLimiterError::Exceeded {
                max_calls: self.config.max_calls,
                window: self.config.window,
            });
        }

        state.count += 1;
        Ok(())
    }

    /// Calls admitted in the current window (for monitoring)
    pub fn current_count(&self) -> u32 {
        self.state.lock().count
    }
}
