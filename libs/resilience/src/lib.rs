//! Resilience patterns for microservices
//!
//! This library provides the policy primitives used to guard remote and
//! store-backed calls:
//! - **Rate Limiter**: Sheds load before it reaches a struggling dependency
//! - **Circuit Breaker**: Fails fast when error or slow-call rate crosses a threshold
//! - **Retry**: Exponential backoff with jitter for transient failures
//! - **Bulkhead**: Isolates a call onto a bounded worker pool
//! - **Timeout**: Enforces time limits on guarded operations
//!
//! The primitives compose by nesting; the conventional order is
//! rate limiter → circuit breaker → retry → bulkhead, with a timeout around
//! the innermost operation.
//!
//! # Example: guarding a call
//!
//! ```rust,no_run
//! use resilience::{CircuitBreaker, CircuitBreakerConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let breaker = CircuitBreaker::new(CircuitBreakerConfig::default());
//!
//!     let result = breaker.call(|| async {
//!         // Your remote call here
//!         Ok::<_, String>(())
//!     }).await;
//!     let _ = result;
//! }
//! ```

pub mod bulkhead;
pub mod circuit_breaker;
pub mod rate_limiter;
pub mod retry;
pub mod timeout;

// Re-export main types for convenience
pub use bulkhead::{Bulkhead, BulkheadConfig, BulkheadError};
pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError, CircuitState};
pub use rate_limiter::{RateLimiter, RateLimiterConfig, RateLimiterError};
pub use retry::{with_retry, with_retry_if, RetryConfig, RetryError};
pub use timeout::{with_timeout, TimeoutElapsed};
