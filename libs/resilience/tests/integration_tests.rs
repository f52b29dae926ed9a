/// Integration tests for the resilience library
use resilience::{
    bulkhead::{Bulkhead, BulkheadConfig, BulkheadError},
    circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState},
    rate_limiter::{RateLimiter, RateLimiterConfig},
    retry::{with_retry_if, RetryConfig, RetryError},
    timeout::{with_timeout, TimeoutElapsed},
};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// The two failure shapes a guarded fetch can produce, mirroring how a
/// consuming service separates retryable timeouts from permanent failures.
#[derive(Debug, thiserror::Error)]
enum FetchFailure {
    #[error(transparent)]
    Timeout(#[from] TimeoutElapsed),
    #[error("Store failure: {0}")]
    Store(String),
}

impl FetchFailure {
    fn is_retryable(error: &FetchFailure) -> bool {
        matches!(error, FetchFailure::Timeout(_))
    }
}

// ==================== Circuit Breaker Tests ====================

#[tokio::test]
async fn circuit_breaker_full_lifecycle() {
    let config = CircuitBreakerConfig {
        failure_threshold: 3,
        success_threshold: 2,
        open_wait: Duration::from_millis(100),
        error_rate_threshold: 1.1,
        slow_call_rate_threshold: 1.1,
        ..Default::default()
    };
    let cb = CircuitBreaker::new(config);

    // Phase 1: Closed -> Open (3 failures)
    for _ in 0..3 {
        let _ = cb.call(|| async { Err::<(), _>("error") }).await;
    }
    assert_eq!(cb.state(), CircuitState::Open);

    // Phase 2: Open -> HalfOpen (wait for cooldown)
    tokio::time::sleep(Duration::from_millis(150)).await;
    let _ = cb.call(|| async { Ok::<_, String>(()) }).await;
    assert_eq!(cb.state(), CircuitState::HalfOpen);

    // Phase 3: HalfOpen -> Closed (2 successes)
    for _ in 0..2 {
        let _ = cb.call(|| async { Ok::<_, String>(()) }).await;
    }
    assert_eq!(cb.state(), CircuitState::Closed);
}

#[tokio::test]
async fn circuit_breaker_counts_timeouts_as_failures() {
    let config = CircuitBreakerConfig {
        failure_threshold: 2,
        error_rate_threshold: 1.1,
        slow_call_rate_threshold: 1.1,
        ..Default::default()
    };
    let cb = CircuitBreaker::new(config);

    for _ in 0..2 {
        let _ = cb
            .call(|| async {
                with_timeout(Duration::from_millis(10), async {
                    tokio::time::sleep(Duration::from_millis(100)).await;
                })
                .await
            })
            .await;
    }

    assert_eq!(cb.state(), CircuitState::Open);
}

// ==================== Retry + Timeout Composition ====================

#[tokio::test]
async fn retry_of_timed_out_operations_is_bounded() {
    let config = RetryConfig {
        max_retries: 2,
        initial_backoff: Duration::from_millis(5),
        jitter: false,
        ..Default::default()
    };

    let attempts = Arc::new(AtomicU32::new(0));
    let attempts_clone = attempts.clone();

    let result = with_retry_if(config, FetchFailure::is_retryable, move || {
        attempts_clone.fetch_add(1, Ordering::SeqCst);
        async {
            let value = with_timeout(Duration::from_millis(5), async {
                tokio::time::sleep(Duration::from_millis(50)).await;
                42
            })
            .await
            .map_err(FetchFailure::from)?;
            Ok(value)
        }
    })
    .await;

    assert!(matches!(
        result,
        Err(RetryError::MaxRetriesExceeded { retries: 2, .. })
    ));
    assert_eq!(attempts.load(Ordering::SeqCst), 3); // Initial + 2 retries
}

#[tokio::test]
async fn retry_does_not_touch_non_retryable_failures() {
    let config = RetryConfig {
        max_retries: 5,
        initial_backoff: Duration::from_millis(5),
        jitter: false,
        ..Default::default()
    };

    let attempts = Arc::new(AtomicU32::new(0));
    let attempts_clone = attempts.clone();

    let result: Result<i32, _> = with_retry_if(config, FetchFailure::is_retryable, move || {
        attempts_clone.fetch_add(1, Ordering::SeqCst);
        async { Err(FetchFailure::Store("store exploded".into())) }
    })
    .await;

    assert!(matches!(result, Err(RetryError::OperationFailed(_))));
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

// ==================== Rate Limiter Tests ====================

#[tokio::test]
async fn rate_limiter_sheds_over_limit_then_refills() {
    let limiter = RateLimiter::new(RateLimiterConfig {
        max_calls: 2,
        window: Duration::from_millis(60),
    });

    assert!(limiter.try_acquire().is_ok());
    assert!(limiter.try_acquire().is_ok());
    assert!(limiter.try_acquire().is_err());

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(limiter.try_acquire().is_ok());
}

// ==================== Bulkhead Tests ====================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn bulkhead_limits_concurrency_without_losing_results() {
    let bulkhead = Bulkhead::new(BulkheadConfig {
        max_concurrent_calls: 2,
        max_queue_depth: 8,
    });

    let mut handles = Vec::new();
    for i in 0..10u32 {
        let bulkhead = bulkhead.clone();
        handles.push(tokio::spawn(async move {
            bulkhead
                .call(async move {
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    i * 2
                })
                .await
        }));
    }

    let mut sum = 0;
    for handle in handles {
        sum += handle.await.unwrap().unwrap();
    }
    assert_eq!(sum, (0..10u32).map(|i| i * 2).sum::<u32>());
    assert_eq!(bulkhead.available_slots(), 2);
}

// ==================== Full Stack Composition ====================

/// Rate limiter → circuit breaker → retry → bulkhead, the order the
/// licensing service composes them in.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn composed_stack_degrades_instead_of_erroring() {
    let limiter = RateLimiter::new(RateLimiterConfig {
        max_calls: 100,
        window: Duration::from_secs(1),
    });
    let breaker = CircuitBreaker::new(CircuitBreakerConfig {
        failure_threshold: 2,
        error_rate_threshold: 1.1,
        slow_call_rate_threshold: 1.1,
        open_wait: Duration::from_secs(30),
        ..Default::default()
    });
    let bulkhead = Bulkhead::new(BulkheadConfig::default());
    let retry = RetryConfig {
        max_retries: 1,
        initial_backoff: Duration::from_millis(5),
        jitter: false,
        ..Default::default()
    };

    let attempts = Arc::new(AtomicU32::new(0));

    let guarded = |fail: bool| {
        let limiter = limiter.clone();
        let breaker = breaker.clone();
        let bulkhead = bulkhead.clone();
        let retry = retry.clone();
        let attempts = attempts.clone();
        async move {
            limiter.try_acquire().map_err(|e| e.to_string())?;
            breaker
                .call(|| {
                    let bulkhead = bulkhead.clone();
                    let retry = retry.clone();
                    let attempts = attempts.clone();
                    async move {
                        with_retry_if(
                            retry,
                            |e: &String| e.contains("timed out"),
                            move || {
                                let bulkhead = bulkhead.clone();
                                let attempts = attempts.clone();
                                async move {
                                    attempts.fetch_add(1, Ordering::SeqCst);
                                    let out = bulkhead
                                        .call(async move {
                                            if fail {
                                                Err("operation timed out".to_string())
                                            } else {
                                                Ok(7u32)
                                            }
                                        })
                                        .await
                                        .map_err(|e: BulkheadError| e.to_string())?;
                                    out
                                }
                            },
                        )
                        .await
                        .map_err(|e| e.to_string())
                    }
                })
                .await
                .map_err(|e| e.to_string())
        }
    };

    // Healthy path returns the real value
    assert_eq!(guarded(false).await.unwrap(), 7);

    // Two failing rounds (each retried once) open the breaker
    assert!(guarded(true).await.is_err());
    assert!(guarded(true).await.is_err());
    assert_eq!(breaker.state(), CircuitState::Open);

    // Open breaker fails fast: no new attempts reach the bulkhead
    let before = attempts.load(Ordering::SeqCst);
    assert!(guarded(false).await.is_err());
    assert_eq!(attempts.load(Ordering::SeqCst), before);
}
