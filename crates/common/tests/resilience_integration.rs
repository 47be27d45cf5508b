//! Integration tests for resilience module
//!
//! Exercises the rate-limited caller with a custom policy configuration and
//! concurrent callers sharing one instance.

#![cfg(feature = "runtime")]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use leadsync_common::resilience::{
    HttpFailure, RateLimitPolicy, RateLimitedCaller, RetryConfig, RetryError,
};

/// Custom error type for testing
#[derive(Debug, Clone)]
struct ApiError {
    status: u16,
    headers: HashMap<String, String>,
}

impl ApiError {
    fn throttled(retry_after: &str) -> Self {
        let mut headers = HashMap::new();
        headers.insert("retry-after".to_string(), retry_after.to_string());
        Self { status: 429, headers }
    }

    fn with_status(status: u16) -> Self {
        Self { status, headers: HashMap::new() }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HTTP {}", self.status)
    }
}

impl std::error::Error for ApiError {}

impl HttpFailure for ApiError {
    fn status(&self) -> Option<u16> {
        Some(self.status)
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }
}

/// Validates that a missing `Retry-After` falls back to the configured
/// default.
///
/// # Test Steps
/// 1. Configure a policy with a 2 s default and no jitter
/// 2. Fail once with a bare 429, then succeed
/// 3. Verify about 2 s of virtual time elapsed
#[tokio::test(start_paused = true)]
async fn test_missing_retry_after_uses_default_delay() {
    let policy = RateLimitPolicy {
        default_retry_after: Duration::from_secs(2),
        jitter: Duration::ZERO..Duration::ZERO,
        ..RateLimitPolicy::default()
    };
    let caller = RateLimitedCaller::with_config(RetryConfig::default(), policy);
    let calls = Arc::new(AtomicU32::new(0));
    let started = tokio::time::Instant::now();

    let counter = calls.clone();
    let result = caller
        .call(|| {
            let counter = counter.clone();
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(ApiError::with_status(429))
                } else {
                    Ok(())
                }
            }
        })
        .await;

    assert!(result.is_ok());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(2) && elapsed < Duration::from_millis(2100));
}

/// Validates that a smaller attempt budget is honored.
///
/// # Test Steps
/// 1. Configure three attempts
/// 2. Throttle every call
/// 3. Verify `AttemptsExhausted { attempts: 3 }` and three calls
#[tokio::test(start_paused = true)]
async fn test_custom_attempt_budget() {
    let config = RetryConfig::builder().max_attempts(3).build().expect("valid config");
    let caller = RateLimitedCaller::with_config(config, RateLimitPolicy::default());
    let calls = Arc::new(AtomicU32::new(0));

    let counter = calls.clone();
    let result: Result<(), RetryError<ApiError>> = caller
        .call(|| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(ApiError::throttled("0"))
            }
        })
        .await;

    assert!(result.unwrap_err().is_exhausted());
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

/// Validates that one throttled caller does not hold up another.
///
/// # Test Steps
/// 1. Share one caller between two tasks
/// 2. Task A is throttled for 5 s; task B succeeds at once
/// 3. Verify B finishes before any virtual time has passed
#[tokio::test(start_paused = true)]
async fn test_throttle_sleep_only_blocks_its_own_task() {
    let caller = Arc::new(RateLimitedCaller::new());
    let started = tokio::time::Instant::now();

    let slow_caller = caller.clone();
    let slow = tokio::spawn(async move {
        let attempts = Arc::new(AtomicU32::new(0));
        slow_caller
            .call(|| {
                let attempts = attempts.clone();
                async move {
                    if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                        Err(ApiError::throttled("5"))
                    } else {
                        Ok("slow")
                    }
                }
            })
            .await
    });

    let fast = caller.call(|| async { Ok::<_, ApiError>("fast") }).await;
    assert_eq!(fast.expect("fast call"), "fast");
    assert!(started.elapsed() < Duration::from_secs(1));

    let slow = slow.await.expect("task joined").expect("slow call");
    assert_eq!(slow, "slow");
    assert!(started.elapsed() >= Duration::from_millis(5500));
}
