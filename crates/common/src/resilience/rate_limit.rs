//! Rate-limit aware retry policy
//!
//! CRMs signal throttling with `429 Too Many Requests` and usually say how
//! long to wait in a `Retry-After` header. [`RateLimitPolicy`] turns that into
//! a [`RetryDecision`]; every other failure stops immediately.

use std::fmt;
use std::future::Future;
use std::ops::Range;
use std::time::Duration;

use rand::Rng;

use super::retry::{RetryConfig, RetryDecision, RetryExecutor, RetryPolicy, RetryResult};

/// HTTP status used by servers to signal throttling
pub const TOO_MANY_REQUESTS: u16 = 429;

/// Wait used when a 429 carries no usable `Retry-After`
pub const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(10);

/// Errors that may carry an HTTP status and response headers
pub trait HttpFailure {
    /// Response status, or `None` for transport-level failures
    fn status(&self) -> Option<u16>;

    /// Response header by case-insensitive name
    fn header(&self, name: &str) -> Option<&str>;
}

/// Retries throttled responses after `Retry-After` plus jitter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitPolicy {
    /// Status that marks a response as throttled
    pub retry_status: u16,
    /// Wait when the header is absent or not an integer
    pub default_retry_after: Duration,
    /// Extra random wait, half-open range
    pub jitter: Range<Duration>,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            retry_status: TOO_MANY_REQUESTS,
            default_retry_after: DEFAULT_RETRY_AFTER,
            jitter: Duration::from_millis(500)..Duration::from_millis(1000),
        }
    }
}

impl RateLimitPolicy {
    /// Delay for a throttled response with the given `Retry-After` value.
    ///
    /// Only the delta-seconds form is understood; HTTP dates fall back to the
    /// default.
    pub fn delay_for(&self, retry_after: Option<&str>) -> Duration {
        let base = retry_after
            .and_then(|value| value.trim().parse::<u64>().ok())
            .map_or(self.default_retry_after, Duration::from_secs);
        base + self.sample_jitter()
    }

    fn sample_jitter(&self) -> Duration {
        if self.jitter.is_empty() {
            return self.jitter.start;
        }
        rand::thread_rng().gen_range(self.jitter.clone())
    }
}

impl<E: HttpFailure> RetryPolicy<E> for RateLimitPolicy {
    fn should_retry(&self, error: &E, _attempt: u32) -> RetryDecision {
        if error.status() == Some(self.retry_status) {
            RetryDecision::RetryAfter(self.delay_for(error.header("retry-after")))
        } else {
            RetryDecision::Stop
        }
    }
}

/// Preconfigured retry wrapper for CRM calls
#[derive(Debug, Clone)]
pub struct RateLimitedCaller {
    executor: RetryExecutor<RateLimitPolicy>,
}

impl Default for RateLimitedCaller {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimitedCaller {
    /// Ten attempts, default rate-limit policy
    pub fn new() -> Self {
        Self::with_config(RetryConfig::default(), RateLimitPolicy::default())
    }

    pub fn with_config(config: RetryConfig, policy: RateLimitPolicy) -> Self {
        Self { executor: RetryExecutor::new(config, policy) }
    }

    pub fn max_attempts(&self) -> u32 {
        self.executor.config().max_attempts
    }

    /// Run `operation`, retrying while it is throttled
    pub async fn call<F, Fut, T, E>(&self, operation: F) -> RetryResult<T, E>
    where
        E: HttpFailure + fmt::Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.executor.execute(operation).await
    }
}
