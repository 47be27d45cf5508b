//! Generic retry executor with pluggable retry policies
//!
//! The executor runs an async operation, asks its [`RetryPolicy`] what to do
//! with each failure, sleeps for the delay the policy chooses, and gives up
//! after a fixed number of total attempts. Policies decide both *whether* an
//! error is retryable and *how long* to wait, so server-supplied backoff
//! (e.g. `Retry-After`) can be honored.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Default number of total attempts (initial try + retries)
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Errors that can occur during retry operations
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// All attempts were consumed by retryable failures
    #[error("Max retries ({attempts}) exceeded due to rate limiting")]
    AttemptsExhausted { attempts: u32 },

    /// The operation failed with an error the policy does not retry
    #[error("{error}")]
    NonRetryable { error: E },

    /// The retry configuration is invalid
    #[error("Invalid retry configuration: {message}")]
    InvalidConfiguration { message: String },
}

impl<E> RetryError<E> {
    /// The underlying operation error, if the executor stopped on one
    pub fn inner(&self) -> Option<&E> {
        match self {
            Self::NonRetryable { error } => Some(error),
            _ => None,
        }
    }

    /// Consume and return the underlying operation error, if any
    pub fn into_inner(self) -> Option<E> {
        match self {
            Self::NonRetryable { error } => Some(error),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::AttemptsExhausted { .. })
    }
}

/// Result type for retry operations
pub type RetryResult<T, E> = Result<T, RetryError<E>>;

/// Trait for determining whether an error should be retried
pub trait RetryPolicy<E> {
    /// Decide what to do after `error` on the given 1-based attempt
    fn should_retry(&self, error: &E, attempt: u32) -> RetryDecision;
}

/// Decision for whether to retry an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry the operation after the given delay
    RetryAfter(Duration),
    /// Don't retry the operation
    Stop,
}

/// Configuration for retry behavior
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total number of attempts, including the first one
    pub max_attempts: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { max_attempts: DEFAULT_MAX_ATTEMPTS }
    }
}

impl RetryConfig {
    /// Create a configuration builder
    pub fn builder() -> RetryConfigBuilder {
        RetryConfigBuilder::new()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), RetryError<()>> {
        if self.max_attempts == 0 {
            return Err(RetryError::InvalidConfiguration {
                message: "max_attempts must be greater than 0".to_string(),
            });
        }
        Ok(())
    }
}

/// Builder for RetryConfig with fluent API
#[derive(Debug, Default)]
pub struct RetryConfigBuilder {
    config: RetryConfig,
}

impl RetryConfigBuilder {
    pub fn new() -> Self {
        Self { config: RetryConfig::default() }
    }

    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.config.max_attempts = attempts;
        self
    }

    pub fn build(self) -> Result<RetryConfig, RetryError<()>> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// The main retry executor
#[derive(Debug, Clone)]
pub struct RetryExecutor<P> {
    config: RetryConfig,
    policy: P,
}

impl<P> RetryExecutor<P> {
    /// Create a new retry executor with the given configuration and policy
    pub fn new(config: RetryConfig, policy: P) -> Self {
        Self { config, policy }
    }

    /// Create with default configuration
    pub fn with_policy(policy: P) -> Self {
        Self::new(RetryConfig::default(), policy)
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Execute an operation with retry logic.
    ///
    /// `operation` is invoked once per attempt. Errors the policy stops on are
    /// returned as [`RetryError::NonRetryable`] without further attempts; when
    /// the final attempt still fails with a retryable error the executor
    /// returns [`RetryError::AttemptsExhausted`] without sleeping again.
    #[instrument(skip(self, operation), fields(max_attempts = self.config.max_attempts))]
    pub async fn execute<F, Fut, T, E>(&self, mut operation: F) -> RetryResult<T, E>
    where
        P: RetryPolicy<E>,
        E: fmt::Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            debug!("Executing operation (attempt {}/{})", attempt, max_attempts);

            let error = match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!("Operation succeeded after {} retries", attempt - 1);
                    }
                    return Ok(value);
                }
                Err(error) => error,
            };

            match self.policy.should_retry(&error, attempt) {
                RetryDecision::Stop => {
                    debug!(attempt, error = %error, "Retry policy determined not to retry");
                    return Err(RetryError::NonRetryable { error });
                }
                RetryDecision::RetryAfter(delay) => {
                    if attempt >= max_attempts {
                        warn!(
                            attempts = attempt,
                            error = %error,
                            "All retry attempts exhausted"
                        );
                        return Err(RetryError::AttemptsExhausted { attempts: attempt });
                    }

                    warn!(
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %error,
                        "Operation failed, retrying after delay"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
