//! Resilience patterns for outbound HTTP calls
//!
//! This module provides:
//! - **Retry executor**: a generic loop that asks a [`RetryPolicy`] whether
//!   and how long to back off after each failure
//! - **Rate-limit policy**: retries `429 Too Many Requests` responses,
//!   honoring the server's `Retry-After` header plus a small random jitter
//!
//! [`RateLimitedCaller`] bundles both and is the wrapper used at every CRM
//! call site.
//!
//! # Examples
//!
//! ```rust,no_run
//! use leadsync_common::resilience::{HttpFailure, RateLimitedCaller};
//!
//! #[derive(Debug)]
//! struct Failure(u16);
//!
//! impl std::fmt::Display for Failure {
//!     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
//!         write!(f, "HTTP {}", self.0)
//!     }
//! }
//!
//! impl HttpFailure for Failure {
//!     fn status(&self) -> Option<u16> {
//!         Some(self.0)
//!     }
//!
//!     fn header(&self, _name: &str) -> Option<&str> {
//!         None
//!     }
//! }
//!
//! # async fn example() {
//! let caller = RateLimitedCaller::new();
//! let result = caller.call(|| async { Ok::<_, Failure>("sent") }).await;
//! assert!(result.is_ok());
//! # }
//! ```

pub mod rate_limit;
pub mod retry;

pub use rate_limit::{HttpFailure, RateLimitPolicy, RateLimitedCaller};
pub use retry::{
    RetryConfig, RetryConfigBuilder, RetryDecision, RetryError, RetryExecutor, RetryPolicy,
    RetryResult, DEFAULT_MAX_ATTEMPTS,
};
