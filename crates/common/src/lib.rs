//! Modular common utilities shared across LeadSync crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `runtime`: async resilience primitives (retry executor, rate-limit
//!   policy)
//! - `platform`: OAuth 2.0 client, session state and token lifecycle
//! - `test-utils`: in-memory doubles for the OAuth token endpoint

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod resilience;

// Platform tier
// -------------------------------------------------------------------
#[cfg(feature = "platform")]
pub mod auth;

// Testing utilities
// ---------------------------------------------------------------
#[cfg(any(feature = "test-utils", all(test, feature = "platform")))]
pub mod testing;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "platform")]
pub use auth::{AuthError, AuthSession, Credentials, OAuthClient, OAuthConfig, TokenManager};
#[cfg(feature = "runtime")]
pub use resilience::{
    HttpFailure, RateLimitPolicy, RateLimitedCaller, RetryConfig, RetryDecision, RetryError,
    RetryExecutor, RetryPolicy, RetryResult,
};
