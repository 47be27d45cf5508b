//! Testing utilities and helpers
//!
//! - **[`mocks`]**: in-memory doubles for the OAuth token endpoint
//!
//! Enabled with the `test-utils` feature so downstream crates can drive a
//! [`TokenManager`](crate::auth::TokenManager) without an HTTP server.

pub mod mocks;

pub use mocks::MockTokenEndpoint;
