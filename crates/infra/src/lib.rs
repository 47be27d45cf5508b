//! # LeadSync Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - The reqwest-backed CRM gateway
//! - Configuration loading (environment, `.env`, TOML/JSON files)
//! - Tracing subscriber setup
//!
//! ## Architecture
//! - Implements traits defined in `leadsync-core`
//! - Contains all "impure" code (HTTP, filesystem, process environment)

pub mod config;
pub mod crm;
pub mod errors;
pub mod http;
pub mod observability;

// Re-export commonly used items
pub use crm::{CrmClient, CrmHttpError};
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
