//! CRM gateway over HTTP
//!
//! Implements [`leadsync_core::CrmGateway`] with bearer-token requests
//! against the configured identity and lead endpoints.

pub mod client;
pub mod error;

pub use client::CrmClient;
pub use error::CrmHttpError;
