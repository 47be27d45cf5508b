//! # LeadSync Domain
//!
//! Business domain types and models for LeadSync.
//!
//! This crate contains:
//! - Lead records as exported by the upstream enrichment pipeline
//! - The CRM payload shape the delivery endpoint accepts
//! - Delivery outcomes and the failure report
//! - Configuration structures
//! - Domain error types and Result definitions
//!
//! ## Architecture
//! - No dependencies on other LeadSync crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
