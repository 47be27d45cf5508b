//! # LeadSync Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - The Record Transformer (lead record to CRM payload)
//! - The Delivery Engine and the gateway port it calls through
//!
//! ## Architecture Principles
//! - Only depends on `leadsync-common` and `leadsync-domain`
//! - No HTTP or filesystem code
//! - The CRM is reached through the [`CrmGateway`] trait

pub mod delivery;
pub mod transform;

pub use delivery::{CrmGateway, DeliveryEngine};
pub use transform::{clean_phone, RecordTransformer, TransformError};
