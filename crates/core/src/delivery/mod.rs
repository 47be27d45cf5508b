//! Delivery Engine: credential verification and concurrent per-record
//! delivery

pub mod engine;
pub mod ports;

pub use engine::DeliveryEngine;
pub use ports::CrmGateway;
