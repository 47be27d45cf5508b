//! # LeadSync App
//!
//! Command-line application layer.
//!
//! This crate contains:
//! - The `leadsync` argument model
//! - Application context (configuration and wired services)
//! - The `authorize` and `deliver` commands
//!
//! ## Architecture
//! - Depends on `common`, `domain`, `core`, and `infra`
//! - Wires the reqwest-backed adapters into the delivery engine
//! - Commands write to caller-supplied streams so they can be tested

pub mod cli;
pub mod commands;
pub mod context;

// Re-export for convenience
pub use cli::{Cli, Command, DeliverArgs};
pub use context::AppContext;
