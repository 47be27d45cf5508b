//! Shared test helpers for `leadsync-core` integration tests.
//!
//! These helpers provide lead fixtures and an in-memory CRM so that delivery
//! tests can focus on behaviour instead of boilerplate.

pub mod gateway;
pub mod leads;
