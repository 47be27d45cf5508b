//! `leadsync` subcommands

pub mod authorize;
pub mod deliver;

pub use authorize::{authorize, parse_callback};
pub use deliver::{deliver, read_leads, DeliveryReport};
