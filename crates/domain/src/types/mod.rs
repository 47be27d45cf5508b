//! Domain types and models

pub mod lead;
pub mod outcome;
pub mod payload;

pub use lead::{FieldError, LeadId, LeadRecord};
pub use outcome::{DeliveryOutcome, FailedLead};
pub use payload::{
    AgentRef, AssignedAgents, ContactBlock, CrmPayload, LeadInfo, MailingAddress, Note,
    PhoneNumbers,
};
