//! CRM payload shape accepted by the lead creation endpoint

use serde::{Deserialize, Serialize};

/// Body of one lead creation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrmPayload {
    /// UTC, second precision
    pub registered_date: String,
    pub info: LeadInfo,
    pub assigned_agents: AssignedAgents,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// At most one pinned note; empty when the record carries no enrichment
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<Note>,
}

impl CrmPayload {
    /// The enrichment note, if the record produced one
    #[must_use]
    pub fn note(&self) -> Option<&Note> {
        self.notes.first()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadInfo {
    pub status: String,
    pub source: String,
    pub contact: ContactBlock,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactBlock {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_validated_email: Option<bool>,
    pub phone_numbers: PhoneNumbers,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mailing_address: Option<MailingAddress>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneNumbers {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_phone: Option<String>,
}

impl PhoneNumbers {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cell_phone.is_none() && self.home_phone.is_none() && self.work_phone.is_none()
    }
}

/// Complete postal address. Partial addresses are never sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailingAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_or_zip: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignedAgents {
    pub primary_agent: AgentRef,
    pub listing_agent: AgentRef,
    pub partner: AgentRef,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRef {
    pub id: Option<String>,
}

impl AgentRef {
    pub fn new(id: Option<String>) -> Self {
        Self { id }
    }
}

/// Freeform note carrying the enrichment attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub content: String,
    pub category: String,
    pub created_by: String,
    pub created_date: String,
    pub is_pinned: bool,
}
