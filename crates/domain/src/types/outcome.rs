//! Per-record delivery results and the failure report

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::lead::LeadId;

/// Result of delivering one record, in batch order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeliveryOutcome {
    /// The CRM accepted the record; `response` is its raw JSON reply
    Delivered { lead_id: LeadId, response: Value },
    /// The record failed at transform or send time
    Failed { lead_id: LeadId, error: String },
}

impl DeliveryOutcome {
    #[must_use]
    pub fn lead_id(&self) -> &LeadId {
        match self {
            Self::Delivered { lead_id, .. } | Self::Failed { lead_id, .. } => lead_id,
        }
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Error message of a failed outcome
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed { error, .. } => Some(error),
            Self::Delivered { .. } => None,
        }
    }
}

/// Entry of the engine's failure report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedLead {
    pub lead_id: LeadId,
    pub error: String,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn failed_outcome_carries_status_tag() {
        let outcome =
            DeliveryOutcome::Failed { lead_id: LeadId::new("abc"), error: "boom".to_string() };

        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({"status": "failed", "lead_id": "abc", "error": "boom"})
        );
        assert!(outcome.is_failed());
        assert_eq!(outcome.error(), Some("boom"));
    }

    #[test]
    fn delivered_outcome_keeps_raw_response() {
        let outcome = DeliveryOutcome::Delivered {
            lead_id: LeadId::new("abc"),
            response: json!({"id": 7}),
        };

        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["status"], "delivered");
        assert_eq!(value["response"]["id"], 7);
        assert_eq!(outcome.lead_id().as_str(), "abc");
    }
}
