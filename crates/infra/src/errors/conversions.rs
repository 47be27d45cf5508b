//! Conversions from external infrastructure errors into domain errors.

use leadsync_domain::LeadSyncError;
use reqwest::Error as HttpError;

use crate::crm::CrmHttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub LeadSyncError);

impl From<InfraError> for LeadSyncError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<LeadSyncError> for InfraError {
    fn from(value: LeadSyncError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoLeadSyncError {
    fn into_leadsync(self) -> LeadSyncError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → LeadSyncError */
/* -------------------------------------------------------------------------- */

impl IntoLeadSyncError for HttpError {
    fn into_leadsync(self) -> LeadSyncError {
        if self.is_builder() {
            return LeadSyncError::Config(format!("invalid http client configuration: {self}"));
        }

        if self.is_timeout() {
            return LeadSyncError::Network(format!("http request timed out: {self}"));
        }

        if self.is_decode() || self.is_body() {
            return LeadSyncError::Network(format!("failed to read http response: {self}"));
        }

        match self.status().map(|s| s.as_u16()) {
            Some(401 | 403) => LeadSyncError::Auth(format!("http request unauthorized: {self}")),
            _ => LeadSyncError::Network(format!("http request failed: {self}")),
        }
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_leadsync())
    }
}

/* -------------------------------------------------------------------------- */
/* CrmHttpError → LeadSyncError */
/* -------------------------------------------------------------------------- */

impl IntoLeadSyncError for CrmHttpError {
    fn into_leadsync(self) -> LeadSyncError {
        match self {
            CrmHttpError::Status { status: 401 | 403, body, .. } => {
                LeadSyncError::Auth(format!("CRM rejected credentials: {body}"))
            }
            CrmHttpError::Status { status, body, .. } if (400..500).contains(&status) => {
                LeadSyncError::InvalidInput(format!("CRM rejected request ({status}): {body}"))
            }
            CrmHttpError::Status { status, body, .. } => {
                LeadSyncError::Network(format!("CRM returned {status}: {body}"))
            }
            CrmHttpError::Transport(err) => err.into_leadsync(),
            CrmHttpError::Decode(message) => {
                LeadSyncError::Internal(format!("unexpected CRM response: {message}"))
            }
        }
    }
}

impl From<CrmHttpError> for InfraError {
    fn from(value: CrmHttpError) -> Self {
        InfraError(value.into_leadsync())
    }
}
