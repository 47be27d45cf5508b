use leadsync_common::resilience::HttpFailure;
use reqwest::header::HeaderMap;
use thiserror::Error;

/// Failure of a single CRM call
#[derive(Debug, Error)]
pub enum CrmHttpError {
    /// The CRM answered with a non-2xx status
    #[error("CRM returned {status}: {body}")]
    Status { status: u16, headers: HeaderMap, body: String },

    /// The request never produced a response
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// A 2xx response whose body is not JSON
    #[error("invalid JSON response: {0}")]
    Decode(String),
}

impl HttpFailure for CrmHttpError {
    fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(err) => err.status().map(|s| s.as_u16()),
            Self::Decode(_) => None,
        }
    }

    fn header(&self, name: &str) -> Option<&str> {
        match self {
            Self::Status { headers, .. } => headers.get(name).and_then(|v| v.to_str().ok()),
            _ => None,
        }
    }
}
