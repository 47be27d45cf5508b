//! Record Transformer: one lead record in, one CRM payload out

mod phone;
mod record;

pub use phone::clean_phone;
pub use record::RecordTransformer;

use leadsync_domain::FieldError;
use thiserror::Error;

/// A record could not be turned into a payload
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransformError {
    #[error("malformed record: {0}")]
    MalformedField(#[from] FieldError),
}
