//! Lead records as exported by the upstream enrichment pipeline

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::constants::{is_recognized_field, FIELD_MD5, IDENTITY_FIELDS};

/// Identifier that follows a lead from the export to its delivery outcome
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeadId(String);

impl LeadId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LeadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A recognized field held a value that cannot be read as text
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("field `{field}` holds {kind} where a scalar value is expected")]
pub struct FieldError {
    pub field: String,
    pub kind: &'static str,
}

/// One row of the lead export.
///
/// Only the recognized vocabulary (see [`crate::constants`]) is kept; unknown
/// columns and `null` values are dropped when the record is built, so an
/// absent field and a null field read the same way.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, Value>", into = "BTreeMap<String, Value>")]
pub struct LeadRecord {
    fields: BTreeMap<String, Value>,
}

impl LeadRecord {
    /// Build a record, ignoring unknown field names and null values.
    pub fn from_fields<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let fields = fields
            .into_iter()
            .map(|(name, value)| (name.into(), value))
            .filter(|(name, value)| !value.is_null() && is_recognized_field(name))
            .collect();
        Self { fields }
    }

    /// Raw value of a field, `None` when absent
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Field rendered as text.
    ///
    /// Strings that are empty or whitespace-only read as absent. Numbers and
    /// booleans are stringified.
    ///
    /// # Errors
    /// Returns [`FieldError`] when the field holds an array or an object.
    pub fn text(&self, field: &str) -> Result<Option<String>, FieldError> {
        match self.fields.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(Value::Bool(b)) => Ok(Some(b.to_string())),
            Some(Value::Array(_)) => {
                Err(FieldError { field: field.to_string(), kind: "an array" })
            }
            Some(Value::Object(_)) => {
                Err(FieldError { field: field.to_string(), kind: "an object" })
            }
        }
    }

    /// Identifier used in outcomes and the failure report.
    ///
    /// Uses the export's `md5` column when present. Otherwise derives a
    /// BLAKE3 digest of the PII fields, so a record without the column is
    /// still traceable.
    #[must_use]
    pub fn identifier(&self) -> LeadId {
        if let Ok(Some(md5)) = self.text(FIELD_MD5) {
            return LeadId(md5.trim().to_string());
        }

        let mut hasher = blake3::Hasher::new();
        for field in IDENTITY_FIELDS {
            if let Some(value) = self.fields.get(*field) {
                match value {
                    Value::String(s) => hasher.update(s.trim().to_lowercase().as_bytes()),
                    other => hasher.update(other.to_string().as_bytes()),
                };
            }
            hasher.update(&[0x1f]);
        }
        LeadId(hasher.finalize().to_hex().to_string())
    }

    /// Number of recognized, non-null fields
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<BTreeMap<String, Value>> for LeadRecord {
    fn from(fields: BTreeMap<String, Value>) -> Self {
        Self::from_fields(fields)
    }
}

impl From<LeadRecord> for BTreeMap<String, Value> {
    fn from(record: LeadRecord) -> Self {
        record.fields
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for LeadRecord {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self::from_fields(iter)
    }
}
