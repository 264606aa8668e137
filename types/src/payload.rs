//! The governed zone document and its schema validation.
//!
//! A proposal payload is a versioned JSON document pinned to exactly one
//! governed domain. The `kind` tag and the `domain` field are checked at the
//! proposal boundary so a payload intended for another resource (or another
//! asset type entirely) can never enter the pipeline.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A DNS zone configuration document.
///
/// `records` is an arbitrary JSON object mapping record paths to values
/// (e.g. `{"www": {"A": "203.0.113.7"}}`). The engine treats it as opaque;
/// the drift verifier diffs it key-by-key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZoneDocument {
    /// Canonical asset tag. Always [`ZoneDocument::KIND`].
    pub kind: String,
    /// The governed domain this document applies to.
    pub domain: String,
    /// Document schema version.
    #[serde(default = "default_version")]
    pub version: u64,
    /// The zone records, as a non-empty JSON object.
    pub records: Value,
}

fn default_version() -> u64 {
    1
}

#[derive(Debug, Error, PartialEq)]
pub enum PayloadError {
    #[error("payload is not a valid zone document: {0}")]
    Malformed(String),

    #[error("unsupported payload kind {found:?}, expected {expected:?}")]
    WrongKind { expected: &'static str, found: String },

    #[error("payload domain {found:?} does not match governed domain {expected:?}")]
    DomainMismatch { expected: String, found: String },

    #[error("payload records must be a JSON object")]
    RecordsNotAnObject,

    #[error("payload records must not be empty")]
    EmptyRecords,
}

impl ZoneDocument {
    /// The canonical asset tag every governed payload must carry.
    pub const KIND: &'static str = "dns-zone";

    /// Parse a raw JSON value into a zone document. Field-level validation
    /// happens separately in [`ZoneDocument::validate`].
    pub fn from_value(value: Value) -> Result<Self, PayloadError> {
        serde_json::from_value(value).map_err(|e| PayloadError::Malformed(e.to_string()))
    }

    /// Validate this document against the governed domain.
    ///
    /// Domain comparison is ASCII case-insensitive, matching DNS semantics.
    pub fn validate(&self, governed_domain: &str) -> Result<(), PayloadError> {
        if self.kind != Self::KIND {
            return Err(PayloadError::WrongKind {
                expected: Self::KIND,
                found: self.kind.clone(),
            });
        }
        if !self.domain.eq_ignore_ascii_case(governed_domain) {
            return Err(PayloadError::DomainMismatch {
                expected: governed_domain.to_string(),
                found: self.domain.clone(),
            });
        }
        match &self.records {
            Value::Object(map) if map.is_empty() => Err(PayloadError::EmptyRecords),
            Value::Object(_) => Ok(()),
            _ => Err(PayloadError::RecordsNotAnObject),
        }
    }

    /// The document as a plain JSON value, for diffing and publication.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).expect("zone document is always serializable")
    }

    /// Canonical JSON encoding: serde_json's map keys are ordered, so the
    /// same document always produces the same byte string.
    pub fn canonical_json(&self) -> String {
        self.to_value().to_string()
    }
}
