//! Error types for the chronicle audit log.
//!
//! All fallible operations in the chronicle crates return
//! `ChronicleResult<T>`. Tamper findings are deliberately *not* errors —
//! verification returns an `IntegrityReport` so callers can decide policy
//! without the call itself failing.

use thiserror::Error;

/// The unified error type for the chronicle audit log.
#[derive(Debug, Error)]
pub enum ChronicleError {
    /// A required field on an append request was empty or missing.
    ///
    /// Raised before anything is written — a rejected append has no
    /// partial effect on the chain or its indices.
    #[error("validation failed for field '{field}': {reason}")]
    Validation { field: String, reason: String },

    /// The event payload is not representable under the canonical
    /// encoding rules (e.g. a non-finite float, or an explicit null).
    #[error("payload not canonically encodable: {reason}")]
    Encoding { reason: String },

    /// A lookup by entry id or hash found nothing.
    #[error("no {kind} found for '{key}'")]
    NotFound { kind: String, key: String },

    /// An export was requested in a format the exporter does not support.
    #[error("unsupported export format '{format}' (supported: json, csv)")]
    UnsupportedFormat { format: String },

    /// A query was given a malformed range (e.g. end before start).
    #[error("invalid range: {reason}")]
    InvalidRange { reason: String },

    /// The backing store failed an I/O operation.
    ///
    /// Always surfaced to the caller; an in-flight append or rollback
    /// aborts with no partial mutation.
    #[error("storage error: {reason}")]
    Storage { reason: String },
}

impl ChronicleError {
    /// Shorthand for a `NotFound` error.
    pub fn not_found(kind: impl Into<String>, key: impl Into<String>) -> Self {
        Self::NotFound {
            kind: kind.into(),
            key: key.into(),
        }
    }
}

/// Convenience alias used throughout the chronicle crates.
pub type ChronicleResult<T> = Result<T, ChronicleError>;
