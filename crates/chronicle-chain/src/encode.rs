//! Canonical content encoding.
//!
//! Hashes are only reproducible if every implementation encodes an entry's
//! content to byte-identical form. The rules:
//!
//! - map keys sorted lexicographically at every nesting level
//!   (`BTreeMap` gives this by construction; the top-level field order is
//!   fixed and sorted in the serialized struct below)
//! - strings as UTF-8 JSON strings
//! - integers as plain decimal; floats in serde_json's shortest
//!   round-trip form, with non-finite values rejected before serialization
//! - timestamps as ISO-8601 UTC with exactly millisecond precision
//! - absent optional fields omitted entirely, never encoded as null
//!
//! `sequence`, `prev_hash`, and `entry_hash` are not part of the content
//! encoding: `sequence` is positional, and the hashes are what the
//! encoding feeds into.

use chrono::{DateTime, Utc};
use serde::Serialize;

use chronicle_contracts::{
    entry::{AuditEntry, EntryId},
    error::{ChronicleError, ChronicleResult},
    value::DataMap,
};

/// The fixed sub-second precision of canonical timestamps.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Render a timestamp in the canonical millisecond-precision form.
///
/// Example: `2026-08-28T09:15:42.031Z`.
pub fn canonical_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// The content fields of an entry, declared in lexicographic key order so
/// the serialized object's keys come out sorted.
#[derive(Serialize)]
struct CanonicalContent<'a> {
    action: &'a str,
    actor: &'a str,
    data: &'a DataMap,
    entry_id: &'a EntryId,
    #[serde(skip_serializing_if = "Option::is_none")]
    resource_id: Option<&'a str>,
    resource_type: &'a str,
    timestamp: String,
}

/// Produce the canonical byte encoding of an entry's content.
///
/// Deterministic: the same logical field values always yield the same
/// bytes, on every platform. Fails with [`ChronicleError::Encoding`] when
/// the payload contains a value the rules cannot represent (a non-finite
/// float smuggled past the constructors).
pub fn canonical_bytes(entry: &AuditEntry) -> ChronicleResult<Vec<u8>> {
    for value in entry.data.values() {
        value.ensure_encodable()?;
    }

    let content = CanonicalContent {
        action: &entry.action,
        actor: &entry.actor,
        data: &entry.data,
        entry_id: &entry.entry_id,
        resource_id: entry.resource_id.as_deref(),
        resource_type: &entry.resource_type,
        timestamp: canonical_timestamp(&entry.timestamp),
    };

    serde_json::to_vec(&content).map_err(|e| ChronicleError::Encoding {
        reason: format!("canonical serialization failed: {e}"),
    })
}
