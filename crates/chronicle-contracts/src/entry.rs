//! Audit entry and append-request types.
//!
//! `AuditEntry` is a single link in the hash chain — caller content plus
//! the chain fields (`sequence`, `prev_hash`, `entry_hash`) assigned at
//! write time. `EventDraft` is what a caller hands to the append
//! coordinator; everything chain-related is filled in by the ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value::DataMap;

/// Unique, caller-opaque identifier for a single audit entry.
///
/// Distinct from any hash; used for direct lookup. Serialized as a
/// hyphenated UUID string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(pub uuid::Uuid);

impl EntryId {
    /// Create a new, unique entry ID.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A single entry in the hash chain.
///
/// Each entry commits to its predecessor via `prev_hash`, forming an
/// append-only chain. Modifying any field — including nested payload
/// values — invalidates `entry_hash` and every subsequent `prev_hash`,
/// which verification detects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Position in the chain: 0, 1, 2, … with no gaps or duplicates.
    /// Assigned by the append coordinator, never by the caller.
    pub sequence: u64,

    /// Caller-opaque unique identifier for direct lookup.
    pub entry_id: EntryId,

    /// Wall-clock time (UTC) the entry was appended. Monotonically
    /// non-decreasing across sequence numbers.
    pub timestamp: DateTime<Utc>,

    /// Non-empty short string naming the event kind (e.g. "CREATE").
    pub action: String,

    /// Non-empty short string identifying who performed the action.
    pub actor: String,

    /// Classification of the affected resource. Empty when the event is
    /// not resource-scoped.
    pub resource_type: String,

    /// Identifier of a specific resource instance, when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,

    /// Arbitrary key/value payload describing the event.
    pub data: DataMap,

    /// SHA-256 hash (hex) of the previous entry, or [`AuditEntry::GENESIS_HASH`]
    /// for sequence 0.
    pub prev_hash: String,

    /// SHA-256 hash (hex) of `prev_hash` followed by this entry's
    /// canonical content encoding.
    pub entry_hash: String,
}

impl AuditEntry {
    /// The sentinel `prev_hash` for the first entry in every chain.
    ///
    /// 64 hex zeros — a value that can never be the SHA-256 of real data,
    /// so independent verifiers agree on entry 0's expected linkage.
    pub const GENESIS_HASH: &'static str =
        "0000000000000000000000000000000000000000000000000000000000000000";
}

/// The caller-supplied portion of an append request.
///
/// The ledger assigns `sequence`, `entry_id`, `timestamp`, and both hashes;
/// a draft only carries event content.
///
/// ```rust
/// use chronicle_contracts::entry::EventDraft;
///
/// let draft = EventDraft::new("CREATE", "alice")
///     .resource("document", "doc_1")
///     .with("size_bytes", 1024i64);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDraft {
    /// Event kind. Must be non-empty after trimming whitespace.
    pub action: String,
    /// Who performed the action. Must be non-empty after trimming.
    pub actor: String,
    /// Resource classification; empty when not resource-scoped.
    pub resource_type: String,
    /// Specific resource instance, if any.
    pub resource_id: Option<String>,
    /// Event payload.
    pub data: DataMap,
}

impl EventDraft {
    /// Start a draft with the two required fields.
    pub fn new(action: impl Into<String>, actor: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            actor: actor.into(),
            resource_type: String::new(),
            resource_id: None,
            data: DataMap::new(),
        }
    }

    /// Scope the event to a specific resource instance.
    pub fn resource(mut self, resource_type: impl Into<String>, resource_id: impl Into<String>) -> Self {
        self.resource_type = resource_type.into();
        self.resource_id = Some(resource_id.into());
        self
    }

    /// Classify the event without naming a specific instance.
    pub fn resource_type(mut self, resource_type: impl Into<String>) -> Self {
        self.resource_type = resource_type.into();
        self
    }

    /// Attach one payload key/value pair.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<crate::value::DataValue>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Replace the entire payload map.
    pub fn data(mut self, data: DataMap) -> Self {
        self.data = data;
        self
    }
}
