//! Read-side result types: integrity reports, statistics, range queries.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The outcome of walking a chain (or a window of it) and re-checking
/// every hash and every link.
///
/// Tamper is reported here, never raised as an error, so callers can
/// decide policy (alert, quarantine, legal hold) themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrityReport {
    /// True iff `chain_breaks` and `invalid_entries` are both empty.
    pub valid: bool,

    /// Number of entries examined. An empty window is vacuously valid
    /// with `total_entries == 0`.
    pub total_entries: u64,

    /// Sequence numbers whose `prev_hash` does not match the actual
    /// predecessor's `entry_hash` (linkage tamper, reordering, deletion).
    pub chain_breaks: Vec<u64>,

    /// Sequence numbers whose stored `entry_hash` does not match the hash
    /// recomputed from their stored fields (content tamper).
    pub invalid_entries: Vec<u64>,
}

impl IntegrityReport {
    /// A report over an empty window.
    pub fn empty() -> Self {
        Self {
            valid: true,
            total_entries: 0,
            chain_breaks: Vec::new(),
            invalid_entries: Vec::new(),
        }
    }
}

/// Aggregate counters over the whole chain.
///
/// Derived entirely from stored entries — rebuilding them never changes
/// any hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainStatistics {
    /// Number of entries currently in the chain.
    pub total_entries: u64,
    /// Number of distinct actors seen.
    pub distinct_actor_count: u64,
    /// Per-action entry counts, in deterministic key order.
    pub action_counts: BTreeMap<String, u64>,
}

/// Bounds for a range read over the chain.
///
/// All bounds are inclusive and optional; an unset bound is unbounded on
/// that side. Sequence and time bounds may be combined — an entry must
/// satisfy every bound that is set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RangeQuery {
    pub start_sequence: Option<u64>,
    pub end_sequence: Option<u64>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

impl RangeQuery {
    /// A query matching the entire chain.
    pub fn all() -> Self {
        Self::default()
    }

    /// A query bounded by sequence numbers (inclusive).
    pub fn sequences(start: u64, end: u64) -> Self {
        Self {
            start_sequence: Some(start),
            end_sequence: Some(end),
            ..Self::default()
        }
    }

    /// A query bounded by timestamps (inclusive).
    pub fn times(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self {
            start_time: start,
            end_time: end,
            ..Self::default()
        }
    }
}

/// Snapshot of the chain's tail, read under the append lock.
///
/// `None` tail means the chain is empty and the next entry is sequence 0
/// linked to the genesis constant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainTail {
    /// Sequence number of the newest entry.
    pub sequence: u64,
    /// `entry_hash` of the newest entry — the next entry's `prev_hash`.
    pub entry_hash: String,
    /// Timestamp of the newest entry, the floor for the next timestamp.
    pub timestamp: DateTime<Utc>,
}
