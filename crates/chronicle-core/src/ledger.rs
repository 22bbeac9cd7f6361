//! The chain handle: append coordination, verification, queries, export,
//! and rollback over a pluggable [`ChainStore`].
//!
//! An [`AuditLedger`] is an explicitly constructed object, not ambient
//! global state — one ledger per chain, injected into callers. Multiple
//! independent chains (per tenant, per project) coexist by constructing
//! multiple ledgers over separate stores.

use std::str::FromStr;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};
use tracing::{info, warn};

use chronicle_chain::{hash_entry, verify_entries};
use chronicle_contracts::{
    entry::{AuditEntry, EntryId, EventDraft},
    error::{ChronicleError, ChronicleResult},
    report::{ChainStatistics, IntegrityReport, RangeQuery},
};
use chronicle_store::{ChainStore, MemoryChainStore};

use crate::export::{export_chain, ExportFormat};

/// A handle to one tamper-evident chain.
///
/// # Concurrency
///
/// Append and rollback serialize on an internal tail mutex: both depend
/// on an atomic read-then-extend (or read-then-truncate) of the tail, and
/// two writers racing past each other would fork the chain with identical
/// `prev_hash` values. Reads (`get_entry`, trails, `statistics`,
/// `verify`, `export`) never take the tail mutex; they run concurrently
/// against the store's own snapshot guarantees.
pub struct AuditLedger {
    store: Arc<dyn ChainStore>,
    /// Guards the read-tail → write critical section shared by append
    /// and rollback.
    tail_lock: Mutex<()>,
}

impl AuditLedger {
    /// Create a ledger over an existing store.
    pub fn new(store: Arc<dyn ChainStore>) -> Self {
        Self {
            store,
            tail_lock: Mutex::new(()),
        }
    }

    /// Create a ledger over a fresh in-memory store.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryChainStore::new()))
    }

    fn lock_tail(&self) -> ChronicleResult<std::sync::MutexGuard<'_, ()>> {
        self.tail_lock.lock().map_err(|e| ChronicleError::Storage {
            reason: format!("tail lock poisoned: {e}"),
        })
    }

    // ── Append ────────────────────────────────────────────────────────────────

    /// Append one event to the chain and return its entry id.
    ///
    /// Validation happens before anything else: `action` and `actor` must
    /// be non-empty after trimming, or the append fails with
    /// [`ChronicleError::Validation`] and writes nothing. The stored
    /// values are the trimmed ones.
    ///
    /// Under the tail mutex: read the current tail, build the entry
    /// (`sequence = tail + 1`, `prev_hash` = tail hash or genesis, fresh
    /// id, timestamp clamped so it never runs backwards), hash it, and
    /// persist atomically. A failed persist leaves no partial effect, and
    /// a retried append re-reads the tail from scratch.
    pub fn append(&self, draft: EventDraft) -> ChronicleResult<EntryId> {
        let action = required_field("action", &draft.action)?;
        let actor = required_field("actor", &draft.actor)?;

        let _guard = self.lock_tail()?;

        let tail = self.store.tail()?;
        let (sequence, prev_hash, floor) = match &tail {
            Some(tail) => (tail.sequence + 1, tail.entry_hash.clone(), Some(tail.timestamp)),
            None => (0, AuditEntry::GENESIS_HASH.to_string(), None),
        };

        let mut entry = AuditEntry {
            sequence,
            entry_id: EntryId::new(),
            timestamp: next_timestamp(floor),
            action,
            actor,
            resource_type: draft.resource_type,
            resource_id: draft.resource_id,
            data: draft.data,
            prev_hash,
            entry_hash: String::new(),
        };
        entry.entry_hash = hash_entry(&entry)?;

        let entry_id = entry.entry_id.clone();
        let (sequence, action, actor) = (entry.sequence, entry.action.clone(), entry.actor.clone());
        self.store.append(entry)?;

        info!(
            sequence,
            entry_id = %entry_id,
            action = %action,
            actor = %actor,
            "audit entry appended"
        );
        Ok(entry_id)
    }

    // ── Reads ─────────────────────────────────────────────────────────────────

    /// Fetch one entry by its id.
    pub fn get_entry(&self, entry_id: &EntryId) -> ChronicleResult<AuditEntry> {
        self.store
            .get_entry(entry_id)?
            .ok_or_else(|| ChronicleError::not_found("entry", entry_id.to_string()))
    }

    /// All entries recorded for `actor`, in append order.
    pub fn actor_trail(&self, actor: &str) -> ChronicleResult<Vec<AuditEntry>> {
        self.store.actor_trail(actor)
    }

    /// The full history of one resource instance, in append order.
    pub fn resource_trail(
        &self,
        resource_type: &str,
        resource_id: &str,
    ) -> ChronicleResult<Vec<AuditEntry>> {
        self.store.resource_trail(resource_type, resource_id)
    }

    /// Aggregate counters over the whole chain.
    pub fn statistics(&self) -> ChronicleResult<ChainStatistics> {
        self.store.statistics()
    }

    /// Read entries matching `query`, ascending by sequence.
    pub fn read_range(&self, query: &RangeQuery) -> ChronicleResult<Vec<AuditEntry>> {
        self.store.read_range(query)
    }

    // ── Verification ──────────────────────────────────────────────────────────

    /// Re-walk the chain (optionally narrowed to a time window) and
    /// report its integrity.
    ///
    /// Tamper never raises: findings land in the report. Only a malformed
    /// request (`end_time` before `start_time`) is an error. A clean
    /// report over a narrowed window certifies that window only; callers
    /// wanting a whole-chain guarantee verify unfiltered.
    pub fn verify(
        &self,
        start_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
    ) -> ChronicleResult<IntegrityReport> {
        if let (Some(start), Some(end)) = (start_time, end_time) {
            if end < start {
                return Err(ChronicleError::InvalidRange {
                    reason: format!("end_time {end} precedes start_time {start}"),
                });
            }
        }

        let entries = self.store.read_range(&RangeQuery::times(start_time, end_time))?;
        let report = verify_entries(&entries);

        if !report.valid {
            warn!(
                total_entries = report.total_entries,
                chain_breaks = report.chain_breaks.len(),
                invalid_entries = report.invalid_entries.len(),
                "chain verification found problems"
            );
        }

        Ok(report)
    }

    // ── Export ────────────────────────────────────────────────────────────────

    /// Export the whole chain as text in the named format
    /// (`"json"` or `"csv"`, case-insensitive).
    ///
    /// An unsupported format fails with [`ChronicleError::UnsupportedFormat`]
    /// before the store is touched.
    pub fn export(&self, format: &str) -> ChronicleResult<String> {
        let format = ExportFormat::from_str(format)?;
        let mut buffer = Vec::new();
        self.export_to(format, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| ChronicleError::Encoding {
            reason: format!("export produced invalid UTF-8: {e}"),
        })
    }

    /// Stream the whole chain into `writer`, reading it in fixed-size
    /// chunks rather than materializing it.
    pub fn export_to<W: std::io::Write>(
        &self,
        format: ExportFormat,
        writer: &mut W,
    ) -> ChronicleResult<()> {
        export_chain(self.store.as_ref(), format, writer)
    }

    // ── Rollback ──────────────────────────────────────────────────────────────

    /// Truncate the chain back to the entry whose hash is `target_hash`,
    /// returning how many entries were removed.
    ///
    /// Destructive and high-privilege: every entry with a greater
    /// sequence number is deleted atomically along with its index
    /// records, and the target becomes the new tail. Shares the tail
    /// mutex with append, so no append can interleave with the
    /// resolve-then-truncate. Fails with [`ChronicleError::NotFound`]
    /// when no entry carries `target_hash`.
    ///
    /// The ledger does not append a rollback record itself; it emits a
    /// structured warn event, and callers wanting an in-chain record of
    /// the rollback append one explicitly afterwards.
    pub fn rollback_to(&self, target_hash: &str) -> ChronicleResult<u64> {
        let _guard = self.lock_tail()?;

        let sequence = self
            .store
            .sequence_of_hash(target_hash)?
            .ok_or_else(|| ChronicleError::not_found("entry", target_hash))?;

        let removed = self.store.truncate_after(sequence)?;
        warn!(
            target_hash = %target_hash,
            new_tail_sequence = sequence,
            removed,
            "chain rolled back"
        );

        Ok(removed)
    }
}

/// Trim a required field, rejecting empty values before anything is
/// written.
fn required_field(field: &str, value: &str) -> ChronicleResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ChronicleError::Validation {
            field: field.to_string(),
            reason: "must be non-empty after trimming whitespace".to_string(),
        });
    }
    Ok(trimmed.to_string())
}

/// The timestamp for a new entry: now, truncated to the canonical
/// millisecond precision, and clamped so it never precedes the tail's.
fn next_timestamp(floor: Option<DateTime<Utc>>) -> DateTime<Utc> {
    let raw = Utc::now();
    let now = Utc
        .timestamp_millis_opt(raw.timestamp_millis())
        .single()
        .unwrap_or(raw);
    match floor {
        Some(floor) if now < floor => floor,
        _ => now,
    }
}
