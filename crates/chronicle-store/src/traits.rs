//! The chain repository interface.
//!
//! Hashing and verification logic never touch a concrete storage engine;
//! they speak to this trait. The in-memory implementation in this crate is
//! the reference; a durable backend (embedded KV, relational) implements
//! the same contract as long as it preserves append order and makes each
//! append atomic with its index updates.

use chronicle_contracts::{
    entry::{AuditEntry, EntryId},
    error::ChronicleResult,
    report::{ChainStatistics, ChainTail, RangeQuery},
};

/// Durable, append-ordered persistence for one chain plus its derived
/// secondary indices (by actor, by resource, by hash, by entry id).
///
/// # Contract
///
/// - Entries are never mutated in place. The only removal is
///   [`truncate_after`](ChainStore::truncate_after), which drops a
///   contiguous tail.
/// - [`append`](ChainStore::append) persists the entry and all its index
///   records atomically: a reader never observes one without the other.
/// - Reads operate on a consistent snapshot and may run fully
///   concurrently with each other.
/// - Indices are derived and rebuildable; they contribute nothing to any
///   `entry_hash`.
///
/// Serialization of writers is the append coordinator's job, not the
/// store's: the coordinator holds its tail lock across
/// [`tail`](ChainStore::tail) and [`append`](ChainStore::append).
pub trait ChainStore: Send + Sync {
    /// The newest entry's sequence, hash, and timestamp, or `None` when
    /// the chain is empty.
    fn tail(&self) -> ChronicleResult<Option<ChainTail>>;

    /// Persist one fully built entry and its index records atomically.
    ///
    /// The entry's `sequence` must be exactly one past the current tail
    /// (or 0 on an empty chain); anything else is a storage error.
    fn append(&self, entry: AuditEntry) -> ChronicleResult<()>;

    /// Look up one entry by its caller-opaque id.
    fn get_entry(&self, entry_id: &EntryId) -> ChronicleResult<Option<AuditEntry>>;

    /// Resolve an `entry_hash` to its sequence number.
    fn sequence_of_hash(&self, entry_hash: &str) -> ChronicleResult<Option<u64>>;

    /// Read entries matching every set bound of `query`, ascending by
    /// sequence number.
    fn read_range(&self, query: &RangeQuery) -> ChronicleResult<Vec<AuditEntry>>;

    /// All entries recorded for `actor`, in append order.
    fn actor_trail(&self, actor: &str) -> ChronicleResult<Vec<AuditEntry>>;

    /// The full history of one resource instance, in append order.
    fn resource_trail(
        &self,
        resource_type: &str,
        resource_id: &str,
    ) -> ChronicleResult<Vec<AuditEntry>>;

    /// Aggregate counters over the whole chain.
    fn statistics(&self) -> ChronicleResult<ChainStatistics>;

    /// Atomically delete every entry with a sequence number strictly
    /// greater than `sequence`, along with its index records. Returns the
    /// number of entries removed.
    fn truncate_after(&self, sequence: u64) -> ChronicleResult<u64>;
}
