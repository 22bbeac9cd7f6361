//! In-memory implementation of [`ChainStore`].
//!
//! `MemoryChainStore` is the reference store: entries live in a `Vec`
//! (vector index == sequence number, since the chain is gapless from 0)
//! with hash-map indices by entry id, entry hash, actor, and resource.
//! The whole state sits behind one `RwLock`, so readers see consistent
//! snapshots, an entry is never visible without its index records, and
//! reads run fully concurrently with each other.

use std::collections::HashMap;
use std::sync::RwLock;

use chronicle_contracts::{
    entry::{AuditEntry, EntryId},
    error::{ChronicleError, ChronicleResult},
    report::{ChainStatistics, ChainTail, RangeQuery},
};

use crate::traits::ChainStore;

// ── Internal mutable state ────────────────────────────────────────────────────

/// Entries plus every derived index, guarded as one unit.
#[derive(Default)]
struct StoreState {
    /// All entries in append order; index == sequence.
    entries: Vec<AuditEntry>,
    /// entry_id → sequence.
    by_id: HashMap<uuid::Uuid, u64>,
    /// entry_hash → sequence.
    by_hash: HashMap<String, u64>,
    /// actor → sequences in append order.
    by_actor: HashMap<String, Vec<u64>>,
    /// (resource_type, resource_id) → sequences in append order.
    by_resource: HashMap<(String, String), Vec<u64>>,
}

impl StoreState {
    fn collect(&self, sequences: &[u64]) -> Vec<AuditEntry> {
        sequences
            .iter()
            .map(|&seq| self.entries[seq as usize].clone())
            .collect()
    }
}

// ── Public store ──────────────────────────────────────────────────────────────

/// An in-memory, append-only chain store.
///
/// # Thread safety
///
/// Every method acquires the internal `RwLock`; the store may be shared
/// across threads behind an `Arc` without further synchronization. Note
/// that the lock only makes individual operations atomic — the
/// read-tail-then-append critical section belongs to the ledger.
#[derive(Default)]
pub struct MemoryChainStore {
    state: RwLock<StoreState>,
}

impl MemoryChainStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read_state(&self) -> ChronicleResult<std::sync::RwLockReadGuard<'_, StoreState>> {
        self.state.read().map_err(|e| ChronicleError::Storage {
            reason: format!("store lock poisoned: {e}"),
        })
    }

    fn write_state(&self) -> ChronicleResult<std::sync::RwLockWriteGuard<'_, StoreState>> {
        self.state.write().map_err(|e| ChronicleError::Storage {
            reason: format!("store lock poisoned: {e}"),
        })
    }
}

impl ChainStore for MemoryChainStore {
    fn tail(&self) -> ChronicleResult<Option<ChainTail>> {
        let state = self.read_state()?;
        Ok(state.entries.last().map(|entry| ChainTail {
            sequence: entry.sequence,
            entry_hash: entry.entry_hash.clone(),
            timestamp: entry.timestamp,
        }))
    }

    /// Append the entry and update every index under one write guard, so
    /// the whole mutation is atomic from any reader's point of view.
    fn append(&self, entry: AuditEntry) -> ChronicleResult<()> {
        let mut state = self.write_state()?;

        let expected = state.entries.len() as u64;
        if entry.sequence != expected {
            return Err(ChronicleError::Storage {
                reason: format!(
                    "append out of order: entry has sequence {}, store expects {}",
                    entry.sequence, expected
                ),
            });
        }

        let sequence = entry.sequence;
        state.by_id.insert(entry.entry_id.0, sequence);
        state.by_hash.insert(entry.entry_hash.clone(), sequence);
        state
            .by_actor
            .entry(entry.actor.clone())
            .or_default()
            .push(sequence);
        if let Some(resource_id) = &entry.resource_id {
            state
                .by_resource
                .entry((entry.resource_type.clone(), resource_id.clone()))
                .or_default()
                .push(sequence);
        }
        state.entries.push(entry);

        Ok(())
    }

    fn get_entry(&self, entry_id: &EntryId) -> ChronicleResult<Option<AuditEntry>> {
        let state = self.read_state()?;
        Ok(state
            .by_id
            .get(&entry_id.0)
            .map(|&seq| state.entries[seq as usize].clone()))
    }

    fn sequence_of_hash(&self, entry_hash: &str) -> ChronicleResult<Option<u64>> {
        let state = self.read_state()?;
        Ok(state.by_hash.get(entry_hash).copied())
    }

    fn read_range(&self, query: &RangeQuery) -> ChronicleResult<Vec<AuditEntry>> {
        let state = self.read_state()?;

        let len = state.entries.len() as u64;
        let start = query.start_sequence.unwrap_or(0).min(len) as usize;
        let end = query
            .end_sequence
            .map(|e| e.saturating_add(1).min(len))
            .unwrap_or(len) as usize;
        if start >= end {
            return Ok(Vec::new());
        }

        Ok(state.entries[start..end]
            .iter()
            .filter(|entry| {
                query.start_time.map_or(true, |t| entry.timestamp >= t)
                    && query.end_time.map_or(true, |t| entry.timestamp <= t)
            })
            .cloned()
            .collect())
    }

    fn actor_trail(&self, actor: &str) -> ChronicleResult<Vec<AuditEntry>> {
        let state = self.read_state()?;
        Ok(state
            .by_actor
            .get(actor)
            .map(|seqs| state.collect(seqs))
            .unwrap_or_default())
    }

    fn resource_trail(
        &self,
        resource_type: &str,
        resource_id: &str,
    ) -> ChronicleResult<Vec<AuditEntry>> {
        let state = self.read_state()?;
        let key = (resource_type.to_string(), resource_id.to_string());
        Ok(state
            .by_resource
            .get(&key)
            .map(|seqs| state.collect(seqs))
            .unwrap_or_default())
    }

    /// Counters are computed from the stored entries on demand — they are
    /// derived data, rebuildable at any time without touching a hash.
    fn statistics(&self) -> ChronicleResult<ChainStatistics> {
        let state = self.read_state()?;

        let mut action_counts = std::collections::BTreeMap::new();
        for entry in &state.entries {
            *action_counts.entry(entry.action.clone()).or_insert(0u64) += 1;
        }

        Ok(ChainStatistics {
            total_entries: state.entries.len() as u64,
            distinct_actor_count: state.by_actor.len() as u64,
            action_counts,
        })
    }

    fn truncate_after(&self, sequence: u64) -> ChronicleResult<u64> {
        let mut state = self.write_state()?;

        let keep = sequence.saturating_add(1) as usize;
        if keep >= state.entries.len() {
            return Ok(0);
        }

        let removed: Vec<AuditEntry> = state.entries.split_off(keep);
        for entry in &removed {
            state.by_id.remove(&entry.entry_id.0);
            state.by_hash.remove(&entry.entry_hash);
            prune_trail(&mut state.by_actor, &entry.actor, sequence);
            if let Some(resource_id) = &entry.resource_id {
                let key = (entry.resource_type.clone(), resource_id.clone());
                prune_trail(&mut state.by_resource, &key, sequence);
            }
        }

        Ok(removed.len() as u64)
    }
}

/// Drop trail sequences greater than `max` under one index key, removing
/// the key entirely when its trail empties. Trails are append-ordered, so
/// the doomed sequences are always a suffix.
fn prune_trail<K: Eq + std::hash::Hash>(index: &mut HashMap<K, Vec<u64>>, key: &K, max: u64) {
    if let Some(seqs) = index.get_mut(key) {
        while seqs.last().is_some_and(|&s| s > max) {
            seqs.pop();
        }
        if seqs.is_empty() {
            index.remove(key);
        }
    }
}
