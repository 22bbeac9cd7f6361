//! # chronicle-store
//!
//! Persistence for the chronicle audit log: the [`ChainStore`] repository
//! trait and the in-memory reference implementation
//! [`MemoryChainStore`].
//!
//! The store knows nothing about hashing or verification — it persists
//! whatever fully built entries the append coordinator hands it, keeps
//! them in append order, and maintains the derived secondary indices
//! (actor, resource, hash, entry id). Swapping in a durable backend means
//! implementing [`ChainStore`] against the same contract.

pub mod memory;
pub mod traits;

pub use memory::MemoryChainStore;
pub use traits::ChainStore;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};

    use chronicle_contracts::{
        entry::{AuditEntry, EntryId},
        report::RangeQuery,
        value::DataMap,
    };

    use super::*;

    // ── Helpers ───────────────────────────────────────────────────────────────

    /// Build an entry with placeholder hashes. The store never inspects
    /// hash validity — only uniqueness of `entry_hash` matters for its
    /// index — so tests use readable stand-ins.
    fn make_entry(sequence: u64, action: &str, actor: &str, resource: Option<(&str, &str)>) -> AuditEntry {
        AuditEntry {
            sequence,
            entry_id: EntryId::new(),
            timestamp: Utc.timestamp_millis_opt(1_700_000_000_000 + sequence as i64 * 1000).unwrap(),
            action: action.to_string(),
            actor: actor.to_string(),
            resource_type: resource.map(|(t, _)| t.to_string()).unwrap_or_default(),
            resource_id: resource.map(|(_, id)| id.to_string()),
            data: DataMap::new(),
            prev_hash: format!("prev-{sequence}"),
            entry_hash: format!("hash-{sequence}"),
        }
    }

    fn populated_store() -> MemoryChainStore {
        let store = MemoryChainStore::new();
        store.append(make_entry(0, "CREATE", "alice", Some(("document", "doc_1")))).unwrap();
        store.append(make_entry(1, "UPDATE", "alice", Some(("document", "doc_1")))).unwrap();
        store.append(make_entry(2, "LOGIN", "bob", None)).unwrap();
        store.append(make_entry(3, "UPDATE", "alice", Some(("document", "doc_2")))).unwrap();
        store.append(make_entry(4, "DELETE", "bob", Some(("document", "doc_1")))).unwrap();
        store
    }

    // ── Append / tail ─────────────────────────────────────────────────────────

    #[test]
    fn test_tail_tracks_newest_entry() {
        let store = MemoryChainStore::new();
        assert!(store.tail().unwrap().is_none());

        store.append(make_entry(0, "CREATE", "alice", None)).unwrap();
        store.append(make_entry(1, "UPDATE", "alice", None)).unwrap();

        let tail = store.tail().unwrap().expect("tail after two appends");
        assert_eq!(tail.sequence, 1);
        assert_eq!(tail.entry_hash, "hash-1");
    }

    /// The store refuses an entry whose sequence does not extend the
    /// chain by exactly one.
    #[test]
    fn test_append_out_of_order_is_rejected() {
        let store = MemoryChainStore::new();
        store.append(make_entry(0, "CREATE", "alice", None)).unwrap();

        let err = store.append(make_entry(5, "UPDATE", "alice", None)).unwrap_err();
        assert!(err.to_string().contains("out of order"));

        // The failed append left nothing behind.
        assert_eq!(store.statistics().unwrap().total_entries, 1);
    }

    // ── Lookups ───────────────────────────────────────────────────────────────

    #[test]
    fn test_get_entry_by_id() {
        let store = MemoryChainStore::new();
        let entry = make_entry(0, "CREATE", "alice", None);
        let id = entry.entry_id.clone();
        store.append(entry).unwrap();

        let found = store.get_entry(&id).unwrap().expect("entry by id");
        assert_eq!(found.sequence, 0);
        assert!(store.get_entry(&EntryId::new()).unwrap().is_none());
    }

    #[test]
    fn test_sequence_of_hash() {
        let store = populated_store();
        assert_eq!(store.sequence_of_hash("hash-3").unwrap(), Some(3));
        assert_eq!(store.sequence_of_hash("nope").unwrap(), None);
    }

    // ── Range reads ───────────────────────────────────────────────────────────

    #[test]
    fn test_read_range_unbounded_returns_all_in_order() {
        let store = populated_store();
        let entries = store.read_range(&RangeQuery::all()).unwrap();
        let sequences: Vec<u64> = entries.iter().map(|e| e.sequence).collect();
        assert_eq!(sequences, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_read_range_sequence_bounds_are_inclusive() {
        let store = populated_store();
        let entries = store.read_range(&RangeQuery::sequences(1, 3)).unwrap();
        let sequences: Vec<u64> = entries.iter().map(|e| e.sequence).collect();
        assert_eq!(sequences, vec![1, 2, 3]);
    }

    #[test]
    fn test_read_range_time_bounds() {
        let store = populated_store();
        // Entries are timestamped one second apart starting at the epoch
        // used by make_entry; select the middle three.
        let start = Utc.timestamp_millis_opt(1_700_000_001_000).unwrap();
        let end = Utc.timestamp_millis_opt(1_700_000_003_000).unwrap();

        let entries = store.read_range(&RangeQuery::times(Some(start), Some(end))).unwrap();
        let sequences: Vec<u64> = entries.iter().map(|e| e.sequence).collect();
        assert_eq!(sequences, vec![1, 2, 3]);
    }

    #[test]
    fn test_read_range_empty_window() {
        let store = populated_store();
        let entries = store.read_range(&RangeQuery::sequences(10, 20)).unwrap();
        assert!(entries.is_empty());
    }

    // ── Trails ────────────────────────────────────────────────────────────────

    #[test]
    fn test_actor_trail_in_append_order() {
        let store = populated_store();

        let alice: Vec<u64> = store.actor_trail("alice").unwrap().iter().map(|e| e.sequence).collect();
        let bob: Vec<u64> = store.actor_trail("bob").unwrap().iter().map(|e| e.sequence).collect();

        assert_eq!(alice, vec![0, 1, 3]);
        assert_eq!(bob, vec![2, 4]);
        assert!(store.actor_trail("nobody").unwrap().is_empty());
    }

    #[test]
    fn test_resource_trail_reconstructs_history() {
        let store = populated_store();

        let doc1: Vec<String> = store
            .resource_trail("document", "doc_1")
            .unwrap()
            .iter()
            .map(|e| e.action.clone())
            .collect();
        assert_eq!(doc1, vec!["CREATE", "UPDATE", "DELETE"]);

        assert!(store.resource_trail("document", "doc_99").unwrap().is_empty());
    }

    // ── Statistics ────────────────────────────────────────────────────────────

    #[test]
    fn test_statistics_counts() {
        let store = populated_store();
        let stats = store.statistics().unwrap();

        assert_eq!(stats.total_entries, 5);
        assert_eq!(stats.distinct_actor_count, 2);
        assert_eq!(stats.action_counts.get("UPDATE"), Some(&2));
        assert_eq!(stats.action_counts.get("CREATE"), Some(&1));
        assert_eq!(stats.action_counts.get("MISSING"), None);
    }

    // ── Truncation ────────────────────────────────────────────────────────────

    #[test]
    fn test_truncate_after_removes_tail_and_indices() {
        let store = populated_store();

        let removed = store.truncate_after(1).unwrap();
        assert_eq!(removed, 3);

        let stats = store.statistics().unwrap();
        assert_eq!(stats.total_entries, 2);
        // bob's only entries (2 and 4) are gone, so the actor disappears.
        assert_eq!(stats.distinct_actor_count, 1);
        assert!(store.actor_trail("bob").unwrap().is_empty());

        // Removed entries are gone from every index.
        assert_eq!(store.sequence_of_hash("hash-4").unwrap(), None);
        let doc1: Vec<u64> = store
            .resource_trail("document", "doc_1")
            .unwrap()
            .iter()
            .map(|e| e.sequence)
            .collect();
        assert_eq!(doc1, vec![0, 1]);
    }

    #[test]
    fn test_truncate_at_tail_removes_nothing() {
        let store = populated_store();
        assert_eq!(store.truncate_after(4).unwrap(), 0);
        assert_eq!(store.truncate_after(100).unwrap(), 0);
        assert_eq!(store.statistics().unwrap().total_entries, 5);
    }

    // ── Snapshot consistency ──────────────────────────────────────────────────

    /// Readers racing a writer must always observe a gapless prefix of
    /// the chain — never a partially applied append.
    #[test]
    fn test_reads_see_consistent_snapshots() {
        let store = Arc::new(MemoryChainStore::new());

        let writer = {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                for sequence in 0..200 {
                    store.append(make_entry(sequence, "TICK", "writer", None)).unwrap();
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        let entries = store.read_range(&RangeQuery::all()).unwrap();
                        for (idx, entry) in entries.iter().enumerate() {
                            assert_eq!(entry.sequence, idx as u64, "observed a gap mid-read");
                        }
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
    }
}
