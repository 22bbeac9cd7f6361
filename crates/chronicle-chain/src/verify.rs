//! Chain verification.
//!
//! Re-walks a slice of entries in ascending sequence order, recomputing
//! every hash and re-checking every link, and reports findings instead of
//! raising: tamper is data for the caller's policy, not a failure of the
//! verification call.

use chronicle_contracts::{entry::AuditEntry, report::IntegrityReport};

use crate::hash::hash_entry;

/// Verify a window of the chain.
///
/// Two independent checks per entry:
///
/// 1. **Content** — the stored `entry_hash` must equal the hash recomputed
///    from the entry's stored fields. A mismatch lands the entry's
///    sequence number in `invalid_entries`.
/// 2. **Linkage** — the entry's `prev_hash` must equal the preceding
///    entry's stored `entry_hash`, sequences must be contiguous, and a
///    window starting at sequence 0 must link to the genesis constant.
///    A violation lands the (later) sequence number in `chain_breaks`.
///
/// An empty slice is vacuously valid. When the slice is a time-filtered
/// window whose first entry is not sequence 0, that first entry's linkage
/// cannot be checked — its predecessor is outside the window — so a clean
/// report only certifies the observed window.
pub fn verify_entries(entries: &[AuditEntry]) -> IntegrityReport {
    let mut report = IntegrityReport::empty();
    report.total_entries = entries.len() as u64;

    let mut previous: Option<&AuditEntry> = None;

    for entry in entries {
        match hash_entry(entry) {
            Ok(recomputed) if recomputed == entry.entry_hash => {}
            // A stored payload that can no longer be encoded counts as
            // content tamper: the hash cannot be reproduced from it.
            _ => report.invalid_entries.push(entry.sequence),
        }

        let linked = match previous {
            Some(prev) => {
                entry.sequence == prev.sequence + 1 && entry.prev_hash == prev.entry_hash
            }
            None => entry.sequence != 0 || entry.prev_hash == AuditEntry::GENESIS_HASH,
        };
        if !linked {
            report.chain_breaks.push(entry.sequence);
        }

        previous = Some(entry);
    }

    report.valid = report.chain_breaks.is_empty() && report.invalid_entries.is_empty();
    report
}
