//! Chain hashing.
//!
//! `entry_hash = SHA-256(prev_hash_bytes || canonical_content_bytes)`,
//! rendered as a 64-character lowercase hex string. The `prev_hash` input
//! is the 64 ASCII hex characters of the predecessor's hash (or the
//! genesis constant), so each hash commits to the entire chain before it.

use sha2::{Digest, Sha256};

use chronicle_contracts::{entry::AuditEntry, error::ChronicleResult};

use crate::encode::canonical_bytes;

/// Compute the hash for one entry from its link and its canonical content.
///
/// Pure function, no I/O; same inputs always yield the same output.
pub fn entry_hash(prev_hash: &str, canonical: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(prev_hash.as_bytes());
    hasher.update(canonical);
    hex::encode(hasher.finalize())
}

/// Recompute an entry's hash from its stored fields.
///
/// Used at append time (to assign `entry_hash`) and at verification time
/// (to compare against the stored value). Fails only when the stored
/// payload is not canonically encodable.
pub fn hash_entry(entry: &AuditEntry) -> ChronicleResult<String> {
    let canonical = canonical_bytes(entry)?;
    Ok(entry_hash(&entry.prev_hash, &canonical))
}
