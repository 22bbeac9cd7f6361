//! # chronicle-chain
//!
//! Pure chain primitives for the chronicle audit log: canonical content
//! encoding, SHA-256 chain hashing, and integrity verification.
//!
//! ## Overview
//!
//! Every audit entry links to its predecessor via that entry's SHA-256
//! hash. Tampering with any stored field — even a single byte — breaks
//! either the entry's own hash or the linkage of everything after it, and
//! is detected by [`verify_entries`].
//!
//! Nothing in this crate does I/O or takes a lock; it operates on entries
//! and slices of entries handed to it.

pub mod encode;
pub mod hash;
pub mod verify;

pub use encode::{canonical_bytes, canonical_timestamp};
pub use hash::{entry_hash, hash_entry};
pub use verify::verify_entries;

// ── Tests ─────────────────────────────────────────────────────────────────────
