//! # chronicle-core
//!
//! The chain handle for the chronicle tamper-evident audit log.
//!
//! This crate provides:
//! - [`AuditLedger`] — append coordination, verification, trail/statistics
//!   queries, and rollback over a pluggable [`chronicle_store::ChainStore`]
//! - [`ExportFormat`] and the streaming exporter
//!
//! ## Usage
//!
//! ```rust
//! use chronicle_core::AuditLedger;
//! use chronicle_contracts::entry::EventDraft;
//!
//! let ledger = AuditLedger::in_memory();
//! let id = ledger
//!     .append(EventDraft::new("CREATE", "alice").resource("document", "doc_1"))
//!     .unwrap();
//!
//! assert!(ledger.verify(None, None).unwrap().valid);
//! assert_eq!(ledger.get_entry(&id).unwrap().action, "CREATE");
//! ```

pub mod export;
pub mod ledger;

pub use export::{ExportFormat, EXPORT_CHUNK};
pub use ledger::AuditLedger;

// ── Tests ─────────────────────────────────────────────────────────────────────
