//! # chronicle-contracts
//!
//! Shared types and errors for the chronicle tamper-evident audit log.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate — only data definitions and error types.

pub mod entry;
pub mod error;
pub mod report;
pub mod value;

pub use entry::{AuditEntry, EntryId, EventDraft};
pub use error::{ChronicleError, ChronicleResult};
pub use report::{ChainStatistics, ChainTail, IntegrityReport, RangeQuery};
pub use value::{data_map_from_json, DataMap, DataValue};

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    // ── DataValue conversion ─────────────────────────────────────────────────

    #[test]
    fn data_value_rejects_null() {
        let err = DataValue::try_from(json!(null)).unwrap_err();
        assert!(matches!(err, ChronicleError::Encoding { .. }));
        assert!(err.to_string().contains("null"));
    }

    #[test]
    fn data_value_rejects_non_finite_float() {
        assert!(DataValue::float(f64::NAN).is_err());
        assert!(DataValue::float(f64::INFINITY).is_err());
        assert!(DataValue::float(1.5).is_ok());
    }

    #[test]
    fn data_value_rejects_oversize_integer() {
        // u64::MAX does not fit in i64 and has no exact f64 form the
        // payload accepts as an integer.
        let err = DataValue::try_from(json!(u64::MAX)).unwrap_err();
        assert!(matches!(err, ChronicleError::Encoding { .. }));
    }

    #[test]
    fn data_value_converts_nested_json() {
        let value = DataValue::try_from(json!({
            "who": "alice",
            "count": 3,
            "tags": ["a", "b"],
            "nested": { "ok": true }
        }))
        .unwrap();

        let DataValue::Map(map) = value else {
            panic!("expected a map");
        };
        assert_eq!(map.get("who"), Some(&DataValue::String("alice".into())));
        assert_eq!(map.get("count"), Some(&DataValue::Int(3)));
        assert_eq!(
            map.get("tags"),
            Some(&DataValue::List(vec!["a".into(), "b".into()]))
        );
    }

    #[test]
    fn data_value_rejects_null_anywhere_in_tree() {
        let err = DataValue::try_from(json!({ "outer": { "inner": null } })).unwrap_err();
        assert!(matches!(err, ChronicleError::Encoding { .. }));
    }

    #[test]
    fn data_map_from_json_requires_object() {
        assert!(data_map_from_json(json!({ "k": "v" })).is_ok());
        assert!(data_map_from_json(json!([1, 2, 3])).is_err());
        assert!(data_map_from_json(json!("scalar")).is_err());
    }

    #[test]
    fn ensure_encodable_finds_smuggled_nan() {
        let mut map = DataMap::new();
        map.insert("bad".to_string(), DataValue::Float(f64::NAN));
        let value = DataValue::Map(map);
        assert!(value.ensure_encodable().is_err());
    }

    // ── EventDraft builder ───────────────────────────────────────────────────

    #[test]
    fn event_draft_builder_populates_all_fields() {
        let draft = EventDraft::new("CREATE", "alice")
            .resource("document", "doc_1")
            .with("size_bytes", 1024i64)
            .with("draft", true);

        assert_eq!(draft.action, "CREATE");
        assert_eq!(draft.actor, "alice");
        assert_eq!(draft.resource_type, "document");
        assert_eq!(draft.resource_id.as_deref(), Some("doc_1"));
        assert_eq!(draft.data.get("size_bytes"), Some(&DataValue::Int(1024)));
        assert_eq!(draft.data.get("draft"), Some(&DataValue::Bool(true)));
    }

    // ── EntryId ──────────────────────────────────────────────────────────────

    #[test]
    fn entry_id_new_produces_unique_values() {
        let ids: Vec<EntryId> = (0..100).map(|_| EntryId::new()).collect();

        let unique: std::collections::HashSet<String> =
            ids.iter().map(|id| id.to_string()).collect();
        assert_eq!(unique.len(), 100);
    }

    // ── Serde round-trips ────────────────────────────────────────────────────

    #[test]
    fn audit_entry_round_trips_through_json() {
        let entry = AuditEntry {
            sequence: 7,
            entry_id: EntryId::new(),
            timestamp: chrono::Utc::now(),
            action: "UPDATE".to_string(),
            actor: "bob".to_string(),
            resource_type: "document".to_string(),
            resource_id: Some("doc_9".to_string()),
            data: DataMap::from([("field".to_string(), DataValue::from("title"))]),
            prev_hash: "ab".repeat(32),
            entry_hash: "cd".repeat(32),
        };

        let text = serde_json::to_string(&entry).unwrap();
        let decoded: AuditEntry = serde_json::from_str(&text).unwrap();
        assert_eq!(decoded.sequence, entry.sequence);
        assert_eq!(decoded.entry_id, entry.entry_id);
        assert_eq!(decoded.actor, entry.actor);
        assert_eq!(decoded.data, entry.data);
        assert_eq!(decoded.entry_hash, entry.entry_hash);
    }

    #[test]
    fn absent_resource_id_is_omitted_from_json() {
        let entry = AuditEntry {
            sequence: 0,
            entry_id: EntryId::new(),
            timestamp: chrono::Utc::now(),
            action: "LOGIN".to_string(),
            actor: "carol".to_string(),
            resource_type: String::new(),
            resource_id: None,
            data: DataMap::new(),
            prev_hash: AuditEntry::GENESIS_HASH.to_string(),
            entry_hash: "ef".repeat(32),
        };

        let text = serde_json::to_string(&entry).unwrap();
        assert!(!text.contains("resource_id"));
    }

    // ── Error display messages ───────────────────────────────────────────────

    #[test]
    fn error_validation_display() {
        let err = ChronicleError::Validation {
            field: "action".to_string(),
            reason: "must not be empty".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("action"));
        assert!(msg.contains("must not be empty"));
    }

    #[test]
    fn error_unsupported_format_names_the_format() {
        let err = ChronicleError::UnsupportedFormat {
            format: "xml".to_string(),
        };
        assert!(err.to_string().contains("'xml'"));
    }

    #[test]
    fn error_not_found_display() {
        let err = ChronicleError::not_found("entry", "deadbeef");
        let msg = err.to_string();
        assert!(msg.contains("entry"));
        assert!(msg.contains("deadbeef"));
    }
}
