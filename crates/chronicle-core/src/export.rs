//! Chain export to interchange formats.
//!
//! Exports stream the chain in fixed-size sequence chunks pulled from the
//! store, so a very large chain never has to be materialized in memory at
//! once. Two formats: `json` (an array of full entry objects) and `csv`
//! (one row per entry, payload rendered as an escaped JSON sub-value).

use std::io::Write;
use std::str::FromStr;

use chronicle_contracts::{
    entry::AuditEntry,
    error::{ChronicleError, ChronicleResult},
    report::RangeQuery,
};
use chronicle_store::ChainStore;

/// How many entries each export pass reads from the store.
pub const EXPORT_CHUNK: u64 = 256;

/// The closed set of supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// A JSON array of entry objects exposing every entry field.
    Json,
    /// RFC-4180-style CSV: header row plus one row per entry, every
    /// scalar field as a column, `data` as an escaped JSON sub-value.
    Csv,
}

impl FromStr for ExportFormat {
    type Err = ChronicleError;

    /// Case-insensitive parse; anything outside the closed set fails with
    /// an error naming the requested format, before any store access.
    fn from_str(s: &str) -> ChronicleResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            _ => Err(ChronicleError::UnsupportedFormat {
                format: s.to_string(),
            }),
        }
    }
}

/// Stream the entire chain from `store` into `writer` in `format`.
///
/// Reads [`EXPORT_CHUNK`] entries at a time, ascending by sequence.
pub fn export_chain<W: Write>(
    store: &dyn ChainStore,
    format: ExportFormat,
    writer: &mut W,
) -> ChronicleResult<()> {
    match format {
        ExportFormat::Json => export_json(store, writer),
        ExportFormat::Csv => export_csv(store, writer),
    }
}

fn export_json<W: Write>(store: &dyn ChainStore, writer: &mut W) -> ChronicleResult<()> {
    write_all(writer, b"[")?;

    let mut first = true;
    for_each_chunk(store, |entry| {
        if !first {
            write_all(writer, b",")?;
        }
        first = false;
        serde_json::to_writer(&mut *writer, entry).map_err(|e| ChronicleError::Storage {
            reason: format!("export write failed: {e}"),
        })
    })?;

    write_all(writer, b"]")
}

const CSV_HEADER: &str =
    "sequence,entry_id,timestamp,action,actor,resource_type,resource_id,prev_hash,entry_hash,data\n";

fn export_csv<W: Write>(store: &dyn ChainStore, writer: &mut W) -> ChronicleResult<()> {
    write_all(writer, CSV_HEADER.as_bytes())?;

    for_each_chunk(store, |entry| {
        let data_json = serde_json::to_string(&entry.data).map_err(|e| ChronicleError::Encoding {
            reason: format!("payload serialization failed: {e}"),
        })?;

        let row = format!(
            "{},{},{},{},{},{},{},{},{},{}\n",
            entry.sequence,
            csv_field(&entry.entry_id.to_string()),
            csv_field(&chronicle_chain::canonical_timestamp(&entry.timestamp)),
            csv_field(&entry.action),
            csv_field(&entry.actor),
            csv_field(&entry.resource_type),
            csv_field(entry.resource_id.as_deref().unwrap_or("")),
            csv_field(&entry.prev_hash),
            csv_field(&entry.entry_hash),
            csv_field(&data_json),
        );
        write_all(writer, row.as_bytes())
    })
}

/// Walk the whole chain chunk by chunk, invoking `f` per entry in
/// ascending sequence order.
fn for_each_chunk<F>(store: &dyn ChainStore, mut f: F) -> ChronicleResult<()>
where
    F: FnMut(&AuditEntry) -> ChronicleResult<()>,
{
    let mut next = 0u64;
    loop {
        let chunk = store.read_range(&RangeQuery::sequences(
            next,
            next + EXPORT_CHUNK - 1,
        ))?;
        if chunk.is_empty() {
            return Ok(());
        }
        for entry in &chunk {
            f(entry)?;
        }
        if (chunk.len() as u64) < EXPORT_CHUNK {
            return Ok(());
        }
        next += EXPORT_CHUNK;
    }
}

/// Quote a CSV field when it contains a delimiter, quote, or line break.
fn csv_field(raw: &str) -> String {
    if raw.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}

fn write_all<W: Write>(writer: &mut W, bytes: &[u8]) -> ChronicleResult<()> {
    writer.write_all(bytes).map_err(|e| ChronicleError::Storage {
        reason: format!("export write failed: {e}"),
    })
}
