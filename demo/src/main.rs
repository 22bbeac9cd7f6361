//! Chronicle — Tamper-Evident Audit Log Demo CLI
//!
//! Exercises the real chronicle components (ledger, in-memory chain store,
//! verifier, exporter) against a small document-workflow scenario.
//!
//! Usage:
//!   cargo run -p demo -- run-all
//!   cargo run -p demo -- tour
//!   cargo run -p demo -- tamper
//!   cargo run -p demo -- rollback
//!   cargo run -p demo -- export --format csv

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use chronicle_chain::verify_entries;
use chronicle_contracts::{entry::EventDraft, error::ChronicleResult, report::RangeQuery};
use chronicle_core::AuditLedger;

// ── CLI definition ────────────────────────────────────────────────────────────

/// Chronicle — hash-chained audit log demo.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "chronicle tamper-evident audit log demo",
    long_about = "Appends a document-workflow scenario to a hash-chained audit log,\n\
                  then demonstrates trails, statistics, verification, tamper\n\
                  detection, rollback, and export."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run every demonstration in sequence.
    RunAll,
    /// Append the scenario and print trails, statistics, and verification.
    Tour,
    /// Show how content and linkage tamper are reported.
    Tamper,
    /// Roll the chain back to an earlier hash and keep appending.
    Rollback,
    /// Export the scenario chain.
    Export {
        /// Output format: json or csv.
        #[arg(long, default_value = "json")]
        format: String,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Structured logging; set RUST_LOG=info to watch appends and rollbacks.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::RunAll => run_all(),
        Command::Tour => run_tour(),
        Command::Tamper => run_tamper(),
        Command::Rollback => run_rollback(),
        Command::Export { format } => run_export(&format),
    };

    if let Err(e) = result {
        eprintln!("Demo error: {e}");
        std::process::exit(1);
    }
}

fn run_all() -> ChronicleResult<()> {
    run_tour()?;
    run_tamper()?;
    run_rollback()?;
    run_export("json")
}

// ── Scenario ──────────────────────────────────────────────────────────────────

/// Append a small document-workflow scenario: two actors, one document
/// that is created and revised, plus session events.
fn scenario_ledger() -> ChronicleResult<AuditLedger> {
    let ledger = AuditLedger::in_memory();

    ledger.append(EventDraft::new("LOGIN", "alice"))?;
    ledger.append(
        EventDraft::new("CREATE", "alice")
            .resource("document", "doc_1")
            .with("title", "Q3 compliance report"),
    )?;
    ledger.append(
        EventDraft::new("UPDATE", "alice")
            .resource("document", "doc_1")
            .with("field", "title")
            .with("revision", 2i64),
    )?;
    ledger.append(EventDraft::new("LOGIN", "bob"))?;
    ledger.append(
        EventDraft::new("READ", "bob")
            .resource("document", "doc_1")
            .with("reason", "quarterly review"),
    )?;

    Ok(ledger)
}

// ── Demonstrations ────────────────────────────────────────────────────────────

fn run_tour() -> ChronicleResult<()> {
    println!("── Tour ─────────────────────────────────────────");
    let ledger = scenario_ledger()?;

    let stats = ledger.statistics()?;
    println!("entries: {}, actors: {}", stats.total_entries, stats.distinct_actor_count);
    for (action, count) in &stats.action_counts {
        println!("  {action}: {count}");
    }

    let doc_history = ledger.resource_trail("document", "doc_1")?;
    println!("document/doc_1 history:");
    for entry in &doc_history {
        println!("  #{} {} by {}", entry.sequence, entry.action, entry.actor);
    }

    let report = ledger.verify(None, None)?;
    println!("verification: valid={} over {} entries", report.valid, report.total_entries);
    println!();
    Ok(())
}

fn run_tamper() -> ChronicleResult<()> {
    println!("── Tamper detection ─────────────────────────────");
    let ledger = scenario_ledger()?;

    // Work on a copied window: the store itself never mutates entries.
    let mut copy = ledger.read_range(&RangeQuery::all())?;
    copy[2].actor = "mallory".to_string();

    let report = verify_entries(&copy);
    println!(
        "after editing entry 2 out of band: valid={}, invalid_entries={:?}",
        report.valid, report.invalid_entries
    );

    let mut relinked = ledger.read_range(&RangeQuery::all())?;
    relinked[3].prev_hash = relinked[1].prev_hash.clone();
    let report = verify_entries(&relinked);
    println!(
        "after rewiring entry 3's prev_hash: valid={}, chain_breaks={:?}",
        report.valid, report.chain_breaks
    );
    println!();
    Ok(())
}

fn run_rollback() -> ChronicleResult<()> {
    println!("── Rollback ─────────────────────────────────────");
    let ledger = scenario_ledger()?;

    let entries = ledger.read_range(&RangeQuery::all())?;
    let target = entries[1].entry_hash.clone();

    let removed = ledger.rollback_to(&target)?;
    println!("rolled back to sequence 1; removed {removed} entries");

    ledger.append(
        EventDraft::new("ROLLBACK_NOTED", "admin").with("target_hash", target.as_str()),
    )?;

    let report = ledger.verify(None, None)?;
    println!("verification after rollback + append: valid={} over {} entries", report.valid, report.total_entries);
    println!();
    Ok(())
}

fn run_export(format: &str) -> ChronicleResult<()> {
    println!("── Export ({format}) ────────────────────────────");
    let ledger = scenario_ledger()?;
    println!("{}", ledger.export(format)?);
    Ok(())
}
