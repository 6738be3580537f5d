//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use super::{InputArgs, LoadArgs};
use crate::config::{Neo4jConfig, load_env_file};
use crate::store::Neo4jStore;
use bookgraph_core::primitives::{
    COL_AUTHORS, COL_BOOK_ID, COL_COUNT, COL_GOODREADS_BOOK_ID, COL_TAG_ID, COL_TAG_NAME,
    COL_TITLE,
};
use bookgraph_core::{
    Dataset, GraphCounts, LoadReport, LoadSession, LoaderError, MemoryGraph, Table,
};
use std::path::Path;

/// Columns each file must carry, in `Dataset::tables` order.
const EXPECTED_COLUMNS: [&[&str]; 3] = [
    &[COL_BOOK_ID, COL_TITLE, COL_AUTHORS],
    &[COL_TAG_ID, COL_TAG_NAME],
    &[COL_GOODREADS_BOOK_ID, COL_TAG_ID, COL_COUNT],
];

// =============================================================================
// LOAD COMMAND
// =============================================================================

/// Read the three files and upsert them in one transaction.
///
/// With `dry_run` the load goes into a fresh `MemoryGraph` and no
/// connection settings are needed.
pub fn cmd_load(
    args: &LoadArgs,
    env_file: Option<&Path>,
    json_mode: bool,
) -> Result<(), LoaderError> {
    let dataset = Dataset::read(&args.input.paths())?;

    if args.dry_run {
        let mut session =
            LoadSession::new(MemoryGraph::new()).with_progress_interval(args.progress_interval);
        let report = session.run(&dataset)?;
        let counts = session.store().counts();
        print_load(&report, "in-memory graph (dry run)", Some(&counts), json_mode);
        return Ok(());
    }

    if let Some(found) = load_env_file(env_file)? {
        tracing::debug!("Loaded settings from {}", found.display());
    }
    let config = Neo4jConfig::from_env()?.with_database(args.database.as_deref());
    tracing::debug!("Resolved {:?}", config);

    let store = Neo4jStore::connect(&config)?;
    let mut session = LoadSession::new(store).with_progress_interval(args.progress_interval);
    let report = session.run(&dataset)?;

    let target = format!("Neo4j database '{}'", session.store().database());
    print_load(&report, &target, None, json_mode);
    Ok(())
}

fn print_load(report: &LoadReport, target: &str, counts: Option<&GraphCounts>, json_mode: bool) {
    if json_mode {
        let output = serde_json::json!({
            "status": "ok",
            "target": target,
            "report": report,
            "graph": counts,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return;
    }

    println!("Bookgraph Load Summary");
    println!("======================");
    println!("Target: {}", target);
    println!();
    println!(
        "{:<10} {:>8} {:>8} {:>10} {:>8} {:>7}",
        "Phase", "Rows", "Written", "Unmatched", "Skipped", "Failed"
    );
    for phase in report.phases() {
        println!(
            "{:<10} {:>8} {:>8} {:>10} {:>8} {:>7}",
            phase.phase.label(),
            phase.rows,
            phase.written,
            phase.unmatched,
            phase.skipped,
            phase.failed
        );
    }

    if let Some(counts) = counts {
        println!();
        println!("Books:     {}", counts.books);
        println!("Authors:   {}", counts.authors);
        println!("Tags:      {}", counts.tags);
        println!("WROTE:     {}", counts.wrote);
        println!("TAGGED_AS: {}", counts.tagged_as);
    }

    println!();
    if counts.is_some() {
        println!("Dry run completed successfully!");
    } else {
        println!("Data uploaded to Neo4j successfully!");
    }
}

// =============================================================================
// INSPECT COMMAND
// =============================================================================

/// Print how each input file is read.
pub fn cmd_inspect(input: &InputArgs, json_mode: bool) -> Result<(), LoaderError> {
    let dataset = Dataset::read(&input.paths())?;

    if json_mode {
        let files: Vec<_> = dataset
            .tables()
            .iter()
            .zip(EXPECTED_COLUMNS)
            .map(|((label, table), expected)| {
                serde_json::json!({
                    "file": label,
                    "path": table.source().display().to_string(),
                    "delimiter": table.delimiter_name(),
                    "columns": table.columns(),
                    "missing_columns": missing_columns(table, expected),
                    "rows": table.len(),
                })
            })
            .collect();
        let output = serde_json::json!({ "files": files, "total_rows": dataset.total_rows() });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    println!("Bookgraph Input Files");
    println!("=====================");
    for ((label, table), expected) in dataset.tables().iter().zip(EXPECTED_COLUMNS) {
        println!();
        println!("{} ({})", label, table.source().display());
        println!("  Delimiter: {}", table.delimiter_name());
        println!("  Columns:   {}", table.columns().join(", "));
        println!("  Rows:      {}", table.len());
        let missing = missing_columns(table, expected);
        if !missing.is_empty() {
            println!("  Missing:   {}", missing.join(", "));
        }
    }
    println!();
    println!("Total rows: {}", dataset.total_rows());

    Ok(())
}

/// Expected columns absent from `table`.
fn missing_columns<'a>(table: &Table, expected: &[&'a str]) -> Vec<&'a str> {
    expected
        .iter()
        .copied()
        .filter(|name| !table.has_column(name))
        .collect()
}
