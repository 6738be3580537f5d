//! # bookgraph-core
//!
//! The synchronous loader for Bookgraph - THE LOADER.
//!
//! This crate turns three related delimited files (books, tags, book-tag
//! associations) into idempotent graph mutations and applies them inside a
//! single write transaction.
//!
//! ## Data Flow
//!
//! ```text
//! files -> formats (Table) -> ingestor (records) -> mutation
//!       -> router (per row, per phase) -> session (one transaction) -> store
//! ```
//!
//! ## Architectural Constraints
//!
//! - No async, no network dependencies (stores plug in via `GraphStore`)
//! - A bad row never aborts the batch; only store-level failures do
//! - Re-running a load converges on the same graph (MERGE semantics)

// =============================================================================
// MODULES
// =============================================================================

pub mod coerce;
pub mod formats;
pub mod graph;
pub mod ingestor;
pub mod mutation;
pub mod primitives;
pub mod router;
pub mod session;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{BookId, LoaderError, Phase, SkipReason, TagCount, TagId};

// =============================================================================
// RE-EXPORTS: Loader
// =============================================================================

pub use coerce::coerce_int;
pub use formats::{Dataset, DatasetPaths, Row, Table, read_table, sniff_delimiter};
pub use graph::{GraphCounts, GraphStore, GraphTxn, MemoryGraph, MemoryTxn};
pub use ingestor::{BookRecord, BookTagRecord, Ingestor, TagRecord};
pub use mutation::{Applied, Mutation, Param};
pub use router::{PhaseReport, UpsertRouter};
pub use session::{LoadReport, LoadSession};
