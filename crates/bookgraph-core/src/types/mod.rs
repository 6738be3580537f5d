//! # Core Type Definitions
//!
//! This module contains the core types shared by every loader stage:
//! - Graph keys (`BookId`, `TagId`, `TagCount`)
//! - Load phases (`Phase`)
//! - Row-level skip conditions (`SkipReason`)
//! - Error types (`LoaderError`)
//!
//! ## Determinism Guarantees
//!
//! All types in this module:
//! - Use integer arithmetic only (no floating-point)
//! - Implement `Ord` for deterministic ordering in `BTreeMap`/`BTreeSet`

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// GRAPH KEYS
// =============================================================================

/// Unique key of a `Book` node (the `id` property).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BookId(pub i64);

/// Unique key of a `Tag` node (the `tag_id` property).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TagId(pub i64);

/// Weight of a `TAGGED_AS` edge.
///
/// Repeat loads overwrite the weight; it is never accumulated.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct TagCount(pub i64);

impl TagCount {
    /// Create a new tag count.
    #[must_use]
    pub const fn new(count: i64) -> Self {
        Self(count)
    }

    /// Get the raw count value.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// PHASES
// =============================================================================

/// One of the three load phases, in execution order.
///
/// Book-tag edges need both endpoints, so `Books` and `Tags` always run first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Books,
    Tags,
    BookTags,
}

impl Phase {
    /// All phases in execution order.
    pub const ALL: [Phase; 3] = [Phase::Books, Phase::Tags, Phase::BookTags];

    /// Short label used in log lines.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Phase::Books => "Books",
            Phase::Tags => "Tags",
            Phase::BookTags => "BookTags",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// SKIP REASON
// =============================================================================

/// Why a row produced no mutation.
///
/// A skip is not an error: the row is logged and the batch continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipReason {
    /// Column whose value failed integer coercion.
    pub field: &'static str,
    /// Raw value of that column (`None` when the column is absent).
    pub raw: Option<String>,
    /// Raw primary identifier of the row, for diagnostics.
    pub row_key: Option<String>,
}

impl SkipReason {
    /// Build a coercion skip for `field`.
    #[must_use]
    pub fn coercion(field: &'static str, raw: Option<&str>, row_key: Option<&str>) -> Self {
        Self {
            field,
            raw: raw.map(str::to_owned),
            row_key: row_key.map(str::to_owned),
        }
    }

    /// The row key rendered for logs (`N/A` when absent).
    #[must_use]
    pub fn key_or_na(&self) -> &str {
        self.row_key.as_deref().unwrap_or("N/A")
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.raw {
            Some(raw) => write!(f, "{} {:?} is not an integer", self.field, raw),
            None => write!(f, "{} is missing", self.field),
        }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur while loading.
///
/// - Row-scoped failures (`StoreError`) are recovered by the router
/// - Everything else ends the load and rolls the transaction back
/// - The loader never panics; all errors are returned
#[derive(Debug, Error)]
pub enum LoaderError {
    /// The input file cannot be interpreted as delimited text.
    #[error("Format error: {0}")]
    FormatError(String),

    /// An input file could not be opened or read.
    #[error("I/O error: {0}")]
    IoError(String),

    /// A single mutation was rejected by the store.
    #[error("Store error: {0}")]
    StoreError(String),

    /// The load transaction could not be started, committed or continued.
    #[error("Transaction error: {0}")]
    TransactionError(String),

    /// No session could be established with the graph store.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Required configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl LoaderError {
    /// Whether the error is confined to one row and the batch may continue.
    #[must_use]
    pub const fn is_row_scoped(&self) -> bool {
        matches!(self, Self::StoreError(_))
    }
}

// =============================================================================
// TESTS
// =============================================================================
