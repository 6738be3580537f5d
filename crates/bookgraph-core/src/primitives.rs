//! # Loader Primitives
//!
//! Hardcoded runtime constants for the loader.
//!
//! These are compiled into the binary and are immutable at runtime.

/// Number of bytes sampled from the head of a file for delimiter inference.
pub const SNIFF_SAMPLE_BYTES: usize = 2048;

/// Delimiter candidates, in preference order.
///
/// When several candidates fit the sample equally well, the earliest wins.
pub const DELIMITER_CANDIDATES: [u8; 5] = [b',', b'\t', b';', b'|', b':'];

/// Minimum share of sampled records (in percent) that must agree on a
/// candidate's per-record count for it to qualify as the delimiter.
pub const DELIMITER_AGREEMENT_PERCENT: usize = 90;

/// Default file holding book rows.
pub const DEFAULT_BOOKS_FILE: &str = "books.csv";

/// Default file holding tag rows.
pub const DEFAULT_TAGS_FILE: &str = "tags.csv";

/// Default file holding book-tag association rows.
pub const DEFAULT_BOOK_TAGS_FILE: &str = "book_tags.csv";

/// Logical database used when none is configured.
pub const DEFAULT_DATABASE: &str = "neo4j";

/// Rows between two progress log lines within a phase.
pub const DEFAULT_PROGRESS_INTERVAL: usize = 1000;

// =============================================================================
// SOURCE COLUMNS
// =============================================================================

pub const COL_BOOK_ID: &str = "book_id";
pub const COL_TITLE: &str = "title";
pub const COL_AUTHORS: &str = "authors";
pub const COL_TAG_ID: &str = "tag_id";
pub const COL_TAG_NAME: &str = "tag_name";
pub const COL_GOODREADS_BOOK_ID: &str = "goodreads_book_id";
pub const COL_COUNT: &str = "count";
