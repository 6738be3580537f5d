//! # Dataset
//!
//! The three related input tables, read before any store interaction.

use crate::LoaderError;
use crate::formats::table::{Table, read_table};
use crate::primitives::{DEFAULT_BOOK_TAGS_FILE, DEFAULT_BOOKS_FILE, DEFAULT_TAGS_FILE};
use std::path::PathBuf;

/// Locations of the three input files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetPaths {
    pub books: PathBuf,
    pub tags: PathBuf,
    pub book_tags: PathBuf,
}

impl Default for DatasetPaths {
    fn default() -> Self {
        Self {
            books: PathBuf::from(DEFAULT_BOOKS_FILE),
            tags: PathBuf::from(DEFAULT_TAGS_FILE),
            book_tags: PathBuf::from(DEFAULT_BOOK_TAGS_FILE),
        }
    }
}

impl DatasetPaths {
    /// The default file names inside `dir`.
    #[must_use]
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            books: dir.join(DEFAULT_BOOKS_FILE),
            tags: dir.join(DEFAULT_TAGS_FILE),
            book_tags: dir.join(DEFAULT_BOOK_TAGS_FILE),
        }
    }
}

/// Books, tags and book-tag associations, fully loaded in memory.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub books: Table,
    pub tags: Table,
    pub book_tags: Table,
}

impl Dataset {
    /// Read all three files. Each file's delimiter is inferred on its own.
    pub fn read(paths: &DatasetPaths) -> Result<Self, LoaderError> {
        let dataset = Self {
            books: read_table(&paths.books)?,
            tags: read_table(&paths.tags)?,
            book_tags: read_table(&paths.book_tags)?,
        };

        for (label, table) in dataset.tables() {
            tracing::info!(
                "{} columns: {:?} ({} rows, {}-delimited)",
                label,
                table.columns(),
                table.len(),
                table.delimiter_name()
            );
        }

        Ok(dataset)
    }

    /// The tables with their labels, in load order.
    pub fn tables(&self) -> [(&'static str, &Table); 3] {
        [
            ("Books", &self.books),
            ("Tags", &self.tags),
            ("Book_tags", &self.book_tags),
        ]
    }

    /// Total number of data rows across all tables.
    #[must_use]
    pub fn total_rows(&self) -> usize {
        self.books.len() + self.tags.len() + self.book_tags.len()
    }
}

// =============================================================================
// TESTS
// =============================================================================
