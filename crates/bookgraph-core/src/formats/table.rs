//! # Tabular Reader
//!
//! Loads a delimited file into an in-memory `Table`.
//!
//! The delimiter is inferred from the first `SNIFF_SAMPLE_BYTES` bytes,
//! header names are stripped of surrounding whitespace, and rows are kept
//! as raw strings. No row-level validation happens here: short rows simply
//! lack their trailing columns and extra unnamed fields are dropped.

use crate::LoaderError;
use crate::formats::sniff::{delimiter_name, sniff_delimiter};
use crate::primitives::SNIFF_SAMPLE_BYTES;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

// =============================================================================
// ROW
// =============================================================================

/// One data record: column name to raw cell value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    /// 1-based position of the record among the data records.
    record: u64,
    fields: BTreeMap<String, String>,
}

impl Row {
    /// Build a row from `(column, value)` pairs. The first occurrence of a
    /// column name wins.
    pub fn from_pairs<K, V>(record: u64, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut fields = BTreeMap::new();
        for (column, value) in pairs {
            fields.entry(column.into()).or_insert_with(|| value.into());
        }
        Self { record, fields }
    }

    /// Raw value of `column`, if the record has it.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    /// 1-based record number within the file.
    #[must_use]
    pub fn record(&self) -> u64 {
        self.record
    }
}

// =============================================================================
// TABLE
// =============================================================================

/// An ordered sequence of rows read from one delimited file.
#[derive(Debug, Clone)]
pub struct Table {
    source: PathBuf,
    delimiter: u8,
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    /// Parse delimited `data` that was read from `source`.
    pub fn parse(source: impl Into<PathBuf>, data: &[u8]) -> Result<Self, LoaderError> {
        let source = source.into();
        let sample_len = data.len().min(SNIFF_SAMPLE_BYTES);
        let truncated = data.len() > SNIFF_SAMPLE_BYTES;
        let delimiter = sniff_delimiter(&data[..sample_len], truncated).map_err(|e| match e {
            LoaderError::FormatError(msg) => {
                LoaderError::FormatError(format!("{}: {}", source.display(), msg))
            }
            other => other,
        })?;

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .has_headers(true)
            .from_reader(data);

        let columns: Vec<String> = reader
            .headers()
            .map_err(|e| csv_error(&source, e))?
            .iter()
            .map(normalize_header)
            .collect();

        let mut rows = Vec::new();
        for (idx, record) in reader.records().enumerate() {
            let record = record.map_err(|e| csv_error(&source, e))?;
            let row = Row::from_pairs(
                idx as u64 + 1,
                columns
                    .iter()
                    .zip(record.iter())
                    .map(|(column, value)| (column.as_str(), value)),
            );
            rows.push(row);
        }

        Ok(Self {
            source,
            delimiter,
            columns,
            rows,
        })
    }

    /// File the table was read from.
    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// The inferred field delimiter.
    #[must_use]
    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    /// Human-readable delimiter name.
    #[must_use]
    pub fn delimiter_name(&self) -> &'static str {
        delimiter_name(self.delimiter)
    }

    /// Normalized column names, in file order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Whether a normalized column is present.
    #[must_use]
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Rows in file order.
    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }

    /// Number of data rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no data rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Read and parse the delimited file at `path`.
pub fn read_table(path: impl AsRef<Path>) -> Result<Table, LoaderError> {
    let path = path.as_ref();
    let data = std::fs::read(path)
        .map_err(|e| LoaderError::IoError(format!("Cannot read '{}': {}", path.display(), e)))?;
    Table::parse(path, &data)
}

fn normalize_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}').trim().to_string()
}

fn csv_error(source: &Path, e: csv::Error) -> LoaderError {
    if e.is_io_error() {
        LoaderError::IoError(format!("{}: {}", source.display(), e))
    } else {
        LoaderError::FormatError(format!("{}: {}", source.display(), e))
    }
}

// =============================================================================
// TESTS
// =============================================================================
