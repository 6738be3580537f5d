//! # Ingestor Module
//!
//! Turns raw table rows into typed records.
//!
//! - Identifiers and counts are coerced with `coerce_int`
//! - A row whose identifier or count cannot be coerced yields a `SkipReason`
//! - Text fields default to the empty string when their column is absent
//! - No semantic enrichment: `authors` stays one name, unsplit

use crate::coerce::coerce_int;
use crate::formats::Row;
use crate::primitives::{
    COL_AUTHORS, COL_BOOK_ID, COL_COUNT, COL_GOODREADS_BOOK_ID, COL_TAG_ID, COL_TAG_NAME,
    COL_TITLE,
};
use crate::{BookId, SkipReason, TagCount, TagId};

/// A book row: one `Book` node, one `Author` node, one `WROTE` edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookRecord {
    pub book_id: BookId,
    pub title: String,
    /// The whole `authors` cell, used as a single author name.
    pub author: String,
}

/// A tag row: one `Tag` node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRecord {
    pub tag_id: TagId,
    pub name: String,
}

/// A book-tag row: one weighted `TAGGED_AS` edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookTagRecord {
    pub book_id: BookId,
    pub tag_id: TagId,
    pub count: TagCount,
}

/// Extracts typed records from rows.
pub struct Ingestor;

impl Ingestor {
    /// Extract a book record.
    pub fn book(row: &Row) -> Result<BookRecord, SkipReason> {
        let raw_id = row.get(COL_BOOK_ID);
        let book_id = required(row, COL_BOOK_ID, raw_id)?;

        Ok(BookRecord {
            book_id: BookId(book_id),
            title: text(row, COL_TITLE),
            author: text(row, COL_AUTHORS),
        })
    }

    /// Extract a tag record.
    pub fn tag(row: &Row) -> Result<TagRecord, SkipReason> {
        let raw_id = row.get(COL_TAG_ID);
        let tag_id = required(row, COL_TAG_ID, raw_id)?;

        Ok(TagRecord {
            tag_id: TagId(tag_id),
            name: text(row, COL_TAG_NAME),
        })
    }

    /// Extract a book-tag record.
    ///
    /// All three of book id, tag id and count must coerce; skips are keyed
    /// by the raw book id.
    pub fn book_tag(row: &Row) -> Result<BookTagRecord, SkipReason> {
        let raw_book = row.get(COL_GOODREADS_BOOK_ID);
        let book_id = required(row, COL_GOODREADS_BOOK_ID, raw_book)?;
        let tag_id = required(row, COL_TAG_ID, raw_book)?;
        let count = required(row, COL_COUNT, raw_book)?;

        Ok(BookTagRecord {
            book_id: BookId(book_id),
            tag_id: TagId(tag_id),
            count: TagCount::new(count),
        })
    }
}

fn required(row: &Row, field: &'static str, row_key: Option<&str>) -> Result<i64, SkipReason> {
    let raw = row.get(field);
    coerce_int(raw, None).ok_or_else(|| SkipReason::coercion(field, raw, row_key))
}

fn text(row: &Row, field: &str) -> String {
    row.get(field).unwrap_or_default().to_string()
}

// =============================================================================
// TESTS
// =============================================================================
