//! # Mutations
//!
//! One idempotent graph statement per accepted row.
//!
//! Every statement is MERGE-based, so replaying a load converges on the
//! same graph instead of duplicating nodes or edges. Stores either interpret
//! the `Mutation` value directly (`MemoryGraph`) or run its Cypher text with
//! its named parameters (Neo4j).

use crate::ingestor::{BookRecord, BookTagRecord, TagRecord};
use crate::{BookId, TagCount, TagId};

/// Upsert a `Book` by `id`, set its title, upsert its `Author` by name and
/// merge the `WROTE` edge between them.
pub const UPSERT_BOOK_CYPHER: &str = "\
MERGE (b:Book {id: $id})
SET b.title = $title
MERGE (a:Author {name: $author})
MERGE (a)-[:WROTE]->(b)";

/// Upsert a `Tag` by `tag_id` and set its name.
pub const UPSERT_TAG_CYPHER: &str = "MERGE (t:Tag {tag_id: $id}) SET t.name = $name";

/// Link an existing `Book` to an existing `Tag`, overwriting the count.
///
/// The relationship is merged without properties so a new count replaces
/// the old one on the same edge. When either endpoint is missing the MATCH
/// yields nothing and `linked` is 0.
pub const LINK_BOOK_TAG_CYPHER: &str = "\
MATCH (b:Book {id: $bid}), (t:Tag {tag_id: $tid})
MERGE (b)-[r:TAGGED_AS]->(t)
SET r.count = $count
RETURN count(r) AS linked";

/// A named statement parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    Int(i64),
    Text(String),
}

/// What a store reports for one applied mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The statement matched and wrote.
    Written,
    /// The statement matched nothing (a book-tag link with a missing endpoint).
    Unmatched,
}

/// One graph mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    UpsertBook {
        id: BookId,
        title: String,
        author: String,
    },
    UpsertTag {
        tag_id: TagId,
        name: String,
    },
    LinkBookTag {
        book_id: BookId,
        tag_id: TagId,
        count: TagCount,
    },
}

impl Mutation {
    /// Cypher text of the statement.
    #[must_use]
    pub const fn cypher(&self) -> &'static str {
        match self {
            Self::UpsertBook { .. } => UPSERT_BOOK_CYPHER,
            Self::UpsertTag { .. } => UPSERT_TAG_CYPHER,
            Self::LinkBookTag { .. } => LINK_BOOK_TAG_CYPHER,
        }
    }

    /// Named parameters referenced by `cypher()`.
    #[must_use]
    pub fn params(&self) -> Vec<(&'static str, Param)> {
        match self {
            Self::UpsertBook { id, title, author } => vec![
                ("id", Param::Int(id.0)),
                ("title", Param::Text(title.clone())),
                ("author", Param::Text(author.clone())),
            ],
            Self::UpsertTag { tag_id, name } => vec![
                ("id", Param::Int(tag_id.0)),
                ("name", Param::Text(name.clone())),
            ],
            Self::LinkBookTag {
                book_id,
                tag_id,
                count,
            } => vec![
                ("bid", Param::Int(book_id.0)),
                ("tid", Param::Int(tag_id.0)),
                ("count", Param::Int(count.value())),
            ],
        }
    }

    /// Whether the statement reports matched rows (only links can miss).
    #[must_use]
    pub const fn reports_matches(&self) -> bool {
        matches!(self, Self::LinkBookTag { .. })
    }

    /// Primary identifier used in log lines.
    #[must_use]
    pub fn key(&self) -> String {
        match self {
            Self::UpsertBook { id, .. } => id.to_string(),
            Self::UpsertTag { tag_id, .. } => tag_id.to_string(),
            Self::LinkBookTag { book_id, .. } => format!("BookID {}", book_id),
        }
    }
}

impl From<BookRecord> for Mutation {
    fn from(record: BookRecord) -> Self {
        Self::UpsertBook {
            id: record.book_id,
            title: record.title,
            author: record.author,
        }
    }
}

impl From<TagRecord> for Mutation {
    fn from(record: TagRecord) -> Self {
        Self::UpsertTag {
            tag_id: record.tag_id,
            name: record.name,
        }
    }
}

impl From<BookTagRecord> for Mutation {
    fn from(record: BookTagRecord) -> Self {
        Self::LinkBookTag {
            book_id: record.book_id,
            tag_id: record.tag_id,
            count: record.count,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
