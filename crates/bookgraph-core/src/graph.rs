//! # Graph Stores
//!
//! The seam between the loader and a graph datastore, plus a deterministic
//! in-memory store with the same merge semantics as the Cypher statements.
//!
//! All data structures use `BTreeMap`/`BTreeSet` for deterministic ordering.

use crate::mutation::{Applied, Mutation};
use crate::{BookId, LoaderError, TagCount, TagId};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

// =============================================================================
// STORE TRAITS
// =============================================================================

/// A graph datastore that can open write transactions.
pub trait GraphStore {
    /// The write transaction type.
    type Txn<'a>: GraphTxn
    where
        Self: 'a;

    /// Open one write transaction.
    fn begin(&mut self) -> Result<Self::Txn<'_>, LoaderError>;
}

/// One open write transaction.
///
/// Dropping a transaction without calling `commit` discards its writes.
pub trait GraphTxn {
    /// Apply one mutation inside the transaction.
    ///
    /// A `StoreError` affects only this mutation; any other error means the
    /// transaction can no longer be used.
    fn apply(&mut self, mutation: &Mutation) -> Result<Applied, LoaderError>;

    /// Make all applied mutations durable.
    fn commit(self) -> Result<(), LoaderError>;

    /// Discard all applied mutations.
    fn rollback(self) -> Result<(), LoaderError>;
}

// =============================================================================
// MEMORY GRAPH
// =============================================================================

/// A `Book` node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
}

/// A `Tag` node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub tag_id: TagId,
    pub name: String,
}

/// Node and edge counts per label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GraphCounts {
    pub books: usize,
    pub authors: usize,
    pub tags: usize,
    pub wrote: usize,
    pub tagged_as: usize,
}

impl GraphCounts {
    /// Total number of nodes.
    #[must_use]
    pub fn nodes(&self) -> usize {
        self.books + self.authors + self.tags
    }

    /// Total number of edges.
    #[must_use]
    pub fn edges(&self) -> usize {
        self.wrote + self.tagged_as
    }
}

/// The in-memory graph.
///
/// Nodes are keyed exactly like the Cypher MERGE patterns: books by `id`,
/// authors by `name`, tags by `tag_id`. Each (author, book) and (book, tag)
/// pair holds at most one edge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryGraph {
    books: BTreeMap<BookId, Book>,
    authors: BTreeSet<String>,
    tags: BTreeMap<TagId, Tag>,
    wrote: BTreeSet<(String, BookId)>,
    tagged_as: BTreeMap<(BookId, TagId), TagCount>,
}

impl MemoryGraph {
    /// Create a new empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a mutation with merge semantics.
    pub fn apply(&mut self, mutation: &Mutation) -> Applied {
        match mutation {
            Mutation::UpsertBook { id, title, author } => {
                self.books
                    .entry(*id)
                    .and_modify(|book| book.title.clone_from(title))
                    .or_insert_with(|| Book {
                        id: *id,
                        title: title.clone(),
                    });
                self.authors.insert(author.clone());
                self.wrote.insert((author.clone(), *id));
                Applied::Written
            }
            Mutation::UpsertTag { tag_id, name } => {
                self.tags
                    .entry(*tag_id)
                    .and_modify(|tag| tag.name.clone_from(name))
                    .or_insert_with(|| Tag {
                        tag_id: *tag_id,
                        name: name.clone(),
                    });
                Applied::Written
            }
            Mutation::LinkBookTag {
                book_id,
                tag_id,
                count,
            } => {
                if !self.books.contains_key(book_id) || !self.tags.contains_key(tag_id) {
                    return Applied::Unmatched;
                }
                self.tagged_as.insert((*book_id, *tag_id), *count);
                Applied::Written
            }
        }
    }

    /// Lookup a book by id.
    #[must_use]
    pub fn book(&self, id: BookId) -> Option<&Book> {
        self.books.get(&id)
    }

    /// Lookup a tag by id.
    #[must_use]
    pub fn tag(&self, tag_id: TagId) -> Option<&Tag> {
        self.tags.get(&tag_id)
    }

    /// Whether an author node with this exact name exists.
    #[must_use]
    pub fn has_author(&self, name: &str) -> bool {
        self.authors.contains(name)
    }

    /// Whether `author` has a `WROTE` edge to `book`.
    #[must_use]
    pub fn wrote(&self, author: &str, book: BookId) -> bool {
        self.wrote.contains(&(author.to_string(), book))
    }

    /// Count on the `TAGGED_AS` edge from `book` to `tag`.
    #[must_use]
    pub fn tagged_as(&self, book: BookId, tag: TagId) -> Option<TagCount> {
        self.tagged_as.get(&(book, tag)).copied()
    }

    /// Node and edge counts per label.
    #[must_use]
    pub fn counts(&self) -> GraphCounts {
        GraphCounts {
            books: self.books.len(),
            authors: self.authors.len(),
            tags: self.tags.len(),
            wrote: self.wrote.len(),
            tagged_as: self.tagged_as.len(),
        }
    }
}

impl GraphStore for MemoryGraph {
    type Txn<'a> = MemoryTxn<'a>;

    fn begin(&mut self) -> Result<MemoryTxn<'_>, LoaderError> {
        Ok(MemoryTxn {
            staged: self.clone(),
            target: self,
        })
    }
}

/// A transaction over a `MemoryGraph`.
///
/// Writes go to a staged copy that replaces the target on commit.
#[derive(Debug)]
pub struct MemoryTxn<'a> {
    target: &'a mut MemoryGraph,
    staged: MemoryGraph,
}

impl MemoryTxn<'_> {
    /// The graph as seen from inside the transaction.
    #[must_use]
    pub fn staged(&self) -> &MemoryGraph {
        &self.staged
    }
}

impl GraphTxn for MemoryTxn<'_> {
    fn apply(&mut self, mutation: &Mutation) -> Result<Applied, LoaderError> {
        Ok(self.staged.apply(mutation))
    }

    fn commit(self) -> Result<(), LoaderError> {
        *self.target = self.staged;
        Ok(())
    }

    fn rollback(self) -> Result<(), LoaderError> {
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
