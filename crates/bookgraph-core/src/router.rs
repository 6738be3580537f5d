//! # Upsert Router
//!
//! Maps each table row to zero or one mutation inside an open transaction.
//!
//! Per-row isolation:
//! - A row that fails coercion is skipped and logged with its raw key
//! - A row rejected by the store (`StoreError`) is logged and counted
//! - Any other store error ends the phase and propagates to the session

use crate::formats::{Row, Table};
use crate::graph::GraphTxn;
use crate::ingestor::Ingestor;
use crate::mutation::{Applied, Mutation};
use crate::primitives::DEFAULT_PROGRESS_INTERVAL;
use crate::{LoaderError, Phase, SkipReason};
use serde::Serialize;

/// Row tallies for one phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PhaseReport {
    pub phase: Phase,
    /// Rows read from the table.
    pub rows: usize,
    /// Rows whose mutation was written.
    pub written: usize,
    /// Rows whose mutation matched nothing (book-tag links only).
    pub unmatched: usize,
    /// Rows skipped because an identifier or count failed coercion.
    pub skipped: usize,
    /// Rows whose mutation the store rejected.
    pub failed: usize,
}

impl PhaseReport {
    /// An empty report for `phase`.
    #[must_use]
    pub const fn new(phase: Phase) -> Self {
        Self {
            phase,
            rows: 0,
            written: 0,
            unmatched: 0,
            skipped: 0,
            failed: 0,
        }
    }

    /// Whether every row produced a write.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.unmatched == 0 && self.skipped == 0 && self.failed == 0
    }
}

/// Routes rows of each phase into a transaction.
pub struct UpsertRouter<'t, T: GraphTxn> {
    txn: &'t mut T,
    progress_interval: usize,
}

impl<'t, T: GraphTxn> UpsertRouter<'t, T> {
    /// Create a router writing into `txn`.
    pub fn new(txn: &'t mut T) -> Self {
        Self {
            txn,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }

    /// Log progress every `interval` rows (0 disables progress lines).
    #[must_use]
    pub fn with_progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Upsert books, authors and `WROTE` edges.
    pub fn upsert_books(&mut self, table: &Table) -> Result<PhaseReport, LoaderError> {
        self.route(Phase::Books, table, |row| {
            Ingestor::book(row).map(Mutation::from)
        })
    }

    /// Upsert tags.
    pub fn upsert_tags(&mut self, table: &Table) -> Result<PhaseReport, LoaderError> {
        self.route(Phase::Tags, table, |row| Ingestor::tag(row).map(Mutation::from))
    }

    /// Merge weighted `TAGGED_AS` edges between existing books and tags.
    pub fn link_book_tags(&mut self, table: &Table) -> Result<PhaseReport, LoaderError> {
        self.route(Phase::BookTags, table, |row| {
            Ingestor::book_tag(row).map(Mutation::from)
        })
    }

    fn route(
        &mut self,
        phase: Phase,
        table: &Table,
        extract: impl Fn(&Row) -> Result<Mutation, SkipReason>,
    ) -> Result<PhaseReport, LoaderError> {
        tracing::info!("Uploading {} ({} rows)...", phase, table.len());
        let mut report = PhaseReport::new(phase);

        for row in table.rows() {
            report.rows += 1;

            match extract(row) {
                Err(skip) => {
                    report.skipped += 1;
                    tracing::warn!(
                        "[{} Skipped] {} (record {}): {}",
                        phase,
                        skip.key_or_na(),
                        row.record(),
                        skip
                    );
                }
                Ok(mutation) => match self.txn.apply(&mutation) {
                    Ok(Applied::Written) => report.written += 1,
                    Ok(Applied::Unmatched) => {
                        report.unmatched += 1;
                        tracing::debug!("[{}] {} matched no endpoints", phase, mutation.key());
                    }
                    Err(e) if e.is_row_scoped() => {
                        report.failed += 1;
                        tracing::warn!("[{} Error] {} - {}", phase, mutation.key(), e);
                    }
                    Err(e) => {
                        tracing::error!(
                            "[{}] aborting at record {}: {}",
                            phase,
                            row.record(),
                            e
                        );
                        return Err(e);
                    }
                },
            }

            if self.progress_interval > 0 && report.rows % self.progress_interval == 0 {
                tracing::info!("{}: {}/{} rows", phase, report.rows, table.len());
            }
        }

        if report.is_clean() {
            tracing::info!("{} done: {} written", phase, report.written);
        } else {
            tracing::warn!(
                "{} done: {} written, {} unmatched, {} skipped, {} failed",
                phase,
                report.written,
                report.unmatched,
                report.skipped,
                report.failed
            );
        }
        Ok(report)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{GraphStore, MemoryGraph};
    use crate::{BookId, TagCount, TagId};

    fn table(name: &str, text: &str) -> Table {
        Table::parse(name, text.as_bytes()).expect("parse")
    }

    /// Rejects books with a chosen id, passes everything else to memory.
    struct RejectingTxn {
        inner: MemoryGraph,
        reject: BookId,
        fatal: bool,
    }

    impl GraphTxn for RejectingTxn {
        fn apply(&mut self, mutation: &Mutation) -> Result<Applied, LoaderError> {
            if let Mutation::UpsertBook { id, .. } = mutation {
                if *id == self.reject {
                    return Err(if self.fatal {
                        LoaderError::TransactionError("connection reset".into())
                    } else {
                        LoaderError::StoreError("constraint violated".into())
                    });
                }
            }
            Ok(self.inner.apply(mutation))
        }

        fn commit(self) -> Result<(), LoaderError> {
            Ok(())
        }

        fn rollback(self) -> Result<(), LoaderError> {
            Ok(())
        }
    }

    #[test]
    fn books_phase_counts_writes_and_skips() {
        let mut graph = MemoryGraph::new();
        let mut txn = graph.begin().expect("begin");
        let books = table(
            "books.csv",
            "book_id,title,authors\n1,Dune,Frank Herbert\nabc,Bad,Nobody\n,Empty,Nobody\n2,Emma,Jane Austen\n",
        );

        let report = UpsertRouter::new(&mut txn)
            .upsert_books(&books)
            .expect("books");

        assert_eq!(report.rows, 4);
        assert_eq!(report.written, 2);
        assert_eq!(report.skipped, 2);
        assert!(!report.is_clean());
        assert!(!txn.staged().has_author("Nobody"));
    }

    #[test]
    fn unmatched_links_are_counted_not_failed() {
        let mut graph = MemoryGraph::new();
        let mut txn = graph.begin().expect("begin");
        let mut router = UpsertRouter::new(&mut txn);
        router
            .upsert_books(&table("b.csv", "book_id,title,authors\n1,Dune,Frank Herbert\n"))
            .expect("books");
        router
            .upsert_tags(&table("t.csv", "tag_id,tag_name\n5,scifi\n"))
            .expect("tags");

        let report = router
            .link_book_tags(&table(
                "bt.csv",
                "goodreads_book_id,tag_id,count\n1,5,42\n99,5,3\n1,77,3\n",
            ))
            .expect("links");

        assert_eq!(report.written, 1);
        assert_eq!(report.unmatched, 2);
        assert_eq!(report.failed, 0);
        assert_eq!(
            txn.staged().tagged_as(BookId(1), TagId(5)),
            Some(TagCount::new(42))
        );
    }

    #[test]
    fn row_store_error_does_not_abort_phase() {
        let mut txn = RejectingTxn {
            inner: MemoryGraph::new(),
            reject: BookId(2),
            fatal: false,
        };
        let books = table(
            "books.csv",
            "book_id,title,authors\n1,A,X\n2,B,Y\n3,C,Z\n",
        );

        let report = UpsertRouter::new(&mut txn)
            .upsert_books(&books)
            .expect("books");

        assert_eq!(report.written, 2);
        assert_eq!(report.failed, 1);
        assert!(txn.inner.book(BookId(3)).is_some());
        assert!(txn.inner.book(BookId(2)).is_none());
    }

    #[test]
    fn fatal_error_propagates() {
        let mut txn = RejectingTxn {
            inner: MemoryGraph::new(),
            reject: BookId(2),
            fatal: true,
        };
        let books = table(
            "books.csv",
            "book_id,title,authors\n1,A,X\n2,B,Y\n3,C,Z\n",
        );

        let result = UpsertRouter::new(&mut txn)
            .with_progress_interval(0)
            .upsert_books(&books);

        assert!(matches!(result, Err(LoaderError::TransactionError(_))));
        assert!(txn.inner.book(BookId(3)).is_none());
    }
}
