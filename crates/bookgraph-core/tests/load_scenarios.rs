//! # Load Scenarios
//!
//! End-to-end loads from CSV files on disk into a `MemoryGraph`, plus a
//! scripted store that fails on demand to exercise rollback and per-row
//! isolation.

use bookgraph_core::{
    Applied, BookId, Dataset, DatasetPaths, GraphStore, GraphTxn, LoadSession, LoaderError,
    MemoryGraph, Mutation, TagCount, TagId,
};
use std::fs;
use tempfile::TempDir;

fn write_dataset(books: &str, tags: &str, book_tags: &str) -> (TempDir, DatasetPaths) {
    let dir = tempfile::tempdir().expect("tempdir");
    let paths = DatasetPaths::in_dir(dir.path());
    fs::write(&paths.books, books).expect("write books");
    fs::write(&paths.tags, tags).expect("write tags");
    fs::write(&paths.book_tags, book_tags).expect("write book_tags");
    (dir, paths)
}

// =============================================================================
// SCENARIOS
// =============================================================================

mod scenarios {
    use super::*;

    #[test]
    fn single_book_tag_and_link() {
        let (_dir, paths) = write_dataset(
            "book_id,title,authors\n1,Dune,Frank Herbert\n",
            "tag_id,tag_name\n5,scifi\n",
            "goodreads_book_id,tag_id,count\n1,5,42\n",
        );
        let dataset = Dataset::read(&paths).expect("read");
        let mut session = LoadSession::new(MemoryGraph::new());

        session.run(&dataset).expect("load");
        let graph = session.store();

        let counts = graph.counts();
        assert_eq!(counts.books, 1);
        assert_eq!(counts.authors, 1);
        assert_eq!(counts.tags, 1);
        assert_eq!(counts.wrote, 1);
        assert_eq!(counts.tagged_as, 1);

        assert_eq!(graph.book(BookId(1)).expect("book").title, "Dune");
        assert!(graph.wrote("Frank Herbert", BookId(1)));
        assert_eq!(graph.tag(TagId(5)).expect("tag").name, "scifi");
        assert_eq!(graph.tagged_as(BookId(1), TagId(5)), Some(TagCount::new(42)));
    }

    #[test]
    fn malformed_count_skips_only_that_row() {
        let (_dir, paths) = write_dataset(
            "book_id,title,authors\n1,Dune,Frank Herbert\n2,Emma,Jane Austen\n",
            "tag_id,tag_name\n5,scifi\n6,classic\n",
            "goodreads_book_id,tag_id,count\n1,5,N/A\n2,6,17\n1,6,3\n",
        );
        let dataset = Dataset::read(&paths).expect("read");
        let mut session = LoadSession::new(MemoryGraph::new());

        let report = session.run(&dataset).expect("load");
        let graph = session.store();

        assert_eq!(report.book_tags.skipped, 1);
        assert_eq!(report.book_tags.written, 2);
        assert_eq!(graph.tagged_as(BookId(1), TagId(5)), None);
        assert_eq!(graph.tagged_as(BookId(2), TagId(6)), Some(TagCount::new(17)));
        assert_eq!(graph.tagged_as(BookId(1), TagId(6)), Some(TagCount::new(3)));
    }

    #[test]
    fn link_to_unknown_book_is_silently_unmatched() {
        let (_dir, paths) = write_dataset(
            "book_id,title,authors\n1,Dune,Frank Herbert\n",
            "tag_id,tag_name\n5,scifi\n",
            "goodreads_book_id,tag_id,count\n404,5,9\n1,5,2\n",
        );
        let dataset = Dataset::read(&paths).expect("read");
        let mut session = LoadSession::new(MemoryGraph::new());

        let report = session.run(&dataset).expect("load");

        assert_eq!(report.book_tags.unmatched, 1);
        assert_eq!(report.book_tags.failed, 0);
        assert_eq!(session.store().counts().tagged_as, 1);
        assert!(session.store().book(BookId(404)).is_none());
    }

    #[test]
    fn non_numeric_book_ids_create_no_nodes() {
        let (_dir, paths) = write_dataset(
            "book_id,title,authors\n,Untitled,Anon\nabc,Letters,Anon\n3,Persuasion,Jane Austen\n",
            "tag_id,tag_name\n",
            "goodreads_book_id,tag_id,count\n",
        );
        let dataset = Dataset::read(&paths).expect("read");
        let mut session = LoadSession::new(MemoryGraph::new());

        let report = session.run(&dataset).expect("load");

        assert_eq!(report.books.skipped, 2);
        assert_eq!(session.store().counts().books, 1);
        assert!(!session.store().has_author("Anon"));
    }

    #[test]
    fn reloading_same_files_converges() {
        let (_dir, paths) = write_dataset(
            "book_id,title,authors\n1,Dune,Frank Herbert\n2,Emma,Jane Austen\n",
            "tag_id,tag_name\n5,scifi\n",
            "goodreads_book_id,tag_id,count\n1,5,42\n",
        );
        let dataset = Dataset::read(&paths).expect("read");
        let mut session = LoadSession::new(MemoryGraph::new());

        session.run(&dataset).expect("first");
        let first = session.store().counts();
        session.run(&dataset).expect("second");

        assert_eq!(session.store().counts(), first);
    }

    #[test]
    fn mixed_delimiters_and_padded_headers() {
        let (_dir, paths) = write_dataset(
            " book_id ; title ; authors \n1;Dune;Frank Herbert\n",
            "tag_id\ttag_name\n5\tscifi\n",
            "goodreads_book_id|tag_id|count\n1|5|42\n",
        );
        let dataset = Dataset::read(&paths).expect("read");
        let mut session = LoadSession::new(MemoryGraph::new());

        let report = session.run(&dataset).expect("load");

        assert_eq!(report.written(), 3);
        assert_eq!(
            session.store().tagged_as(BookId(1), TagId(5)),
            Some(TagCount::new(42))
        );
    }
}

// =============================================================================
// FAILURE HANDLING
// =============================================================================

mod failures {
    use super::*;

    /// A store that wraps a `MemoryGraph` and fails on scripted conditions.
    #[derive(Default)]
    struct ScriptedStore {
        graph: MemoryGraph,
        refuse_begin: bool,
        reject_book: Option<BookId>,
        fatal_on_book: Option<BookId>,
        fail_commit: bool,
    }

    struct ScriptedTxn<'a> {
        store: &'a mut ScriptedStore,
        staged: MemoryGraph,
    }

    impl GraphStore for ScriptedStore {
        type Txn<'a> = ScriptedTxn<'a>;

        fn begin(&mut self) -> Result<ScriptedTxn<'_>, LoaderError> {
            if self.refuse_begin {
                return Err(LoaderError::ConnectionError("unreachable".into()));
            }
            Ok(ScriptedTxn {
                staged: self.graph.clone(),
                store: self,
            })
        }
    }

    impl GraphTxn for ScriptedTxn<'_> {
        fn apply(&mut self, mutation: &Mutation) -> Result<Applied, LoaderError> {
            if let Mutation::UpsertBook { id, .. } = mutation {
                if Some(*id) == self.store.reject_book {
                    return Err(LoaderError::StoreError("constraint violated".into()));
                }
                if Some(*id) == self.store.fatal_on_book {
                    return Err(LoaderError::TransactionError("connection reset".into()));
                }
            }
            Ok(self.staged.apply(mutation))
        }

        fn commit(self) -> Result<(), LoaderError> {
            if self.store.fail_commit {
                return Err(LoaderError::TransactionError("commit refused".into()));
            }
            self.store.graph = self.staged;
            Ok(())
        }

        fn rollback(self) -> Result<(), LoaderError> {
            Ok(())
        }
    }

    fn three_books() -> (TempDir, Dataset) {
        let (dir, paths) = write_dataset(
            "book_id,title,authors\n1,A,X\n2,B,Y\n3,C,Z\n",
            "tag_id,tag_name\n5,scifi\n",
            "goodreads_book_id,tag_id,count\n1,5,1\n2,5,2\n3,5,3\n",
        );
        let dataset = Dataset::read(&paths).expect("read");
        (dir, dataset)
    }

    #[test]
    fn row_error_is_isolated_and_batch_commits() {
        let (_dir, dataset) = three_books();
        let mut session = LoadSession::new(ScriptedStore {
            reject_book: Some(BookId(2)),
            ..ScriptedStore::default()
        });

        let report = session.run(&dataset).expect("load");
        let graph = &session.store().graph;

        assert_eq!(report.books.failed, 1);
        assert_eq!(report.books.written, 2);
        // The rejected book never existed, so its link matched nothing.
        assert_eq!(report.book_tags.unmatched, 1);
        assert!(graph.book(BookId(3)).is_some());
        assert!(graph.book(BookId(2)).is_none());
    }

    #[test]
    fn fatal_error_rolls_back_everything() {
        let (_dir, dataset) = three_books();
        let mut session = LoadSession::new(ScriptedStore {
            fatal_on_book: Some(BookId(2)),
            ..ScriptedStore::default()
        });

        let result = session.run(&dataset);

        assert!(matches!(result, Err(LoaderError::TransactionError(_))));
        assert_eq!(session.store().graph.counts().nodes(), 0);
    }

    #[test]
    fn commit_failure_is_reported() {
        let (_dir, dataset) = three_books();
        let mut session = LoadSession::new(ScriptedStore {
            fail_commit: true,
            ..ScriptedStore::default()
        });

        let result = session.run(&dataset);

        assert!(matches!(result, Err(LoaderError::TransactionError(_))));
        assert_eq!(session.store().graph.counts().nodes(), 0);
    }

    #[test]
    fn refused_session_attempts_no_mutation() {
        let (_dir, dataset) = three_books();
        let mut session = LoadSession::new(ScriptedStore {
            refuse_begin: true,
            ..ScriptedStore::default()
        });

        let result = session.run(&dataset);

        assert!(matches!(result, Err(LoaderError::ConnectionError(_))));
        assert_eq!(session.store().graph.counts().nodes(), 0);
    }
}
