//! # Session Module
//!
//! The transactional load: one write transaction, three phases, one commit.
//!
//! - Books, then Tags, then Book-Tags, strictly in that order
//! - A clean run commits once and reports success
//! - An error escaping the router rolls the transaction back and is
//!   reported as a `TransactionError`; there is no retry and no partial commit

use crate::formats::Dataset;
use crate::graph::{GraphStore, GraphTxn};
use crate::primitives::DEFAULT_PROGRESS_INTERVAL;
use crate::router::{PhaseReport, UpsertRouter};
use crate::{LoaderError, Phase};
use serde::Serialize;

/// Outcome of a committed load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub books: PhaseReport,
    pub tags: PhaseReport,
    pub book_tags: PhaseReport,
}

impl LoadReport {
    /// Report of one phase.
    #[must_use]
    pub const fn phase(&self, phase: Phase) -> &PhaseReport {
        match phase {
            Phase::Books => &self.books,
            Phase::Tags => &self.tags,
            Phase::BookTags => &self.book_tags,
        }
    }

    /// Phase reports in execution order.
    #[must_use]
    pub fn phases(&self) -> [&PhaseReport; 3] {
        Phase::ALL.map(|phase| self.phase(phase))
    }

    /// Rows read across all phases.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.phases().iter().map(|p| p.rows).sum()
    }

    /// Rows written across all phases.
    #[must_use]
    pub fn written(&self) -> usize {
        self.phases().iter().map(|p| p.written).sum()
    }

    /// Rows skipped for failed coercion across all phases.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.phases().iter().map(|p| p.skipped).sum()
    }

    /// Rows rejected by the store across all phases.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.phases().iter().map(|p| p.failed).sum()
    }

    /// Book-tag rows that matched no endpoints.
    #[must_use]
    pub fn unmatched(&self) -> usize {
        self.phases().iter().map(|p| p.unmatched).sum()
    }
}

/// A load session owning the target store.
#[derive(Debug)]
pub struct LoadSession<S: GraphStore> {
    store: S,
    progress_interval: usize,
}

impl<S: GraphStore> LoadSession<S> {
    /// Create a session over `store`.
    pub fn new(store: S) -> Self {
        Self {
            store,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }

    /// Log progress every `interval` rows (0 disables progress lines).
    #[must_use]
    pub fn with_progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval;
        self
    }

    /// The target store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run the three phases inside one transaction and commit.
    pub fn run(&mut self, dataset: &Dataset) -> Result<LoadReport, LoaderError> {
        let mut txn = self.store.begin()?;

        let outcome = run_phases(&mut txn, dataset, self.progress_interval);

        match outcome {
            Ok(report) => {
                txn.commit()?;
                tracing::info!(
                    "Committed {} of {} rows ({} skipped, {} failed, {} unmatched)",
                    report.written(),
                    report.rows(),
                    report.skipped(),
                    report.failed(),
                    report.unmatched()
                );
                Ok(report)
            }
            Err(e) => {
                tracing::warn!("Load failed, rolling back: {}", e);
                if let Err(rollback_err) = txn.rollback() {
                    tracing::error!("Rollback failed: {}", rollback_err);
                }
                Err(match e {
                    LoaderError::TransactionError(_) => e,
                    other => LoaderError::TransactionError(other.to_string()),
                })
            }
        }
    }
}

fn run_phases<T: GraphTxn>(
    txn: &mut T,
    dataset: &Dataset,
    progress_interval: usize,
) -> Result<LoadReport, LoaderError> {
    let mut router = UpsertRouter::new(txn).with_progress_interval(progress_interval);

    let books = router.upsert_books(&dataset.books)?;
    let tags = router.upsert_tags(&dataset.tags)?;
    let book_tags = router.link_book_tags(&dataset.book_tags)?;

    Ok(LoadReport {
        books,
        tags,
        book_tags,
    })
}

// =============================================================================
// TESTS
// =============================================================================
