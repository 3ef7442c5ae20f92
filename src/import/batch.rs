//! Batch import aggregator.
//!
//! # Responsibilities
//! - Run every item of a batch through the retry scheduler
//! - Keep going when an item exhausts its retries
//! - Accumulate per-item outcomes into an [`ImportSummary`]
//!
//! Items run sequentially in input order, so `errors` in the summary is in
//! input order as well.

use std::fmt::Display;
use std::future::Future;
use std::time::Instant;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::RetryConfig;
use crate::import::listing::Listing;
use crate::import::sink::ListingSink;
use crate::import::summary::ImportSummary;
use crate::observability::metrics;
use crate::resilience::retries::{RetryOutcome, RetryScheduler};

type Work<'a, T, E> = Box<dyn FnMut() -> BoxFuture<'a, Result<T, E>> + Send + 'a>;

enum Task<'a, T, E> {
    Run(Work<'a, T, E>),
    Rejected(String),
}

/// One item of a batch: an identifier paired with its unit of work.
pub struct BatchItem<'a, T, E> {
    id: String,
    task: Task<'a, T, E>,
}

impl<'a, T, E> BatchItem<'a, T, E> {
    pub fn new<F, Fut>(id: impl Into<String>, mut work: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'a,
        Fut: Future<Output = Result<T, E>> + Send + 'a,
    {
        Self {
            id: id.into(),
            task: Task::Run(Box::new(move || work().boxed())),
        }
    }

    /// An item that fails without being attempted.
    pub fn rejected(id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            task: Task::Rejected(error.into()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Runs batches through a [`RetryScheduler`].
#[derive(Debug, Clone, Default)]
pub struct BatchImporter {
    scheduler: RetryScheduler,
}

impl BatchImporter {
    pub fn new(scheduler: RetryScheduler) -> Self {
        Self { scheduler }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(RetryScheduler::from_config(config))
    }

    pub fn scheduler(&self) -> &RetryScheduler {
        &self.scheduler
    }

    /// Import every item and summarize the results.
    pub async fn import<T, E>(&self, items: Vec<BatchItem<'_, T, E>>) -> ImportSummary
    where
        E: Display,
    {
        let batch_id = Uuid::new_v4();
        let span = tracing::info_span!("import_batch", batch_id = %batch_id, total = items.len());
        self.run_batch(items).instrument(span).await
    }

    async fn run_batch<T, E>(&self, items: Vec<BatchItem<'_, T, E>>) -> ImportSummary
    where
        E: Display,
    {
        let started = Instant::now();
        let mut summary = ImportSummary::new();
        tracing::info!(items = items.len(), "Batch import started");

        for item in items {
            let BatchItem { id, task } = item;
            match task {
                Task::Rejected(error) => {
                    tracing::warn!(id = %id, error = %error, "Item rejected");
                    metrics::record_item("rejected");
                    summary.record_failure(id, error, 0);
                }
                Task::Run(mut work) => match self.scheduler.run(&id, || work()).await {
                    RetryOutcome::Succeeded { attempts, .. } => {
                        metrics::record_item("imported");
                        summary.record_success(attempts);
                    }
                    RetryOutcome::Exhausted { error, attempts } => {
                        metrics::record_item("failed");
                        summary.record_failure(id, error.to_string(), attempts);
                    }
                },
            }
        }

        metrics::record_batch(started);
        tracing::info!(
            total = summary.total_listings,
            succeeded = summary.successful_imports,
            failed = summary.failed_imports,
            recovered = summary.recovered_imports,
            elapsed = ?started.elapsed(),
            "Batch import finished"
        );
        summary
    }

    /// Import listings into `sink`, keyed by MLS number.
    ///
    /// Listings that fail validation are recorded as failures with zero
    /// attempts instead of being retried.
    pub async fn import_listings<S>(&self, listings: Vec<Listing>, sink: &S) -> ImportSummary
    where
        S: ListingSink,
    {
        let items = listings
            .into_iter()
            .enumerate()
            .map(move |(index, listing)| {
                let id = if listing.mls_number.trim().is_empty() {
                    format!("#{}", index)
                } else {
                    listing.mls_number.clone()
                };

                match listing.validate() {
                    Err(e) => BatchItem::rejected(id, e.to_string()),
                    Ok(()) => BatchItem::new(id, move || {
                        let listing = listing.clone();
                        async move { sink.save(&listing).await }
                    }),
                }
            })
            .collect();

        self.import(items).await
    }
}
