//! Shared fetch-and-parse cycle.
//!
//! One [`PriceFeed`] serves every tracked entity. Each cycle fetches the page
//! once, parses it once, and publishes the result as an immutable
//! [`FeedCycle`]. A failed cycle is reported to the sink exactly once no
//! matter how many entities observe it.

use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use ukfuel_scraper::{PriceSnapshot, PriceTableFetcher, PriceTableParser, SnapshotError};

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::retry::retry_with_backoff;

/// Result of one refresh attempt.
#[derive(Debug)]
pub struct FeedCycle {
    pub attempted_at: DateTime<Utc>,
    pub outcome: Result<PriceSnapshot, SnapshotError>,
}

impl FeedCycle {
    #[must_use]
    pub fn succeeded(snapshot: PriceSnapshot) -> Self {
        Self {
            attempted_at: snapshot.retrieved_at,
            outcome: Ok(snapshot),
        }
    }

    #[must_use]
    pub fn failed(attempted_at: DateTime<Utc>, error: SnapshotError) -> Self {
        Self {
            attempted_at,
            outcome: Err(error),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> Option<&PriceSnapshot> {
        self.outcome.as_ref().ok()
    }

    #[must_use]
    pub fn timed_out(&self) -> bool {
        matches!(&self.outcome, Err(SnapshotError::Fetch(e)) if e.is_timeout())
    }

    fn is_fresh(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        let age = now
            .signed_duration_since(self.attempted_at)
            .to_std()
            .unwrap_or(Duration::ZERO);
        age < max_age
    }
}

/// Where entities get their snapshot from.
pub trait SnapshotSource: Send + Sync {
    /// The latest cycle, reused if still fresh. Runs a new cycle otherwise.
    fn current_cycle(&self) -> impl Future<Output = Arc<FeedCycle>> + Send;

    /// Always runs a new cycle, unless one finished while this call waited
    /// for an in-flight cycle to complete.
    fn refresh_cycle(&self) -> impl Future<Output = Arc<FeedCycle>> + Send;
}

pub struct PriceFeed {
    fetcher: PriceTableFetcher,
    parser: PriceTableParser,
    sink: Arc<dyn DiagnosticSink>,
    max_age: Duration,
    max_retries: u32,
    backoff_base_secs: u64,
    published: RwLock<Option<Arc<FeedCycle>>>,
    gate: Mutex<()>,
}

impl PriceFeed {
    /// Defaults: cycles are never reused (`max_age` zero) and fetches are not
    /// retried.
    #[must_use]
    pub fn new(
        fetcher: PriceTableFetcher,
        parser: PriceTableParser,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Self {
        Self {
            fetcher,
            parser,
            sink,
            max_age: Duration::ZERO,
            max_retries: 0,
            backoff_base_secs: 0,
            published: RwLock::new(None),
            gate: Mutex::new(()),
        }
    }

    /// How long a published cycle is served to callers of
    /// [`SnapshotSource::current_cycle`] before a new one is run.
    #[must_use]
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    #[must_use]
    pub fn with_retries(mut self, max_retries: u32, backoff_base_secs: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_secs = backoff_base_secs;
        self
    }

    /// The last published cycle, if any.
    #[must_use]
    pub fn latest(&self) -> Option<Arc<FeedCycle>> {
        self.published
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn fresh_cycle(&self, now: DateTime<Utc>) -> Option<Arc<FeedCycle>> {
        self.latest()
            .filter(|cycle| cycle.is_fresh(now, self.max_age))
    }

    fn publish(&self, cycle: &Arc<FeedCycle>) {
        *self
            .published
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(cycle));
    }

    async fn run_cycle(&self) -> Arc<FeedCycle> {
        let attempted_at = Utc::now();
        let html = retry_with_backoff(
            self.max_retries,
            self.backoff_base_secs,
            self.sink.as_ref(),
            || self.fetcher.fetch(),
        )
        .await;

        let outcome = html
            .map_err(SnapshotError::from)
            .and_then(|html| {
                self.parser
                    .parse(&html, attempted_at)
                    .map_err(SnapshotError::from)
            });

        let cycle = Arc::new(FeedCycle {
            attempted_at,
            outcome,
        });
        self.report(&cycle);
        self.publish(&cycle);
        cycle
    }

    fn report(&self, cycle: &FeedCycle) {
        match &cycle.outcome {
            Ok(snapshot) => {
                for rejection in &snapshot.skipped_rows {
                    self.sink.record(Diagnostic::RowSkipped {
                        row: rejection.row,
                        retailer: rejection.retailer.clone(),
                        reason: rejection.reason.clone(),
                    });
                }
                self.sink.record(Diagnostic::CycleSucceeded {
                    retrieved_at: snapshot.retrieved_at,
                    retailers: snapshot.rows.len(),
                    skipped_rows: snapshot.skipped_rows.len(),
                });
            }
            Err(error) => self.sink.record(Diagnostic::CycleFailed {
                attempted_at: cycle.attempted_at,
                error: error.to_string(),
                timed_out: cycle.timed_out(),
            }),
        }
    }
}

impl SnapshotSource for PriceFeed {
    async fn current_cycle(&self) -> Arc<FeedCycle> {
        if let Some(cycle) = self.fresh_cycle(Utc::now()) {
            return cycle;
        }
        let _gate = self.gate.lock().await;
        // Another caller may have published while we waited.
        if let Some(cycle) = self.fresh_cycle(Utc::now()) {
            return cycle;
        }
        self.run_cycle().await
    }

    async fn refresh_cycle(&self) -> Arc<FeedCycle> {
        let requested_at = Utc::now();
        let _gate = self.gate.lock().await;
        if let Some(cycle) = self.latest().filter(|c| c.attempted_at > requested_at) {
            return cycle;
        }
        self.run_cycle().await
    }
}
