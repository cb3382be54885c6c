//! The set of tracked entities and the refresh trigger that drives them.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use tokio::sync::Mutex;
use ukfuel_core::TrackedPair;

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::entity::{EntityView, RefreshOutcome, TrackedPriceEntity};
use crate::error::TrackerError;
use crate::feed::SnapshotSource;

/// Outcome counts for one triggered refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshSummary {
    pub attempted_at: DateTime<Utc>,
    pub cycle_ok: bool,
    pub available: usize,
    pub unavailable: usize,
}

/// "Refresh now", as seen by whatever decides when refreshes happen.
pub trait RefreshTrigger: Send + Sync {
    fn refresh_now(&self) -> impl Future<Output = RefreshSummary> + Send;
}

/// An entity and its id. The id never changes, so it lives outside the lock.
struct EntitySlot {
    unique_id: String,
    entity: Mutex<TrackedPriceEntity>,
}

impl EntitySlot {
    fn new(entity: TrackedPriceEntity) -> Self {
        Self {
            unique_id: entity.unique_id().to_string(),
            entity: Mutex::new(entity),
        }
    }
}

pub struct Tracker<S> {
    source: S,
    sink: Arc<dyn DiagnosticSink>,
    entities: Vec<EntitySlot>,
}

impl<S: SnapshotSource> Tracker<S> {
    #[must_use]
    pub fn new(
        source: S,
        sink: Arc<dyn DiagnosticSink>,
        entities: Vec<TrackedPriceEntity>,
    ) -> Self {
        Self {
            source,
            sink,
            entities: entities.into_iter().map(EntitySlot::new).collect(),
        }
    }

    /// # Errors
    ///
    /// Returns [`TrackerError`] for the first pair with a blank field.
    pub fn from_pairs(
        source: S,
        sink: Arc<dyn DiagnosticSink>,
        pairs: &[TrackedPair],
    ) -> Result<Self, TrackerError> {
        let entities = pairs
            .iter()
            .map(TrackedPriceEntity::from_pair)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(source, sink, entities))
    }

    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub async fn views(&self) -> Vec<EntityView> {
        join_all(
            self.entities
                .iter()
                .map(|slot| async { slot.entity.lock().await.view() }),
        )
        .await
    }

    /// Refreshes one entity on its own, reusing the published cycle if it is
    /// still fresh. Returns `None` for an unknown id.
    ///
    /// The entity is locked only for the synchronous apply, never across the
    /// wait for the cycle.
    pub async fn refresh_entity(&self, unique_id: &str) -> Option<RefreshOutcome> {
        let slot = self.entities.iter().find(|s| s.unique_id == unique_id)?;
        let cycle = self.source.current_cycle().await;
        let outcome = slot.entity.lock().await.apply(&cycle);
        self.report_miss(&slot.unique_id, outcome);
        Some(outcome)
    }

    fn report_miss(&self, unique_id: &str, outcome: RefreshOutcome) {
        if let RefreshOutcome::Missed(reason) = outcome {
            self.sink.record(Diagnostic::LookupMissed {
                entity: unique_id.to_string(),
                reason,
            });
        }
    }
}

impl<S: SnapshotSource> RefreshTrigger for Tracker<S> {
    /// Runs one cycle and applies it to every entity. The network wait
    /// happens before any entity is touched.
    async fn refresh_now(&self) -> RefreshSummary {
        let cycle = self.source.refresh_cycle().await;

        let outcomes = join_all(self.entities.iter().map(|slot| {
            let cycle = Arc::clone(&cycle);
            async move {
                let outcome = slot.entity.lock().await.apply(&cycle);
                (slot.unique_id.as_str(), outcome)
            }
        }))
        .await;

        let mut summary = RefreshSummary {
            attempted_at: cycle.attempted_at,
            cycle_ok: cycle.snapshot().is_some(),
            available: 0,
            unavailable: 0,
        };
        for (unique_id, outcome) in outcomes {
            if matches!(outcome, RefreshOutcome::Updated(_)) {
                summary.available += 1;
            } else {
                summary.unavailable += 1;
            }
            self.report_miss(unique_id, outcome);
        }
        summary
    }
}
