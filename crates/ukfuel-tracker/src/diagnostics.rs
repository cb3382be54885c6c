//! Diagnostic reporting.
//!
//! Components receive an `Arc<dyn DiagnosticSink>` at construction instead of
//! logging through process-wide state. [`TracingSink`] forwards to `tracing`;
//! [`RecordingSink`] keeps events in memory for assertions.

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};

use crate::entity::MissReason;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A fetch+parse cycle failed. Reported once per cycle.
    CycleFailed {
        attempted_at: DateTime<Utc>,
        error: String,
        timed_out: bool,
    },
    CycleSucceeded {
        retrieved_at: DateTime<Utc>,
        retailers: usize,
        skipped_rows: usize,
    },
    /// The parser dropped a data row.
    RowSkipped {
        row: usize,
        retailer: String,
        reason: String,
    },
    /// A transient fetch failure is about to be retried.
    FetchRetry {
        attempt: u32,
        delay_secs: u64,
        error: String,
    },
    /// A tracked pair was absent from a valid snapshot. Expected; not an error.
    LookupMissed { entity: String, reason: MissReason },
}

impl Diagnostic {
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Diagnostic::CycleFailed { .. })
    }
}

pub trait DiagnosticSink: Send + Sync {
    fn record(&self, diagnostic: Diagnostic);
}

/// Emits each diagnostic as a structured `tracing` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&self, diagnostic: Diagnostic) {
        match diagnostic {
            Diagnostic::CycleFailed {
                attempted_at,
                error,
                timed_out,
            } => {
                tracing::error!(%attempted_at, timed_out, %error, "price feed: refresh cycle failed");
            }
            Diagnostic::CycleSucceeded {
                retrieved_at,
                retailers,
                skipped_rows,
            } => {
                tracing::info!(%retrieved_at, retailers, skipped_rows, "price feed: snapshot published");
            }
            Diagnostic::RowSkipped {
                row,
                retailer,
                reason,
            } => {
                tracing::warn!(row, %retailer, %reason, "price feed: skipped table row");
            }
            Diagnostic::FetchRetry {
                attempt,
                delay_secs,
                error,
            } => {
                tracing::warn!(attempt, delay_secs, %error, "price feed: transient fetch error, retrying after backoff");
            }
            Diagnostic::LookupMissed { entity, reason } => {
                tracing::debug!(%entity, ?reason, "tracker: pair not in snapshot");
            }
        }
    }
}

/// Keeps every diagnostic in memory, in order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<Diagnostic>>,
}

impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> Vec<Diagnostic> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn errors(&self) -> Vec<Diagnostic> {
        self.events()
            .into_iter()
            .filter(Diagnostic::is_error)
            .collect()
    }
}

impl DiagnosticSink for RecordingSink {
    fn record(&self, diagnostic: Diagnostic) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_sink_keeps_order_and_filters_errors() {
        let sink = RecordingSink::new();
        sink.record(Diagnostic::LookupMissed {
            entity: "uk_fuel_prices-asda-diesel".into(),
            reason: MissReason::RetailerAbsent,
        });
        sink.record(Diagnostic::CycleFailed {
            attempted_at: Utc::now(),
            error: "boom".into(),
            timed_out: false,
        });
        assert_eq!(sink.events().len(), 2);
        assert_eq!(sink.errors().len(), 1);
        assert!(sink.errors()[0].is_error());
    }
}
