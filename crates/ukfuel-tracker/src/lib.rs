//! Tracked (retailer, fuel type) entities and the shared refresh cycle that
//! feeds them.

pub mod diagnostics;
pub mod entity;
pub mod error;
pub mod feed;
mod retry;
pub mod tracker;

pub use diagnostics::{Diagnostic, DiagnosticSink, RecordingSink, TracingSink};
pub use entity::{
    EntityState, EntityStatus, EntityView, MissReason, RefreshOutcome, TrackedPriceEntity,
};
pub use error::TrackerError;
pub use feed::{FeedCycle, PriceFeed, SnapshotSource};
pub use tracker::{RefreshSummary, RefreshTrigger, Tracker};
