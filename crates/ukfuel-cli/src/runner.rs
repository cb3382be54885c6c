//! Command handlers.
//!
//! These build the fetcher, parser, feed and tracker from configuration and
//! hand them to the library crates. Per-entity failures never surface here;
//! only configuration and setup errors are returned.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use ukfuel_core::{fuel_type_info, load_tracking, AppConfig, TrackingFile};
use ukfuel_scraper::{PriceTableFetcher, PriceTableParser, TableLayout, TablePath};
use ukfuel_tracker::{
    DiagnosticSink, PriceFeed, RefreshTrigger, TrackedPriceEntity, Tracker, TracingSink,
};

use crate::scheduler;

/// Table layout with any configured overrides applied.
pub(crate) fn build_layout(config: &AppConfig) -> anyhow::Result<TableLayout> {
    let mut layout = TableLayout::gov_uk_v1();
    if let Some(raw) = &config.table_path {
        let path = raw
            .parse::<TablePath>()
            .context("UKFUEL_TABLE_PATH is not a usable table path")?;
        layout = layout.with_path(path);
    }
    if config.location_column {
        layout = layout.with_location_column();
    }
    Ok(layout)
}

pub(crate) fn build_parser(config: &AppConfig) -> anyhow::Result<PriceTableParser> {
    Ok(PriceTableParser::new(
        build_layout(config)?,
        config.malformed_row_policy,
    ))
}

fn build_fetcher(config: &AppConfig) -> anyhow::Result<PriceTableFetcher> {
    Ok(PriceTableFetcher::new(
        &config.source_url,
        config.request_timeout_secs,
        &config.user_agent,
    )?)
}

fn load_tracking_file(config: &AppConfig) -> anyhow::Result<TrackingFile> {
    load_tracking(&config.tracking_path).with_context(|| {
        format!(
            "failed to load tracking file {}",
            config.tracking_path.display()
        )
    })
}

fn build_tracker(
    config: &AppConfig,
    tracking: &TrackingFile,
    max_age: Duration,
) -> anyhow::Result<Tracker<PriceFeed>> {
    let sink: Arc<dyn DiagnosticSink> = Arc::new(TracingSink);
    let feed = PriceFeed::new(build_fetcher(config)?, build_parser(config)?, Arc::clone(&sink))
        .with_max_age(max_age)
        .with_retries(config.max_retries, config.retry_backoff_base_secs);
    Ok(Tracker::from_pairs(feed, sink, &tracking.tracked_pairs())?)
}

/// Refreshes every tracked pair once and prints the entity views.
pub(crate) async fn run_once(config: &AppConfig) -> anyhow::Result<()> {
    let tracking = load_tracking_file(config)?;
    let tracker = build_tracker(config, &tracking, tracking.update_interval())?;

    let summary = tracker.refresh_now().await;
    tracing::info!(
        cycle_ok = summary.cycle_ok,
        available = summary.available,
        unavailable = summary.unavailable,
        "refresh complete"
    );

    println!("{}", serde_json::to_string_pretty(&tracker.views().await)?);
    Ok(())
}

/// Refreshes immediately, then on every interval tick until Ctrl-C or
/// SIGTERM.
pub(crate) async fn run_watch(
    config: &AppConfig,
    interval_hours: Option<u32>,
) -> anyhow::Result<()> {
    let tracking = load_tracking_file(config)?;
    let interval = interval_hours.map_or_else(
        || tracking.update_interval(),
        |hours| Duration::from_secs(u64::from(hours) * 3600),
    );
    let tracker = Arc::new(build_tracker(config, &tracking, interval)?);
    tracing::info!(
        entities = tracker.len(),
        interval_secs = interval.as_secs(),
        "watching fuel prices"
    );

    let mut scheduler = scheduler::build_scheduler(Arc::clone(&tracker), interval).await?;
    tracker.refresh_now().await;

    scheduler::shutdown_signal().await?;
    scheduler.shutdown().await?;
    Ok(())
}

/// Fetches and parses the table once and prints the snapshot.
pub(crate) async fn run_snapshot(config: &AppConfig) -> anyhow::Result<()> {
    let fetcher = build_fetcher(config)?;
    let parser = build_parser(config)?;

    tracing::info!(
        url = fetcher.url(),
        layout = %parser.layout().version,
        "fetching price table"
    );
    let html = fetcher.fetch().await?;
    let snapshot = parser
        .parse(&html, Utc::now())
        .with_context(|| format!("failed to parse price table from {}", fetcher.url()))?;
    for rejection in &snapshot.skipped_rows {
        tracing::warn!(
            row = rejection.row,
            retailer = %rejection.retailer,
            reason = %rejection.reason,
            "skipped table row"
        );
    }

    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

/// Loads and validates configuration, then lists what would be tracked.
pub(crate) fn run_check_config(config: &AppConfig) -> anyhow::Result<()> {
    let layout = build_layout(config)?;
    let tracking = load_tracking_file(config)?;
    let pairs = tracking.tracked_pairs();

    println!("source:   {}", config.source_url);
    println!("layout:   {} at {}", layout.version, layout.path);
    println!("policy:   {}", config.malformed_row_policy);
    println!("interval: {}h", tracking.update_frequency);
    println!("tracked:  {}", pairs.len());
    for pair in &pairs {
        let entity = TrackedPriceEntity::from_pair(pair)?;
        let fuel =
            fuel_type_info(entity.fuel_type()).map_or(entity.fuel_type(), |info| info.label);
        println!("  {}  ({}, {fuel})", entity.unique_id(), entity.name());
    }
    Ok(())
}
