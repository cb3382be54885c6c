//! Exponential backoff for transient fetch failures.
//!
//! Parse failures never reach this layer: the page is fetched with retries and
//! parsed once.

use std::future::Future;
use std::time::Duration;

use ukfuel_scraper::FetchError;

use crate::diagnostics::{Diagnostic, DiagnosticSink};

/// Retriable:
/// - [`FetchError::Transport`]: connection reset, DNS failure, timeout.
/// - [`FetchError::UnexpectedStatus`] with 429 or any 5xx.
///
/// Everything else (404, 403, bad URL) would fail the same way again.
fn is_retriable(err: &FetchError) -> bool {
    match err {
        FetchError::Transport(_) => true,
        FetchError::UnexpectedStatus { status, .. } => *status == 429 || *status >= 500,
        FetchError::InvalidUrl { .. } => false,
    }
}

/// Runs `operation`, retrying retriable errors up to `max_retries` extra
/// times. Sleeps `backoff_base_secs * 2^attempt` between attempts and reports
/// each retry to `sink`. Returns the last error once retries are exhausted.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    sink: &dyn DiagnosticSink,
    mut operation: F,
) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let mut attempt = 0u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if !is_retriable(&err) || attempt >= max_retries => return Err(err),
            Err(err) => err,
        };

        let delay_secs = backoff_base_secs.saturating_mul(1u64 << attempt.min(62));
        sink.record(Diagnostic::FetchRetry {
            attempt: attempt + 1,
            delay_secs,
            error: err.to_string(),
        });
        tokio::time::sleep(Duration::from_secs(delay_secs)).await;
        attempt += 1;
    }
}
