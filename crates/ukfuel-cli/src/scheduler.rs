//! Periodic refresh job.
//!
//! The job only knows about [`RefreshTrigger`]; it never touches the feed or
//! the entities directly.

use std::sync::Arc;
use std::time::Duration;

use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use ukfuel_tracker::RefreshTrigger;

/// Builds and starts a scheduler that calls `trigger` every `every`.
///
/// The returned handle must be kept alive; dropping it stops the job.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// the job cannot be registered, or the scheduler fails to start.
pub(crate) async fn build_scheduler<T>(
    trigger: Arc<T>,
    every: Duration,
) -> Result<JobScheduler, JobSchedulerError>
where
    T: RefreshTrigger + 'static,
{
    let scheduler = JobScheduler::new().await?;
    register_refresh_job(&scheduler, trigger, every).await?;
    scheduler.start().await?;
    Ok(scheduler)
}

async fn register_refresh_job<T>(
    scheduler: &JobScheduler,
    trigger: Arc<T>,
    every: Duration,
) -> Result<(), JobSchedulerError>
where
    T: RefreshTrigger + 'static,
{
    let job = Job::new_repeated_async(every, move |_uuid, _lock| {
        let trigger = Arc::clone(&trigger);

        Box::pin(async move {
            tracing::info!("scheduler: starting price refresh");
            let summary = trigger.refresh_now().await;
            tracing::info!(
                cycle_ok = summary.cycle_ok,
                available = summary.available,
                unavailable = summary.unavailable,
                "scheduler: price refresh complete"
            );
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
pub(crate) async fn shutdown_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        let mut terminate =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result?,
            _ = terminate.recv() => {},
        }
    }

    #[cfg(not(unix))]
    tokio::signal::ctrl_c().await?;

    tracing::info!("received shutdown signal, stopping scheduler");
    Ok(())
}
