//! Background scheduler for the daily recurring transaction job.
//!
//! Replaces the external cron trigger for deployments that run nothing but
//! this server. The job is idempotent, so overlap with an external trigger
//! (or a restart mid-day) only produces skips, never duplicates.

use std::sync::Arc;

use tokio::time::{interval, Duration};
use tracing::{error, info};

use crate::main_lib::AppState;

/// Generation interval: once per day.
const GENERATION_INTERVAL_SECS: u64 = 24 * 60 * 60;

/// Initial delay before the first run (60 seconds to let the server fully
/// start).
const INITIAL_DELAY_SECS: u64 = 60;

/// Starts the background generation scheduler.
pub fn start_generation_scheduler(state: Arc<AppState>) {
    tokio::spawn(async move {
        info!("Recurring generation scheduler started (daily interval)");

        tokio::time::sleep(Duration::from_secs(INITIAL_DELAY_SECS)).await;

        // First tick fires immediately, subsequent ticks are a day apart.
        let mut tick = interval(Duration::from_secs(GENERATION_INTERVAL_SECS));

        loop {
            tick.tick().await;
            run_scheduled_generation(&state).await;
        }
    });
}

/// Runs a single scheduled generation pass for today (UTC).
async fn run_scheduled_generation(state: &Arc<AppState>) {
    let today = chrono::Utc::now().date_naive();
    info!("Running scheduled recurring generation for {}", today);

    match state.generation_service.run_for_date(today).await {
        Ok(report) => {
            info!(
                "Scheduled generation completed: {} generated, {} skipped, {} failed (of {} rules)",
                report.generated, report.skipped, report.failed, report.processed
            );
        }
        Err(e) => {
            error!("Scheduled generation failed: {}", e);
        }
    }
}
