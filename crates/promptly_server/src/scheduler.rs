//! Scheduled-send poller.
//!
//! Periodically claims due deliveries and hands them to the dispatcher. The
//! claim flips `scheduled` rows to `sent` in a single statement, so a row is
//! executed at most once even if multiple server instances poll.

use crate::dispatch::Dispatcher;
use crate::error::ApiError;
use chrono::Utc;
use promptly_database::Store;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Poll forever at the configured interval.
pub async fn run_scheduler(dispatcher: Dispatcher, store: Arc<dyn Store>, interval_secs: u64) {
    if interval_secs == 0 {
        info!("Scheduler disabled");
        return;
    }
    info!(interval_secs, "Scheduler started");
    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        match run_once(&dispatcher, store.as_ref()).await {
            Ok(0) => {}
            Ok(count) => debug!(count, "Scheduler tick executed deliveries"),
            Err(error) => warn!(error = %error, "Scheduler tick failed"),
        }
    }
}

/// One poll: claim everything due and execute each claimed delivery.
///
/// Individual execution failures are logged and do not abort the tick; the
/// failed rows are already marked by the dispatcher.
///
/// # Errors
///
/// Returns an error only when the claim itself fails.
pub async fn run_once(dispatcher: &Dispatcher, store: &dyn Store) -> Result<usize, ApiError> {
    let claimed = store.claim_due_deliveries(Utc::now()).await?;
    let count = claimed.len();
    for delivery in &claimed {
        if let Err(error) = dispatcher.execute_claimed(delivery).await {
            warn!(delivery_id = %delivery.id, error = %error, "Scheduled delivery failed");
        }
    }
    Ok(count)
}
