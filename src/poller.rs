//! Per-subscription refresh worker.
//!
//! Each discovered subscription gets one task owning its own interval
//! timer: an immediate refresh on startup, then one every five
//! minutes. A failed cycle is retried with doubling backoff and, if
//! still failing, logged and counted — it never takes down the other
//! workers or the endpoint, and previously written gauges keep
//! serving until the next successful cycle.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time;
use tracing::{error, info, warn};

use crate::azure::secure_scores::SecureScoresClient;
use crate::azure::FetchError;
use crate::metrics::ScoreMetrics;

pub const REFRESH_INTERVAL: Duration = Duration::from_secs(5 * 60);

const RETRY_ATTEMPTS: u32 = 3;
const RETRY_INITIAL_DELAY: Duration = Duration::from_secs(2);

/// Run one subscription's refresh loop until shutdown is signalled.
pub async fn run_worker(
    client: SecureScoresClient,
    display_name: String,
    metrics: Arc<ScoreMetrics>,
    mut shutdown: watch::Receiver<bool>,
) {
    info!(subscription = %display_name, "Refresh worker starting — initial refresh");
    if let Err(e) = refresh_with_retry(&client, &display_name, &metrics).await {
        error!(subscription = %display_name, "Initial refresh failed: {e}");
        metrics.inc_refresh_failure(&display_name);
    }

    let mut interval = time::interval(REFRESH_INTERVAL);
    interval.tick().await; // Skip the immediate tick (we already ran)

    loop {
        tokio::select! {
            _ = interval.tick() => {
                if let Err(e) = refresh_with_retry(&client, &display_name, &metrics).await {
                    error!(subscription = %display_name, "Scheduled refresh failed: {e}");
                    metrics.inc_refresh_failure(&display_name);
                }
            }
            _ = shutdown.changed() => {
                info!(subscription = %display_name, "Refresh worker stopping");
                return;
            }
        }
    }
}

/// One refresh cycle with in-cycle retries: up to three attempts with
/// doubling backoff before the cycle is declared failed.
pub async fn refresh_with_retry(
    client: &SecureScoresClient,
    display_name: &str,
    metrics: &ScoreMetrics,
) -> Result<(), FetchError> {
    let mut delay = RETRY_INITIAL_DELAY;
    let mut attempt = 1;
    loop {
        match refresh(client, display_name, metrics).await {
            Ok(()) => return Ok(()),
            Err(e) if attempt < RETRY_ATTEMPTS => {
                warn!(
                    subscription = %display_name,
                    attempt,
                    retry_in_secs = delay.as_secs(),
                    "Refresh attempt failed: {e}"
                );
                time::sleep(delay).await;
                delay *= 2;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Fetch every secure score page for the bound subscription and write
/// both gauges under its display name. Values are passed through
/// exactly as the API reports them.
pub async fn refresh(
    client: &SecureScoresClient,
    display_name: &str,
    metrics: &ScoreMetrics,
) -> Result<(), FetchError> {
    let items = client.list_all().await?;
    for item in items {
        let score = &item.properties.score;
        info!(
            subscription = %display_name,
            current = score.current,
            percentage = score.percentage,
            "Secure score sample"
        );
        metrics.set_point(display_name, score.current);
        metrics.set_percentage(display_name, score.percentage);
    }
    Ok(())
}
