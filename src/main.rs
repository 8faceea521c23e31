use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::watch;
use tracing::{info, warn};

use secure_score_exporter::auth::Credential;
use secure_score_exporter::azure::secure_scores::SecureScoresClient;
use secure_score_exporter::azure::subscriptions::SubscriptionsClient;
use secure_score_exporter::metrics::ScoreMetrics;
use secure_score_exporter::{discovery, poller, server};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing (structured logs)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "secure_score_exporter=info".into()),
        )
        .with_target(false)
        .init();

    info!("Azure secure score exporter v{}", env!("CARGO_PKG_VERSION"));

    // ── Credential gate ─────────────────────────────────────────────
    // Acquire a token up front so a bad service principal fails the
    // process before anything is served.
    let credential =
        Arc::new(Credential::from_env().context("Failed to load Azure credentials")?);
    credential
        .token()
        .await
        .context("Failed to acquire initial ARM token")?;

    // ── Subscription discovery (once, before anything else) ─────────
    let subscriptions_client = SubscriptionsClient::new(Arc::clone(&credential));
    let directory = discovery::discover(&subscriptions_client).await?;
    if directory.is_empty() {
        warn!("No subscriptions visible to this credential — nothing to export");
    }

    let score_metrics = Arc::new(ScoreMetrics::new().context("Failed to build metrics registry")?);

    // ── One refresh worker per subscription ─────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    for (subscription_id, display_name) in &directory {
        let client = SecureScoresClient::new(Arc::clone(&credential), subscription_id.clone());
        let worker_metrics = Arc::clone(&score_metrics);
        let name = display_name.clone();
        let rx = shutdown_rx.clone();
        tokio::spawn(async move {
            poller::run_worker(client, name, worker_metrics, rx).await;
        });
    }
    drop(shutdown_rx);

    info!(subscriptions = directory.len(), "All refresh workers started");

    // ── Scrape endpoint ─────────────────────────────────────────────
    server::run(score_metrics, shutdown_tx).await
}
