//! HTTP scrape endpoint.
//!
//! Single fixed route, `GET /metrics` on port 8080 — neither is
//! configurable. No auth, no TLS; an external collector pulls the
//! current snapshot.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info};

use crate::metrics::ScoreMetrics;

pub const LISTEN_PORT: u16 = 8080;

const TEXT_FORMAT: &str = "text/plain; version=0.0.4";

pub fn router(metrics: Arc<ScoreMetrics>) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metrics)
}

async fn metrics_handler(State(metrics): State<Arc<ScoreMetrics>>) -> impl IntoResponse {
    match metrics.render() {
        Ok(body) => ([(header::CONTENT_TYPE, TEXT_FORMAT)], body).into_response(),
        Err(e) => {
            error!("Failed to encode metrics: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Serve until ctrl-c, then signal the refresh workers and drain.
pub async fn run(metrics: Arc<ScoreMetrics>, shutdown: watch::Sender<bool>) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], LISTEN_PORT));
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on {addr} — scrape endpoint at /metrics");

    axum::serve(listener, router(metrics))
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received — stopping refresh workers");
            let _ = shutdown.send(true);
        })
        .await?;
    Ok(())
}
