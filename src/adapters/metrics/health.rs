//! Monitoring HTTP server.
//!
//! Serves three endpoints on the configured bind address:
//! - `/metrics`: Prometheus text exposition
//! - `/live`: always 200 while the process runs
//! - `/ready`: 200 once both feeds are subscribed, 503 otherwise

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use tokio::sync::watch;
use tracing::info;

use super::prometheus::MetricsRegistry;

#[derive(Clone)]
struct MonitorState {
    metrics: Arc<MetricsRegistry>,
    ready: watch::Receiver<bool>,
}

/// Serve the monitoring endpoints until the process exits.
pub async fn serve(
    bind_address: String,
    metrics: Arc<MetricsRegistry>,
    ready: watch::Receiver<bool>,
) -> Result<()> {
    let state = MonitorState { metrics, ready };
    let app = Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/live", get(live_handler))
        .route("/ready", get(ready_handler))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("binding monitoring server to {bind_address}"))?;
    info!(%bind_address, "monitoring server listening");

    axum::serve(listener, app)
        .await
        .context("monitoring server failed")
}

async fn metrics_handler(State(state): State<MonitorState>) -> (StatusCode, String) {
    match state.metrics.render() {
        Ok(body) => (StatusCode::OK, body),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

async fn live_handler() -> StatusCode {
    StatusCode::OK
}

async fn ready_handler(State(state): State<MonitorState>) -> StatusCode {
    if *state.ready.borrow() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
