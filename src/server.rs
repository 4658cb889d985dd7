use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use tracing::info;

use crate::metrics::{self, MetricsSink};
use crate::worker::WorkerClient;

/// Shared state for the ops endpoints.
pub struct OpsState {
    handle: PrometheusHandle,
    worker: WorkerClient,
    started: Instant,
}

impl OpsState {
    pub fn new(handle: PrometheusHandle, worker: WorkerClient) -> Self {
        Self {
            handle,
            worker,
            started: Instant::now(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    worker: &'static str,
    timestamp: String,
    uptime_seconds: f64,
}

fn router(state: Arc<OpsState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(render_metrics))
        .with_state(state)
}

/// Serve `/health` and `/metrics` until ctrl-c. Also keeps the uptime gauge
/// fresh in the background.
pub async fn run(bind_addr: &str, state: OpsState, sink: Arc<dyn MetricsSink>) -> Result<()> {
    let state = Arc::new(state);

    let started = state.started;
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(Duration::from_secs(5));
        loop {
            tick.tick().await;
            sink.set_gauge(metrics::UPTIME_SECONDS, started.elapsed().as_secs_f64(), &[]);
        }
    });

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("Failed to bind ops server to {bind_addr}"))?;

    info!("Ops server listening on http://{bind_addr}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("Ops server error")?;

    Ok(())
}

async fn health(State(state): State<Arc<OpsState>>) -> Json<HealthResponse> {
    let worker_up = state.worker.check_health().await;

    Json(HealthResponse {
        status: "healthy",
        service: "clipbot",
        worker: if worker_up { "up" } else { "down" },
        timestamp: chrono::Utc::now().to_rfc3339(),
        uptime_seconds: state.started.elapsed().as_secs_f64(),
    })
}

async fn render_metrics(State(state): State<Arc<OpsState>>) -> String {
    state.handle.render()
}
