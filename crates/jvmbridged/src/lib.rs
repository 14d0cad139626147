//! jvmbridged — HTTP exporter for runtime counters.
//!
//! Assembles an introspection source, registers the runtime series into a
//! [`GaugeRegistry`], and serves them.
//!
//! # Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/metrics` | Prometheus exposition |
//! | GET | `/api/v1/samples` | Current samples as JSON |
//! | GET | `/healthz` | Liveness |

pub mod cli;
pub mod demo;
pub mod source;

use std::time::Duration;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum::response::IntoResponse;
use axum::routing::get;
use tokio::task::JoinError;
use tracing::warn;

use jvmbridge_metrics::{GaugeRegistry, Sample, render_prometheus};

/// Shared state for exporter handlers.
#[derive(Clone)]
pub struct ExporterState {
    pub registry: GaugeRegistry,
}

/// Build the exporter router.
pub fn build_router(registry: GaugeRegistry) -> Router {
    Router::new()
        .route("/metrics", get(prometheus_metrics))
        .route("/api/v1/samples", get(list_samples))
        .route("/healthz", get(healthz))
        .with_state(ExporterState { registry })
}

/// Invoke every gauge on the blocking pool.
///
/// Gauges read files and take locks, so they stay off the async workers.
pub async fn scrape(registry: &GaugeRegistry) -> Result<Vec<Sample>, JoinError> {
    let registry = registry.clone();
    tokio::task::spawn_blocking(move || registry.sample()).await
}

/// Render one exposition after `window` has elapsed.
///
/// The CPU gauge reads against the baseline taken at registration, so the
/// window is the interval its value covers.
pub async fn render_after(registry: &GaugeRegistry, window: Duration) -> anyhow::Result<String> {
    tokio::time::sleep(window).await;
    Ok(render_prometheus(&scrape(registry).await?))
}

pub async fn prometheus_metrics(State(state): State<ExporterState>) -> impl IntoResponse {
    match scrape(&state.registry).await {
        Ok(samples) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            render_prometheus(&samples),
        )
            .into_response(),
        Err(e) => {
            warn!(error = %e, "scrape task failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub async fn list_samples(State(state): State<ExporterState>) -> impl IntoResponse {
    match scrape(&state.registry).await {
        Ok(samples) => Json(samples).into_response(),
        Err(e) => {
            warn!(error = %e, "scrape task failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub async fn healthz() -> &'static str {
    "ok"
}
