//! HTTP API handlers.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::feed::{sofascore, AdapterOptions};
use crate::pipeline::{CycleStats, Orchestrator, RunMode};

/// Body returned when a pushed snapshot was processed.
pub const PUSH_ACCEPTED: &str = "Data received successfully";
/// Body returned when a pushed snapshot held no usable match.
pub const PUSH_REJECTED: &str = "No live match";
/// Body returned for any unknown route.
pub const NOT_A_WEBSITE: &str = "This isn't a website but an api";

/// Application state shared with handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Pipeline shared with the poll loop.
    pub orchestrator: Arc<Orchestrator>,
    /// Normalization options for pushed snapshots.
    pub options: AdapterOptions,
    /// How cycles are triggered.
    pub mode: RunMode,
}

impl AppState {
    /// Create new app state.
    pub fn new(orchestrator: Arc<Orchestrator>, options: AdapterOptions, mode: RunMode) -> Self {
        Self {
            orchestrator,
            options,
            mode,
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status: "ok".
    pub status: &'static str,
}

/// Status response.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// Service status.
    pub status: &'static str,
    /// Run mode.
    pub mode: RunMode,
    /// Aggregate counters and the last cycle.
    pub stats: CycleStats,
}

/// Health check handler - always returns 200.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

/// Status handler - returns cycle counters and the last report.
pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    let stats = state.orchestrator.stats().await;
    let status = if stats.cycles > 0 { "running" } else { "starting" };

    Json(StatusResponse {
        status,
        mode: state.mode,
        stats,
    })
}

/// Push endpoint: normalize an inbound Sofascore snapshot and run one cycle
/// before responding. Invalid JSON is treated like an empty snapshot.
pub async fn set_events(State(state): State<AppState>, body: Bytes) -> impl IntoResponse {
    let signal = sofascore::normalize_bytes(&body, &state.options);

    if signal.is_empty() {
        warn!(bytes = body.len(), "Pushed snapshot held no usable match");
        return (StatusCode::BAD_REQUEST, PUSH_REJECTED);
    }

    info!(matches = signal.len(), "Received pushed snapshot");
    state.orchestrator.run_with_signal(signal).await;

    (StatusCode::OK, PUSH_ACCEPTED)
}

/// Fallback for every other path and method.
pub async fn fallback() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        NOT_A_WEBSITE,
    )
}
