//! Health check handlers

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use solvewithme_search::SnapshotStatus;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct ReadyResponse {
    pub status: String,
    pub corpus: SnapshotStatus,
}

/// Liveness check - always returns healthy if server is running
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: solvewithme_common::VERSION.to_string(),
        timestamp: Utc::now(),
    })
}

/// Readiness check - reports the published corpus snapshot.
///
/// An unbuilt index still serves answers, only without retrieval, so it is
/// reported as degraded rather than not ready.
pub async fn ready(State(state): State<AppState>) -> Json<ReadyResponse> {
    let corpus = state.engine.status().await;

    Json(ReadyResponse {
        status: if corpus.index_built { "ready" } else { "degraded" }.to_string(),
        corpus,
    })
}
