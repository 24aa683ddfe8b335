//! Corpus management handlers

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::AppState;
use solvewithme_common::{errors::Result, models::CorpusRecord};
use solvewithme_search::{seed::configured_records, SnapshotStatus};

/// Reload request. Without `records` the configured corpus source is re-read.
#[derive(Debug, Default, Deserialize)]
pub struct ReloadRequest {
    #[serde(default)]
    pub records: Option<Vec<CorpusRecord>>,
}

#[derive(Serialize)]
pub struct ReloadResponse {
    pub status: String,
    pub corpus: SnapshotStatus,
}

/// Rebuild and publish the corpus snapshot
pub async fn reload(
    State(state): State<AppState>,
    Json(request): Json<ReloadRequest>,
) -> Result<Json<ReloadResponse>> {
    let records = match request.records {
        Some(records) => records,
        None => configured_records(&state.config.corpus).await?,
    };

    let corpus = state.engine.reload(records).await.map_err(|e| {
        warn!(error = %e, "Corpus reload rejected, keeping current snapshot");
        e
    })?;

    info!(
        snapshot_id = %corpus.snapshot_id,
        corpus_size = corpus.corpus_size,
        index_built = corpus.index_built,
        "Corpus reloaded"
    );

    Ok(Json(ReloadResponse {
        status: "reloaded".to_string(),
        corpus,
    }))
}
