//! Corpus record sources: the built-in seed corpus and JSON corpus files

use solvewithme_common::config::CorpusConfig;
use solvewithme_common::errors::{AppError, Result};
use solvewithme_common::models::CorpusRecord;
use std::path::Path;
use tracing::info;

const SEED_CORPUS: &str = include_str!("../data/corpus.json");

/// Built-in WAEC/JAMB sample corpus
pub fn default_records() -> Result<Vec<CorpusRecord>> {
    parse_records(SEED_CORPUS)
}

/// Parse a JSON array of corpus records
pub fn parse_records(json: &str) -> Result<Vec<CorpusRecord>> {
    serde_json::from_str(json).map_err(|e| AppError::Load {
        message: format!("invalid corpus JSON: {}", e),
    })
}

/// Read corpus records from a JSON file
pub async fn load_records_from_file(path: impl AsRef<Path>) -> Result<Vec<CorpusRecord>> {
    let path = path.as_ref();
    let json = tokio::fs::read_to_string(path).await.map_err(|e| AppError::Load {
        message: format!("cannot read corpus file {}: {}", path.display(), e),
    })?;

    let records = parse_records(&json)?;
    info!(path = %path.display(), records = records.len(), "Corpus file read");
    Ok(records)
}

/// Records from the configured corpus file, or the seed corpus when none is set
pub async fn configured_records(config: &CorpusConfig) -> Result<Vec<CorpusRecord>> {
    match &config.path {
        Some(path) => load_records_from_file(path).await,
        None => default_records(),
    }
}
