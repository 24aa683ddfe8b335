//! Metrics and observability utilities
//!
//! Provides Prometheus metrics with SLO-aligned histograms
//! and standardized naming conventions.

use metrics::{
    counter, describe_counter, describe_gauge, describe_histogram,
    gauge, histogram, Unit,
};

/// Metrics prefix for all SolveWithMe metrics
pub const METRICS_PREFIX: &str = "solvewithme";

/// SLO-aligned histogram buckets for answer latency (in seconds)
/// Targets: P50 < 50ms, P99 < 150ms
pub const LATENCY_BUCKETS: &[f64] = &[
    0.001,  // 1ms
    0.005,  // 5ms
    0.010,  // 10ms
    0.025,  // 25ms
    0.050,  // 50ms - P50 target
    0.075,  // 75ms
    0.100,  // 100ms
    0.150,  // 150ms - P99 target
    0.250,  // 250ms
    0.500,  // 500ms
    1.000,  // 1s
    2.500,  // 2.5s
    5.000,  // 5s
    10.00,  // 10s
];

/// Buckets for embedding latency (typically slower)
pub const EMBEDDING_BUCKETS: &[f64] = &[
    0.050,  // 50ms
    0.100,  // 100ms
    0.250,  // 250ms
    0.500,  // 500ms
    1.000,  // 1s
    2.000,  // 2s
    5.000,  // 5s
    10.00,  // 10s
    30.00,  // 30s
];

/// Register all metric descriptions
pub fn register_metrics() {
    // Answer metrics
    describe_counter!(
        format!("{}_answers_total", METRICS_PREFIX),
        Unit::Count,
        "Total answers produced, labelled by topic, language and outcome"
    );

    describe_histogram!(
        format!("{}_answer_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "End-to-end answer latency in seconds"
    );

    describe_histogram!(
        format!("{}_answer_confidence", METRICS_PREFIX),
        Unit::Count,
        "Confidence of produced answers"
    );

    // Retrieval metrics
    describe_histogram!(
        format!("{}_retrieval_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Neighbor retrieval latency in seconds"
    );

    describe_gauge!(
        format!("{}_retrieval_results_count", METRICS_PREFIX),
        Unit::Count,
        "Number of neighbors returned by the last retrieval"
    );

    // Embedding metrics
    describe_counter!(
        format!("{}_embedding_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total embedding provider requests"
    );

    describe_histogram!(
        format!("{}_embedding_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Embedding generation latency in seconds"
    );

    describe_counter!(
        format!("{}_embedding_errors_total", METRICS_PREFIX),
        Unit::Count,
        "Total embedding provider errors"
    );

    // Corpus metrics
    describe_gauge!(
        format!("{}_corpus_size", METRICS_PREFIX),
        Unit::Count,
        "Reference questions in the published corpus snapshot"
    );

    describe_counter!(
        format!("{}_corpus_loads_total", METRICS_PREFIX),
        Unit::Count,
        "Corpus snapshot builds, labelled by whether the index was built"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record answer metrics
pub fn record_answer(duration_secs: f64, topic: &str, language: &str, degraded: bool, confidence: f32) {
    let outcome = if degraded { "apology" } else { "answered" };

    counter!(
        format!("{}_answers_total", METRICS_PREFIX),
        "topic" => topic.to_string(),
        "language" => language.to_string(),
        "outcome" => outcome
    )
    .increment(1);

    histogram!(
        format!("{}_answer_duration_seconds", METRICS_PREFIX),
        "outcome" => outcome
    )
    .record(duration_secs);

    histogram!(
        format!("{}_answer_confidence", METRICS_PREFIX),
        "topic" => topic.to_string()
    )
    .record(confidence as f64);
}

/// Helper to record retrieval metrics
pub fn record_retrieval(duration_secs: f64, result_count: usize) {
    histogram!(
        format!("{}_retrieval_duration_seconds", METRICS_PREFIX)
    )
    .record(duration_secs);

    gauge!(
        format!("{}_retrieval_results_count", METRICS_PREFIX)
    )
    .set(result_count as f64);
}

/// Helper to record embedding metrics
pub fn record_embedding(duration_secs: f64, model: &str, batch_size: usize, success: bool) {
    let status = if success { "success" } else { "error" };

    counter!(
        format!("{}_embedding_requests_total", METRICS_PREFIX),
        "model" => model.to_string(),
        "status" => status
    )
    .increment(1);

    if success {
        histogram!(
            format!("{}_embedding_duration_seconds", METRICS_PREFIX),
            "model" => model.to_string(),
            "batch" => if batch_size > 1 { "batch" } else { "single" }
        )
        .record(duration_secs);
    } else {
        counter!(
            format!("{}_embedding_errors_total", METRICS_PREFIX),
            "model" => model.to_string()
        )
        .increment(1);
    }
}

/// Helper to record a corpus snapshot build
pub fn record_corpus_load(corpus_size: usize, index_built: bool) {
    gauge!(
        format!("{}_corpus_size", METRICS_PREFIX)
    )
    .set(corpus_size as f64);

    counter!(
        format!("{}_corpus_loads_total", METRICS_PREFIX),
        "index" => if index_built { "built" } else { "unbuilt" }
    )
    .increment(1);
}
