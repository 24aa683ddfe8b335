//! SolveWithMe Answer Service
//!
//! HTTP entry point for the answer engine.
//! Handles:
//! - Question answering
//! - Corpus reload
//! - Health and readiness checks
//! - Observability (logging, metrics)

mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};
use solvewithme_common::{
    config::{AppConfig, ObservabilityConfig},
    context::Synthesizer,
    embeddings::create_embedder,
    metrics::{self, EMBEDDING_BUCKETS, LATENCY_BUCKETS, METRICS_PREFIX},
    VERSION,
};
use solvewithme_context::{AnswerEngine, EngineConfig};
use solvewithme_search::{seed::configured_records, CorpusHandle, CorpusSnapshot};
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::Notify;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const CONFIDENCE_BUCKETS: &[f64] = &[0.5, 0.6, 0.7, 0.8, 0.9, 1.0];

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub engine: Arc<AnswerEngine>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Arc::new(AppConfig::load()?);

    // Initialize tracing
    init_tracing(&config.observability);

    info!(service = %config.observability.service_name, "Starting SolveWithMe Answer Service v{}", VERSION);

    // Initialize metrics
    init_metrics(&config.observability)?;

    // Embedding provider
    let embedder = create_embedder(&config.embedding).map_err(|e| {
        error!(error = %e, "Failed to create embedding provider");
        e
    })?;

    // Load and index the reference corpus
    info!(provider = %config.embedding.provider, model = %embedder.model_name(), "Loading reference corpus...");
    let records = configured_records(&config.corpus).await.map_err(|e| {
        error!(error = %e, "Failed to read reference corpus");
        e
    })?;
    let snapshot = CorpusSnapshot::build(records, embedder.clone(), config.embedding.batch_size)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to load reference corpus");
            e
        })?;

    let engine = AnswerEngine::new(
        Arc::new(CorpusHandle::new(snapshot)),
        embedder,
        Synthesizer::default(),
        EngineConfig::from(config.as_ref()),
    );

    // Create app state
    let state = AppState {
        config: config.clone(),
        engine: Arc::new(engine),
    };

    // Build the router
    let app = create_router(state);

    // Start the server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    let stop = Arc::new(Notify::new());
    let mut server = tokio::spawn({
        let stop = stop.clone();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { stop.notified().await })
            .into_future()
    });

    tokio::select! {
        result = &mut server => {
            result??;
            return Ok(());
        }
        _ = shutdown_signal() => {}
    }

    stop.notify_one();
    match tokio::time::timeout(config.shutdown_timeout(), server).await {
        Ok(result) => result??,
        Err(_) => warn!(
            timeout_secs = config.server.shutdown_timeout_secs,
            "Graceful shutdown timed out, dropping open connections"
        ),
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize the tracing subscriber. `RUST_LOG` overrides the configured level.
fn init_tracing(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    if config.json_logging {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

/// Install the Prometheus exporter and register metric descriptions
fn init_metrics(config: &ObservabilityConfig) -> Result<(), Box<dyn std::error::Error>> {
    if config.metrics_port == 0 {
        info!("Metrics exporter disabled");
        return Ok(());
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.metrics_port));
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(format!("{}_answer_duration_seconds", METRICS_PREFIX)),
            LATENCY_BUCKETS,
        )?
        .set_buckets_for_metric(
            Matcher::Full(format!("{}_retrieval_duration_seconds", METRICS_PREFIX)),
            LATENCY_BUCKETS,
        )?
        .set_buckets_for_metric(
            Matcher::Full(format!("{}_embedding_duration_seconds", METRICS_PREFIX)),
            EMBEDDING_BUCKETS,
        )?
        .set_buckets_for_metric(
            Matcher::Full(format!("{}_answer_confidence", METRICS_PREFIX)),
            CONFIDENCE_BUCKETS,
        )?
        .with_http_listener(addr)
        .install()?;

    metrics::register_metrics();
    info!(%addr, "Metrics exporter listening");
    Ok(())
}

/// Create the main application router
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    let timeout = TimeoutLayer::new(state.config.request_timeout());

    // API routes
    let api_routes = Router::new()
        .route("/answer", post(handlers::answer::answer))
        .route("/corpus/reload", post(handlers::corpus::reload));

    // Compose the app
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))
        .nest("/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(timeout)
        .layer(cors)
        .layer(request_id)
        .layer(propagate_id)
        .with_state(state)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use solvewithme_common::embeddings::HashingEmbedder;
    use solvewithme_search::seed::default_records;
    use tower::ServiceExt;

    async fn test_app() -> Router {
        let embedder = Arc::new(HashingEmbedder::new(128));
        let snapshot = CorpusSnapshot::build(default_records().unwrap(), embedder.clone(), 8)
            .await
            .unwrap();
        let config = Arc::new(AppConfig::default());
        let engine = AnswerEngine::new(
            Arc::new(CorpusHandle::new(snapshot)),
            embedder,
            Synthesizer::default(),
            EngineConfig::from(config.as_ref()),
        );

        create_router(AppState {
            config,
            engine: Arc::new(engine),
        })
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = test_app()
            .await
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        assert_eq!(json_body(response).await["status"], "healthy");
    }

    #[tokio::test]
    async fn test_ready_reports_corpus() {
        let response = test_app()
            .await
            .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let body = json_body(response).await;
        assert_eq!(body["status"], "ready");
        assert_eq!(body["corpus"]["index_built"], true);
    }

    #[tokio::test]
    async fn test_answer() {
        let response = test_app()
            .await
            .oneshot(post_json(
                "/v1/answer",
                serde_json::json!({ "question": "2x + 5 = 13", "grade_level": "SS1" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["topic"], "algebra");
        assert_eq!(body["language"], "english");
        assert!(body["confidence"].as_f64().unwrap() >= 0.5);
    }

    #[tokio::test]
    async fn test_answer_validation() {
        let app = test_app().await;

        let empty = app
            .clone()
            .oneshot(post_json("/v1/answer", serde_json::json!({ "question": "" })))
            .await
            .unwrap();
        assert_eq!(empty.status(), StatusCode::BAD_REQUEST);

        let bad_grade = app
            .oneshot(post_json(
                "/v1/answer",
                serde_json::json!({ "question": "Solve x + 1 = 2", "grade_level": "JSS1" }),
            ))
            .await
            .unwrap();
        assert_eq!(bad_grade.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_reload_rejects_invalid_records() {
        let app = test_app().await;

        let response = app
            .clone()
            .oneshot(post_json(
                "/v1/corpus/reload",
                serde_json::json!({ "records": [{ "question": "Solve x + 1 = 2", "source": "WAEC" }] }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = app
            .oneshot(post_json("/v1/corpus/reload", serde_json::json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "reloaded");
        assert_eq!(
            body["corpus"]["corpus_size"].as_u64().unwrap() as usize,
            default_records().unwrap().len()
        );
    }
}
