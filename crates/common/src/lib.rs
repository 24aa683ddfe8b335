//! SolveWithMe Common Library
//!
//! Shared code for the SolveWithMe answer engine including:
//! - Domain models (reference questions, answers, grade levels)
//! - Embedding provider abstraction
//! - Error types and handling
//! - Configuration management
//! - Metrics and observability
//! - The pure answer pipeline stages (language, topic, synthesis, confidence, localization)

pub mod config;
pub mod context;
pub mod embeddings;
pub mod errors;
pub mod metrics;
pub mod models;

// Re-export commonly used types
pub use errors::{AppError, Result};
pub use config::AppConfig;
pub use embeddings::Embedder;
pub use models::{AnswerResult, GradeLevel};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default embedding model
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// Default embedding dimension
pub const DEFAULT_EMBEDDING_DIMENSION: usize = 384;
