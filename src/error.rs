//! Error types for rtlgen
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can occur in rtlgen
#[derive(Debug, Error)]
pub enum RtlgenError {
    /// LLM API error
    #[error("LLM error: {0}")]
    Llm(String),

    /// Embedding API error
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Transport failure talking to the remote validation service
    #[error("Transport error: {0}")]
    Transport(String),

    /// Malformed request or response on the tool service boundary
    #[error("Service error: {0}")]
    Service(String),

    /// Test-case discovery error
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// Design store error
    #[error("Store error: {0}")]
    Store(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for rtlgen operations
pub type Result<T> = std::result::Result<T, RtlgenError>;
