//! Wire types for the tool service.
//!
//! Uses JSON Lines (newline-delimited JSON) over a TCP stream. The schema
//! carries familiar field names (id, method, params, result, error) but
//! does NOT implement JSON-RPC 2.0.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Method name of the compile-and-simulate operation.
pub const RUN_TESTS_METHOD: &str = "run_tests";

/// Request sent from a validator client to the tool service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolRequest {
    /// Unique request ID for correlating responses.
    pub id: u64,
    /// Method name.
    pub method: String,
    /// Method parameters as JSON value.
    #[serde(default)]
    pub params: Value,
}

impl ToolRequest {
    /// Create a new request with the given method and params.
    pub fn new(id: u64, method: impl Into<String>, params: Value) -> Self {
        Self {
            id,
            method: method.into(),
            params,
        }
    }
}

/// Response sent from the tool service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResponse {
    /// Request ID this response corresponds to.
    pub id: u64,
    /// Result value on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error details on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ToolError>,
}

impl ToolResponse {
    /// Create a success response.
    pub fn success(id: u64, result: Value) -> Self {
        Self {
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(id: u64, error: ToolError) -> Self {
        Self {
            id,
            result: None,
            error: Some(error),
        }
    }

    /// Check if this response indicates success.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Error details in a tool service response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolError {
    /// Error code.
    pub code: i32,
    /// Human-readable error message.
    pub message: String,
}

impl ToolError {
    /// Create a new error.
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Parse error (-32700).
    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::new(codes::PARSE_ERROR, message)
    }

    /// Method not found error (-32601).
    pub fn method_not_found(method: impl Into<String>) -> Self {
        Self::new(
            codes::METHOD_NOT_FOUND,
            format!("Unknown method: {}", method.into()),
        )
    }

    /// Invalid params error (-32602).
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(codes::INVALID_PARAMS, message)
    }

    /// Internal error (-32603).
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(codes::INTERNAL_ERROR, message)
    }
}

/// Error codes for tool service responses.
pub mod codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
}

/// Parameters of a `run_tests` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunTestsParams {
    pub working_dir: PathBuf,
}

/// Result of a `run_tests` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunTestsResult {
    pub success: bool,
    pub output: String,
}
