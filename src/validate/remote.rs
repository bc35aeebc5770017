//! Validation through the remote tool service.
//!
//! Speaks the tool service's JSON-lines protocol over a fresh TCP
//! connection per validation. A failing testbench comes back as a normal
//! failing verdict; only transport and protocol problems take the error
//! path, and even those are folded into a failing verdict so the repair
//! loop never aborts on an unreachable service.

use std::path::Path;

use async_trait::async_trait;
use serde_json::json;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use crate::error::{Result, RtlgenError};
use crate::service::messages::{RUN_TESTS_METHOD, RunTestsResult, ToolRequest, ToolResponse};
use crate::validate::{Validator, Verdict};

/// Validator client for the tool service.
#[derive(Debug, Clone)]
pub struct RemoteValidator {
    addr: String,
}

impl RemoteValidator {
    /// Create a client for the service at `addr` (host:port).
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }

    /// Service address this client talks to.
    pub fn addr(&self) -> &str {
        &self.addr
    }

    async fn run_tests(&self, working_dir: &Path) -> Result<Verdict> {
        let stream = TcpStream::connect(&self.addr)
            .await
            .map_err(|e| RtlgenError::Transport(format!("connect {}: {}", self.addr, e)))?;

        let (reader, mut writer) = stream.into_split();

        let request = ToolRequest::new(1, RUN_TESTS_METHOD, json!({ "working_dir": working_dir }));
        let request_json = serde_json::to_string(&request)?;
        writer
            .write_all(request_json.as_bytes())
            .await
            .map_err(|e| RtlgenError::Transport(format!("send request: {}", e)))?;
        writer
            .write_all(b"\n")
            .await
            .map_err(|e| RtlgenError::Transport(format!("send request: {}", e)))?;
        writer
            .flush()
            .await
            .map_err(|e| RtlgenError::Transport(format!("send request: {}", e)))?;

        let mut reader = BufReader::new(reader);
        let mut line = String::new();
        let read = reader
            .read_line(&mut line)
            .await
            .map_err(|e| RtlgenError::Transport(format!("read response: {}", e)))?;
        if read == 0 {
            return Err(RtlgenError::Transport("service closed connection".to_string()));
        }

        let response: ToolResponse = serde_json::from_str(line.trim())
            .map_err(|e| RtlgenError::Transport(format!("malformed response: {}", e)))?;

        if let Some(error) = response.error {
            return Err(RtlgenError::Transport(error.message));
        }

        let result: RunTestsResult = serde_json::from_value(
            response
                .result
                .ok_or_else(|| RtlgenError::Transport("response carried no result".to_string()))?,
        )
        .map_err(|e| RtlgenError::Transport(format!("malformed result: {}", e)))?;

        Ok(Verdict {
            passed: result.success,
            output: result.output,
        })
    }
}

#[async_trait]
impl Validator for RemoteValidator {
    async fn validate(&self, working_dir: &Path) -> Result<Verdict> {
        match self.run_tests(working_dir).await {
            Ok(verdict) => Ok(verdict),
            Err(e) => {
                let diagnostic = format!("Error running tests: {}", e);
                log::error!("{}", diagnostic);
                Ok(Verdict::fail(diagnostic))
            }
        }
    }
}
