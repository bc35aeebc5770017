//! Tool service server.
//!
//! Accepts TCP connections and serves `run_tests` requests as JSON lines,
//! one request per line, one response per line. Each connection is handled
//! on its own task; each request runs the full two-stage validation in the
//! requested working directory. Bad input never takes the server down - it
//! is answered with a structured error response.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

use crate::error::{Result, RtlgenError};
use crate::service::messages::{
    RUN_TESTS_METHOD, RunTestsParams, RunTestsResult, ToolError, ToolRequest, ToolResponse,
};
use crate::validate::Validator;

/// TCP server exposing compile-and-simulate as a remote tool.
pub struct ToolServer<V: ?Sized> {
    listener: TcpListener,
    validator: Arc<V>,
}

impl<V> ToolServer<V>
where
    V: Validator + ?Sized + 'static,
{
    /// Bind the server to an address. Use port 0 for an ephemeral port.
    pub async fn bind(addr: &str, validator: Arc<V>) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| RtlgenError::Service(format!("Failed to bind {}: {}", addr, e)))?;
        Ok(Self {
            listener,
            validator,
        })
    }

    /// Address the server is actually listening on.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener
            .local_addr()
            .map_err(|e| RtlgenError::Service(format!("Failed to read local addr: {}", e)))
    }

    /// Accept and serve connections until the task is dropped.
    pub async fn run(self) -> Result<()> {
        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    log::debug!("client connected: {}", peer);
                    let validator = Arc::clone(&self.validator);
                    tokio::spawn(async move {
                        if let Err(e) = handle_client(stream, validator).await {
                            log::warn!("client {} failed: {}", peer, e);
                        }
                    });
                }
                Err(e) => {
                    log::error!("accept error: {}", e);
                }
            }
        }
    }
}

/// Serve one connection until the client hangs up.
async fn handle_client<V>(stream: TcpStream, validator: Arc<V>) -> Result<()>
where
    V: Validator + ?Sized,
{
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();

    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => break,
            Ok(_) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                let response = match serde_json::from_str::<ToolRequest>(trimmed) {
                    Ok(request) => dispatch(request, validator.as_ref()).await,
                    Err(e) => {
                        ToolResponse::error(0, ToolError::parse_error(format!("Parse error: {}", e)))
                    }
                };

                let response_json = serde_json::to_string(&response)?;
                writer.write_all(response_json.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
            Err(_) => break,
        }
    }

    Ok(())
}

/// Route a request to its handler.
pub async fn dispatch<V>(request: ToolRequest, validator: &V) -> ToolResponse
where
    V: Validator + ?Sized,
{
    match request.method.as_str() {
        RUN_TESTS_METHOD => run_tests(request, validator).await,
        other => ToolResponse::error(request.id, ToolError::method_not_found(other)),
    }
}

async fn run_tests<V>(request: ToolRequest, validator: &V) -> ToolResponse
where
    V: Validator + ?Sized,
{
    let params: RunTestsParams = match serde_json::from_value(request.params) {
        Ok(params) => params,
        Err(e) => {
            return ToolResponse::error(request.id, ToolError::invalid_params(e.to_string()));
        }
    };

    log::info!("run_tests in {}", params.working_dir.display());

    match validator.validate(&params.working_dir).await {
        Ok(verdict) => {
            let result = RunTestsResult {
                success: verdict.passed,
                output: verdict.output,
            };
            match serde_json::to_value(&result) {
                Ok(value) => ToolResponse::success(request.id, value),
                Err(e) => ToolResponse::error(request.id, ToolError::internal_error(e.to_string())),
            }
        }
        Err(e) => ToolResponse::error(request.id, ToolError::internal_error(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::Verdict;
    use async_trait::async_trait;
    use serde_json::json;
    use std::path::Path;

    struct StaticValidator {
        verdict: Verdict,
    }

    #[async_trait]
    impl Validator for StaticValidator {
        async fn validate(&self, _working_dir: &Path) -> crate::error::Result<Verdict> {
            Ok(self.verdict.clone())
        }
    }

    #[tokio::test]
    async fn test_dispatch_run_tests() {
        let validator = StaticValidator {
            verdict: Verdict::pass("all tests passed"),
        };
        let request = ToolRequest::new(3, RUN_TESTS_METHOD, json!({"working_dir": "/tmp"}));

        let response = dispatch(request, &validator).await;

        assert!(response.is_success());
        let result = response.result.unwrap();
        assert_eq!(result["success"], true);
        assert_eq!(result["output"], "all tests passed");
        assert_eq!(response.id, 3);
    }

    #[tokio::test]
    async fn test_dispatch_failing_verdict_is_still_success_response() {
        let validator = StaticValidator {
            verdict: Verdict::fail("compile error"),
        };
        let request = ToolRequest::new(1, RUN_TESTS_METHOD, json!({"working_dir": "/tmp"}));

        let response = dispatch(request, &validator).await;

        // A failing testbench is a normal result, not a protocol error
        assert!(response.is_success());
        assert_eq!(response.result.unwrap()["success"], false);
    }

    #[tokio::test]
    async fn test_dispatch_unknown_method() {
        let validator = StaticValidator {
            verdict: Verdict::pass(""),
        };
        let request = ToolRequest::new(9, "frobnicate", json!({}));

        let response = dispatch(request, &validator).await;

        assert!(!response.is_success());
        let error = response.error.unwrap();
        assert_eq!(error.code, crate::service::messages::codes::METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_dispatch_invalid_params() {
        let validator = StaticValidator {
            verdict: Verdict::pass(""),
        };
        let request = ToolRequest::new(4, RUN_TESTS_METHOD, json!({"wrong_key": 1}));

        let response = dispatch(request, &validator).await;

        assert!(!response.is_success());
        assert_eq!(
            response.error.unwrap().code,
            crate::service::messages::codes::INVALID_PARAMS
        );
    }

    #[tokio::test]
    async fn test_bind_ephemeral_port() {
        let validator = Arc::new(StaticValidator {
            verdict: Verdict::pass(""),
        });
        let server = ToolServer::bind("127.0.0.1:0", validator).await.unwrap();
        let addr = server.local_addr().unwrap();
        assert_ne!(addr.port(), 0);
    }
}
