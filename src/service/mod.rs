//! Remote tool service boundary.
//!
//! Fronts the Icarus compile-and-simulate pipeline as a request/response
//! service: JSON lines over TCP, one `run_tests(working_dir)` operation.
//! The server side lives here; the matching client is
//! `validate::RemoteValidator`.

pub mod messages;
pub mod server;

pub use messages::{
    RUN_TESTS_METHOD, RunTestsParams, RunTestsResult, ToolError, ToolRequest, ToolResponse,
};
pub use server::ToolServer;
