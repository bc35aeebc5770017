//! Validation of generated designs against their testbench.
//!
//! A `Validator` submits the design/testbench pair in a working directory
//! to the Icarus toolchain and reports a `Verdict`. Two implementations
//! share the contract: `IcarusValidator` invokes the toolchain directly,
//! `RemoteValidator` goes through the tool service. Callers depend only
//! on the trait.

use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;

pub mod icarus;
pub mod remote;

pub use icarus::IcarusValidator;
pub use remote::RemoteValidator;

/// Substring the testbench prints on success. Detection is deliberately
/// textual rather than exit-code based to match the testbench contract.
pub const PASS_MARKER: &str = "passed";

/// Outcome of one validation attempt.
#[derive(Debug, Clone)]
pub struct Verdict {
    /// True only when compile and simulate both exited zero.
    pub passed: bool,
    /// Combined raw toolchain output.
    pub output: String,
}

impl Verdict {
    /// Create a passing verdict with the given output.
    pub fn pass(output: impl Into<String>) -> Self {
        Self {
            passed: true,
            output: output.into(),
        }
    }

    /// Create a failing verdict with the given output.
    pub fn fail(output: impl Into<String>) -> Self {
        Self {
            passed: false,
            output: output.into(),
        }
    }

    /// Whether the output text reports a pass (case-insensitive).
    pub fn reports_pass(&self) -> bool {
        self.output.to_lowercase().contains(PASS_MARKER)
    }
}

/// Compile-and-simulate capability for one working directory.
#[async_trait]
pub trait Validator: Send + Sync {
    /// Validate the design/testbench pair in `working_dir`.
    ///
    /// Toolchain failures are reported as failing verdicts, never as
    /// errors; the Err path is reserved for local IO problems.
    async fn validate(&self, working_dir: &Path) -> Result<Verdict>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_pass() {
        let verdict = Verdict::pass("all 4 cases passed");
        assert!(verdict.passed);
        assert!(verdict.reports_pass());
    }

    #[test]
    fn test_verdict_fail() {
        let verdict = Verdict::fail("syntax error");
        assert!(!verdict.passed);
        assert!(!verdict.reports_pass());
    }

    #[test]
    fn test_reports_pass_is_case_insensitive() {
        assert!(Verdict::fail("Tests PASSED").reports_pass());
        assert!(Verdict::pass("Design Passed all checks").reports_pass());
    }

    #[test]
    fn test_reports_pass_matches_substring() {
        // Known sharp edge: any occurrence of the marker counts, even
        // inside an unrelated sentence.
        assert!(Verdict::fail("2 of 8 checks passed, 6 failed").reports_pass());
    }

    #[test]
    fn test_reports_pass_empty_output() {
        assert!(!Verdict::fail("").reports_pass());
    }
}
