//! Direct Icarus Verilog invocation.
//!
//! Two-stage pipeline run with the working directory as cwd: `iverilog`
//! compiles the fixed design/testbench pair into `netlist.vvp`, then
//! `vvp` executes it. The netlist is overwritten on every run; no
//! cleanup happens between iterations.

use std::path::Path;
use std::process::Output;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::Result;
use crate::validate::{Validator, Verdict};

/// Design source file name inside a working directory.
pub const DESIGN_FILE: &str = "design.v";

/// Testbench file name inside a working directory.
pub const TESTBENCH_FILE: &str = "testbench.v";

/// Compiled netlist artifact name.
pub const NETLIST_FILE: &str = "netlist.vvp";

/// Validator that invokes the Icarus toolchain as child processes.
#[derive(Debug, Clone)]
pub struct IcarusValidator {
    compiler: String,
    runner: String,
}

impl Default for IcarusValidator {
    fn default() -> Self {
        Self {
            compiler: "iverilog".to_string(),
            runner: "vvp".to_string(),
        }
    }
}

impl IcarusValidator {
    /// Create a validator using the standard `iverilog`/`vvp` tools.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a validator with substitute tool names (used by tests).
    pub fn with_tools(compiler: impl Into<String>, runner: impl Into<String>) -> Self {
        Self {
            compiler: compiler.into(),
            runner: runner.into(),
        }
    }

    async fn run_stage(&self, program: &str, args: &[&str], working_dir: &Path) -> std::io::Result<Output> {
        Command::new(program)
            .args(args)
            .current_dir(working_dir)
            .output()
            .await
    }
}

fn combined_output(output: &Output) -> String {
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.is_empty() {
        text.push_str(&stderr);
    }
    text
}

#[async_trait]
impl Validator for IcarusValidator {
    async fn validate(&self, working_dir: &Path) -> Result<Verdict> {
        log::info!("compiling {} in {}", DESIGN_FILE, working_dir.display());

        let compile = match self
            .run_stage(
                &self.compiler,
                &["-o", NETLIST_FILE, DESIGN_FILE, TESTBENCH_FILE],
                working_dir,
            )
            .await
        {
            Ok(output) => output,
            Err(e) => {
                return Ok(Verdict::fail(format!(
                    "failed to run {}: {}",
                    self.compiler, e
                )));
            }
        };

        let compile_output = combined_output(&compile);
        if !compile.status.success() {
            log::error!("compilation failed:\n{}", compile_output);
            return Ok(Verdict::fail(compile_output));
        }

        let run = match self
            .run_stage(&self.runner, &[NETLIST_FILE], working_dir)
            .await
        {
            Ok(output) => output,
            Err(e) => {
                return Ok(Verdict::fail(format!("failed to run {}: {}", self.runner, e)));
            }
        };

        let output = format!("{}{}", compile_output, combined_output(&run));
        if run.status.success() {
            Ok(Verdict::pass(output))
        } else {
            log::error!("simulation failed:\n{}", output);
            Ok(Verdict::fail(output))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_both_stages_succeed() {
        let dir = TempDir::new().unwrap();
        let validator = IcarusValidator::with_tools("true", "true");

        let verdict = validator.validate(dir.path()).await.unwrap();
        assert!(verdict.passed);
    }

    #[tokio::test]
    async fn test_compile_failure_skips_run_stage() {
        let dir = TempDir::new().unwrap();
        // Runner would succeed, but a failing compiler must short-circuit
        let validator = IcarusValidator::with_tools("false", "true");

        let verdict = validator.validate(dir.path()).await.unwrap();
        assert!(!verdict.passed);
    }

    #[tokio::test]
    async fn test_run_stage_failure_fails_verdict() {
        let dir = TempDir::new().unwrap();
        let validator = IcarusValidator::with_tools("true", "false");

        let verdict = validator.validate(dir.path()).await.unwrap();
        assert!(!verdict.passed);
    }

    #[tokio::test]
    async fn test_output_captures_stage_text() {
        let dir = TempDir::new().unwrap();
        // `echo` prints the compile arguments it was handed
        let validator = IcarusValidator::with_tools("echo", "true");

        let verdict = validator.validate(dir.path()).await.unwrap();
        assert!(verdict.passed);
        assert!(verdict.output.contains(DESIGN_FILE));
        assert!(verdict.output.contains(NETLIST_FILE));
    }

    #[tokio::test]
    async fn test_missing_toolchain_is_failing_verdict_not_error() {
        let dir = TempDir::new().unwrap();
        let validator = IcarusValidator::with_tools("rtlgen-no-such-tool", "true");

        let verdict = validator.validate(dir.path()).await.unwrap();
        assert!(!verdict.passed);
        assert!(verdict.output.contains("rtlgen-no-such-tool"));
    }
}
