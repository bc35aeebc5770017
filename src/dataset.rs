//! Test-case discovery.
//!
//! A test case is any directory containing `design_description.txt`
//! alongside its pre-existing `testbench.v`. Discovery walks the whole
//! tree beneath a root and returns the case directories in sorted order
//! so batch runs are deterministic.

use std::path::{Path, PathBuf};

use glob::glob;

use crate::error::{Result, RtlgenError};

/// Design description file marking a test-case directory.
pub const DESCRIPTION_FILE: &str = "design_description.txt";

/// Find every test-case directory at or beneath `root`, sorted.
pub fn find_test_cases(root: &Path) -> Result<Vec<PathBuf>> {
    let pattern = root.join("**").join(DESCRIPTION_FILE);
    let pattern = pattern
        .to_str()
        .ok_or_else(|| RtlgenError::Dataset(format!("non-UTF-8 path: {}", root.display())))?;

    let mut cases = Vec::new();
    for entry in glob(pattern).map_err(|e| RtlgenError::Dataset(e.to_string()))? {
        let path = entry.map_err(|e| RtlgenError::Dataset(e.to_string()))?;
        if let Some(dir) = path.parent() {
            cases.push(dir.to_path_buf());
        }
    }

    cases.sort();
    cases.dedup();
    Ok(cases)
}
