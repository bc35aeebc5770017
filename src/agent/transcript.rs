//! Durable per-design audit trail.
//!
//! Every validation attempt is recorded to `output.txt` in the design's
//! working directory: status, iteration counter, raw toolchain output and
//! a dump of the live conversation. The first record creates the file;
//! every later record appends behind a separator line. Prior entries are
//! never rewritten.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::agent::conversation::Conversation;
use crate::error::Result;
use crate::validate::Verdict;

/// Transcript file name inside a working directory.
pub const TRANSCRIPT_FILE: &str = "output.txt";

const SEPARATOR_WIDTH: usize = 80;

/// Append-only writer for one design's transcript.
#[derive(Debug)]
pub struct TranscriptWriter {
    path: PathBuf,
    entries: usize,
}

impl TranscriptWriter {
    /// Create a writer for the transcript in `working_dir`. Nothing is
    /// written until the first record.
    pub fn new(working_dir: &Path) -> Self {
        Self {
            path: working_dir.join(TRANSCRIPT_FILE),
            entries: 0,
        }
    }

    /// Record one validation attempt.
    pub fn record(
        &mut self,
        iteration: u32,
        max_iterations: u32,
        verdict: &Verdict,
        conversation: &Conversation,
    ) -> Result<()> {
        let status = if verdict.reports_pass() {
            "Passed"
        } else {
            "Failed"
        };

        let block = format!(
            "Test Results:\nStatus: Design {}\n\nCurrent Iteration: {} of {}\n\nTest Output:\n{}\n\nCurrent Conversation History:\n{}\n",
            status, iteration, max_iterations, verdict.output, conversation.render()
        );

        if self.entries == 0 {
            fs::write(&self.path, &block)?;
        } else {
            let mut file = OpenOptions::new().append(true).open(&self.path)?;
            writeln!(file, "\n{}", "=".repeat(SEPARATOR_WIDTH))?;
            file.write_all(block.as_bytes())?;
        }

        self.entries += 1;
        Ok(())
    }

    /// Number of entries written so far.
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Path of the transcript file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn conversation() -> Conversation {
        let mut conversation = Conversation::new("directive", "build a mux");
        conversation.record_response("module mux; endmodule");
        conversation
    }

    #[test]
    fn test_first_record_creates_file() {
        let dir = TempDir::new().unwrap();
        let mut writer = TranscriptWriter::new(dir.path());

        writer
            .record(1, 3, &Verdict::fail("syntax error"), &conversation())
            .unwrap();

        let content = fs::read_to_string(writer.path()).unwrap();
        assert!(content.starts_with("Test Results:\nStatus: Design Failed"));
        assert!(content.contains("Current Iteration: 1 of 3"));
        assert!(content.contains("syntax error"));
        assert!(content.contains("User:\nbuild a mux"));
        assert_eq!(writer.entries(), 1);
    }

    #[test]
    fn test_status_derived_from_output_text() {
        let dir = TempDir::new().unwrap();
        let mut writer = TranscriptWriter::new(dir.path());

        // The pass flag is ignored; the substring test decides the status
        writer
            .record(1, 3, &Verdict::fail("all checks passed"), &conversation())
            .unwrap();

        let content = fs::read_to_string(writer.path()).unwrap();
        assert!(content.contains("Status: Design Passed"));
    }

    #[test]
    fn test_later_records_append_behind_separator() {
        let dir = TempDir::new().unwrap();
        let mut writer = TranscriptWriter::new(dir.path());
        let conversation = conversation();

        writer
            .record(1, 3, &Verdict::fail("first failure"), &conversation)
            .unwrap();
        writer
            .record(2, 3, &Verdict::pass("tests passed"), &conversation)
            .unwrap();

        let content = fs::read_to_string(writer.path()).unwrap();
        assert!(content.contains("first failure"));
        assert!(content.contains("tests passed"));
        assert_eq!(content.matches(&"=".repeat(SEPARATOR_WIDTH)).count(), 1);
        assert_eq!(content.matches("Test Results:").count(), 2);
        assert_eq!(writer.entries(), 2);
    }

    #[test]
    fn test_repeated_iteration_number_still_appends() {
        // A first-attempt pass records twice with iteration 1: the
        // in-loop entry and the final re-validation must both survive.
        let dir = TempDir::new().unwrap();
        let mut writer = TranscriptWriter::new(dir.path());
        let conversation = conversation();

        writer
            .record(1, 3, &Verdict::pass("Tests passed"), &conversation)
            .unwrap();
        writer
            .record(1, 3, &Verdict::pass("Tests passed"), &conversation)
            .unwrap();

        let content = fs::read_to_string(writer.path()).unwrap();
        assert_eq!(content.matches("Test Results:").count(), 2);
    }
}
