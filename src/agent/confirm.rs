//! Operator confirmation policy.
//!
//! The repair loop blocks on two yes/no decisions per failed iteration.
//! The policy is injectable so automated pipelines and tests can answer
//! deterministically; the interactive CLI wires in stdin.

use std::io::{BufRead, Write};

/// Blocking yes/no decision point.
pub trait ConfirmPolicy: Send + Sync {
    /// Present `prompt` and return whether the operator confirmed.
    fn confirm(&self, prompt: &str) -> bool;
}

/// Interactive policy reading from stdin. Only an answer of `y`/`Y`
/// confirms; anything else, including EOF, declines.
pub struct StdinConfirm;

impl ConfirmPolicy for StdinConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        print!("\n{} (Y/N): ", prompt);
        let _ = std::io::stdout().flush();

        let mut answer = String::new();
        if std::io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        answer.trim().eq_ignore_ascii_case("y")
    }
}

/// Policy that confirms everything, for unattended runs.
pub struct AssumeYes;

impl ConfirmPolicy for AssumeYes {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assume_yes_always_confirms() {
        let policy = AssumeYes;
        assert!(policy.confirm("Continue with reflection?"));
        assert!(policy.confirm("Continue with design modification?"));
    }

    #[test]
    fn test_policy_is_object_safe() {
        let policy: Box<dyn ConfirmPolicy> = Box::new(AssumeYes);
        assert!(policy.confirm("anything"));
    }
}
