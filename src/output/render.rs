//! Shapes handed to the chat renderer.

use serde::Serialize;

use super::truncate::{exceeds, truncate, DEFAULT_TRUNCATION_MARKER};
use crate::execution::CommandResult;

/// Per-stream character budgets for rendered output.
#[derive(Debug, Clone)]
pub struct OutputLimits {
    pub max_stdout_chars: usize,
    pub max_stderr_chars: usize,
    pub marker: String,
}

impl Default for OutputLimits {
    fn default() -> Self {
        Self {
            max_stdout_chars: 1000,
            max_stderr_chars: 1000,
            marker: DEFAULT_TRUNCATION_MARKER.to_string(),
        }
    }
}

/// What the renderer shows for one processed command.
#[derive(Debug, Clone, Serialize)]
pub struct CommandOutcome {
    pub command: String,
    pub stdout: String,
    pub stderr: String,
    /// Session directory after the command; absent in one-shot mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_dir: Option<String>,
    /// Set when either stream was cut and a [`FullOutput`] is worth offering.
    pub truncated: bool,
}

impl CommandOutcome {
    /// Build an outcome, truncating each stream independently.
    pub fn new(
        command: impl Into<String>,
        result: &CommandResult,
        current_dir: Option<String>,
        limits: &OutputLimits,
    ) -> Self {
        let truncated = exceeds(&result.stdout, limits.max_stdout_chars)
            || exceeds(&result.stderr, limits.max_stderr_chars);

        Self {
            command: command.into(),
            stdout: truncate(&result.stdout, limits.max_stdout_chars, &limits.marker),
            stderr: truncate(&result.stderr, limits.max_stderr_chars, &limits.marker),
            current_dir,
            truncated,
        }
    }
}

/// Untruncated output, offered as an attachment for large results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FullOutput {
    pub command: String,
    pub stdout: String,
    pub stderr: String,
}

impl FullOutput {
    pub fn new(command: impl Into<String>, result: &CommandResult) -> Self {
        Self {
            command: command.into(),
            stdout: result.stdout.clone(),
            stderr: result.stderr.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(stdout: &str, stderr: &str) -> CommandResult {
        CommandResult {
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            ..CommandResult::default()
        }
    }

    #[test]
    fn test_outcome_small_output() {
        let outcome = CommandOutcome::new(
            "echo hi",
            &result("hi\n", ""),
            Some("/tmp".into()),
            &OutputLimits::default(),
        );

        assert_eq!(outcome.stdout, "hi\n");
        assert!(!outcome.truncated);
        assert_eq!(outcome.current_dir.as_deref(), Some("/tmp"));
    }

    #[test]
    fn test_outcome_truncates_streams_independently() {
        let limits = OutputLimits {
            max_stdout_chars: 1000,
            max_stderr_chars: 10,
            ..OutputLimits::default()
        };
        let stdout = "x".repeat(5000);
        let outcome = CommandOutcome::new("big", &result(&stdout, "short"), None, &limits);

        assert!(outcome.truncated);
        assert_eq!(outcome.stdout.matches(&limits.marker).count(), 1);
        assert!(outcome.stdout.chars().count() <= 1000 + limits.marker.chars().count());
        assert_eq!(outcome.stderr, "short");
    }

    #[test]
    fn test_outcome_serialization_skips_missing_dir() {
        let outcome =
            CommandOutcome::new("ls", &result("", ""), None, &OutputLimits::default());
        let json = serde_json::to_string(&outcome).unwrap();
        assert!(!json.contains("current_dir"));
    }

    #[test]
    fn test_full_output_is_untruncated() {
        let stdout = "y".repeat(5000);
        let full = FullOutput::new("big", &result(&stdout, ""));
        assert_eq!(full.stdout.len(), 5000);
    }
}
