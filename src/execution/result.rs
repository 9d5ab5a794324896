//! Execution result types.

/// Result of executing one line of input.
///
/// Every failure mode ends up in here as text; the executor never returns
/// an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandResult {
    /// Sanitized standard output, partial if the command failed.
    pub stdout: String,
    /// Sanitized standard error, or the reason the command could not run.
    pub stderr: String,
    /// Set only by a successful `cd`.
    pub new_working_dir: Option<String>,
    /// Exit code, if a process ran to completion.
    pub exit_code: Option<i32>,
}

impl CommandResult {
    /// A result carrying only an error message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            stderr: message.into(),
            ..Self::default()
        }
    }

    /// A result carrying only standard output, as if exit code 0.
    pub fn output(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            exit_code: Some(0),
            ..Self::default()
        }
    }

    /// A successful directory change.
    pub fn changed_dir(dir: impl Into<String>) -> Self {
        Self {
            new_working_dir: Some(dir.into()),
            exit_code: Some(0),
            ..Self::default()
        }
    }

    /// Check if command succeeded.
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}
