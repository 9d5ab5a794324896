//! Command execution engine.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::command::{Command, ParsedCommand};
use super::resolver::{process_dir, DirectoryResolver};
use super::result::CommandResult;
use super::runner::{ProcessRunner, ShellRunner};
use crate::error::ChatShellError;
use crate::output::OutputSanitizer;

/// Runs single lines of input against a virtual working directory.
///
/// Holds no per-call state; the caller owns the working directory and
/// adopts `new_working_dir` from the result.
pub struct CommandExecutor<R = ShellRunner> {
    runner: Arc<R>,
    resolver: DirectoryResolver<R>,
    timeout: Option<Duration>,
}

impl<R: ProcessRunner> CommandExecutor<R> {
    /// Create a new command executor.
    pub fn new(runner: R) -> Self {
        let runner = Arc::new(runner);
        Self {
            resolver: DirectoryResolver::new(Arc::clone(&runner)),
            runner,
            timeout: None,
        }
    }

    /// Kill commands that run longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Execute `command` as if typed at a shell sitting in `working_dir`.
    ///
    /// `None` means the process's own directory. Never fails: spawn errors,
    /// non-zero exits, timeouts and bad `cd` targets all come back as text
    /// in [`CommandResult::stderr`].
    pub async fn execute(&self, command: &str, working_dir: Option<&str>) -> CommandResult {
        let working_dir = match working_dir {
            Some(dir) => dir.to_string(),
            None => match process_dir().await {
                Ok(dir) => dir,
                Err(e) => return CommandResult::error(e.to_string()),
            },
        };

        match ParsedCommand::parse(command) {
            ParsedCommand::Empty => CommandResult::default(),
            ParsedCommand::Pwd => CommandResult::output(format!("{working_dir}\n")),
            ParsedCommand::Cd(target) => {
                match self.resolver.resolve_cd(&target, &working_dir).await {
                    Ok(dir) => CommandResult::changed_dir(dir),
                    Err(e) => CommandResult::error(e.to_string()),
                }
            }
            ParsedCommand::Run(line) => self.run(line, &working_dir).await,
        }
    }

    async fn run(&self, line: String, working_dir: &str) -> CommandResult {
        debug!(command = %line, working_dir, "running command");

        let command = Command::new(line)
            .working_dir(working_dir)
            .timeout(self.timeout);

        let output = match self.runner.run(&command).await {
            Ok(output) => output,
            Err(e) => {
                warn!(command = %command.command_line, error = %e, "failed to spawn command");
                return CommandResult::error(ChatShellError::ExecutionFailed(e.to_string()).to_string());
            }
        };

        let mut stderr = OutputSanitizer::strip_ansi(&output.stderr);
        if let Some(limit) = output.timed_out {
            if !stderr.is_empty() && !stderr.ends_with('\n') {
                stderr.push('\n');
            }
            stderr.push_str(&ChatShellError::Timeout(limit).to_string());
        }

        CommandResult {
            stdout: OutputSanitizer::strip_ansi(&output.stdout),
            stderr,
            new_working_dir: None,
            exit_code: output.exit_code,
        }
    }
}

impl Default for CommandExecutor<ShellRunner> {
    fn default() -> Self {
        Self::new(ShellRunner::default())
    }
}
