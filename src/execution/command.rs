//! Command representation and classification.

use std::path::PathBuf;
use std::time::Duration;

/// Verbose listing a bare `ls` is rewritten to.
pub const VERBOSE_LS: &str = "ls -la";

/// A command line to hand to the process runner.
#[derive(Debug, Clone)]
pub struct Command {
    /// The command line to execute.
    pub command_line: String,
    /// Directory the process starts in.
    pub working_dir: Option<PathBuf>,
    /// Maximum execution time.
    pub timeout: Option<Duration>,
}

impl Command {
    /// Create a new command with the given command line.
    pub fn new(command_line: impl Into<String>) -> Self {
        Self {
            command_line: command_line.into(),
            working_dir: None,
            timeout: None,
        }
    }

    /// Set the working directory.
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Set the execution timeout, if any.
    pub fn timeout(mut self, duration: Option<Duration>) -> Self {
        self.timeout = duration;
        self
    }
}

/// How the executor treats a line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedCommand {
    /// Blank input.
    Empty,
    /// `cd <target>`, intercepted and resolved against the virtual cwd.
    Cd(String),
    /// Bare `pwd`, answered from the virtual cwd.
    Pwd,
    /// Anything else, run as one subprocess.
    Run(String),
}

impl ParsedCommand {
    /// Classify a line of input.
    ///
    /// `cd` with no argument targets `~`. A quoted single-word target is
    /// unquoted; anything else after `cd` is taken verbatim, so
    /// `cd my dir` looks for a directory named `my dir`.
    pub fn parse(line: &str) -> Self {
        let line = line.trim();

        if line.is_empty() {
            return Self::Empty;
        }
        if line == "pwd" {
            return Self::Pwd;
        }
        if line == "ls" {
            return Self::Run(VERBOSE_LS.to_string());
        }
        if line == "cd" {
            return Self::Cd("~".to_string());
        }

        match line.strip_prefix("cd") {
            Some(rest) if rest.starts_with(char::is_whitespace) => {
                Self::Cd(unquote_target(rest.trim()))
            }
            _ => Self::Run(line.to_string()),
        }
    }
}

fn unquote_target(raw: &str) -> String {
    match shlex::split(raw) {
        Some(words) if words.len() == 1 => words.into_iter().next().unwrap_or_default(),
        _ => raw.to_string(),
    }
}
