//! `cd` target resolution against a virtual working directory.
//!
//! There is no long-lived shell holding a real cwd, so a relative target is
//! resolved by a throwaway shell that enters the virtual cwd, then the
//! target, and prints where it ended up. Every candidate is checked to be
//! an existing directory before the caller may adopt it.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use super::command::Command;
use super::runner::ProcessRunner;
use crate::error::ChatShellError;
use crate::Result;

/// Resolves `cd` targets into verified absolute directories.
pub struct DirectoryResolver<R> {
    runner: Arc<R>,
}

impl<R: ProcessRunner> DirectoryResolver<R> {
    pub fn new(runner: Arc<R>) -> Self {
        Self { runner }
    }

    /// Resolve `target` relative to `working_dir`.
    ///
    /// Absolute targets are used as-is and `~` is the home directory.
    /// `~/rest` resolves `rest` from the home directory and everything
    /// else (`..` and `.` included) from `working_dir`, both through the
    /// shell. Fails with [`ChatShellError::DirectoryNotFound`] if the result
    /// is not an existing directory, and with
    /// [`ChatShellError::UnsupportedCdTarget`] for `cd -` and option flags.
    pub async fn resolve_cd(&self, target: &str, working_dir: &str) -> Result<String> {
        if target.starts_with('-') {
            return Err(ChatShellError::UnsupportedCdTarget(target.to_string()));
        }

        let candidate = if target.starts_with('/') {
            target.to_string()
        } else if target == "~" {
            home_dir(target)?
        } else if let Some(rest) = target.strip_prefix("~/") {
            let home = home_dir(target)?;
            match rest.trim_start_matches('/') {
                "" => home,
                rest => self.resolve_relative(rest, &home, target).await?,
            }
        } else {
            self.resolve_relative(target, working_dir, target).await?
        };

        debug!(cd_target = target, working_dir, %candidate, "resolved cd target");
        verify_dir(&candidate, target).await
    }

    /// Run `cd <from> && cd <target> && pwd`. Errors name `shown`, the
    /// target as the user typed it.
    async fn resolve_relative(&self, target: &str, from: &str, shown: &str) -> Result<String> {
        let not_found = || ChatShellError::DirectoryNotFound(shown.to_string());

        let wd = shlex::try_quote(from).map_err(|_| not_found())?;
        let quoted = shlex::try_quote(target).map_err(|_| not_found())?;
        let line = format!("cd {wd} && cd {quoted} && pwd");

        let output = self
            .runner
            .run(&Command::new(line))
            .await
            .map_err(|_| not_found())?;

        let resolved = output.stdout_lossy();
        let resolved = resolved.trim();
        if !output.success() || resolved.is_empty() {
            return Err(not_found());
        }

        Ok(resolved.to_string())
    }
}

/// The process's own working directory, verified.
///
/// Used as a session's starting point and as the cwd of one-shot runs.
pub async fn process_dir() -> Result<String> {
    let cwd = std::env::current_dir()?;
    let cwd = cwd.to_string_lossy().into_owned();
    verify_dir(&cwd, &cwd).await
}

fn home_dir(target: &str) -> Result<String> {
    dirs::home_dir()
        .map(|home| home.to_string_lossy().into_owned())
        .ok_or_else(|| ChatShellError::DirectoryNotFound(target.to_string()))
}

async fn verify_dir(candidate: &str, target: &str) -> Result<String> {
    match tokio::fs::metadata(Path::new(candidate)).await {
        Ok(meta) if meta.is_dir() => Ok(candidate.to_string()),
        _ => Err(ChatShellError::DirectoryNotFound(target.to_string())),
    }
}
