//! Process spawning.

use std::io;
use std::process::Stdio;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::task::JoinHandle;
use tracing::warn;

use super::command::Command;

/// Shell used when none is configured.
pub const DEFAULT_SHELL: &str = "sh";

/// Captured output of one process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// Exit code; `None` if killed by a signal or timed out.
    pub exit_code: Option<i32>,
    /// Set when the process was killed for exceeding its timeout.
    pub timed_out: Option<Duration>,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }
}

/// Runs one command line to completion.
///
/// A non-zero exit is a normal outcome, not an error; `Err` means the
/// process could not be spawned or awaited.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, command: &Command) -> io::Result<ProcessOutput>;
}

/// Runs commands through `<shell> -c <line>`.
#[derive(Debug, Clone)]
pub struct ShellRunner {
    program: String,
}

impl ShellRunner {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self::new(DEFAULT_SHELL)
    }
}

#[async_trait]
impl ProcessRunner for ShellRunner {
    async fn run(&self, command: &Command) -> io::Result<ProcessOutput> {
        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.arg("-c")
            .arg(&command.command_line)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(dir) = &command.working_dir {
            cmd.current_dir(dir);
        }

        let mut child = cmd.spawn()?;
        let stdout = PipeCollector::spawn(child.stdout.take());
        let stderr = PipeCollector::spawn(child.stderr.take());

        let status = match command.timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
                Ok(status) => Some(status?),
                Err(_) => {
                    if let Err(e) = child.kill().await {
                        warn!(error = %e, "failed to kill timed out command");
                    }
                    None
                }
            },
            None => Some(child.wait().await?),
        };

        match status {
            Some(status) => Ok(ProcessOutput {
                stdout: stdout.finish().await,
                stderr: stderr.finish().await,
                exit_code: status.code(),
                timed_out: None,
            }),
            // Background children may still hold the pipes open
            None => Ok(ProcessOutput {
                stdout: stdout.finish_within(DRAIN_GRACE).await,
                stderr: stderr.finish_within(DRAIN_GRACE).await,
                exit_code: None,
                timed_out: command.timeout,
            }),
        }
    }
}

/// How long a killed command's pipes are drained before giving up on EOF.
const DRAIN_GRACE: Duration = Duration::from_millis(100);

/// Reads a child pipe in the background so output written before a kill
/// is kept.
struct PipeCollector {
    buf: Arc<Mutex<Vec<u8>>>,
    task: Option<JoinHandle<()>>,
}

impl PipeCollector {
    fn spawn<P>(pipe: Option<P>) -> Self
    where
        P: AsyncRead + Unpin + Send + 'static,
    {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let task = pipe.map(|mut pipe| {
            let buf = Arc::clone(&buf);
            tokio::spawn(async move {
                let mut chunk = [0u8; 4096];
                loop {
                    match pipe.read(&mut chunk).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => lock(&buf).extend_from_slice(&chunk[..n]),
                    }
                }
            })
        });
        Self { buf, task }
    }

    /// Wait for EOF and return everything read.
    async fn finish(mut self) -> Vec<u8> {
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
        self.take()
    }

    /// Wait up to `grace` for EOF, then return whatever was read.
    async fn finish_within(mut self, grace: Duration) -> Vec<u8> {
        if let Some(mut task) = self.task.take() {
            if tokio::time::timeout(grace, &mut task).await.is_err() {
                task.abort();
            }
        }
        self.take()
    }

    fn take(&self) -> Vec<u8> {
        std::mem::take(&mut *lock(&self.buf))
    }
}

fn lock(buf: &Mutex<Vec<u8>>) -> MutexGuard<'_, Vec<u8>> {
    buf.lock().unwrap_or_else(PoisonError::into_inner)
}
