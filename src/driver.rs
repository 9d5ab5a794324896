//! Session driver: turns inbound chat requests into executions.
//!
//! The driver is what a chat transport talks to. It looks sessions up,
//! serializes commands per owner, keeps the virtual working directory and
//! history current, and hands back renderer-ready outcomes.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::ChatShellError;
use crate::execution::{process_dir, CommandExecutor, CommandResult, ProcessRunner, ShellRunner};
use crate::output::{CommandOutcome, FullOutput, OutputLimits};
use crate::session::{
    directory_change_summary, output_summary, ChannelId, HistoryEntry, OwnerId, SessionStore,
    DEFAULT_HISTORY_DISPLAY,
};
use crate::Result;

/// Maintenance command reporting the session directory without running
/// anything through the executor.
pub const DEBUG_DIR_COMMAND: &str = "debug-dir";

/// A chat message attributed to an owner and a channel.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub text: String,
    pub owner: OwnerId,
    pub channel: ChannelId,
}

impl InboundMessage {
    pub fn new(
        text: impl Into<String>,
        owner: impl Into<OwnerId>,
        channel: impl Into<ChannelId>,
    ) -> Self {
        Self {
            text: text.into(),
            owner: owner.into(),
            channel: channel.into(),
        }
    }
}

/// Why a message produced no outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    NoSession,
    ChannelMismatch,
    EmptyCommand,
}

/// What became of an inbound message.
#[derive(Debug, Clone)]
pub enum MessageDisposition {
    Processed(CommandOutcome),
    Ignored(IgnoreReason),
}

/// Reply to a successful session start.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStarted {
    pub owner: OwnerId,
    pub channel: ChannelId,
    pub current_dir: String,
}

/// Renderable snapshot of a session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub owner: OwnerId,
    pub channel: ChannelId,
    pub current_dir: String,
    /// Most recent entries, oldest first.
    pub history: Vec<HistoryEntry>,
    /// The same entries, numbered for display.
    pub history_text: String,
    pub command_count: usize,
    pub idle_seconds: f64,
}

/// Result of a one-shot run.
#[derive(Debug, Clone, Serialize)]
pub struct OneShotOutcome {
    #[serde(flatten)]
    pub outcome: CommandOutcome,
    /// Present only when the outcome was truncated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full: Option<FullOutput>,
}

/// Orchestrates the session store and the command executor.
pub struct SessionDriver<R = ShellRunner> {
    store: Arc<SessionStore>,
    executor: CommandExecutor<R>,
    limits: OutputLimits,
    history_display: usize,
    idle_timeout: Option<Duration>,
}

impl SessionDriver<ShellRunner> {
    /// Build a driver backed by the configured shell.
    pub fn from_config(config: &Config) -> Self {
        let executor = CommandExecutor::new(ShellRunner::new(config.shell.program.clone()))
            .with_timeout(config.command_timeout());

        Self::new(executor, config.output_limits())
            .with_history_display(config.session.history_display)
            .with_idle_timeout(config.idle_timeout())
    }
}

impl<R: ProcessRunner> SessionDriver<R> {
    pub fn new(executor: CommandExecutor<R>, limits: OutputLimits) -> Self {
        Self {
            store: Arc::new(SessionStore::new()),
            executor,
            limits,
            history_display: DEFAULT_HISTORY_DISPLAY,
            idle_timeout: None,
        }
    }

    pub fn with_history_display(mut self, entries: usize) -> Self {
        self.history_display = entries;
        self
    }

    /// End sessions idle for at least `timeout` when [`reap_idle`] runs.
    ///
    /// [`reap_idle`]: Self::reap_idle
    pub fn with_idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.idle_timeout = timeout;
        self
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Run a command in the process's own directory with no session.
    pub async fn run_oneshot(&self, command: &str) -> OneShotOutcome {
        let command = command.trim();
        let result = self.executor.execute(command, None).await;
        let outcome = CommandOutcome::new(command, &result, None, &self.limits);
        let full = outcome
            .truncated
            .then(|| FullOutput::new(command, &result));

        OneShotOutcome { outcome, full }
    }

    /// Start a session rooted at the process's working directory.
    pub async fn start_session(&self, owner: OwnerId, channel: ChannelId) -> Result<SessionStarted> {
        let current_dir = process_dir().await?;
        self.store
            .start(owner.clone(), channel.clone(), current_dir.clone())?;

        Ok(SessionStarted {
            owner,
            channel,
            current_dir,
        })
    }

    /// End `owner`'s session on behalf of `requester`.
    pub fn end_session(&self, owner: &OwnerId, requester: &OwnerId) -> Result<()> {
        self.store.end(owner, requester)
    }

    /// Process one chat message.
    ///
    /// The session lock is held until the outcome is built, so commands
    /// from one owner run strictly one after another.
    pub async fn handle_message(&self, message: &InboundMessage) -> Result<MessageDisposition> {
        let Some(shared) = self.store.get(&message.owner)? else {
            return Ok(MessageDisposition::Ignored(IgnoreReason::NoSession));
        };

        let mut session = shared.lock().await;

        // The session may have been ended while this command was queued
        let still_active = self
            .store
            .get(&message.owner)?
            .is_some_and(|current| Arc::ptr_eq(&current, &shared));
        if !still_active {
            debug!(owner = %message.owner, "dropping command queued behind an ended session");
            return Ok(MessageDisposition::Ignored(IgnoreReason::NoSession));
        }

        if session.channel != message.channel {
            debug!(owner = %message.owner, channel = %message.channel, "ignoring message from other channel");
            return Ok(MessageDisposition::Ignored(IgnoreReason::ChannelMismatch));
        }

        let command = message.text.trim();
        if command.is_empty() {
            return Ok(MessageDisposition::Ignored(IgnoreReason::EmptyCommand));
        }

        session.touch();
        let cwd = session.current_dir().to_string();
        debug!(owner = %message.owner, cwd = %cwd, command, "handling session command");

        let result = if command == DEBUG_DIR_COMMAND {
            debug_dir(&cwd).await
        } else {
            self.executor.execute(command, Some(&cwd)).await
        };

        let summary = match &result.new_working_dir {
            Some(dir) => {
                session.context.set_current_dir(dir.clone());
                directory_change_summary(dir)
            }
            None => output_summary(&result.stdout, &result.stderr),
        };
        session.context.history_mut().record(command, summary);
        session
            .context
            .set_last_output(FullOutput::new(command, &result));
        session.touch();

        Ok(MessageDisposition::Processed(CommandOutcome::new(
            command,
            &result,
            Some(session.current_dir().to_string()),
            &self.limits,
        )))
    }

    /// Snapshot of `owner`'s session for rendering.
    pub async fn session_view(&self, owner: &OwnerId) -> Result<Option<SessionView>> {
        let Some(shared) = self.store.get(owner)? else {
            return Ok(None);
        };

        let session = shared.lock().await;
        let history = session.context.history();
        Ok(Some(SessionView {
            owner: session.owner.clone(),
            channel: session.channel.clone(),
            current_dir: session.current_dir().to_string(),
            history: history.recent(self.history_display).to_vec(),
            history_text: history.render(self.history_display),
            command_count: history.len(),
            idle_seconds: session.idle_duration().as_secs_f64(),
        }))
    }

    /// Untruncated output of `owner`'s most recent command.
    pub async fn full_output(&self, owner: &OwnerId) -> Result<Option<FullOutput>> {
        let shared = self
            .store
            .get(owner)?
            .ok_or_else(|| ChatShellError::SessionNotFound(owner.to_string()))?;
        let session = shared.lock().await;
        Ok(session.context.last_output().cloned())
    }

    /// End sessions past the idle timeout. No-op when expiry is disabled.
    pub fn reap_idle(&self) -> Result<Vec<OwnerId>> {
        match self.idle_timeout {
            Some(timeout) => self.store.evict_idle(timeout),
            None => Ok(Vec::new()),
        }
    }
}

/// Periodically end idle sessions.
///
/// Returns `None` when the driver has no idle timeout.
pub fn spawn_reaper<R>(driver: Arc<SessionDriver<R>>, interval: Duration) -> Option<JoinHandle<()>>
where
    R: ProcessRunner + 'static,
{
    driver.idle_timeout?;

    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            match driver.reap_idle() {
                Ok(evicted) => {
                    for owner in evicted {
                        info!(%owner, "session expired after idle timeout");
                    }
                }
                Err(e) => warn!(error = %e, "idle session sweep failed"),
            }
        }
    }))
}

async fn debug_dir(cwd: &str) -> CommandResult {
    let exists = tokio::fs::metadata(cwd)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false);

    let mut report = format!("Current directory: {cwd}\nExists: {exists}\n");
    if !exists {
        return CommandResult::output(report);
    }

    let mut entries = match tokio::fs::read_dir(cwd).await {
        Ok(entries) => entries,
        Err(e) => {
            return CommandResult {
                stderr: format!("cannot list {cwd}: {e}"),
                ..CommandResult::output(report)
            }
        }
    };

    let mut names = Vec::new();
    while let Ok(Some(entry)) = entries.next_entry().await {
        let mut name = entry.file_name().to_string_lossy().into_owned();
        if entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false) {
            name.push('/');
        }
        names.push(name);
    }
    names.sort();

    report.push_str("Contents:\n");
    for name in names {
        report.push_str("  ");
        report.push_str(&name);
        report.push('\n');
    }
    CommandResult::output(report)
}
