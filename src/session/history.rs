//! Per-session command history.

use serde::Serialize;

/// Number of entries shown when a session is rendered.
pub const DEFAULT_HISTORY_DISPLAY: usize = 5;

/// Longest summary kept for a single history entry.
const SUMMARY_MAX_CHARS: usize = 80;

/// One executed command and a short description of what it produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub command: String,
    pub result_summary: String,
}

/// Append-only command history.
///
/// Every entry is retained for the session's lifetime; only the rendered
/// view is bounded.
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a command and its summary.
    pub fn record(&mut self, command: impl Into<String>, result_summary: impl Into<String>) {
        self.entries.push(HistoryEntry {
            command: command.into(),
            result_summary: result_summary.into(),
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// The last `n` entries, oldest first.
    pub fn recent(&self, n: usize) -> &[HistoryEntry] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }

    /// Render the last `n` entries numbered from 1, most recent last.
    pub fn render(&self, n: usize) -> String {
        let recent = self.recent(n);
        if recent.is_empty() {
            return "No commands yet".to_string();
        }

        recent
            .iter()
            .enumerate()
            .map(|(i, entry)| format!("{}. $ {}\n   {}", i + 1, entry.command, entry.result_summary))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Summary recorded for a successful `cd`.
pub fn directory_change_summary(new_dir: &str) -> String {
    format!("Changed directory to: {new_dir}")
}

/// Summarize command output as its first non-empty line.
///
/// Falls back to stderr when stdout is empty.
pub fn output_summary(stdout: &str, stderr: &str) -> String {
    let first_line = |text: &str| {
        text.lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string)
    };

    let line = first_line(stdout)
        .or_else(|| first_line(stderr))
        .unwrap_or_else(|| "(no output)".to_string());

    if line.chars().count() > SUMMARY_MAX_CHARS {
        let mut cut: String = line.chars().take(SUMMARY_MAX_CHARS).collect();
        cut.push_str("...");
        cut
    } else {
        line
    }
}
