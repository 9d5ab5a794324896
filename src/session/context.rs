//! Emulated shell state carried by a session.

use super::history::History;
use crate::output::FullOutput;

/// Execution context for a session.
///
/// No shell process outlives a command, so the working directory lives
/// here and is threaded into every execution.
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// Virtual working directory. Always an absolute path that existed
    /// when it was last set.
    current_dir: String,
    /// Commands executed in this session.
    history: History,
    /// Untruncated output of the most recent command.
    last_output: Option<FullOutput>,
}

impl SessionContext {
    /// Create a context rooted at a verified directory.
    pub fn new(current_dir: impl Into<String>) -> Self {
        Self {
            current_dir: current_dir.into(),
            history: History::new(),
            last_output: None,
        }
    }

    /// Get the virtual working directory.
    pub fn current_dir(&self) -> &str {
        &self.current_dir
    }

    /// Replace the virtual working directory.
    ///
    /// Callers pass only directories the resolver has verified.
    pub fn set_current_dir(&mut self, dir: impl Into<String>) {
        self.current_dir = dir.into();
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut History {
        &mut self.history
    }

    pub fn last_output(&self) -> Option<&FullOutput> {
        self.last_output.as_ref()
    }

    pub fn set_last_output(&mut self, output: FullOutput) {
        self.last_output = Some(output);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_new() {
        let ctx = SessionContext::new("/srv/app");
        assert_eq!(ctx.current_dir(), "/srv/app");
        assert!(ctx.history().is_empty());
        assert!(ctx.last_output().is_none());
    }

    #[test]
    fn test_set_current_dir() {
        let mut ctx = SessionContext::new("/srv/app");
        ctx.set_current_dir("/srv/app/logs");
        assert_eq!(ctx.current_dir(), "/srv/app/logs");
    }

    #[test]
    fn test_history_and_last_output() {
        let mut ctx = SessionContext::new("/tmp");
        ctx.history_mut().record("echo hi", "hi");
        ctx.set_last_output(FullOutput {
            command: "echo hi".into(),
            stdout: "hi\n".into(),
            stderr: String::new(),
        });

        assert_eq!(ctx.history().len(), 1);
        assert_eq!(ctx.last_output().unwrap().stdout, "hi\n");
    }
}
