//! Error types for chat-shell.

use std::time::Duration;

use thiserror::Error;

/// Main error type for chat-shell operations.
#[derive(Error, Debug)]
pub enum ChatShellError {
    /// The owner already has an active session.
    #[error("a session is already active for {0}")]
    AlreadyActiveSession(String),

    /// Someone other than the owner tried to end a session.
    #[error("{requester} may not end the session owned by {owner}")]
    PermissionDenied { owner: String, requester: String },

    /// No session exists for the given owner.
    #[error("no active session for {0}")]
    SessionNotFound(String),

    /// A `cd` target does not name an existing directory.
    #[error("cd: {0}: No such file or directory")]
    DirectoryNotFound(String),

    /// A `cd` form that needs shell state the session doesn't keep,
    /// such as `cd -` or `cd -P`.
    #[error("cd: {0}: not supported in sessions, give a directory path")]
    UnsupportedCdTarget(String),

    /// Command execution failed.
    #[error("command execution failed: {0}")]
    ExecutionFailed(String),

    /// Command execution timeout.
    #[error("command timed out after {0:?}")]
    Timeout(Duration),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal lock was poisoned.
    #[error("internal lock poisoned")]
    LockPoisoned,
}

impl ChatShellError {
    /// Short machine-readable code used by the HTTP surface.
    pub fn code(&self) -> &'static str {
        match self {
            Self::AlreadyActiveSession(_) => "ALREADY_ACTIVE",
            Self::PermissionDenied { .. } => "PERMISSION_DENIED",
            Self::SessionNotFound(_) => "SESSION_NOT_FOUND",
            Self::DirectoryNotFound(_) => "DIRECTORY_NOT_FOUND",
            Self::UnsupportedCdTarget(_) => "UNSUPPORTED_CD_TARGET",
            Self::ExecutionFailed(_) => "EXECUTION_FAILED",
            Self::Timeout(_) => "TIMEOUT",
            Self::Io(_) | Self::LockPoisoned => "INTERNAL_ERROR",
        }
    }
}

/// Convenience Result type for chat-shell operations.
pub type Result<T> = std::result::Result<T, ChatShellError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_already_active_display() {
        let err = ChatShellError::AlreadyActiveSession("alice".into());
        assert!(err.to_string().contains("alice"));
        assert!(err.to_string().contains("already active"));
        assert_eq!(err.code(), "ALREADY_ACTIVE");
    }

    #[test]
    fn test_permission_denied_display() {
        let err = ChatShellError::PermissionDenied {
            owner: "alice".into(),
            requester: "mallory".into(),
        };
        let text = err.to_string();
        assert!(text.starts_with("mallory"));
        assert!(text.contains("alice"));
    }

    #[test]
    fn test_directory_not_found_display() {
        let err = ChatShellError::DirectoryNotFound("missing".into());
        assert_eq!(err.to_string(), "cd: missing: No such file or directory");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ChatShellError = io_err.into();
        assert!(matches!(err, ChatShellError::Io(_)));
        assert_eq!(err.code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_timeout_display() {
        let err = ChatShellError::Timeout(Duration::from_secs(30));
        assert_eq!(err.to_string(), "command timed out after 30s");

        let short = ChatShellError::Timeout(Duration::from_millis(300));
        assert_eq!(short.to_string(), "command timed out after 300ms");
    }
}
