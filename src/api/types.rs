//! API request and response types.

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::driver::IgnoreReason;
use crate::error::ChatShellError;

/// Request to run a command without a session.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecuteRequest {
    pub command: String,
}

/// Request to start a session.
#[derive(Debug, Clone, Deserialize)]
pub struct StartSessionRequest {
    pub owner: String,
    pub channel: String,
}

/// Query for ending a session; the requester must be the owner.
#[derive(Debug, Clone, Deserialize)]
pub struct EndSessionQuery {
    pub requester: String,
}

/// An inbound chat message.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageRequest {
    pub text: String,
    pub owner: String,
    pub channel: String,
}

/// Request to attach the renderer's message handle to a session.
#[derive(Debug, Clone, Deserialize)]
pub struct RenderTargetRequest {
    pub target: String,
}

/// Reply for a message that produced no outcome.
#[derive(Debug, Clone, Serialize)]
pub struct IgnoredResponse {
    pub ignored: IgnoreReason,
}

/// Generic API error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "ALREADY_ACTIVE").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn session_not_found(owner: &str) -> Self {
        Self::new("SESSION_NOT_FOUND", format!("No active session for '{}'", owner))
    }

    pub fn no_output(owner: &str) -> Self {
        Self::new("NO_OUTPUT", format!("Session '{}' has not run a command yet", owner))
    }
}

/// HTTP status a crate error maps to.
pub fn status_for(err: &ChatShellError) -> StatusCode {
    match err {
        ChatShellError::AlreadyActiveSession(_) => StatusCode::CONFLICT,
        ChatShellError::PermissionDenied { .. } => StatusCode::FORBIDDEN,
        ChatShellError::SessionNotFound(_) => StatusCode::NOT_FOUND,
        ChatShellError::DirectoryNotFound(_)
        | ChatShellError::UnsupportedCdTarget(_)
        | ChatShellError::ExecutionFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ChatShellError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        ChatShellError::Io(_) | ChatShellError::LockPoisoned => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<&ChatShellError> for ErrorResponse {
    fn from(err: &ChatShellError) -> Self {
        Self::new(err.code(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_session_request() {
        let json = r#"{"owner": "alice", "channel": "ops"}"#;
        let req: StartSessionRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.owner, "alice");
        assert_eq!(req.channel, "ops");
    }

    #[test]
    fn test_message_request_requires_fields() {
        assert!(serde_json::from_str::<MessageRequest>(r#"{"text": "ls"}"#).is_err());
    }

    #[test]
    fn test_error_response_from_crate_error() {
        let err = ChatShellError::AlreadyActiveSession("alice".into());
        let body = ErrorResponse::from(&err);
        assert_eq!(body.code, "ALREADY_ACTIVE");
        assert_eq!(status_for(&err), StatusCode::CONFLICT);
    }

    #[test]
    fn test_status_mapping() {
        let denied = ChatShellError::PermissionDenied {
            owner: "a".into(),
            requester: "b".into(),
        };
        assert_eq!(status_for(&denied), StatusCode::FORBIDDEN);
        assert_eq!(
            status_for(&ChatShellError::SessionNotFound("a".into())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_ignored_response_serialization() {
        let body = IgnoredResponse {
            ignored: IgnoreReason::ChannelMismatch,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"ignored":"channel_mismatch"}"#);
    }
}
