//! REST API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::types::{
    status_for, EndSessionQuery, ErrorResponse, ExecuteRequest, IgnoredResponse, MessageRequest,
    RenderTargetRequest, StartSessionRequest,
};
use crate::config::Config;
use crate::driver::{
    InboundMessage, MessageDisposition, OneShotOutcome, SessionDriver, SessionStarted, SessionView,
};
use crate::error::ChatShellError;
use crate::output::FullOutput;
use crate::session::{ChannelId, OwnerId};

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(err: ChatShellError) -> ApiError {
    (status_for(&err), Json(ErrorResponse::from(&err)))
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub driver: Arc<SessionDriver>,
}

impl AppState {
    pub fn new() -> Self {
        Self::from_config(&Config::default())
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            driver: Arc::new(SessionDriver::from_config(config)),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Health check endpoint.
pub async fn health() -> &'static str {
    "OK"
}

/// API information endpoint.
pub async fn api_info(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "chat-shell",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "sessions": state.driver.store().count(),
    }))
}

/// Execute a command without a session (one-shot).
pub async fn execute_oneshot(
    State(state): State<AppState>,
    Json(req): Json<ExecuteRequest>,
) -> Json<OneShotOutcome> {
    Json(state.driver.run_oneshot(&req.command).await)
}

/// Start a session.
pub async fn start_session(
    State(state): State<AppState>,
    Json(req): Json<StartSessionRequest>,
) -> Result<(StatusCode, Json<SessionStarted>), ApiError> {
    let started = state
        .driver
        .start_session(OwnerId::new(req.owner), ChannelId::new(req.channel))
        .await
        .map_err(api_error)?;

    Ok((StatusCode::CREATED, Json(started)))
}

/// Get a session's directory and recent history.
pub async fn get_session(
    State(state): State<AppState>,
    Path(owner): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    state
        .driver
        .session_view(&OwnerId::new(owner.as_str()))
        .await
        .map_err(api_error)?
        .map(Json)
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::session_not_found(&owner)),
            )
        })
}

/// End a session. Only its owner may do so.
pub async fn end_session(
    State(state): State<AppState>,
    Path(owner): Path<String>,
    Query(query): Query<EndSessionQuery>,
) -> Result<StatusCode, ApiError> {
    state
        .driver
        .end_session(&OwnerId::new(owner), &OwnerId::new(query.requester))
        .map_err(api_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Process an inbound chat message.
///
/// Ignored messages are acknowledged with 202 so the transport can stay
/// silent about them.
pub async fn post_message(
    State(state): State<AppState>,
    Json(req): Json<MessageRequest>,
) -> Result<Response, ApiError> {
    let message = InboundMessage::new(req.text, req.owner, req.channel);

    match state
        .driver
        .handle_message(&message)
        .await
        .map_err(api_error)?
    {
        MessageDisposition::Processed(outcome) => Ok(Json(outcome).into_response()),
        MessageDisposition::Ignored(reason) => Ok((
            StatusCode::ACCEPTED,
            Json(IgnoredResponse { ignored: reason }),
        )
            .into_response()),
    }
}

/// Untruncated output of the session's most recent command.
pub async fn get_output(
    State(state): State<AppState>,
    Path(owner): Path<String>,
) -> Result<Json<FullOutput>, ApiError> {
    state
        .driver
        .full_output(&OwnerId::new(owner.as_str()))
        .await
        .map_err(api_error)?
        .map(Json)
        .ok_or_else(|| (StatusCode::NOT_FOUND, Json(ErrorResponse::no_output(&owner))))
}

/// Attach the renderer's message handle to a session.
pub async fn set_render_target(
    State(state): State<AppState>,
    Path(owner): Path<String>,
    Json(req): Json<RenderTargetRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .driver
        .store()
        .set_render_target(&OwnerId::new(owner), req.target)
        .await
        .map_err(api_error)?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_new() {
        let state = AppState::new();
        assert_eq!(state.driver.store().count(), 0);
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        assert_eq!(health().await, "OK");
    }

    #[tokio::test]
    async fn test_api_info_endpoint() {
        let response = api_info(State(AppState::new())).await;
        let json = response.0;
        assert_eq!(json["name"], "chat-shell");
        assert_eq!(json["sessions"], 0);
    }

    #[tokio::test]
    async fn test_end_session_missing_is_not_found() {
        let state = AppState::new();
        let err = end_session(
            State(state),
            Path("alice".to_string()),
            Query(EndSessionQuery {
                requester: "alice".to_string(),
            }),
        )
        .await
        .unwrap_err();

        assert_eq!(err.0, StatusCode::NOT_FOUND);
    }
}
