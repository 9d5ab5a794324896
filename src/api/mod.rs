//! HTTP surface for chat transports.
//!
//! A chat bot forwards its users' requests here and renders the replies.
//!
//! ## Endpoints
//!
//! ### Health & Info
//! - `GET /health` - Health check
//! - `GET /api/v1` - API information
//!
//! ### Sessions
//! - `POST /api/v1/sessions` - Start a session for an owner in a channel
//! - `GET /api/v1/sessions/{owner}` - Current directory and recent history
//! - `DELETE /api/v1/sessions/{owner}?requester={id}` - End a session
//! - `GET /api/v1/sessions/{owner}/output` - Untruncated last output
//! - `PUT /api/v1/sessions/{owner}/render-target` - Attach a message handle
//! - `POST /api/v1/messages` - Run a chat message in the sender's session
//!
//! ### One-shot Execution
//! - `POST /api/v1/execute` - Execute command without session
//!
//! ## Example
//!
//! ```no_run
//! use chat_shell::api::{serve, AppState, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> chat_shell::Result<()> {
//!     serve(ServerConfig::new("127.0.0.1", 3000), AppState::new()).await
//! }
//! ```

pub mod handlers;
pub mod router;
pub mod types;

pub use handlers::AppState;
pub use router::{create_router, create_router_with_state, serve, ServerConfig};
pub use types::{
    EndSessionQuery, ErrorResponse, ExecuteRequest, IgnoredResponse, MessageRequest,
    RenderTargetRequest, StartSessionRequest,
};
