//! # chat-shell
//!
//! Session-backed host shell command execution for chat front-ends.
//!
//! Chat users either run isolated one-shot commands or open a *session*:
//! a sequence of commands that behaves as if typed into one interactive
//! shell, even though every command is its own short-lived process. The
//! session carries a virtual working directory so `cd` sticks, keeps a
//! command history, and output is trimmed to fit a chat message.
//!
//! ## Features
//!
//! - **Virtual cwd**: `cd` and `pwd` are resolved against session state,
//!   never against a long-lived shell
//! - **One session per user**: bound to the channel it was started in
//! - **Serialized commands**: a user's commands run one at a time
//! - **Chat-sized output**: ANSI stripping and per-stream truncation, with
//!   the full text kept for attachments
//!
//! ## Quick Start
//!
//! ```no_run
//! use chat_shell::{ChannelId, Config, InboundMessage, MessageDisposition, OwnerId, SessionDriver};
//!
//! #[tokio::main]
//! async fn main() -> chat_shell::Result<()> {
//!     chat_shell::logging::try_init().ok();
//!
//!     let driver = SessionDriver::from_config(&Config::default());
//!     driver
//!         .start_session(OwnerId::new("alice"), ChannelId::new("ops"))
//!         .await?;
//!
//!     let message = InboundMessage::new("cd src", "alice", "ops");
//!     if let MessageDisposition::Processed(outcome) = driver.handle_message(&message).await? {
//!         println!("now in {:?}", outcome.current_dir);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod driver;
pub mod error;
pub mod execution;
pub mod logging;
pub mod output;
pub mod session;

// Re-export commonly used types
pub use config::Config;
pub use driver::{InboundMessage, MessageDisposition, SessionDriver};
pub use error::{ChatShellError, Result};
pub use execution::{CommandExecutor, CommandResult, DirectoryResolver, ProcessRunner, ShellRunner};
pub use output::{CommandOutcome, FullOutput, OutputSanitizer};
pub use session::{ChannelId, OwnerId, Session, SessionStore};
