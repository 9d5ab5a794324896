//! Session management module.
//!
//! A session emulates a persistent interactive shell for one chat user:
//! identity, virtual working directory, command history, and the store
//! that enforces one session per owner.

mod context;
mod history;
mod id;
mod store;

pub use context::SessionContext;
pub use history::{
    directory_change_summary, output_summary, History, HistoryEntry, DEFAULT_HISTORY_DISPLAY,
};
pub use id::{ChannelId, OwnerId};
pub use store::{Session, SessionStore, SharedSession};
