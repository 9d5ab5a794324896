//! Output processing for chat display.
//!
//! This module turns raw process output into something a size-capped chat
//! message can carry:
//! - ANSI escape code stripping
//! - Character-budget truncation with a marker
//! - The outcome and attachment shapes handed to the renderer
//!
//! # Example
//!
//! ```
//! use chat_shell::output::{truncate, OutputSanitizer};
//!
//! let clean = OutputSanitizer::strip_ansi(b"\x1b[31mRed text\x1b[0m");
//! assert_eq!(clean, "Red text");
//!
//! let cut = truncate("abcdef", 3, "...");
//! assert_eq!(cut, "abc...");
//! ```

mod render;
mod sanitizer;
mod truncate;

pub use render::{CommandOutcome, FullOutput, OutputLimits};
pub use sanitizer::OutputSanitizer;
pub use truncate::{exceeds, truncate, DEFAULT_TRUNCATION_MARKER};
