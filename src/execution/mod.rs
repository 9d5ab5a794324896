//! Command execution engine.
//!
//! Every command runs as its own short-lived process; shell state is
//! emulated by the caller passing a virtual working directory in:
//! - `cd` is intercepted and resolved by [`DirectoryResolver`]
//! - bare `pwd` is answered from the virtual directory
//! - bare `ls` becomes a verbose listing
//! - everything else runs through a [`ProcessRunner`]
//!
//! # Example
//!
//! ```no_run
//! use chat_shell::execution::CommandExecutor;
//!
//! # async fn demo() {
//! let executor: CommandExecutor = CommandExecutor::default();
//! let result = executor.execute("cd logs", Some("/srv/app")).await;
//! if let Some(dir) = result.new_working_dir {
//!     let listing = executor.execute("ls", Some(&dir)).await;
//!     println!("{}", listing.stdout);
//! }
//! # }
//! ```

mod command;
mod executor;
mod resolver;
mod result;
mod runner;

pub use command::{Command, ParsedCommand, VERBOSE_LS};
pub use executor::CommandExecutor;
pub use resolver::{process_dir, DirectoryResolver};
pub use result::CommandResult;
pub use runner::{ProcessOutput, ProcessRunner, ShellRunner, DEFAULT_SHELL};
