//! Portal CLI library.
//!
//! Terminal front-end for the Portal login screen:
//! - `cli` - Command-line argument parsing and dispatch
//! - `login_cmd` - `login`, `status` and `logout` commands
//! - `terminal` - Line input, toast output and screen rendering
//! - `styled_output` - Colored status lines

pub mod cli;
pub mod login_cmd;
pub mod styled_output;
pub mod terminal;

pub use cli::{Cli, Commands, LogLevel, dispatch_command};
