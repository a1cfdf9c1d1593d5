//! Taskpoll CLI Library
//!
//! Command-line front end for the taskpoll polling library.

#![warn(missing_docs)]

mod commands;
mod config;
mod error;
pub mod handlers;
pub mod logging;

pub use commands::{Cli, Commands, ConfigArgs, PolicyArgs, RefreshMethodArg, WaitArgs};
pub use config::{FileConfig, PollSettings, Verbosity};
pub use error::{CliError, CliResult};
