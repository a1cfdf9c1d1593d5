//! Command handlers - kept out of main.rs so they can be tested directly

pub mod config;
pub mod wait;

pub use config::execute_config;
pub use wait::{execute_wait, exit_status, format_summary, EXIT_TIMED_OUT};
