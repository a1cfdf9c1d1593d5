//! CLI command definitions using clap

use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Taskpoll: wait for a long-running operation to finish
#[derive(Parser, Debug)]
#[command(name = "taskpoll")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit log lines as JSON on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Poll a file or URL until its progress marker clears
    ///
    /// Exits 0 when the operation completes, 2 when the attempt bound is
    /// reached, and 1 on any other failure.
    Wait(WaitArgs),

    /// Print the effective poll configuration as YAML
    Config(ConfigArgs),
}

/// Poll policy and marker options shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct PolicyArgs {
    /// YAML configuration file
    #[arg(short, long, env = "TASKPOLL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Milliseconds to sleep between attempts
    #[arg(long, allow_negative_numbers = true)]
    pub interval_ms: Option<i64>,

    /// Maximum number of attempts (0 = check once)
    #[arg(long, allow_negative_numbers = true)]
    pub max_attempts: Option<i64>,

    /// Text present while the operation is running (repeatable)
    #[arg(long = "in-progress", value_name = "MARKER")]
    pub in_progress: Vec<String>,

    /// Text present once the operation has finished (repeatable)
    #[arg(long, value_name = "MARKER")]
    pub completed: Vec<String>,

    /// Text that means the operation failed (repeatable)
    #[arg(long, value_name = "MARKER")]
    pub failed: Vec<String>,
}

impl PolicyArgs {
    /// Whether any marker flag was given
    #[must_use]
    pub fn has_markers(&self) -> bool {
        !(self.in_progress.is_empty() && self.completed.is_empty() && self.failed.is_empty())
    }
}

/// Arguments for the wait command
#[derive(Args, Debug)]
#[command(group(ArgGroup::new("source").required(true).args(["file", "url"])))]
pub struct WaitArgs {
    /// File to observe
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// URL to observe (GET)
    #[arg(long)]
    pub url: Option<String>,

    /// URL requested between attempts to advance the operation
    #[arg(long)]
    pub refresh_url: Option<String>,

    /// Method used for the refresh request
    #[arg(long, default_value = "get")]
    pub refresh_method: RefreshMethodArg,

    /// Name used in log lines and the timeout message
    #[arg(long)]
    pub name: Option<String>,

    /// Poll policy and markers
    #[command(flatten)]
    pub policy: PolicyArgs,
}

/// Arguments for the config command
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Poll policy and markers
    #[command(flatten)]
    pub policy: PolicyArgs,
}

/// Refresh request method
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RefreshMethodArg {
    /// GET the refresh URL
    #[default]
    Get,
    /// POST an empty body to the refresh URL
    Post,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_wait_with_file() {
        let cli = Cli::try_parse_from([
            "taskpoll",
            "wait",
            "--file",
            "status.txt",
            "--in-progress",
            "Running",
            "--completed",
            "Done",
            "--max-attempts",
            "5",
        ])
        .unwrap();
        match cli.command {
            Commands::Wait(args) => {
                assert_eq!(args.file, Some(PathBuf::from("status.txt")));
                assert_eq!(args.policy.in_progress, vec!["Running".to_string()]);
                assert_eq!(args.policy.max_attempts, Some(5));
                assert_eq!(args.refresh_method, RefreshMethodArg::Get);
                assert!(args.policy.has_markers());
            }
            Commands::Config(_) => panic!("expected wait"),
        }
    }

    #[test]
    fn test_parse_negative_attempts() {
        let cli =
            Cli::try_parse_from(["taskpoll", "wait", "--file", "x", "--max-attempts", "-1"])
                .unwrap();
        match cli.command {
            Commands::Wait(args) => assert_eq!(args.policy.max_attempts, Some(-1)),
            Commands::Config(_) => panic!("expected wait"),
        }
    }

    #[test]
    fn test_wait_requires_source() {
        assert!(Cli::try_parse_from(["taskpoll", "wait"]).is_err());
    }

    #[test]
    fn test_wait_rejects_two_sources() {
        let result = Cli::try_parse_from([
            "taskpoll",
            "wait",
            "--file",
            "a",
            "--url",
            "http://localhost/",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_verbosity_count() {
        let cli = Cli::try_parse_from(["taskpoll", "-vv", "config"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(!cli.quiet);
        assert!(!cli.log_json);
    }

    #[test]
    fn test_log_json_is_global() {
        let cli = Cli::try_parse_from(["taskpoll", "config", "--log-json"]).unwrap();
        assert!(cli.log_json);
    }
}
