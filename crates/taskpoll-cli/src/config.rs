//! CLI configuration
//!
//! Settings come from three layers, later ones winning: built-in defaults,
//! an optional YAML file, and command-line flags.
//!
//! ```yaml
//! poll:
//!   sleep_interval_ms: 1000
//!   max_attempts: 100
//! markers:
//!   in_progress: ['type="submit" name="Refresh"']
//!   completed: ['type="submit" name="Done"']
//! ```

use crate::commands::PolicyArgs;
use crate::error::{CliError, CliResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use taskpoll::{MarkerRules, PollConfig};

/// CLI verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Verbosity {
    /// Quiet - errors only
    Quiet,
    /// Normal - default output
    #[default]
    Normal,
    /// Verbose - extra output
    Verbose,
    /// Debug - maximum output
    Debug,
}

impl Verbosity {
    /// Derive verbosity from `-q` and the `-v` count
    #[must_use]
    pub const fn from_flags(quiet: bool, verbose: u8) -> Self {
        if quiet {
            return Self::Quiet;
        }
        match verbose {
            0 => Self::Normal,
            1 => Self::Verbose,
            _ => Self::Debug,
        }
    }

    /// Check if quiet mode
    #[must_use]
    pub const fn is_quiet(self) -> bool {
        matches!(self, Self::Quiet)
    }

    /// Default `tracing` filter when `RUST_LOG` is unset
    #[must_use]
    pub const fn filter_directive(self) -> &'static str {
        match self {
            Self::Quiet => "error",
            Self::Normal => "warn",
            Self::Verbose => "info",
            Self::Debug => "debug",
        }
    }
}

/// Contents of a YAML configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Poll policy
    #[serde(default)]
    pub poll: PollConfig,
    /// Marker rules
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markers: Option<MarkerRules>,
}

impl FileConfig {
    /// Parse a configuration document
    pub fn from_yaml(yaml: &str) -> CliResult<Self> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    /// Load a configuration file
    pub fn load(path: &Path) -> CliResult<Self> {
        let yaml = fs::read_to_string(path).map_err(|err| {
            CliError::config(format!("cannot read {}: {err}", path.display()))
        })?;
        Self::from_yaml(&yaml)
    }
}

/// Fully resolved settings for one poll
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PollSettings {
    /// Poll policy
    pub poll: PollConfig,
    /// Marker rules
    pub markers: MarkerRules,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            poll: PollConfig::default(),
            markers: MarkerRules::task_progress_page(),
        }
    }
}

impl PollSettings {
    /// Resolve settings from flags, loading the file they name
    pub fn from_args(args: &PolicyArgs) -> CliResult<Self> {
        let file = args.config.as_deref().map(FileConfig::load).transpose()?;
        Self::resolve(file, args)
    }

    /// Layer flags over an optional file config over defaults
    pub fn resolve(file: Option<FileConfig>, args: &PolicyArgs) -> CliResult<Self> {
        let defaults = Self::default();
        let (poll, file_markers) = match file {
            Some(file) => (file.poll, file.markers),
            None => (defaults.poll, None),
        };

        let poll = PollConfig::new(
            args.interval_ms
                .unwrap_or_else(|| i64::try_from(poll.sleep_interval_ms()).unwrap_or(i64::MAX)),
            args.max_attempts
                .unwrap_or_else(|| i64::from(poll.max_attempts())),
        )?;

        let markers = if args.has_markers() {
            MarkerRules::new(
                args.in_progress.clone(),
                args.completed.clone(),
                args.failed.clone(),
            )?
        } else {
            file_markers.unwrap_or(defaults.markers)
        };

        Ok(Self { poll, markers })
    }

    /// Render as YAML
    pub fn to_yaml(&self) -> CliResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }
}
