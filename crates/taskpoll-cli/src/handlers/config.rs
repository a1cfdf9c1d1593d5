//! Config command handler

use crate::commands::ConfigArgs;
use crate::config::PollSettings;
use crate::error::CliResult;

/// Resolve the effective settings and render them as YAML
pub fn execute_config(args: &ConfigArgs) -> CliResult<String> {
    PollSettings::from_args(&args.policy)?.to_yaml()
}
