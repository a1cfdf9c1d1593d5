//! Log output for the CLI.
//!
//! Library events go through `tracing`; the binary installs a formatter on
//! stderr so stdout stays reserved for command output.

use crate::config::Verbosity;
use tracing_subscriber::EnvFilter;

/// Build the filter: `RUST_LOG` if set, otherwise the verbosity default
#[must_use]
pub fn build_filter(verbosity: Verbosity) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(verbosity.filter_directive()))
}

/// Install the global subscriber. A second call is a no-op.
pub fn init_logging(verbosity: Verbosity, json: bool) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(build_filter(verbosity))
        .with_target(false)
        .with_writer(std::io::stderr);
    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_does_not_panic() {
        init_logging(Verbosity::Normal, false);
        init_logging(Verbosity::Debug, true);
    }

    #[test]
    fn test_filter_uses_verbosity() {
        if std::env::var_os("RUST_LOG").is_none() {
            assert_eq!(build_filter(Verbosity::Verbose).to_string(), "info");
        }
    }
}
