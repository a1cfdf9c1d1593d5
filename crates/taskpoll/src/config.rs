//! Poll configuration.
//!
//! A [`PollConfig`] is the only policy a poll needs: how long to sleep between
//! attempts and how many attempts to make. Values are validated when the
//! config is built, both from code and when deserialized from YAML.

use crate::result::{PollError, TaskpollResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default sleep between attempts (1 second)
pub const DEFAULT_SLEEP_INTERVAL_MS: u64 = 1_000;

/// Default attempt bound
pub const DEFAULT_MAX_ATTEMPTS: u32 = 100;

/// Sleep used by [`PollConfig::fast`]
pub const FAST_SLEEP_INTERVAL_MS: u64 = 100;

// =============================================================================
// POLL CONFIG
// =============================================================================

/// Sleep interval and attempt bound for a single poll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPollConfig")]
pub struct PollConfig {
    sleep_interval_ms: u64,
    max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self::task_progress()
    }
}

impl PollConfig {
    /// Build a config from possibly-untrusted signed values.
    ///
    /// Negative values are rejected. Zero is accepted for both fields:
    /// a zero interval busy-polls, and a zero attempt bound makes the poll a
    /// single read-only check.
    pub fn new(sleep_interval_ms: i64, max_attempts: i64) -> TaskpollResult<Self> {
        let sleep_interval_ms = u64::try_from(sleep_interval_ms).map_err(|_| {
            PollError::configuration(format!(
                "sleep_interval_ms must not be negative (got {sleep_interval_ms})"
            ))
        })?;
        let max_attempts = u32::try_from(max_attempts).map_err(|_| {
            PollError::configuration(format!(
                "max_attempts must be between 0 and {} (got {max_attempts})",
                u32::MAX
            ))
        })?;

        Ok(Self {
            sleep_interval_ms,
            max_attempts,
        })
    }

    /// One-second refresh, up to 100 attempts
    #[must_use]
    pub const fn task_progress() -> Self {
        Self {
            sleep_interval_ms: DEFAULT_SLEEP_INTERVAL_MS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// 100ms refresh, up to 100 attempts
    #[must_use]
    pub const fn fast() -> Self {
        Self {
            sleep_interval_ms: FAST_SLEEP_INTERVAL_MS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Set the sleep interval in milliseconds
    #[must_use]
    pub const fn with_sleep_interval_ms(mut self, sleep_interval_ms: u64) -> Self {
        self.sleep_interval_ms = sleep_interval_ms;
        self
    }

    /// Set the attempt bound
    #[must_use]
    pub const fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Sleep interval in milliseconds
    #[must_use]
    pub const fn sleep_interval_ms(&self) -> u64 {
        self.sleep_interval_ms
    }

    /// Sleep interval as a `Duration`
    #[must_use]
    pub const fn sleep_interval(&self) -> Duration {
        Duration::from_millis(self.sleep_interval_ms)
    }

    /// Attempt bound
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Whether the poll is a single read-only check
    #[must_use]
    pub const fn is_single_check(&self) -> bool {
        self.max_attempts == 0
    }

    /// Worst-case time spent sleeping before the poll gives up
    #[must_use]
    pub fn sleep_budget(&self) -> Duration {
        let sleeps = u64::from(self.max_attempts.saturating_sub(1));
        Duration::from_millis(self.sleep_interval_ms.saturating_mul(sleeps))
    }
}

/// Unvalidated wire form; signed so negative values reach validation
#[derive(Debug, Deserialize)]
struct RawPollConfig {
    #[serde(default = "default_sleep_interval_ms")]
    sleep_interval_ms: i64,
    #[serde(default = "default_max_attempts")]
    max_attempts: i64,
}

const fn default_sleep_interval_ms() -> i64 {
    DEFAULT_SLEEP_INTERVAL_MS as i64
}

const fn default_max_attempts() -> i64 {
    DEFAULT_MAX_ATTEMPTS as i64
}

impl TryFrom<RawPollConfig> for PollConfig {
    type Error = PollError;

    fn try_from(raw: RawPollConfig) -> Result<Self, Self::Error> {
        Self::new(raw.sleep_interval_ms, raw.max_attempts)
    }
}
