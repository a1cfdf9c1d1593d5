//! Bounded polling.
//!
//! [`BoundedPoller`] evaluates a [`PollCondition`] until it reports
//! `Completed` or `Failed`, invoking an [`OperationTrigger`] and sleeping
//! between evaluations, and gives up after `max_attempts` evaluations.
//!
//! ```
//! use taskpoll::{BoundedPoller, NoopTrigger, PollConfig, PollOutcome, RecordingSleeper,
//!     ScriptedCondition};
//!
//! let config = PollConfig::new(100, 3).unwrap();
//! let mut poller = BoundedPoller::with_sleeper(config, RecordingSleeper::new());
//! let outcome = poller
//!     .poll(ScriptedCondition::completes_after(2), NoopTrigger)
//!     .unwrap();
//! assert_eq!(outcome, PollOutcome::Success);
//! assert_eq!(poller.sleeper().count(), 2);
//! ```

use crate::condition::{FnCondition, PollCondition, PollResult};
use crate::config::PollConfig;
use crate::result::{PollError, TaskpollResult};
use crate::sleeper::{Sleeper, ThreadSleeper};
use crate::trigger::{NoopTrigger, OperationTrigger};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

// =============================================================================
// POLL OUTCOME
// =============================================================================

/// Final result of a bounded poll that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The condition reported `Completed`
    Success,
    /// The attempt bound was reached while the operation was still running
    TimedOut(u32),
}

impl PollOutcome {
    /// Check if the poll succeeded
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Check if the poll timed out
    #[must_use]
    pub const fn is_timed_out(&self) -> bool {
        matches!(self, Self::TimedOut(_))
    }

    /// Convert a timeout into a [`PollError::Timeout`] so it can be
    /// propagated with `?`
    pub fn ensure_success(self, description: impl Into<String>) -> TaskpollResult<()> {
        match self {
            Self::Success => Ok(()),
            Self::TimedOut(attempts) => Err(PollError::Timeout {
                attempts,
                description: description.into(),
            }),
        }
    }
}

impl fmt::Display for PollOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::TimedOut(attempts) => write!(f, "timed out after {attempts} attempt(s)"),
        }
    }
}

// =============================================================================
// POLL REPORT
// =============================================================================

/// Counters for a finished poll
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollStats {
    /// Times the condition was evaluated
    pub evaluations: u32,
    /// Times the trigger was invoked
    pub triggers: u32,
    /// Times the poller slept
    pub sleeps: u32,
    /// Wall-clock time spent in the poll
    pub elapsed: Duration,
}

/// Outcome plus counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollReport {
    /// Final outcome
    pub outcome: PollOutcome,
    /// Counters
    pub stats: PollStats,
}

// =============================================================================
// BOUNDED POLLER
// =============================================================================

/// Drives a condition to completion under a fixed attempt bound
#[derive(Debug, Clone)]
pub struct BoundedPoller<S: Sleeper = ThreadSleeper> {
    config: PollConfig,
    sleeper: S,
}

impl BoundedPoller<ThreadSleeper> {
    /// Create a poller that blocks the calling thread between attempts
    #[must_use]
    pub const fn new(config: PollConfig) -> Self {
        Self {
            config,
            sleeper: ThreadSleeper,
        }
    }
}

impl Default for BoundedPoller<ThreadSleeper> {
    fn default() -> Self {
        Self::new(PollConfig::default())
    }
}

impl<S: Sleeper> BoundedPoller<S> {
    /// Create a poller with a custom sleeper
    pub const fn with_sleeper(config: PollConfig, sleeper: S) -> Self {
        Self { config, sleeper }
    }

    /// The poll policy
    #[must_use]
    pub const fn config(&self) -> &PollConfig {
        &self.config
    }

    /// The sleeper
    pub const fn sleeper(&self) -> &S {
        &self.sleeper
    }

    /// Consume the poller and return its sleeper
    pub fn into_sleeper(self) -> S {
        self.sleeper
    }

    /// Poll until the condition completes, fails or exhausts the bound
    pub fn poll<C, T>(&mut self, condition: C, trigger: T) -> TaskpollResult<PollOutcome>
    where
        C: PollCondition,
        T: OperationTrigger,
    {
        self.poll_with_stats(condition, trigger)
            .map(|report| report.outcome)
    }

    /// Like [`poll`](Self::poll), also returning counters.
    ///
    /// A `Failed` evaluation or a trigger error ends the poll immediately.
    /// With `max_attempts == 0` the condition is evaluated exactly once and
    /// neither the trigger nor the sleeper is used.
    pub fn poll_with_stats<C, T>(
        &mut self,
        mut condition: C,
        mut trigger: T,
    ) -> TaskpollResult<PollReport>
    where
        C: PollCondition,
        T: OperationTrigger,
    {
        let start = Instant::now();
        let description = condition.description();
        let max_attempts = self.config.max_attempts();
        let bound = max_attempts.max(1);
        let interval = self.config.sleep_interval();
        let mut stats = PollStats::default();

        let span = tracing::debug_span!("poll", operation = %description, max_attempts);
        let _guard = span.enter();

        loop {
            stats.evaluations += 1;
            match condition.evaluate() {
                PollResult::Completed => {
                    stats.elapsed = start.elapsed();
                    info!(
                        evaluations = stats.evaluations,
                        elapsed_ms = stats.elapsed.as_millis() as u64,
                        "{description} completed"
                    );
                    return Ok(PollReport {
                        outcome: PollOutcome::Success,
                        stats,
                    });
                }
                PollResult::Failed(reason) => {
                    warn!(evaluations = stats.evaluations, %reason, "{description} failed");
                    return Err(PollError::Observation {
                        reason,
                        evaluations: stats.evaluations,
                    });
                }
                PollResult::StillInProgress => {}
            }

            if stats.evaluations >= bound {
                stats.elapsed = start.elapsed();
                warn!(
                    evaluations = stats.evaluations,
                    "{description} still in progress after {max_attempts} attempt(s)"
                );
                return Ok(PollReport {
                    outcome: PollOutcome::TimedOut(max_attempts),
                    stats,
                });
            }

            debug!(attempt = stats.evaluations, "{description} still in progress");
            trigger
                .advance()
                .map_err(|err| trigger_failure(err, stats.evaluations))?;
            stats.triggers += 1;

            if !interval.is_zero() {
                self.sleeper.sleep(interval);
                stats.sleeps += 1;
            }
        }
    }
}

fn trigger_failure(err: PollError, evaluations: u32) -> PollError {
    let reason = match err {
        PollError::Trigger { reason, .. } => reason,
        other => other.to_string(),
    };
    warn!(evaluations, %reason, "trigger failed");
    PollError::Trigger {
        reason,
        evaluations,
    }
}

// =============================================================================
// CONVENIENCE FUNCTIONS
// =============================================================================

/// Poll with a blocking sleeper
pub fn poll<C, T>(condition: C, trigger: T, config: PollConfig) -> TaskpollResult<PollOutcome>
where
    C: PollCondition,
    T: OperationTrigger,
{
    BoundedPoller::new(config).poll(condition, trigger)
}

/// Wait while `in_progress` returns true, re-observing without a trigger
pub fn poll_while<F>(mut in_progress: F, config: PollConfig) -> TaskpollResult<PollOutcome>
where
    F: FnMut() -> bool,
{
    let condition = FnCondition::new(
        move || PollResult::from_in_progress(in_progress()),
        "operation",
    );
    poll(condition, NoopTrigger, config)
}
