//! Result and error types for taskpoll.

use thiserror::Error;

/// Result type for taskpoll operations
pub type TaskpollResult<T> = Result<T, PollError>;

/// Errors that can occur while configuring or running a poll
#[derive(Debug, Error)]
pub enum PollError {
    /// Invalid poll configuration or marker rules
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message
        message: String,
    },

    /// The condition reported a failure while observing the operation
    #[error("Observation failed after {evaluations} evaluation(s): {reason}")]
    Observation {
        /// Failure reason reported by the condition
        reason: String,
        /// Evaluations performed, including the failing one
        evaluations: u32,
    },

    /// The trigger could not advance the operation
    #[error("Trigger failed after {evaluations} evaluation(s): {reason}")]
    Trigger {
        /// Failure reason reported by the trigger
        reason: String,
        /// Evaluations performed before the trigger failed
        evaluations: u32,
    },

    /// The operation was still in progress when the attempt bound was reached
    #[error("{description} took longer than {attempts} attempt(s)")]
    Timeout {
        /// Attempt bound that was exhausted
        attempts: u32,
        /// What was being waited for
        description: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP transport error
    #[cfg(feature = "http")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl PollError {
    /// Create a configuration error
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a trigger error that has not yet been tied to a poll
    #[must_use]
    pub fn trigger(reason: impl Into<String>) -> Self {
        Self::Trigger {
            reason: reason.into(),
            evaluations: 0,
        }
    }

    /// Create an observation error that has not yet been tied to a poll
    #[must_use]
    pub fn observation(reason: impl Into<String>) -> Self {
        Self::Observation {
            reason: reason.into(),
            evaluations: 0,
        }
    }

    /// Whether this error came from an invalid configuration
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    /// Whether this error is a timed-out poll
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
