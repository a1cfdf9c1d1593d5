//! Sleep between poll attempts.
//!
//! The poller never calls `std::thread::sleep` directly; it goes through a
//! [`Sleeper`] so tests can record the requested waits instead of blocking.

use std::time::Duration;

/// The suspension point between two poll attempts
pub trait Sleeper {
    /// Suspend the calling thread for `duration`
    fn sleep(&mut self, duration: Duration);
}

impl<S: Sleeper + ?Sized> Sleeper for &mut S {
    fn sleep(&mut self, duration: Duration) {
        (**self).sleep(duration);
    }
}

/// Blocks the calling thread
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Records requested sleeps and returns immediately
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingSleeper {
    sleeps: Vec<Duration>,
}

impl RecordingSleeper {
    /// Create an empty recorder
    #[must_use]
    pub const fn new() -> Self {
        Self { sleeps: Vec::new() }
    }

    /// Every duration passed to `sleep`, in order
    #[must_use]
    pub fn sleeps(&self) -> &[Duration] {
        &self.sleeps
    }

    /// Number of sleeps requested
    #[must_use]
    pub fn count(&self) -> usize {
        self.sleeps.len()
    }

    /// Sum of all requested sleeps
    #[must_use]
    pub fn total(&self) -> Duration {
        self.sleeps.iter().sum()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&mut self, duration: Duration) {
        self.sleeps.push(duration);
    }
}
