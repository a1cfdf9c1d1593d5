//! Operation triggers.
//!
//! A trigger is the side effect issued between observations, such as
//! submitting a "Refresh" form so the server re-renders its progress page.

use crate::result::TaskpollResult;
use std::fmt;

/// Advances or refreshes the operation being polled
pub trait OperationTrigger {
    /// Perform the refresh action once
    fn advance(&mut self) -> TaskpollResult<()>;
}

impl<T: OperationTrigger + ?Sized> OperationTrigger for &mut T {
    fn advance(&mut self) -> TaskpollResult<()> {
        (**self).advance()
    }
}

impl<T: OperationTrigger + ?Sized> OperationTrigger for Box<T> {
    fn advance(&mut self) -> TaskpollResult<()> {
        (**self).advance()
    }
}

/// Trigger that does nothing; the poller just waits and re-observes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoopTrigger;

impl OperationTrigger for NoopTrigger {
    fn advance(&mut self) -> TaskpollResult<()> {
        Ok(())
    }
}

/// A closure-based trigger
pub struct FnTrigger<F: FnMut() -> TaskpollResult<()>> {
    func: F,
}

impl<F: FnMut() -> TaskpollResult<()>> fmt::Debug for FnTrigger<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnTrigger").finish_non_exhaustive()
    }
}

impl<F: FnMut() -> TaskpollResult<()>> FnTrigger<F> {
    /// Create a new closure trigger
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F: FnMut() -> TaskpollResult<()>> OperationTrigger for FnTrigger<F> {
    fn advance(&mut self) -> TaskpollResult<()> {
        (self.func)()
    }
}

/// Trigger that counts invocations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CountingTrigger {
    count: u32,
}

impl CountingTrigger {
    /// Create a new counting trigger
    #[must_use]
    pub const fn new() -> Self {
        Self { count: 0 }
    }

    /// Number of times `advance` has been called
    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count
    }
}

impl OperationTrigger for CountingTrigger {
    fn advance(&mut self) -> TaskpollResult<()> {
        self.count += 1;
        Ok(())
    }
}
