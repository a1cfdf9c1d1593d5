//! Poll conditions.
//!
//! A condition answers one question: is the awaited operation still running?
//! Conditions never return errors; an observation that cannot be made is
//! reported as [`PollResult::Failed`] so the poller has a single result type
//! to branch on.

use std::collections::VecDeque;
use std::fmt;

// =============================================================================
// POLL RESULT
// =============================================================================

/// Outcome of evaluating a condition once
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollResult {
    /// The awaited operation has finished
    Completed,
    /// The operation is still running
    StillInProgress,
    /// The observation failed or the operation ended in an unexpected state
    Failed(String),
}

impl PollResult {
    /// Map a "progress indicator is present" signal onto a poll result
    #[must_use]
    pub const fn from_in_progress(in_progress: bool) -> Self {
        if in_progress {
            Self::StillInProgress
        } else {
            Self::Completed
        }
    }

    /// Create a failed result
    #[must_use]
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed(reason.into())
    }

    /// Check if the operation has completed
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Check if the operation is still running
    #[must_use]
    pub const fn is_in_progress(&self) -> bool {
        matches!(self, Self::StillInProgress)
    }

    /// Check if the observation failed
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

impl fmt::Display for PollResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::StillInProgress => write!(f, "still in progress"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

// =============================================================================
// POLL CONDITION TRAIT
// =============================================================================

/// Observes an external system and reports whether an operation is running.
///
/// Implementations may read external state (fetch a page, read a file) but
/// must not otherwise change it; advancing the operation is the job of an
/// [`OperationTrigger`](crate::OperationTrigger).
pub trait PollCondition {
    /// Observe the current state once
    fn evaluate(&mut self) -> PollResult;

    /// Description used in logs and timeout errors
    fn description(&self) -> String {
        "operation".to_string()
    }
}

impl<C: PollCondition + ?Sized> PollCondition for &mut C {
    fn evaluate(&mut self) -> PollResult {
        (**self).evaluate()
    }

    fn description(&self) -> String {
        (**self).description()
    }
}

impl<C: PollCondition + ?Sized> PollCondition for Box<C> {
    fn evaluate(&mut self) -> PollResult {
        (**self).evaluate()
    }

    fn description(&self) -> String {
        (**self).description()
    }
}

/// A closure-based condition
pub struct FnCondition<F: FnMut() -> PollResult> {
    func: F,
    description: String,
}

impl<F: FnMut() -> PollResult> fmt::Debug for FnCondition<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCondition")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl<F: FnMut() -> PollResult> FnCondition<F> {
    /// Create a new closure condition
    pub fn new(func: F, description: impl Into<String>) -> Self {
        Self {
            func,
            description: description.into(),
        }
    }
}

impl<F: FnMut() -> PollResult> PollCondition for FnCondition<F> {
    fn evaluate(&mut self) -> PollResult {
        (self.func)()
    }

    fn description(&self) -> String {
        self.description.clone()
    }
}

/// Wraps another condition under a caller-chosen description
#[derive(Debug, Clone)]
pub struct Named<C> {
    inner: C,
    description: String,
}

impl<C: PollCondition> Named<C> {
    /// Report `inner` as `description` in logs and timeout errors
    pub fn new(inner: C, description: impl Into<String>) -> Self {
        Self {
            inner,
            description: description.into(),
        }
    }

    /// The wrapped condition
    pub const fn inner(&self) -> &C {
        &self.inner
    }

    /// Unwrap the condition
    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<C: PollCondition> PollCondition for Named<C> {
    fn evaluate(&mut self) -> PollResult {
        self.inner.evaluate()
    }

    fn description(&self) -> String {
        self.description.clone()
    }
}

// =============================================================================
// SCRIPTED CONDITION
// =============================================================================

/// Replays a fixed sequence of results, repeating the last one once the
/// script runs out. Counts evaluations so tests can assert on them.
#[derive(Debug, Clone)]
pub struct ScriptedCondition {
    script: VecDeque<PollResult>,
    last: PollResult,
    evaluations: u32,
}

impl ScriptedCondition {
    /// Create a condition from a result sequence.
    ///
    /// An empty script always reports `StillInProgress`.
    #[must_use]
    pub fn new(script: impl IntoIterator<Item = PollResult>) -> Self {
        Self {
            script: script.into_iter().collect(),
            last: PollResult::StillInProgress,
            evaluations: 0,
        }
    }

    /// A condition that reports `StillInProgress` `pending` times, then `Completed`
    #[must_use]
    pub fn completes_after(pending: usize) -> Self {
        Self::new(
            std::iter::repeat(PollResult::StillInProgress)
                .take(pending)
                .chain(std::iter::once(PollResult::Completed)),
        )
    }

    /// A condition that never completes
    #[must_use]
    pub fn never_completes() -> Self {
        Self::new(std::iter::empty())
    }

    /// Number of times `evaluate` has been called
    #[must_use]
    pub const fn evaluations(&self) -> u32 {
        self.evaluations
    }
}

impl PollCondition for ScriptedCondition {
    fn evaluate(&mut self) -> PollResult {
        self.evaluations += 1;
        if let Some(next) = self.script.pop_front() {
            self.last = next;
        }
        self.last.clone()
    }

    fn description(&self) -> String {
        "scripted operation".to_string()
    }
}
