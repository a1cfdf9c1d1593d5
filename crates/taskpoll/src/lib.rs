//! Taskpoll: bounded polling for asynchronous operations
//!
//! End-to-end tests often start a long-running server operation (a data
//! migration, an import, a re-index) and then have to wait for it. The wait
//! always looks the same: observe the operation, refresh it if it is still
//! running, sleep, and give up after a fixed number of attempts.
//!
//! ```text
//!            ┌───────────────┐  StillInProgress  ┌─────────────────┐
//!   start ──►│ PollCondition │──────────────────►│ OperationTrigger│
//!            │  evaluate()   │                   │   advance()     │
//!            └──────┬────────┘◄──── Sleeper ─────└─────────────────┘
//!                   │
//!       Completed / Failed / bound reached
//!                   ▼
//!      Ok(Success) · Err(Observation) · Ok(TimedOut(n))
//! ```
//!
//! The loop lives in [`BoundedPoller`]; policy lives in [`PollConfig`].
//! [`MarkerCondition`] covers the common case of a progress page that is
//! classified by substrings, and the `http` feature adds blocking HTTP
//! collaborators.

#![warn(missing_docs)]

mod condition;
mod config;
#[cfg(feature = "http")]
mod http;
mod marker;
mod poller;
mod result;
mod sleeper;
mod trigger;

pub use condition::{FnCondition, Named, PollCondition, PollResult, ScriptedCondition};
pub use config::{
    PollConfig, DEFAULT_MAX_ATTEMPTS, DEFAULT_SLEEP_INTERVAL_MS, FAST_SLEEP_INTERVAL_MS,
};
#[cfg(feature = "http")]
pub use http::{HttpMethod, HttpTextSource, HttpTrigger, DEFAULT_REQUEST_TIMEOUT};
pub use marker::{FileTextSource, MarkerCondition, MarkerRules, ScriptedTextSource, TextSource};
pub use poller::{poll, poll_while, BoundedPoller, PollOutcome, PollReport, PollStats};
pub use result::{PollError, TaskpollResult};
pub use sleeper::{RecordingSleeper, Sleeper, ThreadSleeper};
pub use trigger::{CountingTrigger, FnTrigger, NoopTrigger, OperationTrigger};
