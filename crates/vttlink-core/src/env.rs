//! Environment abstraction.
//!
//! The state machine never reads a clock itself. Callers pass time in, and the
//! application layer obtains it from an [`Environment`]. Production uses
//! [`SystemEnv`]; the simulation harness derives both clocks from the
//! runtime's (pausable) timer.

use std::time::Instant;

use chrono::{DateTime, Utc};

/// Source of time for the application layer.
pub trait Environment: Clone + Send + Sync + 'static {
    /// Monotonic instant, used for timeouts.
    fn now(&self) -> Instant;

    /// Wall-clock time, used for chat timestamps.
    fn wall_clock(&self) -> DateTime<Utc>;
}

/// Real clocks.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl Environment for SystemEnv {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn wall_clock(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
