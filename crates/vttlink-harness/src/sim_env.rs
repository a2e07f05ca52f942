//! Simulated environment.
//!
//! Both clocks follow tokio's timer, so with `start_paused = true` they only
//! move when the runtime auto-advances or a test calls
//! `tokio::time::advance`.

use std::time::{Duration, Instant};

use chrono::{DateTime, TimeDelta, Utc};
use tokio::time;
use vttlink_core::Environment;

/// Wall-clock origin used by [`SimEnv::new`] (2023-11-14T22:13:20Z).
pub const WALL_ORIGIN_MS: i64 = 1_700_000_000_000;

/// Environment whose clocks derive from tokio time.
#[derive(Debug, Clone)]
pub struct SimEnv {
    origin: time::Instant,
    wall_origin: DateTime<Utc>,
}

impl SimEnv {
    /// Start both clocks now, with the wall clock at [`WALL_ORIGIN_MS`].
    ///
    /// Must be called inside a tokio runtime.
    pub fn new() -> Self {
        Self::with_wall_origin(DateTime::from_timestamp_millis(WALL_ORIGIN_MS).unwrap_or_default())
    }

    /// Start both clocks now, with the wall clock at `wall_origin`.
    pub fn with_wall_origin(wall_origin: DateTime<Utc>) -> Self {
        Self { origin: time::Instant::now(), wall_origin }
    }

    /// Virtual time since creation.
    pub fn elapsed(&self) -> Duration {
        self.origin.elapsed()
    }

    /// Wall-clock time as epoch milliseconds.
    pub fn wall_millis(&self) -> i64 {
        self.wall_clock().timestamp_millis()
    }
}

impl Default for SimEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for SimEnv {
    fn now(&self) -> Instant {
        time::Instant::now().into_std()
    }

    fn wall_clock(&self) -> DateTime<Utc> {
        TimeDelta::from_std(self.elapsed())
            .ok()
            .and_then(|delta| self.wall_origin.checked_add_signed(delta))
            .unwrap_or(self.wall_origin)
    }
}
