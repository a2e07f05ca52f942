//! Driver trait for abstracting I/O operations.
//!
//! The [`Driver`] trait decouples the application runtime from specific I/O
//! implementations. Each frontend implements the trait to provide
//! platform-specific input, rendering and embedded surfaces, while the
//! generic [`crate::Runtime`] handles all orchestration.

use std::future::Future;

use vttlink_core::Environment;

use crate::{App, AppEvent, Surface};

/// Abstracts I/O operations for the application runtime.
///
/// Implementations provide platform-specific I/O while the generic
/// [`crate::Runtime`] handles orchestration logic. This ensures the same
/// orchestration code runs in the terminal frontend and in simulation.
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Embedded surface opened by this driver.
    type Surface: Surface;

    /// Wait for the next batch of events.
    ///
    /// Must be cancel-safe: the runtime polls it inside `select!`. Returning
    /// an empty vector is allowed.
    fn poll_event(&mut self) -> impl Future<Output = Result<Vec<AppEvent>, Self::Error>> + Send;

    /// Open an embedded surface at `url`.
    ///
    /// Payloads the surface posts to the host entry point must come back
    /// through [`Driver::poll_event`] as [`AppEvent::Notification`], and each
    /// load-progress report of the surface as [`AppEvent::SurfaceProgress`]
    /// so the bootstrap script is re-injected. A surface that never loads a
    /// page reports no progress.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface cannot be created.
    fn open_surface(&mut self, url: &str) -> Result<Self::Surface, Self::Error>;

    /// Render the application state.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render<E: Environment>(&mut self, app: &App<E>) -> Result<(), Self::Error>;

    /// Release platform resources.
    fn stop(&mut self);
}
