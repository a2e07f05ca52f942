//! Application actions
//!
//! Actions produced by the App for the runtime to execute.

use vttlink_core::SessionAction;

/// Actions produced by the App.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Render the UI.
    Render,

    /// Quit the application.
    Quit,

    /// Re-inject the bootstrap script into the attached surface.
    InstallBootstrap,

    /// Execute an effect requested by the session machine.
    Session(SessionAction),
}
