//! Application events
//!
//! Inputs to the App: user intents from the frontend, payloads from the
//! embedded surface, handshake results and timer ticks.

use vttlink_core::{ActorId, HandshakeError, HandshakeOutcome, UserConnectionInput};

/// Events consumed by [`crate::App::handle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Start a session.
    Connect(UserConnectionInput),

    /// End the session.
    Disconnect,

    /// Select an actor for the native sheet.
    SelectActor(ActorId),

    /// Send chat text as the local user.
    SendChat(String),

    /// Set a resource on an actor.
    UpdateResource {
        /// Target actor.
        actor_id: ActorId,
        /// Resource label.
        label: String,
        /// Requested value, clamped by the session.
        value: i32,
    },

    /// Raw payload posted by the embedded context to the host entry point.
    Notification(String),

    /// The embedded surface reported load progress.
    SurfaceProgress,

    /// A handshake task finished.
    HandshakeFinished {
        /// Attempt the task was started for.
        attempt: u64,
        /// Collaborator result.
        result: Result<HandshakeOutcome, HandshakeError>,
    },

    /// Periodic timer.
    Tick,

    /// Quit the application.
    Quit,
}
