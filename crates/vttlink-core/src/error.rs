//! Session error types.

use std::time::Duration;

use thiserror::Error;

use crate::state::ConnectionStatus;

/// Failure reported by the handshake collaborator.
///
/// The `Display` form is the single human-readable message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandshakeError {
    /// The server could not be reached.
    #[error("server unreachable: {0}")]
    Unreachable(String),

    /// The server refused the supplied credentials.
    #[error("authentication rejected: {0}")]
    Rejected(String),

    /// Any other collaborator failure.
    #[error("{0}")]
    Other(String),
}

/// Errors returned by [`crate::SessionMachine`] operations.
///
/// Several of these are tolerated misses rather than faults. They are still
/// returned so callers can tell them apart from success; the application
/// layer logs and swallows them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// `connect` while an attempt is already in flight.
    #[error("a connection attempt is already in progress")]
    AlreadyConnecting,

    /// `connect` while connected; disconnect first to change mode.
    #[error("already connected; disconnect first")]
    AlreadyConnected,

    /// Operation requires a connected session.
    #[error("operation requires a connected session (status: {status:?})")]
    NotConnected {
        /// Status at the time of the call.
        status: ConnectionStatus,
    },

    /// The handshake collaborator reported a failure.
    #[error("connection failed: {0}")]
    ConnectionFailed(#[from] HandshakeError),

    /// The handshake did not finish within the configured timeout.
    #[error("connection timed out after {0:?}")]
    ConnectTimeout(Duration),

    /// A handshake result arrived for an attempt that is no longer current.
    #[error("handshake result for stale attempt {attempt}")]
    StaleHandshake {
        /// Attempt the result belongs to.
        attempt: u64,
    },

    /// A bridge notification arrived while not connected.
    #[error("bridge event received while not connected")]
    StaleBridgeEvent,

    /// Actor id does not match any actor in the roster.
    #[error("no actor with id {0:?}")]
    UnknownActor(String),

    /// Actor has no resource with the given label.
    #[error("actor {actor_id:?} has no resource {label:?}")]
    UnknownResource {
        /// Actor that was addressed.
        actor_id: String,
        /// Missing resource label.
        label: String,
    },

    /// Chat text is empty after trimming.
    #[error("chat message is empty")]
    EmptyMessage,

    /// Bridge timestamp cannot be represented as an instant.
    #[error("timestamp {0} ms is out of range")]
    InvalidTimestamp(i64),
}
