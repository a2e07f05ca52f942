//! Handshake collaborator.
//!
//! Authentication with the remote server is outside this crate. The state
//! machine emits [`crate::SessionAction::StartHandshake`]; the runtime hands
//! the request to a [`Handshake`] implementation on a background task and
//! feeds the result back in.

use async_trait::async_trait;

use crate::{
    actor::Actor,
    chat::ChatMessage,
    error::HandshakeError,
    input::Secret,
    state::ConnectionMode,
};

/// Everything the collaborator needs to authenticate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeRequest {
    /// Normalized server URL as entered.
    pub server_url: String,
    /// World identifier.
    pub world: String,
    /// URL derived by the configured routing, if any.
    pub world_url: Option<String>,
    /// Display name.
    pub username: Option<String>,
    /// Account password.
    pub password: Option<Secret>,
    /// API token.
    pub token: Option<Secret>,
    /// Session mode.
    pub mode: ConnectionMode,
}

/// Data returned by a successful handshake.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandshakeOutcome {
    /// Actor roster for the native projection.
    pub actors: Vec<Actor>,
    /// Prior chat history, appended before any live message.
    pub backlog: Vec<ChatMessage>,
}

/// Performs the network/authentication step of `connect`.
///
/// Implementations may take arbitrarily long; the runtime enforces the
/// connect timeout and may abort the task.
#[async_trait]
pub trait Handshake: Send + Sync + 'static {
    /// Authenticate against the remote server.
    async fn handshake(&self, request: HandshakeRequest)
    -> Result<HandshakeOutcome, HandshakeError>;
}
