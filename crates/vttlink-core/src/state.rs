//! Canonical session state.
//!
//! [`SessionState`] is the single source of truth the UI renders from. Only
//! [`crate::SessionMachine`] mutates it; everything outside the crate gets a
//! read-only view.

use std::{fmt, str::FromStr};

use thiserror::Error;

use crate::{
    actor::{Actor, ActorId},
    chat::ChatMessage,
};

/// How chat and sheets are sourced for a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ConnectionMode {
    /// Embedded surface for sheets, native chat fed by the bridge.
    #[default]
    Hybrid,
    /// Everything inside the embedded surface.
    WebView,
    /// No embedded surface; native projections only.
    Native,
}

impl ConnectionMode {
    /// Whether this mode loads the embedded surface.
    pub fn uses_surface(self) -> bool {
        !matches!(self, Self::Native)
    }
}

impl fmt::Display for ConnectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Hybrid => "hybrid",
            Self::WebView => "webview",
            Self::Native => "native",
        })
    }
}

/// Unrecognized mode name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown mode {0:?} (expected hybrid, webview or native)")]
pub struct ParseModeError(String);

impl FromStr for ConnectionMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hybrid" => Ok(Self::Hybrid),
            "webview" | "web" => Ok(Self::WebView),
            "native" => Ok(Self::Native),
            _ => Err(ParseModeError(s.to_string())),
        }
    }
}

/// Connection lifecycle.
///
/// ```text
///                 connect                 handshake ok
/// Disconnected ───────────> Connecting ──────────────> Connected
///      ^                        │                          │
///      │   failure / timeout    │                          │
///      ├────────────────────────┘                          │
///      │                 disconnect                        │
///      └───────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// No session.
    #[default]
    Disconnected,
    /// Handshake in flight.
    Connecting,
    /// Session established.
    Connected,
}

/// Session state rendered by the UI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub(crate) status: ConnectionStatus,
    pub(crate) error_message: Option<String>,
    pub(crate) server_url: Option<String>,
    pub(crate) world: Option<String>,
    pub(crate) username: Option<String>,
    pub(crate) world_url: Option<String>,
    pub(crate) mode: ConnectionMode,
    pub(crate) actors: Vec<Actor>,
    pub(crate) selected_actor: Option<ActorId>,
    pub(crate) chat_messages: Vec<ChatMessage>,
}

impl SessionState {
    /// Current lifecycle status.
    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    /// A handshake is in flight.
    pub fn connecting(&self) -> bool {
        self.status == ConnectionStatus::Connecting
    }

    /// The session is established.
    pub fn connected(&self) -> bool {
        self.status == ConnectionStatus::Connected
    }

    /// Message from the last failed attempt.
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Server URL of the current attempt or session.
    pub fn server_url(&self) -> Option<&str> {
        self.server_url.as_deref()
    }

    /// World of the current attempt or session.
    pub fn world(&self) -> Option<&str> {
        self.world.as_deref()
    }

    /// Username of the current attempt or session.
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// URL the embedded surface loads.
    pub fn world_url(&self) -> Option<&str> {
        self.world_url.as_deref()
    }

    /// Operating mode, fixed while connecting or connected.
    pub fn mode(&self) -> ConnectionMode {
        self.mode
    }

    /// Actor roster in handshake order.
    pub fn actors(&self) -> &[Actor] {
        &self.actors
    }

    /// Currently selected actor, always an element of [`Self::actors`].
    pub fn selected_actor(&self) -> Option<&Actor> {
        let id = self.selected_actor.as_ref()?;
        self.actors.iter().find(|a| &a.id == id)
    }

    /// Chat feed in insertion order.
    pub fn chat_messages(&self) -> &[ChatMessage] {
        &self.chat_messages
    }
}
