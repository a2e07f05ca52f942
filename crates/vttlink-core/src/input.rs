//! Connection input supplied by the UI.

use std::fmt;

use crate::state::ConnectionMode;

/// A credential that must never reach logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    /// Wrap a credential.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the raw value. Only the handshake collaborator should call this.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Everything the user entered to start a session.
///
/// Ephemeral: the state machine echoes the non-secret fields into
/// [`crate::SessionState`] and forwards the rest to the handshake, but never
/// retains the credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserConnectionInput {
    /// Base URL of the remote server.
    pub server_url: String,
    /// World identifier.
    pub world: String,
    /// Display name; `None` falls back to the default author label.
    pub username: Option<String>,
    /// Account password.
    pub password: Option<Secret>,
    /// API token.
    pub token: Option<Secret>,
    /// Operating mode for the whole session.
    pub mode: ConnectionMode,
}

impl UserConnectionInput {
    /// Input with only a server URL, world and mode.
    pub fn new(
        server_url: impl Into<String>,
        world: impl Into<String>,
        mode: ConnectionMode,
    ) -> Self {
        Self {
            server_url: server_url.into(),
            world: world.into(),
            username: None,
            password: None,
            token: None,
            mode,
        }
    }

    /// Set the username.
    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set the password.
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(Secret::new(password));
        self
    }

    /// Set the API token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(Secret::new(token));
        self
    }

    /// Trim text fields and turn empty optionals into `None`.
    #[must_use]
    pub fn normalized(self) -> Self {
        let non_empty_secret = |s: Option<Secret>| s.filter(|s| !s.0.is_empty());
        Self {
            server_url: self.server_url.trim().to_string(),
            world: self.world.trim().to_string(),
            username: self.username.map(|u| u.trim().to_string()).filter(|u| !u.is_empty()),
            password: non_empty_secret(self.password),
            token: non_empty_secret(self.token),
            mode: self.mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secrets_are_redacted() {
        let input = UserConnectionInput::new("https://x", "w", ConnectionMode::Native)
            .with_password("hunter2")
            .with_token("tok-123");
        let debug = format!("{input:?}");
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("tok-123"));
        assert!(debug.contains("Secret(***)"));
    }

    #[test]
    fn normalization_trims_and_drops_empties() {
        let input = UserConnectionInput::new(" https://x/ ", " w1 ", ConnectionMode::Hybrid)
            .with_username("   ")
            .with_password("")
            .with_token("t")
            .normalized();
        assert_eq!(input.server_url, "https://x/");
        assert_eq!(input.world, "w1");
        assert_eq!(input.username, None);
        assert_eq!(input.password, None);
        assert_eq!(input.token.as_ref().map(Secret::expose), Some("t"));
    }

    #[test]
    fn password_whitespace_is_preserved() {
        let input = UserConnectionInput::new("u", "w", ConnectionMode::Native)
            .with_password(" pw ")
            .normalized();
        assert_eq!(input.password.as_ref().map(Secret::expose), Some(" pw "));
    }
}
