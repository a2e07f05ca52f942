//! Reference model for model-based testing.
//!
//! [`ModelSession`] is a deliberately naive re-statement of the session
//! rules: plain fields, linear scans, no shared code with the real machine.
//! Tests apply the same [`Operation`] sequence to both and compare results
//! and [`ObservableState`].

use arbitrary::Arbitrary;
use vttlink_core::ConnectionMode;

/// Connect timeout enforced by the model, in milliseconds.
pub const CONNECT_TIMEOUT_MS: i64 = 30_000;

/// Echo window enforced by the model, in milliseconds.
pub const ECHO_WINDOW_MS: i64 = 5_000;

/// Author label used when no username was given.
pub const DEFAULT_AUTHOR: &str = "You";

/// Username used by `Connect { with_username: true }`.
pub const MODEL_USERNAME: &str = "alice";

/// Resource label every model actor carries.
pub const RESOURCE: &str = "HP";

/// Maximum of every model actor's resource.
pub const RESOURCE_MAX: i32 = 20;

/// Small fixed vocabulary for chat text.
const VOCABULARY: [&str; 5] = ["hi", "Attack!", "roll d20", "", " Attack! "];

/// Session mode, arbitrary-friendly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Arbitrary)]
pub enum ModelMode {
    /// [`ConnectionMode::Hybrid`]
    Hybrid,
    /// [`ConnectionMode::WebView`]
    WebView,
    /// [`ConnectionMode::Native`]
    Native,
}

impl From<ModelMode> for ConnectionMode {
    fn from(mode: ModelMode) -> Self {
        match mode {
            ModelMode::Hybrid => Self::Hybrid,
            ModelMode::WebView => Self::WebView,
            ModelMode::Native => Self::Native,
        }
    }
}

/// Chat text drawn from a small vocabulary so echoes actually collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Arbitrary)]
pub struct SmallText {
    /// Vocabulary index (modulo its length).
    pub seed: u8,
}

impl SmallText {
    /// The text this seed selects.
    pub fn text(self) -> &'static str {
        VOCABULARY[usize::from(self.seed) % VOCABULARY.len()]
    }
}

/// One step of a generated scenario.
#[derive(Debug, Clone, PartialEq, Eq, Arbitrary)]
pub enum Operation {
    /// `connect` to a fixed server.
    Connect {
        /// Session mode.
        mode: ModelMode,
        /// Supply [`MODEL_USERNAME`] or no username.
        with_username: bool,
    },
    /// The in-flight handshake succeeds with `actors % 4` actors.
    HandshakeOk {
        /// Roster size seed.
        actors: u8,
    },
    /// The in-flight handshake fails.
    HandshakeErr,
    /// `disconnect`.
    Disconnect,
    /// Select actor `a{actor % 6}`, which may not exist.
    Select {
        /// Actor index seed.
        actor: u8,
    },
    /// Local send.
    SendChat {
        /// Text to send.
        text: SmallText,
    },
    /// Notification from the embedded context.
    BridgeChat {
        /// Author is the session user (an echo candidate) or a stranger.
        from_self: bool,
        /// Message text.
        text: SmallText,
        /// Timestamp skew seed: `offset % 8000 - 4000` ms from now.
        offset: u16,
    },
    /// Set the HP of actor `a{actor % 6}`.
    UpdateResource {
        /// Actor index seed.
        actor: u8,
        /// Requested value.
        value: i16,
    },
    /// Advance virtual time, then run the timeout check.
    AdvanceTime {
        /// Milliseconds to advance.
        millis: u16,
    },
}

impl Operation {
    /// Actor id addressed by an actor seed.
    pub fn actor_id(seed: u8) -> String {
        format!("a{}", seed % 6)
    }

    /// Bridge timestamp skew for an offset seed.
    pub fn skew_ms(offset: u16) -> i64 {
        i64::from(offset % 8000) - 4000
    }

    /// Bridge author for the `from_self` flag given the session username.
    pub fn bridge_author(from_self: bool, username: Option<&str>) -> &str {
        match (from_self, username) {
            (true, Some(name)) => name,
            (true, None) => "Gamemaster",
            (false, _) => "Stranger",
        }
    }
}

/// Why an operation was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationError {
    /// Connect while connecting.
    AlreadyConnecting,
    /// Connect while connected.
    AlreadyConnected,
    /// Operation requires a connected session.
    NotConnected,
    /// Handshake result without a pending attempt.
    StaleHandshake,
    /// Bridge event while not connected.
    StaleBridgeEvent,
    /// No such actor.
    UnknownActor,
    /// Blank chat text.
    EmptyMessage,
    /// Any other rejection. The model never produces it.
    Other,
}

/// Result of one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationResult {
    /// Applied.
    Ok,
    /// A bridge message was recognized as an echo and dropped.
    Suppressed,
    /// Rejected; state unchanged.
    Error(OperationError),
}

/// Lifecycle status in the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelStatus {
    /// No session.
    #[default]
    Disconnected,
    /// Handshake in flight.
    Connecting,
    /// Session established.
    Connected,
}

/// The comparable projection of a session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ObservableState {
    /// Lifecycle status.
    pub status: ModelStatus,
    /// Whether an error message is shown.
    pub has_error: bool,
    /// Selected actor id.
    pub selected: Option<String>,
    /// Feed as `(author, content)` in order.
    pub feed: Vec<(String, String)>,
    /// HP per actor in roster order.
    pub resources: Vec<i32>,
    /// Number of chat sends forwarded to the embedded context.
    pub forwarded: usize,
}

#[derive(Debug, Clone)]
struct ModelMessage {
    author: String,
    content: String,
    at_ms: i64,
    local: bool,
}

/// Reference model of one session.
#[derive(Debug, Clone, Default)]
pub struct ModelSession {
    status: ModelStatus,
    has_error: bool,
    mode: Option<ModelMode>,
    username: Option<String>,
    actors: Vec<(String, i32)>,
    selected: Option<String>,
    feed: Vec<ModelMessage>,
    clock_ms: i64,
    connect_started_ms: i64,
    forwarded: usize,
}

impl ModelSession {
    /// Disconnected model at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time in milliseconds.
    pub fn clock_ms(&self) -> i64 {
        self.clock_ms
    }

    /// Username of the current session.
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Apply one operation.
    pub fn apply(&mut self, op: &Operation) -> OperationResult {
        match *op {
            Operation::Connect { mode, with_username } => self.connect(mode, with_username),
            Operation::HandshakeOk { actors } => {
                if self.status != ModelStatus::Connecting {
                    return OperationResult::Error(OperationError::StaleHandshake);
                }
                self.actors = (0..actors % 4).map(|i| (format!("a{i}"), 10)).collect();
                self.selected = self.actors.first().map(|(id, _)| id.clone());
                self.status = ModelStatus::Connected;
                OperationResult::Ok
            },
            Operation::HandshakeErr => {
                if self.status != ModelStatus::Connecting {
                    return OperationResult::Error(OperationError::StaleHandshake);
                }
                self.reset();
                self.has_error = true;
                OperationResult::Ok
            },
            Operation::Disconnect => {
                self.reset();
                OperationResult::Ok
            },
            Operation::Select { actor } => {
                let id = Operation::actor_id(actor);
                if !self.actors.iter().any(|(a, _)| *a == id) {
                    return OperationResult::Error(OperationError::UnknownActor);
                }
                self.selected = Some(id);
                OperationResult::Ok
            },
            Operation::SendChat { text } => {
                if self.status != ModelStatus::Connected {
                    return OperationResult::Error(OperationError::NotConnected);
                }
                let content = text.text().trim();
                if content.is_empty() {
                    return OperationResult::Error(OperationError::EmptyMessage);
                }
                let author = self.username.clone().unwrap_or_else(|| DEFAULT_AUTHOR.to_string());
                self.feed.push(ModelMessage {
                    author,
                    content: content.to_string(),
                    at_ms: self.clock_ms,
                    local: true,
                });
                if self.mode != Some(ModelMode::Native) {
                    self.forwarded += 1;
                }
                OperationResult::Ok
            },
            Operation::BridgeChat { from_self, text, offset } => {
                if self.status != ModelStatus::Connected {
                    return OperationResult::Error(OperationError::StaleBridgeEvent);
                }
                let author = Operation::bridge_author(from_self, self.username()).to_string();
                let at_ms = self.clock_ms + Operation::skew_ms(offset);
                self.bridge_chat(author, text.text(), at_ms)
            },
            Operation::UpdateResource { actor, value } => {
                if self.status != ModelStatus::Connected {
                    return OperationResult::Error(OperationError::NotConnected);
                }
                let id = Operation::actor_id(actor);
                match self.actors.iter_mut().find(|(a, _)| *a == id) {
                    Some((_, hp)) => {
                        *hp = i32::from(value).clamp(0, RESOURCE_MAX);
                        OperationResult::Ok
                    },
                    None => OperationResult::Error(OperationError::UnknownActor),
                }
            },
            Operation::AdvanceTime { millis } => {
                self.clock_ms += i64::from(millis);
                if self.status == ModelStatus::Connecting
                    && self.clock_ms - self.connect_started_ms >= CONNECT_TIMEOUT_MS
                {
                    self.reset();
                    self.has_error = true;
                }
                OperationResult::Ok
            },
        }
    }

    /// Comparable projection.
    pub fn observable_state(&self) -> ObservableState {
        ObservableState {
            status: self.status,
            has_error: self.has_error,
            selected: self.selected.clone(),
            feed: self.feed.iter().map(|m| (m.author.clone(), m.content.clone())).collect(),
            resources: self.actors.iter().map(|(_, hp)| *hp).collect(),
            forwarded: self.forwarded,
        }
    }

    fn connect(&mut self, mode: ModelMode, with_username: bool) -> OperationResult {
        match self.status {
            ModelStatus::Connecting => OperationResult::Error(OperationError::AlreadyConnecting),
            ModelStatus::Connected => OperationResult::Error(OperationError::AlreadyConnected),
            ModelStatus::Disconnected => {
                self.reset();
                self.status = ModelStatus::Connecting;
                self.mode = Some(mode);
                self.username = with_username.then(|| MODEL_USERNAME.to_string());
                self.connect_started_ms = self.clock_ms;
                OperationResult::Ok
            },
        }
    }

    fn bridge_chat(&mut self, author: String, content: &str, at_ms: i64) -> OperationResult {
        let trimmed = content.trim();
        let is_echo = self.feed.iter().any(|m| {
            m.local
                && m.content == trimmed
                && (m.author == DEFAULT_AUTHOR || m.author.eq_ignore_ascii_case(&author))
                && (at_ms - m.at_ms).abs() <= ECHO_WINDOW_MS
        });
        if is_echo {
            return OperationResult::Suppressed;
        }
        self.feed.push(ModelMessage { author, content: content.to_string(), at_ms, local: false });
        OperationResult::Ok
    }

    /// Back to the empty state; time, error flag and forward count survive
    /// until the caller decides otherwise.
    fn reset(&mut self) {
        *self = Self { clock_ms: self.clock_ms, forwarded: self.forwarded, ..Self::default() };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_lifecycle() {
        let mut model = ModelSession::new();
        assert_eq!(
            model.apply(&Operation::SendChat { text: SmallText { seed: 0 } }),
            OperationResult::Error(OperationError::NotConnected)
        );
        assert_eq!(
            model.apply(&Operation::Connect { mode: ModelMode::Hybrid, with_username: true }),
            OperationResult::Ok
        );
        assert_eq!(
            model.apply(&Operation::Connect { mode: ModelMode::Native, with_username: false }),
            OperationResult::Error(OperationError::AlreadyConnecting)
        );
        assert_eq!(model.apply(&Operation::HandshakeOk { actors: 2 }), OperationResult::Ok);

        let state = model.observable_state();
        assert_eq!(state.status, ModelStatus::Connected);
        assert_eq!(state.selected.as_deref(), Some("a0"));
        assert_eq!(state.resources, vec![10, 10]);
    }

    #[test]
    fn every_echo_copy_inside_window_is_suppressed() {
        let mut model = ModelSession::new();
        model.apply(&Operation::Connect { mode: ModelMode::Hybrid, with_username: true });
        model.apply(&Operation::HandshakeOk { actors: 0 });
        model.apply(&Operation::SendChat { text: SmallText { seed: 4 } });

        let echo = Operation::BridgeChat { from_self: true, text: SmallText { seed: 1 }, offset: 4000 };
        assert_eq!(model.apply(&echo), OperationResult::Suppressed);
        assert_eq!(model.apply(&echo), OperationResult::Suppressed);
        assert_eq!(model.observable_state().feed, vec![("alice".into(), "Attack!".into())]);
        assert_eq!(model.observable_state().forwarded, 1);

        model.apply(&Operation::AdvanceTime { millis: 6000 });
        assert_eq!(model.apply(&echo), OperationResult::Ok);
    }

    #[test]
    fn blank_send_is_rejected() {
        let mut model = ModelSession::new();
        model.apply(&Operation::Connect { mode: ModelMode::Hybrid, with_username: false });
        model.apply(&Operation::HandshakeOk { actors: 0 });
        assert_eq!(
            model.apply(&Operation::SendChat { text: SmallText { seed: 3 } }),
            OperationResult::Error(OperationError::EmptyMessage)
        );
        assert!(model.observable_state().feed.is_empty());
        assert_eq!(model.observable_state().forwarded, 0);
    }

    #[test]
    fn timeout_resets_with_error() {
        let mut model = ModelSession::new();
        model.apply(&Operation::Connect { mode: ModelMode::Native, with_username: false });
        model.apply(&Operation::AdvanceTime { millis: 29_999 });
        assert_eq!(model.observable_state().status, ModelStatus::Connecting);
        model.apply(&Operation::AdvanceTime { millis: 1 });

        let state = model.observable_state();
        assert_eq!(state.status, ModelStatus::Disconnected);
        assert!(state.has_error);
        assert_eq!(model.apply(&Operation::HandshakeOk { actors: 1 }), OperationResult::Error(OperationError::StaleHandshake));
    }
}
