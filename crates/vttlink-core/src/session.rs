//! Session state machine.
//!
//! Owns [`SessionState`] and every legal transition on it.
//!
//! # Architecture: Action-Based State Machine
//!
//! - Methods accept time as a parameter (no stored clock)
//! - Methods return the effects to perform as [`SessionAction`]s
//! - The runtime executes actions (spawn the handshake, open or release the
//!   embedded surface, evaluate bridge commands)
//!
//! Every method reads and then writes the whole state, so callers must
//! serialize them. The application runtime does this by owning the machine
//! on a single task.
//!
//! # Handshake attempts
//!
//! Each `connect` starts a numbered attempt. Results carrying any other
//! attempt number are rejected with [`SessionError::StaleHandshake`], so a
//! handshake that finishes after a disconnect, a timeout or a newer attempt
//! never touches the state.

use std::{
    collections::HashSet,
    sync::Arc,
    time::{Duration, Instant},
};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use vttlink_proto::BridgeCommand;

use crate::{
    actor::Actor,
    chat::{Admission, ChatMessage, Reconciler},
    error::{HandshakeError, SessionError},
    handshake::{HandshakeOutcome, HandshakeRequest},
    input::UserConnectionInput,
    routing::{BaseUrlRouting, WorldRouting},
    state::{ConnectionStatus, SessionState},
};

/// Effects requested by the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Run the handshake collaborator for this attempt.
    StartHandshake {
        /// Attempt number to report the result under.
        attempt: u64,
        /// Credentials and target.
        request: HandshakeRequest,
    },

    /// Cancel the handshake for this attempt, if still running.
    AbortHandshake {
        /// Attempt to cancel.
        attempt: u64,
    },

    /// Load the embedded surface at `url`.
    OpenSurface {
        /// Derived world URL.
        url: String,
    },

    /// Drop the embedded surface handle. No further outbound commands are
    /// issued against it.
    ReleaseSurface,

    /// Evaluate a command in the embedded context (best-effort).
    Bridge(BridgeCommand),
}

/// Session configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Time allowed for the handshake before the attempt fails.
    pub connect_timeout: Duration,
    /// Window for suppressing bridge echoes of local sends. `None` appends
    /// every bridge message.
    pub echo_window: Option<Duration>,
    /// Author label for local messages when no username was given.
    pub default_author: String,
    /// Derives the embedded surface URL.
    pub routing: Arc<dyn WorldRouting>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            echo_window: Some(Duration::from_secs(5)),
            default_author: "You".to_string(),
            routing: Arc::new(BaseUrlRouting),
        }
    }
}

/// Session state machine.
#[derive(Debug)]
pub struct SessionMachine {
    config: SessionConfig,
    state: SessionState,
    /// Last attempt number handed out. Survives disconnects.
    attempt: u64,
    /// When the current attempt entered `Connecting`.
    connect_started: Option<Instant>,
    /// Per-process counter keeping chat ids unique.
    chat_seq: u64,
    reconciler: Reconciler,
}

impl SessionMachine {
    /// Create a machine in the empty `Disconnected` state.
    pub fn new(config: SessionConfig) -> Self {
        let reconciler = Reconciler::new(config.echo_window, config.default_author.clone());
        Self {
            config,
            state: SessionState::default(),
            attempt: 0,
            connect_started: None,
            chat_seq: 0,
            reconciler,
        }
    }

    /// Read-only view of the canonical state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Active configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Attempt currently in flight, if connecting.
    pub fn pending_attempt(&self) -> Option<u64> {
        (self.state.status == ConnectionStatus::Connecting).then_some(self.attempt)
    }

    /// Start a connection attempt.
    ///
    /// Records the normalized input, clears any previous error and enters
    /// `Connecting`.
    ///
    /// # Errors
    ///
    /// - `AlreadyConnecting` if an attempt is in flight (state unchanged)
    /// - `AlreadyConnected` if a session is established (state unchanged)
    pub fn connect(
        &mut self,
        input: UserConnectionInput,
        now: Instant,
    ) -> Result<Vec<SessionAction>, SessionError> {
        match self.state.status {
            ConnectionStatus::Connecting => return Err(SessionError::AlreadyConnecting),
            ConnectionStatus::Connected => return Err(SessionError::AlreadyConnected),
            ConnectionStatus::Disconnected => {},
        }

        let input = input.normalized();
        let world_url = self.config.routing.world_url(&input.server_url, &input.world);

        self.attempt += 1;
        self.connect_started = Some(now);
        self.state = SessionState {
            status: ConnectionStatus::Connecting,
            server_url: Some(input.server_url.clone()),
            world: Some(input.world.clone()),
            username: input.username.clone(),
            world_url: world_url.clone(),
            mode: input.mode,
            ..SessionState::default()
        };

        info!(
            attempt = self.attempt,
            mode = %input.mode,
            server_url = %input.server_url,
            world = %input.world,
            "connecting"
        );

        let request = HandshakeRequest {
            server_url: input.server_url,
            world: input.world,
            world_url,
            username: input.username,
            password: input.password,
            token: input.token,
            mode: input.mode,
        };

        Ok(vec![SessionAction::StartHandshake { attempt: self.attempt, request }])
    }

    /// Apply a successful handshake.
    ///
    /// Populates the roster (first actor selected) and any backlog, then
    /// enters `Connected`. Surface modes also get an `OpenSurface` action.
    ///
    /// # Errors
    ///
    /// `StaleHandshake` if `attempt` is not the attempt in flight.
    pub fn handshake_succeeded(
        &mut self,
        attempt: u64,
        outcome: HandshakeOutcome,
    ) -> Result<Vec<SessionAction>, SessionError> {
        self.ensure_pending(attempt)?;

        let actors = dedup_actors(outcome.actors);
        self.state.selected_actor = actors.first().map(|a| a.id.clone());
        self.state.actors = actors;
        self.state.chat_messages = outcome.backlog;
        self.state.status = ConnectionStatus::Connected;
        self.connect_started = None;

        info!(
            attempt,
            actors = self.state.actors.len(),
            backlog = self.state.chat_messages.len(),
            "connected"
        );

        let mut actions = Vec::new();
        if self.state.mode.uses_surface() {
            match &self.state.world_url {
                Some(url) => actions.push(SessionAction::OpenSurface { url: url.clone() }),
                None => warn!(mode = %self.state.mode, "no world URL; embedded surface not opened"),
            }
        }
        Ok(actions)
    }

    /// Apply a failed handshake.
    ///
    /// Returns to `Disconnected` with the failure as the error message.
    ///
    /// # Errors
    ///
    /// `StaleHandshake` if `attempt` is not the attempt in flight.
    pub fn handshake_failed(
        &mut self,
        attempt: u64,
        error: HandshakeError,
    ) -> Result<Vec<SessionAction>, SessionError> {
        self.ensure_pending(attempt)?;
        self.fail(&SessionError::ConnectionFailed(error));
        Ok(Vec::new())
    }

    /// Elapsed time if the attempt in flight has exceeded the timeout.
    pub fn check_timeout(&self, now: Instant) -> Option<Duration> {
        let started = self.connect_started?;
        let elapsed = now.saturating_duration_since(started);
        (elapsed >= self.config.connect_timeout).then_some(elapsed)
    }

    /// Enforce the connect timeout.
    ///
    /// Call periodically. A timed-out attempt returns to `Disconnected` and
    /// yields `AbortHandshake`.
    pub fn tick(&mut self, now: Instant) -> Vec<SessionAction> {
        let Some(elapsed) = self.check_timeout(now) else {
            return Vec::new();
        };
        let attempt = self.attempt;
        warn!(attempt, ?elapsed, "handshake timed out");
        self.fail(&SessionError::ConnectTimeout(self.config.connect_timeout));
        vec![SessionAction::AbortHandshake { attempt }]
    }

    /// End the session from any state.
    ///
    /// Resets the state to its initial empty form and releases the surface.
    /// An attempt in flight is aborted.
    pub fn disconnect(&mut self) -> Vec<SessionAction> {
        let mut actions = Vec::new();
        if let Some(attempt) = self.pending_attempt() {
            actions.push(SessionAction::AbortHandshake { attempt });
        }
        actions.push(SessionAction::ReleaseSurface);

        if self.state.status != ConnectionStatus::Disconnected {
            info!(status = ?self.state.status, "disconnected");
        }

        self.state = SessionState::default();
        self.connect_started = None;
        actions
    }

    /// Select the actor with `actor_id`.
    ///
    /// # Errors
    ///
    /// `UnknownActor` if no actor matches; the state is left unchanged.
    pub fn select_actor(&mut self, actor_id: &str) -> Result<(), SessionError> {
        if !self.state.actors.iter().any(|a| a.id == actor_id) {
            return Err(SessionError::UnknownActor(actor_id.to_string()));
        }
        self.state.selected_actor = Some(actor_id.to_string());
        Ok(())
    }

    /// Append a locally authored message.
    ///
    /// The author is the session username or the default label. Outside
    /// native mode a `Bridge` action forwards the text to the embedded
    /// context; the caller must execute it exactly once. Surrounding
    /// whitespace is trimmed.
    ///
    /// # Errors
    ///
    /// - `NotConnected` unless connected
    /// - `EmptyMessage` if nothing is left after trimming (state unchanged)
    pub fn send_chat(
        &mut self,
        text: &str,
        at: DateTime<Utc>,
    ) -> Result<Vec<SessionAction>, SessionError> {
        self.ensure_connected()?;
        let text = text.trim();
        if text.is_empty() {
            return Err(SessionError::EmptyMessage);
        }

        let seq = self.next_seq();
        let author = self.state.username.as_deref().unwrap_or(&self.config.default_author);
        let message = ChatMessage::local(seq, author, text, at);
        debug!(id = message.id(), "local chat appended");
        self.state.chat_messages.push(message);

        if self.state.mode.uses_surface() {
            Ok(vec![SessionAction::Bridge(BridgeCommand::submit_chat(text))])
        } else {
            Ok(Vec::new())
        }
    }

    /// Append a message observed through the bridge.
    ///
    /// The timestamp is the embedded context's, in milliseconds since the
    /// epoch. An echo of a recent local send may be suppressed, see
    /// [`Reconciler`].
    ///
    /// # Errors
    ///
    /// - `StaleBridgeEvent` unless connected (state unchanged)
    /// - `InvalidTimestamp` if `timestamp_ms` is out of range
    pub fn receive_chat_from_bridge(
        &mut self,
        author: &str,
        content: &str,
        timestamp_ms: i64,
    ) -> Result<Admission, SessionError> {
        if self.state.status != ConnectionStatus::Connected {
            return Err(SessionError::StaleBridgeEvent);
        }
        let at = DateTime::from_timestamp_millis(timestamp_ms)
            .ok_or(SessionError::InvalidTimestamp(timestamp_ms))?;

        let message = ChatMessage::bridge(self.chat_seq, author, content, at);
        let admission = self.reconciler.admit(&self.state.chat_messages, &message);
        match &admission {
            Admission::Appended => {
                self.chat_seq += 1;
                debug!(id = message.id(), "bridge chat appended");
                self.state.chat_messages.push(message);
            },
            Admission::SuppressedEcho { local_id } => {
                debug!(local_id, "bridge echo of local message suppressed");
            },
        }
        Ok(admission)
    }

    /// Set a resource of an actor, clamped into `0..=max`.
    ///
    /// Returns the committed value.
    ///
    /// # Errors
    ///
    /// `NotConnected`, `UnknownActor` or `UnknownResource`; the state is
    /// left unchanged.
    pub fn update_resource(
        &mut self,
        actor_id: &str,
        label: &str,
        new_current: i32,
    ) -> Result<i32, SessionError> {
        self.ensure_connected()?;

        let actor = self
            .state
            .actors
            .iter_mut()
            .find(|a| a.id == actor_id)
            .ok_or_else(|| SessionError::UnknownActor(actor_id.to_string()))?;
        let resource = actor.resource_mut(label).ok_or_else(|| SessionError::UnknownResource {
            actor_id: actor_id.to_string(),
            label: label.to_string(),
        })?;

        let committed = resource.set_current(new_current);
        debug!(actor_id, label, requested = new_current, committed, "resource updated");
        Ok(committed)
    }

    fn ensure_pending(&self, attempt: u64) -> Result<(), SessionError> {
        if self.pending_attempt() == Some(attempt) {
            Ok(())
        } else {
            debug!(attempt, current = self.attempt, "ignoring stale handshake result");
            Err(SessionError::StaleHandshake { attempt })
        }
    }

    fn ensure_connected(&self) -> Result<(), SessionError> {
        if self.state.status == ConnectionStatus::Connected {
            Ok(())
        } else {
            Err(SessionError::NotConnected { status: self.state.status })
        }
    }

    fn fail(&mut self, error: &SessionError) {
        warn!(attempt = self.attempt, %error, "connection attempt failed");
        self.state =
            SessionState { error_message: Some(error.to_string()), ..SessionState::default() };
        self.connect_started = None;
    }

    fn next_seq(&mut self) -> u64 {
        let seq = self.chat_seq;
        self.chat_seq += 1;
        seq
    }
}

impl Default for SessionMachine {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

/// Keep the first actor for each id.
fn dedup_actors(actors: Vec<Actor>) -> Vec<Actor> {
    let mut seen = HashSet::new();
    actors
        .into_iter()
        .filter(|a| {
            let fresh = seen.insert(a.id.clone());
            if !fresh {
                warn!(actor_id = %a.id, "duplicate actor id in roster dropped");
            }
            fresh
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        actor::ActorResource,
        state::ConnectionMode,
    };

    fn at(ms: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(ms).unwrap()
    }

    fn roster() -> Vec<Actor> {
        vec![
            Actor::new("a1", "Althea Stormborn", "PC").with_resource(ActorResource::new("HP", 28, 34)),
            Actor::new("a2", "Kael Nightwind", "PC").with_resource(ActorResource::new("HP", 21, 26)),
        ]
    }

    fn connected(mode: ConnectionMode) -> SessionMachine {
        let mut machine = SessionMachine::default();
        let t0 = Instant::now();
        let input = UserConnectionInput::new("https://example.com/", "w1", mode).with_username("alice");
        machine.connect(input, t0).unwrap();
        machine
            .handshake_succeeded(1, HandshakeOutcome { actors: roster(), backlog: Vec::new() })
            .unwrap();
        machine
    }

    #[test]
    fn connect_lifecycle() {
        let t0 = Instant::now();
        let mut machine = SessionMachine::default();
        assert_eq!(machine.state().status(), ConnectionStatus::Disconnected);

        let input = UserConnectionInput::new("https://example.com/", "w1", ConnectionMode::Hybrid)
            .with_password("pw");
        let actions = machine.connect(input, t0).unwrap();
        assert!(machine.state().connecting());
        assert!(!machine.state().connected());
        assert_eq!(machine.state().world_url(), Some("https://example.com"));
        assert_eq!(machine.state().world(), Some("w1"));

        let [SessionAction::StartHandshake { attempt, request }] = actions.as_slice() else {
            panic!("expected a single StartHandshake, got {actions:?}");
        };
        assert_eq!(*attempt, 1);
        assert_eq!(request.password.as_ref().map(|p| p.expose()), Some("pw"));

        let actions = machine
            .handshake_succeeded(1, HandshakeOutcome { actors: roster(), backlog: Vec::new() })
            .unwrap();
        assert!(machine.state().connected());
        assert_eq!(machine.state().selected_actor().map(|a| a.id.as_str()), Some("a1"));
        assert_eq!(actions, vec![SessionAction::OpenSurface { url: "https://example.com".into() }]);
    }

    #[test]
    fn native_mode_opens_no_surface() {
        let mut machine = SessionMachine::default();
        machine
            .connect(UserConnectionInput::new("https://x", "w", ConnectionMode::Native), Instant::now())
            .unwrap();
        let actions = machine.handshake_succeeded(1, HandshakeOutcome::default()).unwrap();
        assert!(actions.is_empty());
        assert!(machine.state().selected_actor().is_none());
    }

    #[test]
    fn second_connect_is_rejected_without_side_effects() {
        let t0 = Instant::now();
        let mut machine = SessionMachine::default();
        machine.connect(UserConnectionInput::new("https://a", "w", ConnectionMode::Hybrid), t0).unwrap();
        let before = machine.state().clone();

        let result =
            machine.connect(UserConnectionInput::new("https://b", "w", ConnectionMode::Native), t0);
        assert_eq!(result, Err(SessionError::AlreadyConnecting));
        assert_eq!(machine.state(), &before);

        // The original attempt still completes normally.
        machine.handshake_succeeded(1, HandshakeOutcome::default()).unwrap();
        assert!(machine.state().connected());
        assert_eq!(machine.state().server_url(), Some("https://a"));
    }

    #[test]
    fn connect_while_connected_is_rejected() {
        let mut machine = connected(ConnectionMode::Hybrid);
        let result = machine
            .connect(UserConnectionInput::new("https://b", "w", ConnectionMode::Native), Instant::now());
        assert_eq!(result, Err(SessionError::AlreadyConnected));
        assert_eq!(machine.state().mode(), ConnectionMode::Hybrid);
    }

    #[test]
    fn handshake_failure_sets_error_and_clears_on_next_attempt() {
        let t0 = Instant::now();
        let mut machine = SessionMachine::default();
        machine.connect(UserConnectionInput::new("https://a", "w", ConnectionMode::Hybrid), t0).unwrap();
        machine.handshake_failed(1, HandshakeError::Rejected("bad password".into())).unwrap();

        assert_eq!(machine.state().status(), ConnectionStatus::Disconnected);
        assert_eq!(
            machine.state().error_message(),
            Some("connection failed: authentication rejected: bad password")
        );
        assert!(machine.state().server_url().is_none());

        machine.connect(UserConnectionInput::new("https://a", "w", ConnectionMode::Hybrid), t0).unwrap();
        assert!(machine.state().error_message().is_none());
        assert_eq!(machine.pending_attempt(), Some(2));
    }

    #[test]
    fn stale_handshake_results_are_rejected() {
        let t0 = Instant::now();
        let mut machine = SessionMachine::default();
        machine.connect(UserConnectionInput::new("https://a", "w", ConnectionMode::Hybrid), t0).unwrap();
        machine.disconnect();

        let result = machine.handshake_succeeded(1, HandshakeOutcome::default());
        assert_eq!(result, Err(SessionError::StaleHandshake { attempt: 1 }));
        assert_eq!(machine.state(), &SessionState::default());

        machine.connect(UserConnectionInput::new("https://a", "w", ConnectionMode::Hybrid), t0).unwrap();
        let result = machine.handshake_failed(1, HandshakeError::Other("late".into()));
        assert_eq!(result, Err(SessionError::StaleHandshake { attempt: 1 }));
        assert!(machine.state().connecting());
    }

    #[test]
    fn connect_timeout() {
        let t0 = Instant::now();
        let config = SessionConfig { connect_timeout: Duration::from_secs(10), ..Default::default() };
        let mut machine = SessionMachine::new(config);
        machine.connect(UserConnectionInput::new("https://a", "w", ConnectionMode::Hybrid), t0).unwrap();

        assert!(machine.tick(t0 + Duration::from_secs(9)).is_empty());
        assert!(machine.state().connecting());

        let actions = machine.tick(t0 + Duration::from_secs(10));
        assert_eq!(actions, vec![SessionAction::AbortHandshake { attempt: 1 }]);
        assert_eq!(machine.state().status(), ConnectionStatus::Disconnected);
        assert_eq!(machine.state().error_message(), Some("connection timed out after 10s"));

        // A result arriving after the timeout is stale.
        assert!(machine.handshake_succeeded(1, HandshakeOutcome::default()).is_err());
    }

    #[test]
    fn tick_is_inert_when_connected() {
        let mut machine = connected(ConnectionMode::Native);
        assert!(machine.tick(Instant::now() + Duration::from_secs(3600)).is_empty());
        assert!(machine.state().connected());
    }

    #[test]
    fn disconnect_resets_to_initial_state() {
        let mut machine = connected(ConnectionMode::Hybrid);
        machine.send_chat("hello", at(1_000)).unwrap();
        let actions = machine.disconnect();
        assert_eq!(actions, vec![SessionAction::ReleaseSurface]);
        assert_eq!(machine.state(), &SessionState::default());
    }

    #[test]
    fn disconnect_while_connecting_aborts_attempt() {
        let mut machine = SessionMachine::default();
        machine
            .connect(UserConnectionInput::new("https://a", "w", ConnectionMode::Hybrid), Instant::now())
            .unwrap();
        let actions = machine.disconnect();
        assert_eq!(
            actions,
            vec![SessionAction::AbortHandshake { attempt: 1 }, SessionAction::ReleaseSurface]
        );
    }

    #[test]
    fn select_actor_hit_and_miss() {
        let mut machine = connected(ConnectionMode::Native);
        machine.select_actor("a2").unwrap();
        assert_eq!(machine.state().selected_actor().map(|a| a.name.as_str()), Some("Kael Nightwind"));

        let before = machine.state().clone();
        assert_eq!(machine.select_actor("zz"), Err(SessionError::UnknownActor("zz".into())));
        assert_eq!(machine.state(), &before);
    }

    #[test]
    fn select_actor_with_empty_roster_is_a_miss() {
        let mut machine = SessionMachine::default();
        assert!(matches!(machine.select_actor("a1"), Err(SessionError::UnknownActor(_))));
    }

    #[test]
    fn send_chat_forwards_outside_native_mode() {
        let mut machine = connected(ConnectionMode::WebView);
        let actions = machine.send_chat("hi there", at(5_000)).unwrap();
        assert_eq!(actions, vec![SessionAction::Bridge(BridgeCommand::submit_chat("hi there"))]);

        let msg = machine.state().chat_messages().last().unwrap();
        assert_eq!(msg.author_name(), "alice");
        assert_eq!(msg.content(), "hi there");
        assert_eq!(msg.timestamp(), at(5_000));
        assert!(msg.id().starts_with("local-"));
    }

    #[test]
    fn send_chat_in_native_mode_stays_local() {
        let mut machine = connected(ConnectionMode::Native);
        assert!(machine.send_chat("hi", at(5_000)).unwrap().is_empty());
        assert_eq!(machine.state().chat_messages().len(), 1);
    }

    #[test]
    fn send_chat_uses_default_author_without_username() {
        let mut machine = SessionMachine::default();
        machine
            .connect(UserConnectionInput::new("https://a", "w", ConnectionMode::Native), Instant::now())
            .unwrap();
        machine.handshake_succeeded(1, HandshakeOutcome::default()).unwrap();
        machine.send_chat("hi", at(0)).unwrap();
        assert_eq!(machine.state().chat_messages()[0].author_name(), "You");
    }

    #[test]
    fn send_chat_requires_connection() {
        let mut machine = SessionMachine::default();
        assert!(matches!(
            machine.send_chat("hi", at(0)),
            Err(SessionError::NotConnected { status: ConnectionStatus::Disconnected })
        ));
        assert_eq!(machine.state(), &SessionState::default());
    }

    #[test]
    fn bridge_chat_before_connect_is_stale() {
        let mut machine = SessionMachine::default();
        assert_eq!(
            machine.receive_chat_from_bridge("GM", "hello", 1_000),
            Err(SessionError::StaleBridgeEvent)
        );
        assert_eq!(machine.state(), &SessionState::default());
    }

    #[test]
    fn bridge_chat_keeps_arrival_order() {
        let mut machine = connected(ConnectionMode::Hybrid);
        machine.receive_chat_from_bridge("GM", "second", 2_000).unwrap();
        machine.receive_chat_from_bridge("GM", "first", 1_000).unwrap();

        let contents: Vec<_> =
            machine.state().chat_messages().iter().map(ChatMessage::content).collect();
        assert_eq!(contents, ["second", "first"]);
        assert_eq!(machine.state().chat_messages()[1].timestamp(), at(1_000));
    }

    #[test]
    fn bridge_echo_of_local_send_is_suppressed() {
        let mut machine = connected(ConnectionMode::Hybrid);
        machine.send_chat("Attack!", at(10_000)).unwrap();
        let created = machine.receive_chat_from_bridge("alice", "Attack!", 10_100).unwrap();
        let rendered = machine.receive_chat_from_bridge("alice", "Attack!", 10_150).unwrap();
        assert_eq!(created, Admission::SuppressedEcho { local_id: "local-10000-0".into() });
        assert_eq!(rendered, created);
        assert_eq!(machine.state().chat_messages().len(), 1);

        // Same text from the same author after the window is a new message.
        let later = machine.receive_chat_from_bridge("alice", "Attack!", 15_001).unwrap();
        assert_eq!(later, Admission::Appended);
        assert_eq!(machine.state().chat_messages().len(), 2);
    }

    #[test]
    fn send_chat_trims_text() {
        let mut machine = connected(ConnectionMode::Hybrid);
        let actions = machine.send_chat("  roll d20 \n", at(1_000)).unwrap();
        assert_eq!(actions, vec![SessionAction::Bridge(BridgeCommand::submit_chat("roll d20"))]);
        assert_eq!(machine.state().chat_messages()[0].content(), "roll d20");
    }

    #[test]
    fn blank_chat_is_rejected_without_side_effects() {
        let mut machine = connected(ConnectionMode::Hybrid);
        let before = machine.state().clone();
        assert_eq!(machine.send_chat("   ", at(1_000)), Err(SessionError::EmptyMessage));
        assert_eq!(machine.send_chat("", at(1_000)), Err(SessionError::EmptyMessage));
        assert_eq!(machine.state(), &before);

        // Ids stay dense after a rejected send.
        machine.send_chat("hi", at(2_000)).unwrap();
        assert_eq!(machine.state().chat_messages()[0].id(), "local-2000-0");
    }

    #[test]
    fn echo_suppression_can_be_disabled() {
        let config = SessionConfig { echo_window: None, ..Default::default() };
        let mut machine = SessionMachine::new(config);
        machine
            .connect(UserConnectionInput::new("https://a", "w", ConnectionMode::Hybrid), Instant::now())
            .unwrap();
        machine.handshake_succeeded(1, HandshakeOutcome::default()).unwrap();
        machine.send_chat("Attack!", at(10_000)).unwrap();
        machine.receive_chat_from_bridge("You", "Attack!", 10_000).unwrap();
        assert_eq!(machine.state().chat_messages().len(), 2);
    }

    #[test]
    fn out_of_range_timestamp_is_rejected() {
        let mut machine = connected(ConnectionMode::Hybrid);
        assert_eq!(
            machine.receive_chat_from_bridge("GM", "x", i64::MAX),
            Err(SessionError::InvalidTimestamp(i64::MAX))
        );
        assert!(machine.state().chat_messages().is_empty());
    }

    #[test]
    fn backlog_seeds_feed() {
        let mut machine = SessionMachine::default();
        machine
            .connect(UserConnectionInput::new("https://a", "w", ConnectionMode::Native), Instant::now())
            .unwrap();
        let backlog = vec![ChatMessage::new(
            "m1",
            "GM",
            "Welcome to the session!",
            at(0),
            crate::chat::ChatOrigin::Backlog,
        )];
        machine.handshake_succeeded(1, HandshakeOutcome { actors: Vec::new(), backlog }).unwrap();
        assert_eq!(machine.state().chat_messages()[0].id(), "m1");
    }

    #[test]
    fn duplicate_actor_ids_keep_first() {
        let mut machine = SessionMachine::default();
        machine
            .connect(UserConnectionInput::new("https://a", "w", ConnectionMode::Native), Instant::now())
            .unwrap();
        let actors = vec![Actor::new("a1", "First", "PC"), Actor::new("a1", "Second", "PC")];
        machine.handshake_succeeded(1, HandshakeOutcome { actors, backlog: Vec::new() }).unwrap();
        assert_eq!(machine.state().actors().len(), 1);
        assert_eq!(machine.state().actors()[0].name, "First");
    }

    #[test]
    fn update_resource_commits_clamped_value() {
        let mut machine = connected(ConnectionMode::Native);
        assert_eq!(machine.update_resource("a1", "HP", 99), Ok(34));
        assert_eq!(machine.update_resource("a1", "HP", 20), Ok(20));

        let selected = machine.state().selected_actor().unwrap();
        assert_eq!(selected.resource("HP").map(ActorResource::current), Some(20));
    }

    #[test]
    fn update_resource_errors_leave_state_unchanged() {
        let mut machine = connected(ConnectionMode::Native);
        let before = machine.state().clone();
        assert!(matches!(
            machine.update_resource("zz", "HP", 1),
            Err(SessionError::UnknownActor(_))
        ));
        assert!(matches!(
            machine.update_resource("a1", "Mana", 1),
            Err(SessionError::UnknownResource { .. })
        ));
        assert_eq!(machine.state(), &before);

        machine.disconnect();
        assert!(matches!(
            machine.update_resource("a1", "HP", 1),
            Err(SessionError::NotConnected { .. })
        ));
    }
}
