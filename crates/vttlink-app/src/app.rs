//! Application state machine.
//!
//! [`App`] owns the [`SessionMachine`] and is the single writer of session
//! state. It supplies time from its [`Environment`], turns events into
//! session operations and lifts the resulting effects into [`AppAction`]s.
//!
//! Tolerated misses (unknown actor, stale handshake or bridge events,
//! malformed notifications) are logged and produce no actions.

use tracing::{debug, warn};
use vttlink_core::{
    Admission, Environment, SessionAction, SessionConfig, SessionError, SessionMachine,
    SessionState,
};
use vttlink_proto::BridgeNotification;

use crate::{AppAction, AppEvent, bridge::decode_notification};

/// Application state.
#[derive(Debug)]
pub struct App<E: Environment> {
    env: E,
    session: SessionMachine,
}

impl<E: Environment> App<E> {
    /// Create an app with a fresh session.
    pub fn new(env: E, config: SessionConfig) -> Self {
        Self { env, session: SessionMachine::new(config) }
    }

    /// Session state for rendering.
    pub fn state(&self) -> &SessionState {
        self.session.state()
    }

    /// Environment supplying time.
    pub fn env(&self) -> &E {
        &self.env
    }

    /// Handle one event.
    pub fn handle(&mut self, event: AppEvent) -> Vec<AppAction> {
        let result = match event {
            AppEvent::Connect(input) => self.session.connect(input, self.env.now()).map(lift),
            AppEvent::Disconnect => Ok(lift(self.session.disconnect())),
            AppEvent::SelectActor(actor_id) => {
                self.session.select_actor(&actor_id).map(|()| vec![AppAction::Render])
            },
            AppEvent::SendChat(text) => {
                self.session.send_chat(&text, self.env.wall_clock()).map(lift)
            },
            AppEvent::UpdateResource { actor_id, label, value } => self
                .session
                .update_resource(&actor_id, &label, value)
                .map(|_| vec![AppAction::Render]),
            AppEvent::Notification(raw) => self.on_notification(&raw),
            AppEvent::SurfaceProgress => Ok(vec![AppAction::InstallBootstrap]),
            AppEvent::HandshakeFinished { attempt, result } => match result {
                Ok(outcome) => self.session.handshake_succeeded(attempt, outcome).map(lift),
                Err(error) => self.session.handshake_failed(attempt, error).map(lift),
            },
            AppEvent::Tick => {
                let actions = self.session.tick(self.env.now());
                Ok(if actions.is_empty() { Vec::new() } else { lift(actions) })
            },
            AppEvent::Quit => Ok(vec![AppAction::Quit]),
        };

        result.unwrap_or_else(|error| {
            tolerate(&error);
            Vec::new()
        })
    }

    fn on_notification(&mut self, raw: &str) -> Result<Vec<AppAction>, SessionError> {
        let notification = match decode_notification(raw) {
            Ok(notification) => notification,
            Err(error) => {
                warn!(%error, "dropping bridge notification");
                return Ok(Vec::new());
            },
        };

        match notification {
            BridgeNotification::ChatMessage { author, content, timestamp } => {
                let admission =
                    self.session.receive_chat_from_bridge(&author, &content, timestamp)?;
                Ok(match admission {
                    Admission::Appended => vec![AppAction::Render],
                    Admission::SuppressedEcho { .. } => Vec::new(),
                })
            },
        }
    }
}

/// Wrap session effects, then re-render.
fn lift(actions: Vec<SessionAction>) -> Vec<AppAction> {
    actions.into_iter().map(AppAction::Session).chain([AppAction::Render]).collect()
}

fn tolerate(error: &SessionError) {
    match error {
        SessionError::UnknownActor(_)
        | SessionError::StaleHandshake { .. }
        | SessionError::StaleBridgeEvent
        | SessionError::EmptyMessage => debug!(%error, "ignored"),
        _ => warn!(%error, "rejected"),
    }
}
