//! The real session machine behind the model's interface.
//!
//! [`MachineSession`] drives a [`SessionMachine`] with the same
//! [`Operation`]s as [`crate::model::ModelSession`] and projects it onto the
//! same [`ObservableState`], so the two can be compared step by step.

use std::time::{Duration, Instant};

use chrono::{DateTime, TimeDelta, Utc};
use vttlink_core::{
    Actor, ActorResource, Admission, ConnectionStatus, HandshakeError, HandshakeOutcome,
    SessionAction, SessionConfig, SessionError, SessionMachine, UserConnectionInput,
};

use crate::{
    model::{
        CONNECT_TIMEOUT_MS, DEFAULT_AUTHOR, ECHO_WINDOW_MS, MODEL_USERNAME, ModelStatus,
        ObservableState, Operation, OperationError, OperationResult, RESOURCE, RESOURCE_MAX,
    },
    sim_env::WALL_ORIGIN_MS,
};

/// A [`SessionMachine`] with a virtual clock.
#[derive(Debug)]
pub struct MachineSession {
    machine: SessionMachine,
    t0: Instant,
    wall0: DateTime<Utc>,
    clock_ms: i64,
    forwarded: usize,
}

impl MachineSession {
    /// Disconnected machine configured like the model.
    pub fn new() -> Self {
        let config = SessionConfig {
            connect_timeout: Duration::from_millis(CONNECT_TIMEOUT_MS as u64),
            echo_window: Some(Duration::from_millis(ECHO_WINDOW_MS as u64)),
            default_author: DEFAULT_AUTHOR.to_string(),
            ..SessionConfig::default()
        };
        Self {
            machine: SessionMachine::new(config),
            t0: Instant::now(),
            wall0: DateTime::from_timestamp_millis(WALL_ORIGIN_MS).unwrap_or_default(),
            clock_ms: 0,
            forwarded: 0,
        }
    }

    /// The wrapped machine.
    pub fn machine(&self) -> &SessionMachine {
        &self.machine
    }

    fn now(&self) -> Instant {
        self.t0 + Duration::from_millis(self.clock_ms as u64)
    }

    fn wall(&self) -> DateTime<Utc> {
        self.wall0 + TimeDelta::milliseconds(self.clock_ms)
    }

    /// Apply one operation.
    pub fn apply(&mut self, op: &Operation) -> OperationResult {
        let result = match *op {
            Operation::Connect { mode, with_username } => {
                let mut input = UserConnectionInput::new("https://vtt.example/", "w1", mode.into());
                if with_username {
                    input = input.with_username(MODEL_USERNAME);
                }
                self.machine.connect(input, self.now()).map(|_| OperationResult::Ok)
            },
            Operation::HandshakeOk { actors } => {
                let roster = (0..actors % 4)
                    .map(|i| {
                        Actor::new(format!("a{i}"), format!("Actor {i}"), "PC")
                            .with_resource(ActorResource::new(RESOURCE, 10, RESOURCE_MAX))
                    })
                    .collect();
                let attempt = self.machine.pending_attempt().unwrap_or(0);
                let outcome = HandshakeOutcome { actors: roster, backlog: Vec::new() };
                self.machine.handshake_succeeded(attempt, outcome).map(|_| OperationResult::Ok)
            },
            Operation::HandshakeErr => {
                let attempt = self.machine.pending_attempt().unwrap_or(0);
                self.machine
                    .handshake_failed(attempt, HandshakeError::Rejected("denied".into()))
                    .map(|_| OperationResult::Ok)
            },
            Operation::Disconnect => {
                self.machine.disconnect();
                Ok(OperationResult::Ok)
            },
            Operation::Select { actor } => self
                .machine
                .select_actor(&Operation::actor_id(actor))
                .map(|()| OperationResult::Ok),
            Operation::SendChat { text } => {
                let wall = self.wall();
                self.machine.send_chat(text.text(), wall).map(|actions| {
                    self.forwarded += actions
                        .iter()
                        .filter(|a| matches!(a, SessionAction::Bridge(_)))
                        .count();
                    OperationResult::Ok
                })
            },
            Operation::BridgeChat { from_self, text, offset } => {
                let author =
                    Operation::bridge_author(from_self, self.machine.state().username()).to_string();
                let ts = self.wall().timestamp_millis() + Operation::skew_ms(offset);
                self.machine.receive_chat_from_bridge(&author, text.text(), ts).map(|admission| {
                    match admission {
                        Admission::Appended => OperationResult::Ok,
                        Admission::SuppressedEcho { .. } => OperationResult::Suppressed,
                    }
                })
            },
            Operation::UpdateResource { actor, value } => self
                .machine
                .update_resource(&Operation::actor_id(actor), RESOURCE, i32::from(value))
                .map(|_| OperationResult::Ok),
            Operation::AdvanceTime { millis } => {
                self.clock_ms += i64::from(millis);
                let now = self.now();
                self.machine.tick(now);
                Ok(OperationResult::Ok)
            },
        };

        result.unwrap_or_else(|error| OperationResult::Error(classify(&error)))
    }

    /// Projection comparable with the model's.
    pub fn observable_state(&self) -> ObservableState {
        let state = self.machine.state();
        ObservableState {
            status: match state.status() {
                ConnectionStatus::Disconnected => ModelStatus::Disconnected,
                ConnectionStatus::Connecting => ModelStatus::Connecting,
                ConnectionStatus::Connected => ModelStatus::Connected,
            },
            has_error: state.error_message().is_some(),
            selected: state.selected_actor().map(|a| a.id.clone()),
            feed: state
                .chat_messages()
                .iter()
                .map(|m| (m.author_name().to_string(), m.content().to_string()))
                .collect(),
            resources: state
                .actors()
                .iter()
                .filter_map(|a| a.resource(RESOURCE).map(ActorResource::current))
                .collect(),
            forwarded: self.forwarded,
        }
    }
}

impl Default for MachineSession {
    fn default() -> Self {
        Self::new()
    }
}

fn classify(error: &SessionError) -> OperationError {
    match error {
        SessionError::AlreadyConnecting => OperationError::AlreadyConnecting,
        SessionError::AlreadyConnected => OperationError::AlreadyConnected,
        SessionError::NotConnected { .. } => OperationError::NotConnected,
        SessionError::StaleHandshake { .. } => OperationError::StaleHandshake,
        SessionError::StaleBridgeEvent => OperationError::StaleBridgeEvent,
        SessionError::EmptyMessage => OperationError::EmptyMessage,
        SessionError::UnknownActor(_) | SessionError::UnknownResource { .. } => {
            OperationError::UnknownActor
        },
        SessionError::ConnectionFailed(_)
        | SessionError::ConnectTimeout(_)
        | SessionError::InvalidTimestamp(_) => OperationError::Other,
    }
}
