//! Session-sync core logic
//!
//! Pure state machine logic for the companion client, decoupled from I/O.
//! This enables deterministic testing of every transition.
//!
//! # Architecture
//!
//! The session is a deterministic state machine isolated from the network,
//! the embedded surface, clocks and scheduling. Time is supplied by the
//! caller, and the handshake is an external collaborator.
//!
//! Transitions produce declarative [`SessionAction`]s describing intended
//! effects (start a handshake, open or release the surface, forward a bridge
//! command). The application runtime or the simulation harness interprets
//! them.
//!
//! # Components
//!
//! - [`session`]: Session state machine (connect, chat, selection, resources)
//! - [`state`]: Canonical state rendered by the UI
//! - [`chat`]: Chat feed and echo reconciliation
//! - [`actor`]: Actor projection for the native view
//! - [`handshake`]: Handshake collaborator trait
//! - [`routing`]: World URL derivation
//! - [`input`]: Connection input and secrets
//! - [`mod@env`]: Environment abstraction (time)
//! - [`error`]: Session error types

pub mod actor;
pub mod chat;
pub mod env;
pub mod error;
pub mod handshake;
pub mod input;
pub mod routing;
pub mod session;
pub mod state;

pub use actor::{Actor, ActorAttribute, ActorId, ActorResource};
pub use chat::{Admission, ChatMessage, ChatOrigin, Reconciler};
pub use env::{Environment, SystemEnv};
pub use error::{HandshakeError, SessionError};
pub use handshake::{Handshake, HandshakeOutcome, HandshakeRequest};
pub use input::{Secret, UserConnectionInput};
pub use routing::{BaseUrlRouting, WorldRouting};
pub use session::{SessionAction, SessionConfig, SessionMachine};
pub use state::{ConnectionMode, ConnectionStatus, ParseModeError, SessionState};
