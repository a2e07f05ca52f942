//! Application layer for the companion client
//!
//! Pure intent handling and a generic runtime, so that deterministic
//! simulation runs the same orchestration code as the terminal frontend.
//!
//! # Components
//!
//! - [`App`]: Owns the session machine; turns [`AppEvent`]s into
//!   [`AppAction`]s
//! - [`BridgeTransport`]: Host side of the bridge (surface handle, bootstrap
//!   injection, outbound commands, inbound decoding)
//! - [`Driver`]: Trait for platform-specific I/O
//! - [`Runtime`]: Single-writer orchestration loop using a Driver

mod action;
mod app;
mod bridge;
mod driver;
mod event;
mod runtime;

pub use action::AppAction;
pub use app::App;
pub use bridge::{BridgeError, BridgeTransport, Surface, decode_notification};
pub use driver::Driver;
pub use event::AppEvent;
pub use runtime::{Runtime, RuntimeConfig, RuntimeError};
