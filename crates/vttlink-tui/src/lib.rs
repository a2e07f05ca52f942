//! Terminal frontend for the companion client.
//!
//! A thin shell over [`vttlink_app::Driver`] that provides terminal-specific
//! I/O. All orchestration logic lives in the generic [`vttlink_app::Runtime`].
//! The terminal has no web view, so the embedded surface is a
//! [`DetachedSurface`] and the handshake is the offline [`DemoHandshake`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod commands;
pub mod console;
pub mod demo;
pub mod input;
pub mod terminal;
pub mod ui;

pub use commands::Command;
pub use console::{ConnectProfile, Console};
pub use demo::DemoHandshake;
pub use input::{InputState, KeyInput};
pub use terminal::{DetachedSurface, TerminalDriver, TerminalError};
pub use ui::View;
pub use vttlink_app::{App, AppAction, AppEvent, Driver, Runtime};
