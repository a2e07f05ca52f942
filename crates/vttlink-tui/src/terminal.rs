//! Terminal driver.
//!
//! Implements [`Driver`] over crossterm input and a ratatui terminal. The
//! terminal cannot host a web page, so embedded surfaces are
//! [`DetachedSurface`]s that write every script they receive to the log.

use std::{convert::Infallible, io};

use crossterm::event::{Event, EventStream};
use futures::StreamExt;
use ratatui::DefaultTerminal;
use thiserror::Error;
use tracing::{debug, info, warn};
use vttlink_app::{App, AppEvent, Driver, Surface};
use vttlink_core::Environment;
use vttlink_proto::{BOOTSTRAP_SCRIPT, BridgeCommand};

use crate::{
    console::{ConnectProfile, Console},
    input::KeyInput,
    ui,
};

/// Terminal driver failures.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// Terminal I/O failed.
    #[error("terminal I/O: {0}")]
    Io(#[from] io::Error),

    /// The input stream ended.
    #[error("terminal input closed")]
    InputClosed,
}

/// Stand-in for an embedded web view.
///
/// Nothing is loaded, so the terminal driver reports no load progress and
/// the bootstrap script is injected once, when the surface is attached.
#[derive(Debug)]
pub struct DetachedSurface {
    url: String,
    evaluated: usize,
}

impl DetachedSurface {
    /// Surface for `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), evaluated: 0 }
    }

    /// URL the surface was opened for.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Number of scripts received.
    pub fn evaluated(&self) -> usize {
        self.evaluated
    }
}

impl Surface for DetachedSurface {
    type Error = Infallible;

    fn evaluate(&mut self, script: &str) -> Result<(), Infallible> {
        self.evaluated += 1;
        if script == BOOTSTRAP_SCRIPT {
            debug!(url = %self.url, "bootstrap script received");
            return Ok(());
        }
        match BridgeCommand::from_script(script) {
            Ok(BridgeCommand::SubmitChat { text }) => {
                info!(url = %self.url, %text, "chat handed to detached surface");
            },
            Err(error) => warn!(url = %self.url, %error, "unrecognized script"),
        }
        Ok(())
    }
}

/// Driver for an interactive terminal.
pub struct TerminalDriver {
    terminal: DefaultTerminal,
    events: EventStream,
    console: Console,
}

impl TerminalDriver {
    /// Enter the alternate screen and start reading input.
    pub fn new(profile: ConnectProfile) -> Result<Self, TerminalError> {
        let terminal = ratatui::try_init()?;
        Ok(Self { terminal, events: EventStream::new(), console: Console::new(profile) })
    }

    /// Deliver `event` to the runtime before any key input.
    pub fn queue(&mut self, event: AppEvent) {
        self.console.queue(event);
    }

    fn redraw(&mut self) -> Result<(), TerminalError> {
        let view = self.console.view();
        self.terminal.draw(|frame| ui::draw(frame, &view))?;
        Ok(())
    }
}

impl Driver for TerminalDriver {
    type Error = TerminalError;
    type Surface = DetachedSurface;

    async fn poll_event(&mut self) -> Result<Vec<AppEvent>, TerminalError> {
        let queued = self.console.take_queued();
        if !queued.is_empty() {
            return Ok(queued);
        }

        let event = self.events.next().await.ok_or(TerminalError::InputClosed)??;
        let events = match event {
            Event::Key(key) => {
                KeyInput::from_event(&key).map(|key| self.console.key(key)).unwrap_or_default()
            },
            _ => Vec::new(),
        };
        self.redraw()?;
        Ok(events)
    }

    fn open_surface(&mut self, url: &str) -> Result<DetachedSurface, TerminalError> {
        info!(url, "opening detached surface");
        Ok(DetachedSurface::new(url))
    }

    fn render<E: Environment>(&mut self, app: &App<E>) -> Result<(), TerminalError> {
        self.console.sync(app.state());
        self.redraw()
    }

    fn stop(&mut self) {
        ratatui::restore();
    }
}
