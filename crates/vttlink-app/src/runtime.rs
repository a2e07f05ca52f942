//! Generic application runtime.
//!
//! The [`Runtime`] is the single owner of the [`App`] and therefore of
//! session state. Everything that can mutate state is marshalled onto its
//! loop:
//!
//! ```text
//!  Driver::poll_event ──┐
//!  handshake results ───┼──> App::handle ──> AppActions ──> execute
//!  tick interval ───────┘
//! ```
//!
//! Handshakes run as spawned tasks so the loop never blocks on them; their
//! results come back over a channel tagged with the attempt number.

use std::{sync::Arc, time::Duration};

use thiserror::Error;
use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tracing::{debug, info, warn};
use vttlink_core::{
    Environment, Handshake, HandshakeError, HandshakeOutcome, HandshakeRequest, SessionAction,
};

use crate::{App, AppAction, AppEvent, BridgeError, BridgeTransport, Driver};

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Interval of [`AppEvent::Tick`], which drives the connect timeout.
    pub tick_interval: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self { tick_interval: Duration::from_millis(100) }
    }
}

/// Fatal runtime errors.
#[derive(Debug, Error)]
pub enum RuntimeError<E: std::error::Error + 'static> {
    /// The driver failed to poll or render.
    #[error("driver error: {0}")]
    Driver(#[source] E),
}

type HandshakeResult = (u64, Result<HandshakeOutcome, HandshakeError>);

struct PendingHandshake {
    attempt: u64,
    task: JoinHandle<()>,
}

enum Flow {
    Continue,
    Quit,
}

/// Orchestrates a [`Driver`], the [`App`] and the handshake collaborator.
pub struct Runtime<D: Driver, H, E: Environment> {
    app: App<E>,
    driver: D,
    bridge: BridgeTransport<D::Surface>,
    handshake: Arc<H>,
    config: RuntimeConfig,
    pending: Option<PendingHandshake>,
}

impl<D, H, E> Runtime<D, H, E>
where
    D: Driver,
    H: Handshake,
    E: Environment,
{
    /// Create a runtime.
    pub fn new(app: App<E>, driver: D, handshake: Arc<H>, config: RuntimeConfig) -> Self {
        Self { app, driver, bridge: BridgeTransport::new(), handshake, config, pending: None }
    }

    /// Application state.
    pub fn app(&self) -> &App<E> {
        &self.app
    }

    /// Run until a quit action or a driver error.
    ///
    /// On exit any handshake in flight is aborted, the surface is released
    /// and the driver is stopped.
    pub async fn run(mut self) -> Result<(), RuntimeError<D::Error>> {
        let (results_tx, mut results_rx) = mpsc::unbounded_channel::<HandshakeResult>();
        let mut ticker = time::interval(self.config.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!("runtime started");
        let outcome = match self.driver.render(&self.app) {
            Ok(()) => loop {
                let polled = tokio::select! {
                    polled = self.driver.poll_event() => polled.map_err(RuntimeError::Driver),
                    Some((attempt, result)) = results_rx.recv() => {
                        Ok(vec![AppEvent::HandshakeFinished { attempt, result }])
                    },
                    _ = ticker.tick() => Ok(vec![AppEvent::Tick]),
                };

                match polled.and_then(|events| self.process(events, &results_tx)) {
                    Ok(Flow::Continue) => {},
                    Ok(Flow::Quit) => break Ok(()),
                    Err(error) => break Err(error),
                }
            },
            Err(error) => Err(RuntimeError::Driver(error)),
        };

        self.shutdown();
        outcome
    }

    fn process(
        &mut self,
        events: Vec<AppEvent>,
        results: &mpsc::UnboundedSender<HandshakeResult>,
    ) -> Result<Flow, RuntimeError<D::Error>> {
        let mut dirty = false;
        for event in events {
            if let AppEvent::HandshakeFinished { attempt, .. } = &event {
                self.finish_handshake(*attempt);
            }
            for action in self.app.handle(event) {
                match action {
                    AppAction::Render => dirty = true,
                    AppAction::Quit => return Ok(Flow::Quit),
                    AppAction::InstallBootstrap => self.bridge.install_bootstrap(),
                    AppAction::Session(action) => self.execute(action, results),
                }
            }
        }

        if dirty {
            self.driver.render(&self.app).map_err(RuntimeError::Driver)?;
        }
        Ok(Flow::Continue)
    }

    fn execute(&mut self, action: SessionAction, results: &mpsc::UnboundedSender<HandshakeResult>) {
        match action {
            SessionAction::StartHandshake { attempt, request } => {
                self.start_handshake(attempt, request, results);
            },
            SessionAction::AbortHandshake { attempt } => self.abort_handshake(attempt),
            SessionAction::OpenSurface { url } => match self.driver.open_surface(&url) {
                Ok(surface) => self.bridge.attach(surface),
                Err(error) => warn!(%error, %url, "failed to open embedded surface"),
            },
            SessionAction::ReleaseSurface => self.bridge.release(),
            SessionAction::Bridge(command) => match self.bridge.send(&command) {
                Ok(()) => {},
                Err(BridgeError::Unavailable) => debug!("bridge unavailable; command dropped"),
                Err(error) => warn!(%error, "bridge command dropped"),
            },
        }
    }

    fn start_handshake(
        &mut self,
        attempt: u64,
        request: HandshakeRequest,
        results: &mpsc::UnboundedSender<HandshakeResult>,
    ) {
        if let Some(previous) = self.pending.take() {
            previous.task.abort();
        }

        let handshake = Arc::clone(&self.handshake);
        let results = results.clone();
        let task = tokio::spawn(async move {
            let result = handshake.handshake(request).await;
            if results.send((attempt, result)).is_err() {
                debug!(attempt, "runtime gone; handshake result dropped");
            }
        });
        debug!(attempt, "handshake started");
        self.pending = Some(PendingHandshake { attempt, task });
    }

    fn abort_handshake(&mut self, attempt: u64) {
        match self.pending.take() {
            Some(pending) if pending.attempt == attempt => {
                pending.task.abort();
                debug!(attempt, "handshake aborted");
            },
            other => self.pending = other,
        }
    }

    fn finish_handshake(&mut self, attempt: u64) {
        if self.pending.as_ref().is_some_and(|p| p.attempt == attempt) {
            self.pending = None;
        }
    }

    fn shutdown(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.task.abort();
        }
        self.bridge.release();
        self.driver.stop();
        info!("runtime stopped");
    }
}
