//! Simulated driver and simulation harness.
//!
//! [`SimDriver`] implements [`Driver`] over channels: events come from the
//! test (through [`SimHandle`]) and from simulated pages, rendered state goes
//! to a watch channel, and every opened surface is a [`SimPage`] that starts
//! loading (and reporting progress) as soon as it is opened.

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};
use tracing::debug;
use vttlink_app::{App, AppEvent, Driver, Runtime, RuntimeConfig, RuntimeError};
use vttlink_core::{Environment, SessionConfig, SessionState};

use crate::{PageProbe, ScriptedHandshake, SimEnv, SimError, SimPage};

/// Upper bound on [`SimHandle::wait_for`] in virtual time.
pub const WAIT_LIMIT: Duration = Duration::from_secs(120);

type PageList = Arc<Mutex<Vec<PageProbe>>>;

fn lock_pages(pages: &PageList) -> MutexGuard<'_, Vec<PageProbe>> {
    pages.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Channel-backed driver.
#[derive(Debug)]
pub struct SimDriver {
    events: mpsc::UnboundedReceiver<AppEvent>,
    host: mpsc::UnboundedSender<AppEvent>,
    env: SimEnv,
    page_author: String,
    refuse_surfaces: bool,
    pages: PageList,
    rendered: watch::Sender<SessionState>,
}

impl Driver for SimDriver {
    type Error = SimError;
    type Surface = SimPage;

    async fn poll_event(&mut self) -> Result<Vec<AppEvent>, SimError> {
        match self.events.recv().await {
            Some(event) => Ok(vec![event]),
            None => Err(SimError::RuntimeGone),
        }
    }

    fn open_surface(&mut self, url: &str) -> Result<SimPage, SimError> {
        if self.refuse_surfaces {
            return Err(SimError::SurfaceRefused(url.to_string()));
        }
        let page = SimPage::new(url, self.page_author.clone(), self.env.clone(), self.host.clone());
        page.start_loading();
        lock_pages(&self.pages).push(page.probe());
        debug!(url, "simulated page opened");
        Ok(page)
    }

    fn render<E: Environment>(&mut self, app: &App<E>) -> Result<(), SimError> {
        self.rendered.send_replace(app.state().clone());
        Ok(())
    }

    fn stop(&mut self) {
        self.events.close();
    }
}

/// Builder for a simulated runtime.
#[derive(Debug)]
pub struct Simulation {
    handshake: ScriptedHandshake,
    session: SessionConfig,
    runtime: RuntimeConfig,
    page_author: String,
    refuse_surfaces: bool,
}

impl Simulation {
    /// Simulation with default configuration and the given handshake script.
    pub fn new(handshake: ScriptedHandshake) -> Self {
        Self {
            handshake,
            session: SessionConfig::default(),
            runtime: RuntimeConfig::default(),
            page_author: "alice".to_string(),
            refuse_surfaces: false,
        }
    }

    /// Override the session configuration.
    #[must_use]
    pub fn with_session_config(mut self, session: SessionConfig) -> Self {
        self.session = session;
        self
    }

    /// Name of the user logged into simulated pages.
    #[must_use]
    pub fn with_page_author(mut self, author: impl Into<String>) -> Self {
        self.page_author = author.into();
        self
    }

    /// Make every `open_surface` fail.
    #[must_use]
    pub fn refusing_surfaces(mut self) -> Self {
        self.refuse_surfaces = true;
        self
    }

    /// Spawn the runtime on the current tokio runtime.
    pub fn spawn(self) -> SimHandle {
        let env = SimEnv::new();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (rendered_tx, rendered_rx) = watch::channel(SessionState::default());
        let pages = PageList::default();

        let driver = SimDriver {
            events: events_rx,
            host: events_tx.clone(),
            env: env.clone(),
            page_author: self.page_author,
            refuse_surfaces: self.refuse_surfaces,
            pages: Arc::clone(&pages),
            rendered: rendered_tx,
        };
        let app = App::new(env.clone(), self.session);
        let runtime = Runtime::new(app, driver, Arc::new(self.handshake), self.runtime);
        let task = tokio::spawn(runtime.run());

        SimHandle { events: events_tx, rendered: rendered_rx, pages, env, task }
    }
}

/// Test-side handle to a running simulation.
#[derive(Debug)]
pub struct SimHandle {
    events: mpsc::UnboundedSender<AppEvent>,
    rendered: watch::Receiver<SessionState>,
    pages: PageList,
    env: SimEnv,
    task: JoinHandle<Result<(), RuntimeError<SimError>>>,
}

impl SimHandle {
    /// Deliver an event to the runtime.
    pub fn send(&self, event: AppEvent) -> Result<(), SimError> {
        self.events.send(event).map_err(|_| SimError::RuntimeGone)
    }

    /// Last rendered state.
    pub fn state(&self) -> SessionState {
        self.rendered.borrow().clone()
    }

    /// Wait until a rendered state satisfies `predicate`.
    pub async fn wait_for(
        &mut self,
        predicate: impl FnMut(&SessionState) -> bool,
    ) -> Result<SessionState, SimError> {
        match tokio::time::timeout(WAIT_LIMIT, self.rendered.wait_for(predicate)).await {
            Ok(Ok(state)) => Ok(state.clone()),
            Ok(Err(_)) => Err(SimError::RuntimeGone),
            Err(_) => Err(SimError::Timeout(WAIT_LIMIT)),
        }
    }

    /// Let the runtime and pages run for `duration` of virtual time.
    pub async fn settle(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    /// Most recently opened page.
    pub fn page(&self) -> Option<PageProbe> {
        lock_pages(&self.pages).last().cloned()
    }

    /// Every page opened so far, in order.
    pub fn pages(&self) -> Vec<PageProbe> {
        lock_pages(&self.pages).clone()
    }

    /// Simulation environment.
    pub fn env(&self) -> &SimEnv {
        &self.env
    }

    /// Whether the runtime task has ended.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Quit the runtime and wait for it to stop.
    pub async fn quit(self) -> Result<(), SimError> {
        self.send(AppEvent::Quit)?;
        match self.task.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(error)) => Err(SimError::Runtime(error.to_string())),
            Err(error) => Err(SimError::Runtime(error.to_string())),
        }
    }
}
