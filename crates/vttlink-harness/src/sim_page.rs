//! Simulated embedded context.
//!
//! [`SimPage`] executes the scripts the host evaluates the way the injected
//! bootstrap behaves in a real embedded client, without a JavaScript engine:
//!
//! - The first bootstrap injection sets the sentinel and starts hook wiring;
//!   later injections are no-ops.
//! - Hook wiring retries every [`HOOK_RETRY_DELAY`] until the embedded client
//!   reports ready. The retry task is cancelled when the page is torn down.
//! - A submit-chat command is decoded from its script. If the chat API
//!   exists the text is submitted, and once hooks are wired the page echoes
//!   it back to the host.
//! - Every chat event fires both the create and the render hook. Forwarding
//!   is keyed by message id, so an event with an id reaches the host once and
//!   one without an id reaches it twice.
//! - While loading, the page reports progress [`LOAD_PROGRESS_TICKS`] times,
//!   [`LOAD_PROGRESS_INTERVAL`] apart, as [`AppEvent::SurfaceProgress`].
//!
//! The host keeps the [`SimPage`] (through the bridge transport); tests keep
//! a [`PageProbe`] to observe and steer the page. Dropping the `SimPage` is
//! the page teardown.

use std::{
    collections::HashSet,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use vttlink_app::{AppEvent, Surface};
use vttlink_proto::{
    BOOTSTRAP_SCRIPT, BridgeCommand, BridgeNotification,
    bootstrap::{CREATE_HOOK, HOOK_RETRY_DELAY, RENDER_HOOK},
};

use crate::{SimEnv, SimError};

/// Load-progress reports a page sends after it is opened.
pub const LOAD_PROGRESS_TICKS: usize = 3;

/// Delay between load-progress reports.
pub const LOAD_PROGRESS_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Default)]
struct PageState {
    bootstrap_injections: usize,
    installed: bool,
    client_ready: bool,
    hooks_wired: bool,
    hook_retries: u32,
    submitted: Vec<String>,
    progress_reported: usize,
    last_message_id: u64,
    forwarded: HashSet<u64>,
    hook_firings: usize,
    disposed: bool,
}

#[derive(Debug)]
struct PageShared {
    url: String,
    author: String,
    env: SimEnv,
    host: mpsc::UnboundedSender<AppEvent>,
    state: Mutex<PageState>,
}

impl PageShared {
    fn lock(&self) -> MutexGuard<'_, PageState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fire both chat hooks for a new message. `with_id` is false for
    /// messages the embedded client creates without a document id.
    fn fire_chat_hooks(&self, author: &str, content: &str, with_id: bool) {
        let id = with_id.then(|| {
            let mut state = self.lock();
            state.last_message_id += 1;
            state.last_message_id
        });
        for hook in [CREATE_HOOK, RENDER_HOOK] {
            let fresh = {
                let mut state = self.lock();
                state.hook_firings += 1;
                id.is_none_or(|id| state.forwarded.insert(id))
            };
            if fresh {
                self.post_chat(author, content);
            } else {
                debug!(hook, ?id, "message already forwarded");
            }
        }
    }

    /// Post a chat notification to the host entry point.
    fn post_chat(&self, author: &str, content: &str) {
        let notification =
            BridgeNotification::chat_message(author, content, self.env.wall_millis());
        match notification.to_json() {
            Ok(raw) => self.post_raw(raw),
            Err(error) => warn!(%error, "page failed to encode notification"),
        }
    }

    fn post_raw(&self, raw: String) {
        if self.host.send(AppEvent::Notification(raw)).is_err() {
            debug!(url = %self.url, "host gone; notification dropped");
        }
    }
}

/// A simulated embedded context, owned by the host.
#[derive(Debug)]
pub struct SimPage {
    shared: Arc<PageShared>,
    cancel: CancellationToken,
}

impl SimPage {
    /// Load a page at `url`. `author` is the user logged into the embedded
    /// client; notifications are posted to `host`.
    pub fn new(
        url: impl Into<String>,
        author: impl Into<String>,
        env: SimEnv,
        host: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        let shared = PageShared {
            url: url.into(),
            author: author.into(),
            env,
            host,
            state: Mutex::new(PageState::default()),
        };
        Self { shared: Arc::new(shared), cancel: CancellationToken::new() }
    }

    /// Observer for this page, valid after teardown.
    pub fn probe(&self) -> PageProbe {
        PageProbe { shared: Arc::clone(&self.shared), cancel: self.cancel.clone() }
    }

    /// Start reporting load progress to the host until the page is torn
    /// down or loading completes.
    pub fn start_loading(&self) {
        let shared = Arc::clone(&self.shared);
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            for _ in 0..LOAD_PROGRESS_TICKS {
                tokio::select! {
                    () = cancel.cancelled() => return,
                    () = tokio::time::sleep(LOAD_PROGRESS_INTERVAL) => {},
                }
                shared.lock().progress_reported += 1;
                if shared.host.send(AppEvent::SurfaceProgress).is_err() {
                    return;
                }
            }
            debug!(url = %shared.url, "page loaded");
        });
    }

    fn spawn_hook_wiring(&self) {
        let shared = Arc::clone(&self.shared);
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            loop {
                {
                    let mut state = shared.lock();
                    if state.client_ready {
                        state.hooks_wired = true;
                        debug!(url = %shared.url, retries = state.hook_retries, "chat hooks wired");
                        return;
                    }
                    state.hook_retries += 1;
                }
                tokio::select! {
                    () = cancel.cancelled() => {
                        debug!(url = %shared.url, "page torn down; hook wiring stopped");
                        return;
                    },
                    () = tokio::time::sleep(HOOK_RETRY_DELAY) => {},
                }
            }
        });
    }

    fn submit_chat(&self, text: String) {
        let mut state = self.shared.lock();
        if !state.installed {
            // Guard in the command script short-circuits.
            return;
        }
        if !state.client_ready {
            warn!(url = %self.shared.url, "no chat API available; message dropped");
            return;
        }
        state.submitted.push(text.clone());
        let echo = state.hooks_wired;
        drop(state);

        if echo {
            self.shared.fire_chat_hooks(&self.shared.author, &text, true);
        }
    }
}

impl Surface for SimPage {
    type Error = SimError;

    fn evaluate(&mut self, script: &str) -> Result<(), SimError> {
        if script == BOOTSTRAP_SCRIPT {
            let mut state = self.shared.lock();
            if state.disposed {
                return Err(SimError::Disposed);
            }
            state.bootstrap_injections += 1;
            if state.installed {
                return Ok(());
            }
            state.installed = true;
            drop(state);
            self.spawn_hook_wiring();
            return Ok(());
        }

        match BridgeCommand::from_script(script)? {
            BridgeCommand::SubmitChat { text } => self.submit_chat(text),
        }
        Ok(())
    }
}

impl Drop for SimPage {
    fn drop(&mut self) {
        self.shared.lock().disposed = true;
        self.cancel.cancel();
    }
}

/// Test-side view of a [`SimPage`].
#[derive(Debug, Clone)]
pub struct PageProbe {
    shared: Arc<PageShared>,
    cancel: CancellationToken,
}

impl PageProbe {
    /// URL the page was opened at.
    pub fn url(&self) -> &str {
        &self.shared.url
    }

    /// Number of bootstrap injections received, including no-op repeats.
    pub fn bootstrap_injections(&self) -> usize {
        self.shared.lock().bootstrap_injections
    }

    /// Whether the bootstrap sentinel is set.
    pub fn installed(&self) -> bool {
        self.shared.lock().installed
    }

    /// Whether the chat hooks are subscribed.
    pub fn hooks_wired(&self) -> bool {
        self.shared.lock().hooks_wired
    }

    /// Failed hook wiring attempts so far.
    pub fn hook_retries(&self) -> u32 {
        self.shared.lock().hook_retries
    }

    /// Load-progress reports sent so far.
    pub fn progress_reported(&self) -> usize {
        self.shared.lock().progress_reported
    }

    /// Chat hook firings so far, counting both hooks.
    pub fn hook_firings(&self) -> usize {
        self.shared.lock().hook_firings
    }

    /// Texts submitted through the embedded chat API.
    pub fn submitted(&self) -> Vec<String> {
        self.shared.lock().submitted.clone()
    }

    /// Whether the host dropped the page.
    pub fn disposed(&self) -> bool {
        self.shared.lock().disposed && self.cancel.is_cancelled()
    }

    /// Finish initializing the embedded client: chat API and hooks appear.
    pub fn set_client_ready(&self) {
        self.shared.lock().client_ready = true;
    }

    /// Another participant chats inside the embedded client.
    ///
    /// Returns whether a notification was posted; nothing is observed until
    /// hooks are wired, and nothing after teardown.
    pub fn remote_chat(&self, author: &str, content: &str) -> bool {
        self.chat_event(author, content, true)
    }

    /// A chat message the embedded client creates without a document id.
    ///
    /// Both hooks forward it, so the host receives two notifications.
    pub fn chat_without_id(&self, author: &str, content: &str) -> bool {
        self.chat_event(author, content, false)
    }

    fn chat_event(&self, author: &str, content: &str, with_id: bool) -> bool {
        let state = self.shared.lock();
        let observed = state.hooks_wired && !state.disposed;
        drop(state);
        if observed {
            self.shared.fire_chat_hooks(author, content, with_id);
        }
        observed
    }

    /// Post an arbitrary payload to the host entry point.
    pub fn post_raw(&self, raw: impl Into<String>) {
        self.shared.post_raw(raw.into());
    }
}
