//! Terminal-independent input handling.
//!
//! [`Console`] turns key presses into [`AppEvent`]s. It keeps the line editor,
//! the connection defaults from the command line, and a snapshot of the last
//! rendered session so `/set` can address the selected actor.

use tracing::debug;
use vttlink_app::AppEvent;
use vttlink_core::{ConnectionMode, Secret, SessionState, UserConnectionInput};

use crate::{
    commands::{self, Command},
    input::{InputState, KeyInput},
    ui::View,
};

/// Connection defaults supplied at startup.
#[derive(Debug, Clone, Default)]
pub struct ConnectProfile {
    /// Server used by a bare `/connect`.
    pub server_url: Option<String>,
    /// World used when `/connect` names none.
    pub world: String,
    /// Display name.
    pub username: Option<String>,
    /// Account password.
    pub password: Option<Secret>,
    /// API token.
    pub token: Option<Secret>,
    /// Mode used when `/connect` names none.
    pub mode: ConnectionMode,
}

impl ConnectProfile {
    /// Build connection input, overriding the defaults where given.
    pub fn input(
        &self,
        server_url: Option<String>,
        world: Option<String>,
        mode: Option<ConnectionMode>,
    ) -> Option<UserConnectionInput> {
        let server_url = server_url.or_else(|| self.server_url.clone())?;
        let mut input = UserConnectionInput::new(
            server_url,
            world.unwrap_or_else(|| self.world.clone()),
            mode.unwrap_or(self.mode),
        );
        if let Some(username) = &self.username {
            input = input.with_username(username.clone());
        }
        if let Some(password) = &self.password {
            input = input.with_password(password.expose());
        }
        if let Some(token) = &self.token {
            input = input.with_token(token.expose());
        }
        Some(input)
    }
}

/// Line editor plus command dispatch.
#[derive(Debug, Default)]
pub struct Console {
    input: InputState,
    profile: ConnectProfile,
    snapshot: SessionState,
    notice: Option<String>,
    queued: Vec<AppEvent>,
}

impl Console {
    /// Console with the given connection defaults.
    pub fn new(profile: ConnectProfile) -> Self {
        Self { profile, ..Self::default() }
    }

    /// Connection defaults.
    pub fn profile(&self) -> &ConnectProfile {
        &self.profile
    }

    /// Queue an event to be delivered before any key input.
    pub fn queue(&mut self, event: AppEvent) {
        self.queued.push(event);
    }

    /// Drain queued events.
    pub fn take_queued(&mut self) -> Vec<AppEvent> {
        std::mem::take(&mut self.queued)
    }

    /// Record the state that was just rendered.
    pub fn sync(&mut self, state: &SessionState) {
        self.snapshot.clone_from(state);
    }

    /// Frontend message shown in the status bar.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Everything needed to draw a frame.
    pub fn view(&self) -> View<'_> {
        View { state: &self.snapshot, input: &self.input, notice: self.notice() }
    }

    /// Handle one key press.
    pub fn key(&mut self, key: KeyInput) -> Vec<AppEvent> {
        if key == KeyInput::Quit {
            return vec![AppEvent::Quit];
        }
        match self.input.apply(key) {
            Some(line) => self.submit(&line).into_iter().collect(),
            None => Vec::new(),
        }
    }

    /// Handle a submitted line.
    pub fn submit(&mut self, line: &str) -> Option<AppEvent> {
        let command = commands::parse(line)?;
        self.notice = None;
        debug!(?command, "command entered");

        match command {
            Command::Connect { server_url, world, mode } => {
                match self.profile.input(server_url, world, mode) {
                    Some(input) => Some(AppEvent::Connect(input)),
                    None => self.refuse("/connect: no server URL given and none configured"),
                }
            },
            Command::Disconnect => Some(AppEvent::Disconnect),
            Command::Select { actor_id } => Some(AppEvent::SelectActor(actor_id)),
            Command::Set { label, value } => match self.snapshot.selected_actor() {
                Some(actor) => {
                    Some(AppEvent::UpdateResource { actor_id: actor.id.clone(), label, value })
                },
                None => self.refuse("/set: no actor selected"),
            },
            Command::Quit => Some(AppEvent::Quit),
            Command::Message { content } => Some(AppEvent::SendChat(content)),
            Command::Unknown { input } => self.refuse(&format!("Unknown command: {input}")),
            Command::InvalidArgs { command, error } => self.refuse(&format!("/{command}: {error}")),
        }
    }

    fn refuse(&mut self, notice: &str) -> Option<AppEvent> {
        self.notice = Some(notice.to_string());
        None
    }
}
