//! Offline handshake.
//!
//! There is no network transport in this frontend. [`DemoHandshake`] accepts
//! any well-formed server URL after a short delay and returns a fixed roster
//! and chat backlog, so the rest of the client can be exercised end to end.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use tracing::info;
use vttlink_core::{
    Actor, ActorAttribute, ActorResource, ChatMessage, ChatOrigin, Handshake, HandshakeError,
    HandshakeOutcome, HandshakeRequest,
};

/// Simulated latency of a successful handshake.
pub const DEMO_LATENCY: Duration = Duration::from_millis(500);

/// Handshake that always succeeds with a demo party.
#[derive(Debug, Clone)]
pub struct DemoHandshake {
    latency: Duration,
}

impl DemoHandshake {
    /// Handshake with [`DEMO_LATENCY`].
    pub fn new() -> Self {
        Self { latency: DEMO_LATENCY }
    }

    /// Override the simulated latency.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

impl Default for DemoHandshake {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Handshake for DemoHandshake {
    async fn handshake(
        &self,
        request: HandshakeRequest,
    ) -> Result<HandshakeOutcome, HandshakeError> {
        tokio::time::sleep(self.latency).await;

        if !(request.server_url.starts_with("http://") || request.server_url.starts_with("https://"))
        {
            return Err(HandshakeError::Unreachable(format!(
                "{:?} is not an http(s) URL",
                request.server_url
            )));
        }

        info!(server = %request.server_url, world = %request.world, "demo handshake accepted");
        Ok(HandshakeOutcome { actors: roster(), backlog: backlog() })
    }
}

fn roster() -> Vec<Actor> {
    vec![
        Actor::new("actor-1", "Althea Stormborn", "PC")
            .with_attribute(ActorAttribute::new("Strength", 14))
            .with_attribute(ActorAttribute::new("Dexterity", 16))
            .with_resource(ActorResource::new("HP", 28, 34))
            .with_resource(ActorResource::new("Spell Slots", 3, 4)),
        Actor::new("actor-2", "Kael Nightwind", "PC")
            .with_attribute(ActorAttribute::new("Strength", 10))
            .with_attribute(ActorAttribute::new("Wisdom", 17))
            .with_resource(ActorResource::new("HP", 21, 26)),
    ]
}

fn backlog() -> Vec<ChatMessage> {
    let now = Utc::now();
    [
        ("m1", "GM", "Welcome to the session!", 10),
        ("m2", "Althea Stormborn", "Ready when you are.", 6),
        ("m3", "Kael Nightwind", "I check the door for traps.", 2),
    ]
    .into_iter()
    .map(|(id, author, content, minutes_ago)| {
        let at = now - TimeDelta::minutes(minutes_ago);
        ChatMessage::new(id, author, content, at, ChatOrigin::Backlog)
    })
    .collect()
}
