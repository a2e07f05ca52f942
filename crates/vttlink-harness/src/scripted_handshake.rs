//! Scripted handshake collaborator.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use async_trait::async_trait;
use vttlink_core::{
    Actor, ActorAttribute, ActorResource, Handshake, HandshakeError, HandshakeOutcome,
    HandshakeRequest,
};

/// One canned handshake reply.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Succeed after `latency`.
    Succeed {
        /// Virtual time before replying.
        latency: Duration,
        /// Roster and backlog to return.
        outcome: HandshakeOutcome,
    },
    /// Fail after `latency`.
    Fail {
        /// Virtual time before replying.
        latency: Duration,
        /// Failure to report.
        error: HandshakeError,
    },
    /// Never reply.
    Hang,
}

#[derive(Debug, Default)]
struct Script {
    replies: VecDeque<Reply>,
    requests: Vec<HandshakeRequest>,
}

/// Handshake that plays back queued [`Reply`]s, one per call.
///
/// Calls beyond the script fail with [`HandshakeError::Other`]. Clones share
/// the script, so a test can keep one to inspect the recorded requests.
#[derive(Debug, Clone, Default)]
pub struct ScriptedHandshake {
    script: Arc<Mutex<Script>>,
}

impl ScriptedHandshake {
    /// Empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply.
    #[must_use]
    pub fn then(self, reply: Reply) -> Self {
        self.lock().replies.push_back(reply);
        self
    }

    /// Queue a success.
    #[must_use]
    pub fn then_succeed(self, latency: Duration, outcome: HandshakeOutcome) -> Self {
        self.then(Reply::Succeed { latency, outcome })
    }

    /// Queue a failure.
    #[must_use]
    pub fn then_fail(self, latency: Duration, error: HandshakeError) -> Self {
        self.then(Reply::Fail { latency, error })
    }

    /// Queue a reply that never arrives.
    #[must_use]
    pub fn then_hang(self) -> Self {
        self.then(Reply::Hang)
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<HandshakeRequest> {
        self.lock().requests.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Handshake for ScriptedHandshake {
    async fn handshake(
        &self,
        request: HandshakeRequest,
    ) -> Result<HandshakeOutcome, HandshakeError> {
        let reply = {
            let mut script = self.lock();
            script.requests.push(request);
            script.replies.pop_front()
        };

        match reply {
            Some(Reply::Succeed { latency, outcome }) => {
                tokio::time::sleep(latency).await;
                Ok(outcome)
            },
            Some(Reply::Fail { latency, error }) => {
                tokio::time::sleep(latency).await;
                Err(error)
            },
            Some(Reply::Hang) => std::future::pending().await,
            None => Err(HandshakeError::Other("no scripted reply".to_string())),
        }
    }
}

/// Two-character party used across simulation tests.
pub fn party() -> HandshakeOutcome {
    let althea = Actor::new("actor-1", "Althea Stormborn", "PC")
        .with_attribute(ActorAttribute::new("Strength", 14))
        .with_attribute(ActorAttribute::new("Dexterity", 16))
        .with_resource(ActorResource::new("HP", 28, 34))
        .with_resource(ActorResource::new("Spell Slots", 3, 4));
    let kael = Actor::new("actor-2", "Kael Nightwind", "PC")
        .with_attribute(ActorAttribute::new("Strength", 10))
        .with_attribute(ActorAttribute::new("Wisdom", 17))
        .with_resource(ActorResource::new("HP", 21, 26));
    HandshakeOutcome { actors: vec![althea, kael], backlog: Vec::new() }
}
