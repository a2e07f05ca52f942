//! Chat feed and reconciliation.
//!
//! Local sends and bridge notifications feed one append-only sequence.
//! Ordering is insertion order; out-of-order bridge delivery is kept as
//! received.
//!
//! A message sent locally is usually echoed back by the embedded client's own
//! hooks. [`Reconciler`] suppresses such an echo when it matches a recent
//! local message; with no echo window configured every bridge message is
//! appended.

use std::{fmt::Display, time::Duration};

use chrono::{DateTime, Local, TimeZone, Utc};

/// Where a message entered the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatOrigin {
    /// Authored in this client.
    Local,
    /// Observed inside the embedded context.
    Bridge,
    /// Delivered by the handshake as prior history.
    Backlog,
}

/// One entry of the chat feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    id: String,
    author_name: String,
    content: String,
    timestamp: DateTime<Utc>,
    origin: ChatOrigin,
}

impl ChatMessage {
    /// Create a message with an explicit id.
    pub fn new(
        id: impl Into<String>,
        author_name: impl Into<String>,
        content: impl Into<String>,
        timestamp: DateTime<Utc>,
        origin: ChatOrigin,
    ) -> Self {
        Self {
            id: id.into(),
            author_name: author_name.into(),
            content: content.into(),
            timestamp,
            origin,
        }
    }

    /// Locally authored message. `seq` keeps ids unique within a session.
    pub(crate) fn local(seq: u64, author: &str, content: &str, at: DateTime<Utc>) -> Self {
        let id = format!("local-{}-{seq}", at.timestamp_millis());
        Self::new(id, author, content, at, ChatOrigin::Local)
    }

    /// Message observed through the bridge.
    pub(crate) fn bridge(seq: u64, author: &str, content: &str, at: DateTime<Utc>) -> Self {
        let id = format!("bridge-{}-{seq}", at.timestamp_millis());
        Self::new(id, author, content, at, ChatOrigin::Bridge)
    }

    /// Unique key within the feed.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name of the author.
    pub fn author_name(&self) -> &str {
        &self.author_name
    }

    /// Message body.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Absolute instant of the message.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Origin channel.
    pub fn origin(&self) -> ChatOrigin {
        self.origin
    }

    /// `HH:MM` in the local time zone.
    pub fn display_time(&self) -> String {
        self.display_time_in(&Local)
    }

    /// `HH:MM` in the given time zone.
    pub fn display_time_in<Tz>(&self, tz: &Tz) -> String
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        self.timestamp.with_timezone(tz).format("%H:%M").to_string()
    }
}

/// Outcome of offering a bridge message to the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// The message was appended.
    Appended,
    /// The message echoed a local send and was dropped.
    SuppressedEcho {
        /// Id of the local message it matched.
        local_id: String,
    },
}

/// Echo suppression policy for bridge-origin messages.
///
/// The embedded client reports one chat event through more than one hook,
/// so a single local send can come back several times. Every copy inside
/// the window is suppressed.
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    echo_window: Option<Duration>,
    default_author: String,
}

impl Reconciler {
    /// Create a reconciler. `None` disables suppression.
    pub fn new(echo_window: Option<Duration>, default_author: impl Into<String>) -> Self {
        Self { echo_window, default_author: default_author.into() }
    }

    /// Decide whether `candidate` echoes a local message in `feed`.
    ///
    /// Matches on trimmed content, author (unless the local message used the
    /// default label) and timestamp distance. The newest match is reported.
    pub fn admit(&self, feed: &[ChatMessage], candidate: &ChatMessage) -> Admission {
        let Some(window) = self.echo_window else {
            return Admission::Appended;
        };
        let window_ms = u64::try_from(window.as_millis()).unwrap_or(u64::MAX);
        let content = candidate.content.trim();

        let matched = feed.iter().rev().find(|local| {
            local.origin == ChatOrigin::Local
                && local.content.trim() == content
                && (local.author_name == self.default_author
                    || local.author_name.eq_ignore_ascii_case(&candidate.author_name))
                && (candidate.timestamp - local.timestamp).num_milliseconds().unsigned_abs()
                    <= window_ms
        });

        match matched {
            Some(local) => Admission::SuppressedEcho { local_id: local.id.clone() },
            None => Admission::Appended,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::FixedOffset;

    use super::*;

    fn at(ms: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(ms).unwrap()
    }

    fn reconciler() -> Reconciler {
        Reconciler::new(Some(Duration::from_secs(5)), "You")
    }

    #[test]
    fn ids_carry_origin_and_sequence() {
        let local = ChatMessage::local(3, "You", "hi", at(1_000));
        let bridge = ChatMessage::bridge(4, "GM", "hi", at(1_000));
        assert_eq!(local.id(), "local-1000-3");
        assert_eq!(bridge.id(), "bridge-1000-4");
        assert_eq!(bridge.origin(), ChatOrigin::Bridge);
    }

    #[test]
    fn display_time_in_fixed_zone() {
        let msg = ChatMessage::local(0, "You", "hi", at(0));
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(msg.display_time_in(&Utc), "00:00");
        assert_eq!(msg.display_time_in(&plus_two), "02:00");
    }

    #[test]
    fn every_hook_copy_within_window_is_suppressed() {
        let rec = reconciler();
        let feed = vec![ChatMessage::local(0, "alice", "Attack!", at(10_000))];
        let expected = Admission::SuppressedEcho { local_id: feed[0].id().to_string() };

        let created = ChatMessage::bridge(1, "Alice", " Attack! ", at(10_100));
        let rendered = ChatMessage::bridge(2, "alice", "Attack!", at(10_150));
        assert_eq!(rec.admit(&feed, &created), expected);
        assert_eq!(rec.admit(&feed, &rendered), expected);
    }

    #[test]
    fn newest_matching_local_is_reported() {
        let rec = reconciler();
        let feed = vec![
            ChatMessage::local(0, "alice", "Attack!", at(10_000)),
            ChatMessage::local(1, "alice", "Attack!", at(12_000)),
        ];
        let echo = ChatMessage::bridge(2, "alice", "Attack!", at(12_100));
        assert_eq!(
            rec.admit(&feed, &echo),
            Admission::SuppressedEcho { local_id: feed[1].id().to_string() }
        );
    }

    #[test]
    fn echo_outside_window_is_appended() {
        let rec = reconciler();
        let feed = vec![ChatMessage::local(0, "alice", "Attack!", at(10_000))];
        let late = ChatMessage::bridge(1, "alice", "Attack!", at(16_000));
        assert_eq!(rec.admit(&feed, &late), Admission::Appended);
    }

    #[test]
    fn different_author_is_appended() {
        let rec = reconciler();
        let feed = vec![ChatMessage::local(0, "alice", "Attack!", at(10_000))];
        let other = ChatMessage::bridge(1, "bob", "Attack!", at(10_000));
        assert_eq!(rec.admit(&feed, &other), Admission::Appended);
    }

    #[test]
    fn default_author_matches_any_bridge_author() {
        let rec = reconciler();
        let feed = vec![ChatMessage::local(0, "You", "hello", at(10_000))];
        let echo = ChatMessage::bridge(1, "Gamemaster", "hello", at(10_200));
        assert!(matches!(rec.admit(&feed, &echo), Admission::SuppressedEcho { .. }));
    }

    #[test]
    fn bridge_messages_never_suppress_each_other() {
        let rec = reconciler();
        let feed = vec![ChatMessage::bridge(0, "GM", "hello", at(10_000))];
        let repeat = ChatMessage::bridge(1, "GM", "hello", at(10_000));
        assert_eq!(rec.admit(&feed, &repeat), Admission::Appended);
    }

    #[test]
    fn disabled_window_appends_everything() {
        let rec = Reconciler::new(None, "You");
        let feed = vec![ChatMessage::local(0, "You", "hello", at(10_000))];
        let echo = ChatMessage::bridge(1, "You", "hello", at(10_000));
        assert_eq!(rec.admit(&feed, &echo), Admission::Appended);
    }
}
