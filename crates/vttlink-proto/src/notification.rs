//! Inbound notifications (embedded context → host).
//!
//! The bootstrap script posts one JSON object per observed chat event to the
//! host entry point. Delivery is at-least-zero: nothing is sent until the
//! embedded client's hook system exists, and a single chat event may be
//! reported by more than one hook.

use serde::{Deserialize, Serialize};

use crate::errors::{ProtocolError, Result};

/// Upper bound on a single inbound message, checked before parsing.
pub const MAX_NOTIFICATION_SIZE: usize = 1024 * 1024;

/// A notification delivered through the host entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BridgeNotification {
    /// The embedded client created or rendered a chat message.
    #[serde(rename_all = "camelCase")]
    ChatMessage {
        /// Best-effort author name resolved inside the embedded context.
        author: String,
        /// Message body as reported by the embedded client.
        content: String,
        /// Embedded context's timestamp, milliseconds since the Unix epoch.
        timestamp: i64,
    },
}

impl BridgeNotification {
    /// Build a [`BridgeNotification::ChatMessage`].
    pub fn chat_message(
        author: impl Into<String>,
        content: impl Into<String>,
        timestamp: i64,
    ) -> Self {
        Self::ChatMessage { author: author.into(), content: content.into(), timestamp }
    }

    /// Decode a raw message posted by the embedded context.
    pub fn from_json(raw: &str) -> Result<Self> {
        if raw.len() > MAX_NOTIFICATION_SIZE {
            return Err(ProtocolError::NotificationTooLarge {
                size: raw.len(),
                max: MAX_NOTIFICATION_SIZE,
            });
        }
        Ok(serde_json::from_str(raw)?)
    }

    /// Encode as the embedded context would post it.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_bootstrap_payload() {
        let raw = r#"{"type":"chatMessage","author":"GM","content":"Welcome","timestamp":1700000000000}"#;
        assert_eq!(
            BridgeNotification::from_json(raw).unwrap(),
            BridgeNotification::chat_message("GM", "Welcome", 1_700_000_000_000)
        );
    }

    #[test]
    fn encodes_with_type_tag() {
        let json = BridgeNotification::chat_message("a", "b", 1).to_json().unwrap();
        assert_eq!(json, r#"{"type":"chatMessage","author":"a","content":"b","timestamp":1}"#);
    }

    #[test]
    fn unknown_type_is_malformed() {
        let raw = r#"{"type":"combatStarted","round":1}"#;
        assert!(matches!(
            BridgeNotification::from_json(raw),
            Err(ProtocolError::MalformedNotification(_))
        ));
    }

    #[test]
    fn fractional_timestamp_is_malformed() {
        let raw = r#"{"type":"chatMessage","author":"a","content":"b","timestamp":1.5}"#;
        assert!(BridgeNotification::from_json(raw).is_err());
    }

    #[test]
    fn oversized_payload_is_rejected_before_parsing() {
        let raw = "x".repeat(MAX_NOTIFICATION_SIZE + 1);
        assert!(matches!(
            BridgeNotification::from_json(&raw),
            Err(ProtocolError::NotificationTooLarge { .. })
        ));
    }
}
