//! Protocol error types.

use thiserror::Error;

/// Result alias for bridge protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors raised while encoding or decoding bridge traffic.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Inbound notification exceeds [`crate::notification::MAX_NOTIFICATION_SIZE`].
    #[error("notification of {size} bytes exceeds limit of {max} bytes")]
    NotificationTooLarge {
        /// Size of the rejected message.
        size: usize,
        /// Configured maximum.
        max: usize,
    },

    /// Inbound notification is not valid JSON or has an unknown shape.
    #[error("malformed notification: {0}")]
    MalformedNotification(#[from] serde_json::Error),

    /// Percent-decoded bytes are not valid UTF-8.
    #[error("decoded chat text is not valid UTF-8")]
    InvalidUtf8,

    /// Script does not match the outbound command template.
    #[error("script is not a recognized bridge command")]
    UnrecognizedCommand,
}
