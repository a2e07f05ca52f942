//! Wire format for the embedded-client bridge.
//!
//! The bridge is the only channel between the host application and the
//! embedded tabletop client, which runs third-party script the host does not
//! control. It is asymmetric:
//!
//! - **Outbound** ([`BridgeCommand`]): a single script-evaluation call that
//!   submits chat text. The text is percent-encoded on the host and decoded by
//!   `decodeURIComponent` inside the embedded context, because the evaluation
//!   call has no binary-safe string literals.
//! - **Inbound** ([`BridgeNotification`]): a JSON message posted by the
//!   injected script to the host entry point whenever the embedded client
//!   observes a chat message.
//! - **Bootstrap** ([`bootstrap`]): the idempotent script that installs the
//!   outbound entry point and subscribes to the embedded client's hooks.
//!
//! Nothing here performs I/O. Both directions are best-effort: there is no
//! acknowledgement, no retry and no error channel back from the embedded
//! context.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod bootstrap;
pub mod command;
pub mod encoding;
pub mod errors;
pub mod notification;

pub use bootstrap::BOOTSTRAP_SCRIPT;
pub use command::BridgeCommand;
pub use encoding::{decode_chat_text, encode_chat_text};
pub use errors::{ProtocolError, Result};
pub use notification::BridgeNotification;
