//! Outbound commands (host → embedded context).

use crate::{
    bootstrap::BRIDGE_NAMESPACE,
    encoding::{decode_chat_text, encode_chat_text},
    errors::{ProtocolError, Result},
};

/// A command the host evaluates inside the embedded context.
///
/// Commands are fire-and-forget. If the embedded context has not installed
/// the bootstrap entry point yet, the guard in the rendered script turns the
/// call into a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeCommand {
    /// Submit chat text through the embedded client's own chat API.
    SubmitChat {
        /// Raw chat text, unescaped.
        text: String,
    },
}

impl BridgeCommand {
    /// Build a [`BridgeCommand::SubmitChat`].
    pub fn submit_chat(text: impl Into<String>) -> Self {
        Self::SubmitChat { text: text.into() }
    }

    /// Render the script-evaluation call for this command.
    pub fn to_script(&self) -> String {
        match self {
            Self::SubmitChat { text } => {
                format!("{}{}{}", submit_prefix(), encode_chat_text(text), SUBMIT_SUFFIX)
            },
        }
    }

    /// Parse a script produced by [`BridgeCommand::to_script`].
    ///
    /// This is the receiving side of the encoding contract, used by simulated
    /// embedded contexts and the fuzz targets.
    pub fn from_script(script: &str) -> Result<Self> {
        let encoded = script
            .strip_prefix(submit_prefix().as_str())
            .and_then(|rest| rest.strip_suffix(SUBMIT_SUFFIX))
            .ok_or(ProtocolError::UnrecognizedCommand)?;

        // Encoded text never contains an apostrophe; one here means the
        // literal was not produced by us.
        if encoded.contains('\'') {
            return Err(ProtocolError::UnrecognizedCommand);
        }

        Ok(Self::SubmitChat { text: decode_chat_text(encoded)? })
    }
}

const SUBMIT_SUFFIX: &str = "'));";

fn submit_prefix() -> String {
    format!("window.{BRIDGE_NAMESPACE} && window.{BRIDGE_NAMESPACE}.sendChat(decodeURIComponent('")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_chat_script() {
        let script = BridgeCommand::submit_chat("Roll for it & don't miss").to_script();
        insta::assert_snapshot!(
            script,
            @"window.__VTTLINK__ && window.__VTTLINK__.sendChat(decodeURIComponent('Roll%20for%20it%20%26%20don%27t%20miss'));"
        );
    }

    #[test]
    fn script_round_trip() {
        for text in ["hello", "a'b", "new\nline", "ünï & 🎲", ""] {
            let command = BridgeCommand::submit_chat(text);
            assert_eq!(BridgeCommand::from_script(&command.to_script()).unwrap(), command);
        }
    }

    #[test]
    fn foreign_script_is_rejected() {
        assert!(matches!(
            BridgeCommand::from_script("alert('hi');"),
            Err(ProtocolError::UnrecognizedCommand)
        ));
    }

    #[test]
    fn injected_literal_is_rejected() {
        let script = format!("{}x'); evil(); ('{}", submit_prefix(), SUBMIT_SUFFIX);
        assert!(matches!(
            BridgeCommand::from_script(&script),
            Err(ProtocolError::UnrecognizedCommand)
        ));
    }
}
