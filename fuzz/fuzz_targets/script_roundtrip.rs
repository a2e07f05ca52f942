//! Fuzz the outbound submit-chat script.
//!
//! Any chat text must come back unchanged from its own script, and the
//! script must never contain a raw quote or newline that could break out of
//! the string literal.

#![no_main]

use libfuzzer_sys::fuzz_target;
use vttlink_proto::{BridgeCommand, decode_chat_text, encode_chat_text};

fuzz_target!(|text: String| {
    let encoded = encode_chat_text(&text);
    assert!(!encoded.contains(['\'', '"', '\n', '\r', '\\']));
    assert_eq!(decode_chat_text(&encoded).expect("own encoding decodes"), text);

    let command = BridgeCommand::submit_chat(text);
    let script = command.to_script();
    assert_eq!(BridgeCommand::from_script(&script).expect("own script parses"), command);
});
