//! Fuzz inbound notification decoding.
//!
//! Arbitrary payloads must decode or fail cleanly; anything that decodes must
//! survive a re-encode.

#![no_main]

use libfuzzer_sys::fuzz_target;
use vttlink_proto::BridgeNotification;

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(notification) = BridgeNotification::from_json(raw) {
        let json = notification.to_json().expect("decoded notification re-encodes");
        assert_eq!(BridgeNotification::from_json(&json).ok(), Some(notification));
    }
});
