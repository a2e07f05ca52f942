//! Transport-safe escaping for chat text.
//!
//! The outbound command embeds chat text inside a single-quoted literal of a
//! script-evaluation call. Encoding follows `encodeURIComponent` so that
//! `decodeURIComponent` in the embedded context restores the exact input, with
//! one addition: the apostrophe is escaped as well, since it would otherwise
//! terminate the literal.
//!
//! Spaces are encoded as `%20`, never `+`. `decodeURIComponent` does not treat
//! `+` as a space.

use std::borrow::Cow;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

use crate::errors::{ProtocolError, Result};

/// Bytes escaped by [`encode_chat_text`].
///
/// Everything except ASCII alphanumerics and `- _ . ! ~ * ( )`.
const CHAT_TEXT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'(')
    .remove(b')');

/// Percent-encode chat text for embedding in the outbound command.
///
/// The output contains only ASCII alphanumerics, `-_.!~*()` and `%XX`
/// escapes, so it is safe inside single- or double-quoted script literals.
pub fn encode_chat_text(text: &str) -> String {
    utf8_percent_encode(text, CHAT_TEXT).to_string()
}

/// Reverse [`encode_chat_text`].
///
/// Agrees with `decodeURIComponent` on well-formed input. It is more lenient
/// on malformed escapes: `%zz` or a trailing `%` is kept literally where
/// `decodeURIComponent` would throw. Only invalid UTF-8 after decoding is an
/// error.
pub fn decode_chat_text(encoded: &str) -> Result<String> {
    percent_decode_str(encoded)
        .decode_utf8()
        .map(Cow::into_owned)
        .map_err(|_| ProtocolError::InvalidUtf8)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn reserved_characters_are_escaped() {
        assert_eq!(encode_chat_text("a b&c'd"), "a%20b%26c%27d");
        assert_eq!(encode_chat_text("line\nbreak"), "line%0Abreak");
        assert_eq!(encode_chat_text("+"), "%2B");
    }

    #[test]
    fn unreserved_characters_pass_through() {
        assert_eq!(encode_chat_text("Az09-_.!~*()"), "Az09-_.!~*()");
    }

    #[test]
    fn unicode_is_utf8_encoded() {
        assert_eq!(encode_chat_text("é"), "%C3%A9");
        assert_eq!(decode_chat_text("%F0%9F%8E%B2").unwrap(), "🎲");
    }

    #[test]
    fn round_trip_reserved_inputs() {
        for input in ["&", "'", "O'Brien & co", "ünïcødé 🐉", "two\nlines", "%41", ""] {
            assert_eq!(decode_chat_text(&encode_chat_text(input)).unwrap(), input);
        }
    }

    #[test]
    fn malformed_escape_passes_through() {
        assert_eq!(decode_chat_text("100%zz").unwrap(), "100%zz");
        assert_eq!(decode_chat_text("50%").unwrap(), "50%");
        assert_eq!(decode_chat_text("%4").unwrap(), "%4");
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        assert!(matches!(decode_chat_text("%FF%FE"), Err(ProtocolError::InvalidUtf8)));
    }

    proptest! {
        #[test]
        fn encoded_text_is_literal_safe(input in any::<String>()) {
            let encoded = encode_chat_text(&input);
            prop_assert!(!encoded.contains('\''));
            prop_assert!(!encoded.contains('"'));
            prop_assert!(!encoded.contains('\\'));
            prop_assert!(encoded.is_ascii());
        }

        #[test]
        fn decode_restores_any_string(input in any::<String>()) {
            prop_assert_eq!(decode_chat_text(&encode_chat_text(&input)).unwrap(), input);
        }
    }
}
