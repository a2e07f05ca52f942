//! Fuzz terminal command parsing.

#![no_main]

use libfuzzer_sys::fuzz_target;
use vttlink_tui::{Command, commands};

fuzz_target!(|line: &str| {
    match commands::parse(line) {
        None => assert!(line.trim().is_empty()),
        Some(Command::Message { content }) => {
            assert!(!content.is_empty());
            assert!(!content.starts_with('/'));
        },
        Some(_) => assert!(line.trim().starts_with('/')),
    }
});
