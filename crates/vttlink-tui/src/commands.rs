//! Command parsing for the terminal frontend.
//!
//! This module parses input lines into structured [`Command`] values. Lines
//! starting with `/` are commands; anything else is chat.

use vttlink_core::{ActorId, ConnectionMode};

/// Parsed command from user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Start a session.
    Connect {
        /// Base URL of the remote server; `None` uses the configured default.
        server_url: Option<String>,
        /// World identifier; `None` uses the configured default.
        world: Option<String>,
        /// Session mode; `None` uses the configured default.
        mode: Option<ConnectionMode>,
    },

    /// End the session.
    Disconnect,

    /// Select an actor for the sheet.
    Select {
        /// Actor to select.
        actor_id: ActorId,
    },

    /// Set a resource on the selected actor.
    Set {
        /// Resource label, may contain spaces.
        label: String,
        /// Requested value.
        value: i32,
    },

    /// Quit the application.
    Quit,

    /// Send a chat message.
    Message {
        /// Message content.
        content: String,
    },

    /// Unknown or invalid command.
    Unknown {
        /// The original input.
        input: String,
    },

    /// Command with missing or invalid arguments.
    InvalidArgs {
        /// Command name.
        command: String,
        /// Error message.
        error: String,
    },
}

/// Parse a user input line into a command.
///
/// Returns `None` for blank input.
pub fn parse(input: &str) -> Option<Command> {
    let input = input.trim();

    if input.is_empty() {
        return None;
    }

    let Some(cmd_str) = input.strip_prefix('/') else {
        return Some(Command::Message { content: input.to_string() });
    };

    let parts: Vec<&str> = cmd_str.split_whitespace().collect();
    let command = parts.first().copied().unwrap_or("");

    let parsed = match command {
        "connect" => parse_connect(&parts[1..]),

        "disconnect" | "dc" => Command::Disconnect,

        "select" => match parts.get(1) {
            Some(id) => Command::Select { actor_id: (*id).to_string() },
            None => invalid("select", "Usage: /select <actor-id>"),
        },

        "set" => parse_set(&parts[1..]),

        "quit" | "q" => Command::Quit,

        _ => Command::Unknown { input: input.to_string() },
    };
    Some(parsed)
}

fn parse_connect(args: &[&str]) -> Command {
    let mode = match args.get(2).map(|m| m.parse::<ConnectionMode>()).transpose() {
        Ok(mode) => mode,
        Err(error) => return invalid("connect", &error.to_string()),
    };
    if args.len() > 3 {
        return invalid("connect", "Too many arguments");
    }
    Command::Connect {
        server_url: args.first().map(|u| (*u).to_string()),
        world: args.get(1).map(|w| (*w).to_string()),
        mode,
    }
}

fn parse_set(args: &[&str]) -> Command {
    let Some((value, label)) = args.split_last() else {
        return invalid("set", "Usage: /set <resource-label> <value>");
    };
    if label.is_empty() {
        return invalid("set", "Usage: /set <resource-label> <value>");
    }
    match value.parse::<i32>() {
        Ok(value) => Command::Set { label: label.join(" "), value },
        Err(_) => invalid("set", "Invalid value"),
    }
}

fn invalid(command: &str, error: &str) -> Command {
    Command::InvalidArgs { command: command.into(), error: error.into() }
}
