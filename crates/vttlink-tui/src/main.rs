//! Terminal companion client.
//!
//! ```text
//! vttlink-tui --server https://vtt.example --world w1 --username alice --auto-connect
//! ```
//!
//! The password is read from `VTTLINK_PASSWORD`, never from the command line.
//! Logs go to `--log-file` because the terminal belongs to the UI.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use clap::Parser;
use tracing::info;
use vttlink_app::{App, AppEvent, Runtime, RuntimeConfig};
use vttlink_core::{ConnectionMode, Secret, SessionConfig, SystemEnv};
use vttlink_tui::{ConnectProfile, DemoHandshake, TerminalDriver};

const PASSWORD_ENV: &str = "VTTLINK_PASSWORD";

#[derive(Debug, Parser)]
#[command(name = "vttlink-tui", version, about = "Companion client for a remote tabletop session")]
struct Args {
    /// Server used by `/connect` without arguments.
    #[arg(long)]
    server: Option<String>,

    /// Default world identifier.
    #[arg(long, default_value = "")]
    world: String,

    /// Display name.
    #[arg(long)]
    username: Option<String>,

    /// API token.
    #[arg(long)]
    token: Option<String>,

    /// Default session mode: hybrid, webview or native.
    #[arg(long, default_value_t = ConnectionMode::Hybrid)]
    mode: ConnectionMode,

    /// Log file path.
    #[arg(long, default_value = "vttlink-tui.log")]
    log_file: PathBuf,

    /// Seconds to wait for the handshake before giving up.
    #[arg(long, default_value_t = 30)]
    connect_timeout: u64,

    /// Connect to `--server` on startup.
    #[arg(long, requires = "server")]
    auto_connect: bool,
}

impl Args {
    fn profile(&self) -> ConnectProfile {
        ConnectProfile {
            server_url: self.server.clone(),
            world: self.world.clone(),
            username: self.username.clone(),
            password: std::env::var(PASSWORD_ENV).ok().map(Secret::new),
            token: self.token.clone().map(Secret::new),
            mode: self.mode,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(&args.log_file)?;

    let profile = args.profile();
    let auto_connect = if args.auto_connect { profile.input(None, None, None) } else { None };

    let config = SessionConfig {
        connect_timeout: Duration::from_secs(args.connect_timeout),
        ..SessionConfig::default()
    };
    let app = App::new(SystemEnv, config);

    let mut driver = TerminalDriver::new(profile)?;
    if let Some(input) = auto_connect {
        driver.queue(AppEvent::Connect(input));
    }

    info!(mode = %args.mode, "starting terminal client");
    let runtime =
        Runtime::new(app, driver, Arc::new(DemoHandshake::new()), RuntimeConfig::default());
    runtime.run().await?;
    Ok(())
}

fn init_logging(log_path: &Path) -> std::io::Result<()> {
    if let Some(parent) = log_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let log_file = std::fs::OpenOptions::new().create(true).append(true).open(log_path)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(log_file))
        .init();

    Ok(())
}
