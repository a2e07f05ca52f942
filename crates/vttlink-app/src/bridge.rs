//! Host side of the bridge.
//!
//! [`BridgeTransport`] owns the live handle to the embedded surface. The
//! handle is present from `attach` until `release`; outbound commands issued
//! while it is absent are dropped. Every outbound call is best-effort: a
//! successful `evaluate` only means the script was handed to the surface.

use thiserror::Error;
use tracing::{debug, info, warn};
use vttlink_proto::{BOOTSTRAP_SCRIPT, BridgeCommand, BridgeNotification, ProtocolError};

/// Script evaluation inside an embedded rendering context.
pub trait Surface: Send + 'static {
    /// Surface-specific evaluation error.
    type Error: std::error::Error + Send + 'static;

    /// Hand `script` to the embedded context. Does not wait for a result.
    fn evaluate(&mut self, script: &str) -> Result<(), Self::Error>;
}

/// Bridge failures.
///
/// None of these reach the user; the runtime logs and drops them.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// No surface is attached.
    #[error("no embedded surface attached")]
    Unavailable,

    /// The surface refused the script.
    #[error("script evaluation failed: {0}")]
    Evaluation(String),

    /// An inbound payload could not be decoded.
    #[error("malformed notification: {0}")]
    Decode(#[from] ProtocolError),
}

/// Owner of the surface handle.
#[derive(Debug)]
pub struct BridgeTransport<S> {
    surface: Option<S>,
}

impl<S: Surface> BridgeTransport<S> {
    /// Transport with no surface attached.
    pub fn new() -> Self {
        Self { surface: None }
    }

    /// Take ownership of a freshly opened surface and inject the bootstrap.
    ///
    /// Replaces any previously attached surface.
    pub fn attach(&mut self, surface: S) {
        if self.surface.replace(surface).is_some() {
            debug!("replaced attached surface");
        }
        info!("embedded surface attached");
        self.install_bootstrap();
    }

    /// Drop the surface handle. Idempotent.
    pub fn release(&mut self) {
        if self.surface.take().is_some() {
            info!("embedded surface released");
        }
    }

    /// Whether a surface is attached.
    pub fn is_attached(&self) -> bool {
        self.surface.is_some()
    }

    /// Borrow the attached surface.
    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    /// Inject the bootstrap script.
    ///
    /// Safe to repeat: the script's sentinel makes every injection after the
    /// first a no-op inside the embedded context.
    pub fn install_bootstrap(&mut self) {
        let Some(surface) = self.surface.as_mut() else {
            debug!("no surface attached; bootstrap skipped");
            return;
        };
        if let Err(error) = surface.evaluate(BOOTSTRAP_SCRIPT) {
            warn!(%error, "bootstrap injection failed");
        }
    }

    /// Evaluate an outbound command.
    ///
    /// # Errors
    ///
    /// - `Unavailable` if no surface is attached
    /// - `Evaluation` if the surface refused the script
    pub fn send(&mut self, command: &BridgeCommand) -> Result<(), BridgeError> {
        let surface = self.surface.as_mut().ok_or(BridgeError::Unavailable)?;
        surface.evaluate(&command.to_script()).map_err(|e| BridgeError::Evaluation(e.to_string()))
    }
}

impl<S: Surface> Default for BridgeTransport<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode a payload posted to the host entry point.
///
/// # Errors
///
/// `Decode` if the payload is oversized or not a known notification.
pub fn decode_notification(raw: &str) -> Result<BridgeNotification, BridgeError> {
    Ok(BridgeNotification::from_json(raw)?)
}
