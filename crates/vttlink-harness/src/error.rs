//! Simulation errors.

use std::time::Duration;

use thiserror::Error;
use vttlink_proto::ProtocolError;

/// Errors raised by simulated components.
#[derive(Debug, Error)]
pub enum SimError {
    /// Script evaluated against a page that was already torn down.
    #[error("page disposed")]
    Disposed,

    /// The page could not interpret a script.
    #[error("unrecognized script: {0}")]
    Script(#[from] ProtocolError),

    /// The driver was configured to refuse surfaces.
    #[error("surface refused for {0}")]
    SurfaceRefused(String),

    /// A wait did not complete within the virtual time limit.
    #[error("condition not reached within {0:?}")]
    Timeout(Duration),

    /// The runtime task is no longer running.
    #[error("runtime stopped")]
    RuntimeGone,

    /// The runtime task ended with an error or panicked.
    #[error("runtime failed: {0}")]
    Runtime(String),
}
