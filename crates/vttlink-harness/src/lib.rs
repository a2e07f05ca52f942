//! Deterministic simulation harness for the companion client.
//!
//! Simulated implementations of the Environment, Surface, Handshake and
//! Driver seams. Everything is driven by tokio's timer, so tests running with
//! paused time are reproducible down to the millisecond.
//!
//! - [`SimEnv`]: clocks derived from tokio time
//! - [`SimPage`]: an embedded context that executes the bootstrap protocol
//! - [`ScriptedHandshake`]: canned handshake replies with latency
//! - [`SimDriver`] / [`Simulation`]: the runtime wired to all of the above
//! - [`model`] / [`MachineSession`]: reference model and the real machine
//!   behind the same interface, for model-based testing

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod machine;
pub mod model;
pub mod scripted_handshake;
pub mod sim_driver;
pub mod sim_env;
pub mod sim_page;

pub use error::SimError;
pub use machine::MachineSession;
pub use scripted_handshake::{Reply, ScriptedHandshake, party};
pub use sim_driver::{SimDriver, SimHandle, Simulation};
pub use sim_env::SimEnv;
pub use sim_page::{PageProbe, SimPage};
