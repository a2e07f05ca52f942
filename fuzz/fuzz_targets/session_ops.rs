//! Fuzz the session machine against the reference model.
//!
//! Arbitrary operation sequences must produce the same results and the same
//! observable state in both.

#![no_main]

use libfuzzer_sys::fuzz_target;
use vttlink_harness::{
    MachineSession,
    model::{ModelSession, Operation},
};

fuzz_target!(|ops: Vec<Operation>| {
    let mut model = ModelSession::new();
    let mut real = MachineSession::new();

    for op in &ops {
        assert_eq!(model.apply(op), real.apply(op), "result diverged on {op:?}");
        assert_eq!(model.observable_state(), real.observable_state(), "state diverged on {op:?}");
    }
});
