//! Model-based property tests.
//!
//! These tests generate random operation sequences and verify that the real
//! session machine behaves identically to the reference model.
//!
//! # Architecture
//!
//! ```text
//! proptest generates: Vec<Operation>
//!                          │
//!           ┌──────────────┼──────────────┐
//!           ▼              ▼              ▼
//!     ModelSession   MachineSession    Compare
//!     (reference)    (SessionMachine)  Results
//! ```

use proptest::prelude::*;
use vttlink_core::ConnectionStatus;
use vttlink_harness::{
    MachineSession,
    model::{
        MODEL_USERNAME, ModelMode, ModelSession, ModelStatus, Operation, OperationResult,
        SmallText,
    },
};

fn mode_strategy() -> impl Strategy<Value = ModelMode> {
    prop_oneof![Just(ModelMode::Hybrid), Just(ModelMode::WebView), Just(ModelMode::Native)]
}

fn text_strategy() -> impl Strategy<Value = SmallText> {
    any::<u8>().prop_map(|seed| SmallText { seed })
}

/// Strategy for generating operations.
fn operation_strategy() -> impl Strategy<Value = Operation> {
    prop_oneof![
        // Weight towards a connected session
        3 => (mode_strategy(), any::<bool>())
            .prop_map(|(mode, with_username)| Operation::Connect { mode, with_username }),
        3 => any::<u8>().prop_map(|actors| Operation::HandshakeOk { actors }),
        1 => Just(Operation::HandshakeErr),
        1 => Just(Operation::Disconnect),
        2 => any::<u8>().prop_map(|actor| Operation::Select { actor }),
        5 => text_strategy().prop_map(|text| Operation::SendChat { text }),
        5 => (any::<bool>(), text_strategy(), any::<u16>())
            .prop_map(|(from_self, text, offset)| Operation::BridgeChat { from_self, text, offset }),
        2 => (any::<u8>(), any::<i16>())
            .prop_map(|(actor, value)| Operation::UpdateResource { actor, value }),
        2 => any::<u16>().prop_map(|millis| Operation::AdvanceTime { millis }),
    ]
}

proptest! {
    /// Operation results and observable state match between model and real
    /// machine after every step.
    #[test]
    fn prop_model_matches_real(ops in prop::collection::vec(operation_strategy(), 0..80)) {
        let mut model = ModelSession::new();
        let mut real = MachineSession::new();

        for (i, op) in ops.iter().enumerate() {
            let model_result = model.apply(op);
            let real_result = real.apply(op);

            prop_assert_eq!(
                model_result,
                real_result,
                "Divergence at operation {}: {:?}",
                i, op
            );
            prop_assert_eq!(
                model.observable_state(),
                real.observable_state(),
                "State divergence after operation {}: {:?}",
                i, op
            );
        }
    }

    /// Rejected operations never change observable state.
    #[test]
    fn prop_errors_leave_state_unchanged(ops in prop::collection::vec(operation_strategy(), 0..60)) {
        let mut real = MachineSession::new();

        for op in ops {
            let before = real.observable_state();
            if let OperationResult::Error(error) = real.apply(&op) {
                prop_assert_eq!(
                    &real.observable_state(),
                    &before,
                    "{:?} rejected with {:?} but changed state",
                    op, error
                );
            }
        }
    }

    /// The selection always names an actor in the roster.
    #[test]
    fn prop_selection_in_roster(ops in prop::collection::vec(operation_strategy(), 0..60)) {
        let mut real = MachineSession::new();
        for op in ops {
            real.apply(&op);
            let state = real.machine().state();
            if let Some(selected) = state.selected_actor() {
                prop_assert!(state.actors().iter().any(|a| a.id == selected.id));
            }
            prop_assert_eq!(
                state.selected_actor().is_none(),
                state.actors().is_empty() || state.status() != ConnectionStatus::Connected
            );
        }
    }
}

#[cfg(test)]
mod smoke_tests {
    use super::*;

    /// Echo of a local send is suppressed in both implementations.
    #[test]
    fn echo_scenario() {
        let ops = [
            Operation::Connect { mode: ModelMode::Hybrid, with_username: true },
            Operation::HandshakeOk { actors: 2 },
            Operation::SendChat { text: SmallText { seed: 1 } },
            Operation::BridgeChat { from_self: true, text: SmallText { seed: 1 }, offset: 4500 },
            Operation::BridgeChat { from_self: false, text: SmallText { seed: 2 }, offset: 4000 },
        ];
        let mut model = ModelSession::new();
        let mut real = MachineSession::new();
        let results: Vec<_> = ops.iter().map(|op| (model.apply(op), real.apply(op))).collect();

        assert_eq!(results[3], (OperationResult::Suppressed, OperationResult::Suppressed));
        assert_eq!(model.observable_state(), real.observable_state());
        assert_eq!(real.observable_state().feed, vec![
            (MODEL_USERNAME.to_string(), "Attack!".to_string()),
            ("Stranger".to_string(), "roll d20".to_string()),
        ]);
        assert_eq!(real.observable_state().forwarded, 1);
    }

    /// A hung handshake times out in both implementations.
    #[test]
    fn timeout_scenario() {
        let ops = [
            Operation::Connect { mode: ModelMode::WebView, with_username: false },
            Operation::AdvanceTime { millis: 20_000 },
            Operation::AdvanceTime { millis: 10_000 },
            Operation::HandshakeOk { actors: 1 },
        ];
        let mut model = ModelSession::new();
        let mut real = MachineSession::new();
        for op in &ops {
            assert_eq!(model.apply(op), real.apply(op), "{op:?}");
        }
        let state = real.observable_state();
        assert_eq!(state.status, ModelStatus::Disconnected);
        assert!(state.has_error);
    }
}
