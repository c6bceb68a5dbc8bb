// src/emulation/engine.rs
use super::results::GateTrace;
use crate::core::complex::AmplitudeExt;
use crate::core::state::RegisterState;
use crate::gates::BasisAction;

/// Applies `action` to `state` and returns the contributions it produced.
///
/// Every active basis state is pushed through the gate's basis action and the
/// weighted results are summed into a fresh state, which then replaces the
/// old one. Contributions that are exactly zero are neither stored nor traced;
/// a target whose sum cancels to exactly zero drops out of the active set.
pub fn apply<A: BasisAction + ?Sized>(action: &A, state: &mut RegisterState) -> GateTrace {
    let mut next = RegisterState::empty(state.qubit_count());
    let mut trace = GateTrace::new();

    for (from, amp) in state.iter() {
        for (to, coef) in action.basis_action(from) {
            let contribution = amp * coef;
            if contribution.is_exact_zero() {
                continue;
            }
            next.accumulate(to, contribution);
            trace.record(from, to, contribution);
        }
    }

    *state = next;
    trace
}
