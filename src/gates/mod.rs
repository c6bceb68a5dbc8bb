// src/gates/mod.rs

//! Gates expressed as their action on a single basis state.
//!
//! Every gate maps one basis index to a short list of `(to, coefficient)`
//! pairs, which is the unitary restricted to its target qubits. The shared
//! apply loop in [`crate::emulation::engine`] sums these contributions over all
//! active states, so superposing gates (H) and permutations (X, SWAP, oracles)
//! go through the same path.

pub mod oracle;
mod resolve;

pub use oracle::{OracleDefinition, OracleGate, TableSource};
pub use resolve::resolve;

use crate::core::complex::{exp_i, Amplitude, I, ONE};
use crate::core::store::BasisIndex;
use std::f64::consts::{FRAC_1_SQRT_2, PI};
use std::fmt;

/// Capability of mapping a basis state to weighted successor states.
pub trait BasisAction {
    /// Returns `(to, coefficient)` pairs for basis state `from`.
    fn basis_action(&self, from: BasisIndex) -> Vec<(BasisIndex, Amplitude)>;
}

/// A resolved gate, with absolute bit positions inside one real register.
#[derive(Debug, Clone, PartialEq)]
pub enum Gate {
    /// Pauli X (NOT).
    X { target: usize },
    /// Pauli Y.
    Y { target: usize },
    /// Pauli Z.
    Z { target: usize },
    /// Hadamard.
    H { target: usize },
    /// Phase by `i` on `|1>`.
    S { target: usize },
    /// Phase by `e^(iπ/4)` on `|1>`.
    T { target: usize },
    /// Phase by `e^(i·phase)` on `|1>`.
    Phase { target: usize, phase: f64 },
    /// Exchanges two qubits.
    Swap { first: usize, second: usize },
    /// Adds 1 modulo `2^qubit_count` to the whole register value.
    Increment { qubit_count: usize },
    /// Subtracts 1 modulo `2^qubit_count` from the whole register value.
    Decrement { qubit_count: usize },
    /// Applies `inner` only where the `control` bit is 1.
    Controlled { control: usize, inner: Box<Gate> },
    /// Flips an ancilla bit where a marked input value is present.
    Oracle(OracleGate),
}

#[inline]
fn bit(state: BasisIndex, position: usize) -> bool {
    (state >> position) & 1 == 1
}

#[inline]
fn flip(state: BasisIndex, position: usize) -> BasisIndex {
    state ^ (1 << position)
}

/// `2^qubit_count - 1`, the largest value of a register of that width.
fn value_mask(qubit_count: usize) -> BasisIndex {
    if qubit_count >= 64 { BasisIndex::MAX } else { (1 << qubit_count) - 1 }
}

impl BasisAction for Gate {
    fn basis_action(&self, from: BasisIndex) -> Vec<(BasisIndex, Amplitude)> {
        match self {
            Gate::X { target } => vec![(flip(from, *target), ONE)],
            Gate::Y { target } => {
                let coef = if bit(from, *target) { -I } else { I };
                vec![(flip(from, *target), coef)]
            }
            Gate::Z { target } => {
                let coef = if bit(from, *target) { -ONE } else { ONE };
                vec![(from, coef)]
            }
            Gate::H { target } => {
                let h = Amplitude::new(FRAC_1_SQRT_2, 0.0);
                let stay = if bit(from, *target) { -h } else { h };
                vec![(from, stay), (flip(from, *target), h)]
            }
            Gate::S { target } => vec![(from, if bit(from, *target) { I } else { ONE })],
            Gate::T { target } => vec![(from, if bit(from, *target) { exp_i(PI / 4.0) } else { ONE })],
            Gate::Phase { target, phase } => vec![(from, if bit(from, *target) { exp_i(*phase) } else { ONE })],
            Gate::Swap { first, second } => {
                if bit(from, *first) == bit(from, *second) {
                    vec![(from, ONE)]
                } else {
                    vec![(flip(flip(from, *first), *second), ONE)]
                }
            }
            Gate::Increment { qubit_count } => vec![(from.wrapping_add(1) & value_mask(*qubit_count), ONE)],
            Gate::Decrement { qubit_count } => vec![(from.wrapping_sub(1) & value_mask(*qubit_count), ONE)],
            Gate::Controlled { control, inner } => {
                if bit(from, *control) {
                    inner.basis_action(from)
                } else {
                    vec![(from, ONE)]
                }
            }
            Gate::Oracle(oracle) => oracle.basis_action(from),
        }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gate::X { .. } => write!(f, "X"),
            Gate::Y { .. } => write!(f, "Y"),
            Gate::Z { .. } => write!(f, "Z"),
            Gate::H { .. } => write!(f, "H"),
            Gate::S { .. } => write!(f, "S"),
            Gate::T { .. } => write!(f, "T"),
            Gate::Phase { phase, .. } => write!(f, "P({:.4})", phase),
            Gate::Swap { .. } => write!(f, "SWAP"),
            Gate::Increment { .. } => write!(f, "INC"),
            Gate::Decrement { .. } => write!(f, "DEC"),
            Gate::Controlled { inner, .. } => write!(f, "C{}", inner),
            Gate::Oracle(oracle) => write!(f, "{}", oracle.name()),
        }
    }
}
