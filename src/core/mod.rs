// src/core/mod.rs

//! Core data structures: amplitudes, sparse storage, register state and the
//! register arena.

pub mod error;
pub mod complex;
pub mod store;
pub mod state;
pub mod register;
pub mod arena;

// Re-export public types for convenient access via `qregemu::core::TypeName`
pub use error::{EmulatorError, Result};
pub use complex::{Amplitude, AmplitudeExt, ONE, ZERO};
pub use store::{AmplitudeStore, BasisIndex};
pub use state::{basis_label, RegisterState};
pub use register::{Binding, QubitRegister, RegisterId};
pub use arena::RegisterArena;

pub mod constants;
pub use constants::emulator_constants::{AMPLITUDE_EPSILON, MAX_QUBITS};
