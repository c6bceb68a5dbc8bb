//! Error handling logic

use thiserror::Error;

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, EmulatorError>;

/// Failures raised by register construction, gate resolution and command execution.
///
/// Construction-time violations are returned directly to the caller. The
/// [`Emulation`](crate::emulation::Emulation) command boundary turns every
/// variant into a readable status string instead of propagating it.
#[derive(Debug, Error)]
pub enum EmulatorError {
    /// A constructor or command received a value outside its domain.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the rejected value
        message: String,
    },

    /// No nominal or real register carries this name.
    #[error("Register '{name}' not found")]
    UnknownRegister {
        /// The name that failed to resolve
        name: String,
    },

    /// The gate name does not resolve to any known gate.
    #[error("Unknown gate: {name}")]
    UnknownGate {
        /// The requested gate name
        name: String,
    },

    /// No oracle has been defined under this name.
    #[error("Oracle '{name}' is not defined")]
    UnknownOracle {
        /// The requested oracle name
        name: String,
    },

    /// A qubit index falls outside its register.
    #[error("Index {index} out of bounds for register '{register}' (size {size})")]
    IndexOutOfBounds {
        /// Register the index was applied to
        register: String,
        /// The offending index
        index: usize,
        /// Number of qubits in the register
        size: usize,
    },

    /// A register name is already taken.
    #[error("Register '{name}' already exists")]
    DuplicateName {
        /// The conflicting name
        name: String,
    },

    /// Operands of an oracle application share a qubit.
    #[error("Overlapping operands: {message}")]
    OverlappingOperands {
        /// Which operands overlap
        message: String,
    },

    /// The operation would need a register merge that it does not support.
    #[error("Unsupported merge: {message}")]
    UnsupportedMerge {
        /// Why the merge was refused
        message: String,
    },

    /// An oracle table is malformed or out of range.
    #[error("Invalid oracle table: {message}")]
    InvalidOracleTable {
        /// Description of the malformed entry
        message: String,
    },

    /// A measurement would have to renormalize a (near) zero probability mass.
    #[error("Degenerate arithmetic: {message}")]
    ArithmeticDegenerate {
        /// Details of the degenerate computation
        message: String,
    },

    /// Reading an external resource failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding or decoding a saved emulation failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EmulatorError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        EmulatorError::InvalidArgument { message: message.into() }
    }

    pub(crate) fn unknown_register(name: impl Into<String>) -> Self {
        EmulatorError::UnknownRegister { name: name.into() }
    }
}
