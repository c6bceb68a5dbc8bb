//! Numeric constants shared by the register and gate layers.

/// Tolerances and limits used throughout the emulator.
pub mod emulator_constants {
    /// Tolerance for approximate amplitude equality.
    pub const AMPLITUDE_EPSILON: f64 = 1e-9;
    /// Retained probability mass below which a measurement projection is degenerate.
    pub const DEGENERATE_MASS_EPSILON: f64 = 1e-12;
    /// Number of amplitudes grouped in one storage chunk.
    pub const CHUNK_SIZE: usize = 32;
    /// Widest register whose basis indices still fit a `u64` together with `2^n`.
    pub const MAX_QUBITS: usize = 63;
}
