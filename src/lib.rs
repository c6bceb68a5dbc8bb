// src/lib.rs

//! `qregemu` - A sparse, gate-based quantum register emulator
//!
//! Qubits are grouped into named registers. A *real* register owns a sparse
//! amplitude store; *nominal* registers are named windows into a real one.
//! Gates address qubits through nominal registers, and an operation that
//! spans several real registers joins them by tensor product first.

pub mod core;
pub mod gates;
pub mod emulation;
pub mod command;
pub mod script;
pub mod session;
pub mod validation;

// Re-export the most common types for easier top-level use
pub use core::{Amplitude, BasisIndex, EmulatorError, QubitRegister, RegisterId, RegisterState, Result};
pub use gates::{BasisAction, Gate, OracleDefinition, OracleGate, TableSource};
pub use emulation::{CommandOutput, Emulation, EmulationConfig, GateTrace, MergeInfo};
pub use command::{Command, NominalSpec, Operand};
pub use script::{Script, ScriptBuilder};
pub use session::Session;
pub use validation::{check_normalization, total_probability, validate_state};

// Example 1: Single register flip and measurement
// A one-qubit register starts in |0>; X moves all weight to |1>, so the
// measurement is certain and leaves the state unchanged.
/// ```
/// use qregemu::{Command, Emulation, EmulationConfig, EmulatorError};
///
/// let mut emu = Emulation::with_config(EmulationConfig::seeded(42));
/// assert!(emu.run(&Command::create(&[("r", 1)])).succeeded);
///
/// let out = emu.run(&Command::gate("X", &[("r", 0)]));
/// println!("{}", out);
/// assert_eq!(out.status, "|1>: 1.00 + 0.00i");
///
/// let bit = emu.measure("r", 0)?;
/// assert_eq!(bit, 1);
/// assert_eq!(emu.register_state("r")?.to_string(), "|1>: 1.00 + 0.00i");
/// # Ok::<(), EmulatorError>(())
/// ```
#[doc(hidden)]
const _: () = (); // Attaches the preceding doc comment block to a hidden item

// Example 2: Entangling two separately created registers
// The CNOT spans two real registers, so they are joined first. Both nominal
// registers then resolve through the joined register "join(A,B)".
/// ```
/// use qregemu::{Command, Emulation, EmulationConfig, EmulatorError, NominalSpec};
///
/// let mut emu = Emulation::with_config(EmulationConfig::seeded(7));
/// emu.create_register(Some("A"), None, &[NominalSpec::new("a", 1)])?;
/// emu.create_register(Some("B"), None, &[NominalSpec::new("b", 1)])?;
///
/// emu.run(&Command::gate("H", &[("a", 0)]));
/// let out = emu.run(&Command::gate("CNOT", &[("a", 0), ("b", 0)]));
/// let merge = out.merge.expect("a and b lived on different real registers");
/// assert_eq!(merge.new_real_name, "join(A,B)");
/// assert_eq!(merge.old_real_names, vec!["A", "B"]);
///
/// // (|00> + |11>) / sqrt(2)
/// println!("{}", out.status);
/// assert_eq!(out.status, "|00>: 0.71 + 0.00i\n|11>: 0.71 + 0.00i");
/// assert_eq!(emu.real_name_of("b")?, "join(A,B)");
///
/// // Measuring one half fixes the other.
/// let a = emu.measure("a", 0)?;
/// let b = emu.measure("b", 0)?;
/// assert_eq!(a, b);
/// # Ok::<(), EmulatorError>(())
/// ```
#[doc(hidden)]
const _: () = (); // Attaches the preceding doc comment block to a hidden item
