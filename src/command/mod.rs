// src/command/mod.rs

//! Defines the commands accepted by an [`Emulation`](crate::emulation::Emulation).
//!
//! Commands are plain data. They serialize as JSON objects tagged by `kind`,
//! so a front end can either build them directly or hand over parsed JSON.

use crate::gates::TableSource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// One qubit addressed through a nominal register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operand {
    /// Name of the nominal register.
    pub register: String,
    /// Qubit index inside that register.
    pub index: usize,
}

impl Operand {
    pub fn new(register: &str, index: usize) -> Self {
        Self { register: register.to_string(), index }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.register, self.index)
    }
}

/// Name and width of one nominal register declared by `CreateRegister`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NominalSpec {
    pub name: String,
    pub size: usize,
}

impl NominalSpec {
    pub fn new(name: &str, size: usize) -> Self {
        Self { name: name.to_string(), size }
    }
}

/// A single instruction for the emulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Command {
    /// Create one real register and a nominal register per spec.
    ///
    /// Specs declared later occupy lower qubit positions. When `real_size` is
    /// given it must equal the sum of the spec sizes.
    CreateRegister {
        #[serde(default)]
        real_name: Option<String>,
        #[serde(default)]
        real_size: Option<usize>,
        specs: Vec<NominalSpec>,
    },
    /// Apply a named gate. The first operands are controls for `C`-prefixed
    /// names.
    ApplyGate {
        gate: String,
        #[serde(default)]
        phase: Option<f64>,
        operands: Vec<Operand>,
    },
    /// Measure one qubit, collapsing the shared state.
    Measure { register: String, index: usize },
    /// Draw an outcome for one qubit without collapsing.
    Sample { register: String, index: usize },
    /// Define (or redefine) an oracle from a truth table.
    DefineOracleFromTable { name: String, table: TableSource },
    /// Apply a defined oracle with `input` as the argument register and
    /// `ancilla[ancilla_index]` as the output bit.
    ApplyOracle {
        oracle: String,
        input: String,
        ancilla: String,
        ancilla_index: usize,
    },
}

impl Command {
    /// `CreateRegister` with a generated real name and inferred size.
    pub fn create(specs: &[(&str, usize)]) -> Self {
        Command::CreateRegister {
            real_name: None,
            real_size: None,
            specs: specs.iter().map(|(name, size)| NominalSpec::new(name, *size)).collect(),
        }
    }

    /// `ApplyGate` without a phase.
    pub fn gate(name: &str, operands: &[(&str, usize)]) -> Self {
        Command::ApplyGate {
            gate: name.to_string(),
            phase: None,
            operands: operands.iter().map(|(register, index)| Operand::new(register, *index)).collect(),
        }
    }

    /// `ApplyGate` with a phase, for `P` and its controlled forms.
    pub fn phase_gate(name: &str, phase: f64, operands: &[(&str, usize)]) -> Self {
        match Self::gate(name, operands) {
            Command::ApplyGate { gate, operands, .. } => Command::ApplyGate { gate, phase: Some(phase), operands },
            other => other,
        }
    }

    pub fn measure(register: &str, index: usize) -> Self {
        Command::Measure { register: register.to_string(), index }
    }

    pub fn sample(register: &str, index: usize) -> Self {
        Command::Sample { register: register.to_string(), index }
    }

    pub fn define_oracle(name: &str, table: TableSource) -> Self {
        Command::DefineOracleFromTable { name: name.to_string(), table }
    }

    pub fn apply_oracle(oracle: &str, input: &str, ancilla: &str, ancilla_index: usize) -> Self {
        Command::ApplyOracle {
            oracle: oracle.to_string(),
            input: input.to_string(),
            ancilla: ancilla.to_string(),
            ancilla_index,
        }
    }

    /// Names of the nominal registers this command reads or declares.
    pub fn registers(&self) -> BTreeSet<&str> {
        match self {
            Command::CreateRegister { specs, .. } => specs.iter().map(|spec| spec.name.as_str()).collect(),
            Command::ApplyGate { operands, .. } => operands.iter().map(|op| op.register.as_str()).collect(),
            Command::Measure { register, .. } | Command::Sample { register, .. } => BTreeSet::from([register.as_str()]),
            Command::DefineOracleFromTable { .. } => BTreeSet::new(),
            Command::ApplyOracle { input, ancilla, .. } => BTreeSet::from([input.as_str(), ancilla.as_str()]),
        }
    }

    /// `true` if running the command can change register state.
    pub fn mutates_state(&self) -> bool {
        !matches!(self, Command::Sample { .. } | Command::DefineOracleFromTable { .. })
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::CreateRegister { real_name, specs, .. } => {
                let specs: Vec<_> = specs.iter().map(|s| format!("{}[{}]", s.name, s.size)).collect();
                write!(f, "CREATE {}", specs.join(", "))?;
                if let Some(real) = real_name {
                    write!(f, " AS {}", real)?;
                }
                Ok(())
            }
            Command::ApplyGate { gate, phase, operands } => {
                write!(f, "{}", gate)?;
                if let Some(phase) = phase {
                    write!(f, "({})", phase)?;
                }
                let operands: Vec<_> = operands.iter().map(Operand::to_string).collect();
                write!(f, " {}", operands.join(", "))
            }
            Command::Measure { register, index } => write!(f, "MEASURE {}[{}]", register, index),
            Command::Sample { register, index } => write!(f, "SAMPLE {}[{}]", register, index),
            Command::DefineOracleFromTable { name, table } => match table {
                TableSource::Path(path) => write!(f, "ORACLE {} FROM {}", name, path.display()),
                TableSource::Text(_) | TableSource::Entries(_) => write!(f, "ORACLE {} FROM <inline table>", name),
            },
            Command::ApplyOracle { oracle, input, ancilla, ancilla_index } => {
                write!(f, "{} {} -> {}[{}]", oracle, input, ancilla, ancilla_index)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_shape() -> Result<(), serde_json::Error> {
        let cmd = Command::gate("CNOT", &[("q", 0), ("q", 1)]);
        let json = serde_json::to_value(&cmd)?;
        assert_eq!(json["kind"], "ApplyGate");
        assert_eq!(json["operands"][1]["index"], 1);

        let parsed: Command = serde_json::from_str(r#"{"kind":"Measure","register":"r","index":0}"#)?;
        assert_eq!(parsed, Command::measure("r", 0));

        // Optional fields may be omitted.
        let parsed: Command = serde_json::from_str(r#"{"kind":"CreateRegister","specs":[{"name":"a","size":2}]}"#)?;
        assert_eq!(parsed, Command::create(&[("a", 2)]));
        Ok(())
    }

    #[test]
    fn test_registers_and_mutation() {
        let cmd = Command::apply_oracle("f", "x", "y", 0);
        assert_eq!(cmd.registers().into_iter().collect::<Vec<_>>(), vec!["x", "y"]);
        assert!(cmd.mutates_state());
        assert!(!Command::sample("x", 0).mutates_state());
        assert!(Command::define_oracle("f", TableSource::Entries(vec![1])).registers().is_empty());
    }

    #[test]
    fn test_display() {
        assert_eq!(Command::phase_gate("P", 0.5, &[("q", 2)]).to_string(), "P(0.5) q[2]");
        assert_eq!(Command::create(&[("q", 2), ("a", 1)]).to_string(), "CREATE q[2], a[1]");
        assert_eq!(Command::apply_oracle("f", "x", "y", 0).to_string(), "f x -> y[0]");
    }
}
