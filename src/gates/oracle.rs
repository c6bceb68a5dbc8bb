// src/gates/oracle.rs

//! Boolean oracles defined from truth tables.

use super::BasisAction;
use crate::core::complex::{Amplitude, ONE};
use crate::core::constants::emulator_constants::MAX_QUBITS;
use crate::core::error::{EmulatorError, Result};
use crate::core::store::BasisIndex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;
use tracing::warn;

/// Where an oracle truth table comes from.
///
/// The text format holds one integer per line: the input size first, then
/// every input value for which the function is 1. Blank lines and lines
/// starting with `#` are skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableSource {
    /// A file in the text format.
    Path(PathBuf),
    /// The text format, inline.
    Text(String),
    /// Already parsed entries, input size first.
    Entries(Vec<i64>),
}

/// A named boolean function over `input_size` bits, stored as the set of
/// inputs mapped to 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleDefinition {
    pub name: String,
    pub input_size: usize,
    pub marked: BTreeSet<BasisIndex>,
}

impl OracleDefinition {
    /// Builds a definition from raw table entries.
    ///
    /// # Errors
    /// `InvalidOracleTable` if the table is empty, the input size is not in
    /// `1..=MAX_QUBITS`, or a value is negative or `>= 2^input_size`.
    pub fn from_entries(name: &str, entries: &[i64]) -> Result<Self> {
        let (&header, values) = entries.split_first().ok_or_else(|| EmulatorError::InvalidOracleTable {
            message: format!("table for oracle '{}' has no input size", name),
        })?;
        if header <= 0 || header as u64 > MAX_QUBITS as u64 {
            return Err(EmulatorError::InvalidOracleTable {
                message: format!("input size must be in 1..={}, got {}", MAX_QUBITS, header),
            });
        }
        let input_size = header as usize;
        let limit: u64 = 1 << input_size;

        let mut marked = BTreeSet::new();
        for &value in values {
            if value < 0 {
                return Err(EmulatorError::InvalidOracleTable {
                    message: format!("marked value {} is negative", value),
                });
            }
            if value as u64 >= limit {
                return Err(EmulatorError::InvalidOracleTable {
                    message: format!("marked value {} does not fit in {} input bits", value, input_size),
                });
            }
            if !marked.insert(value as BasisIndex) {
                warn!(oracle = name, value, "duplicate marked value in oracle table");
            }
        }

        Ok(Self {
            name: name.to_string(),
            input_size,
            marked,
        })
    }

    /// Reads and parses a table from any [`TableSource`].
    ///
    /// # Errors
    /// `Io` if a file cannot be read, `InvalidOracleTable` for bad contents.
    pub fn load(name: &str, source: &TableSource) -> Result<Self> {
        match source {
            TableSource::Path(path) => {
                let text = fs::read_to_string(path)?;
                Self::from_entries(name, &parse_table(&text)?)
            }
            TableSource::Text(text) => Self::from_entries(name, &parse_table(text)?),
            TableSource::Entries(entries) => Self::from_entries(name, entries),
        }
    }

    /// The value of the function at `input`.
    pub fn evaluate(&self, input: BasisIndex) -> bool {
        self.marked.contains(&input)
    }
}

fn parse_table(text: &str) -> Result<Vec<i64>> {
    text.lines()
        .enumerate()
        .map(|(number, line)| (number + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(number, line)| {
            line.parse::<i64>().map_err(|_| EmulatorError::InvalidOracleTable {
                message: format!("line {}: '{}' is not an integer", number, line),
            })
        })
        .collect()
}

/// An oracle bound to positions of one real register:
/// `|x>|y> -> |x>|y XOR f(x)>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OracleGate {
    name: String,
    input_offset: usize,
    input_size: usize,
    ancilla: usize,
    marked: BTreeSet<BasisIndex>,
}

impl OracleGate {
    /// Binds `definition` to the input window `[input_offset, input_offset +
    /// input_size)` and the absolute ancilla bit.
    ///
    /// The window width is that of the input register, not the table header:
    /// a wider window reads more bits, and marked values beyond a narrower
    /// window are never matched.
    ///
    /// # Errors
    /// `OverlappingOperands` if the ancilla lies inside the input window.
    pub fn new(definition: &OracleDefinition, input_offset: usize, input_size: usize, ancilla: usize) -> Result<Self> {
        if (input_offset..input_offset + input_size).contains(&ancilla) {
            return Err(EmulatorError::OverlappingOperands {
                message: format!(
                    "ancilla bit {} lies inside the input bits [{}, {})",
                    ancilla,
                    input_offset,
                    input_offset + input_size
                ),
            });
        }
        Ok(Self {
            name: definition.name.clone(),
            input_offset,
            input_size,
            ancilla,
            marked: definition.marked.clone(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bit `input_offset + i` of `state` becomes bit `i` of the result.
    fn input_value(&self, state: BasisIndex) -> BasisIndex {
        (0..self.input_size).fold(0, |value, i| value | (((state >> (self.input_offset + i)) & 1) << i))
    }
}

impl BasisAction for OracleGate {
    fn basis_action(&self, from: BasisIndex) -> Vec<(BasisIndex, Amplitude)> {
        let to = if self.marked.contains(&self.input_value(from)) {
            from ^ (1 << self.ancilla)
        } else {
            from
        };
        vec![(to, ONE)]
    }
}
