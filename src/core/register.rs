// src/core/register.rs

use super::constants::emulator_constants::MAX_QUBITS;
use super::error::{EmulatorError, Result};
use super::state::RegisterState;
use super::store::BasisIndex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle of a register inside a [`RegisterArena`](super::arena::RegisterArena).
/// Ids are never reused within one arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegisterId(pub u64);

impl fmt::Display for RegisterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Reg({})", self.0)
    }
}

/// How a register reaches its amplitudes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Binding {
    /// A real register: owns its state and sits at offset 0 of itself.
    Owned(RegisterState),
    /// A nominal register: a window `[offset, offset + qubit_count)` into the
    /// real register `target`.
    Aliased {
        /// The real register holding the amplitudes.
        target: RegisterId,
        /// Position of qubit 0 of this view inside the target.
        offset: usize,
    },
}

/// A named group of qubits, either real (owning storage) or nominal (a view).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QubitRegister {
    name: String,
    qubit_count: usize,
    binding: Binding,
}

impl QubitRegister {
    /// Creates a real register in the `|0...0>` state.
    ///
    /// # Errors
    /// `InvalidArgument` for an empty name, zero qubits, or more than
    /// [`MAX_QUBITS`] qubits.
    pub fn real(name: &str, qubit_count: usize) -> Result<Self> {
        Self::validate_shape(name, qubit_count)?;
        Ok(Self {
            name: name.to_string(),
            qubit_count,
            binding: Binding::Owned(RegisterState::ground(qubit_count)),
        })
    }

    /// Creates a real register holding `state`.
    pub fn real_with_state(name: &str, state: RegisterState) -> Result<Self> {
        let qubit_count = state.qubit_count();
        Self::validate_shape(name, qubit_count)?;
        Ok(Self {
            name: name.to_string(),
            qubit_count,
            binding: Binding::Owned(state),
        })
    }

    /// Creates a nominal view. The caller guarantees that `target` is a real
    /// register of `target_qubits` qubits.
    pub(crate) fn nominal(name: &str, qubit_count: usize, target: RegisterId, target_qubits: usize, offset: usize) -> Result<Self> {
        if name.is_empty() {
            return Err(EmulatorError::invalid("register name must not be empty"));
        }
        if qubit_count == 0 {
            return Err(EmulatorError::invalid(format!("nominal register '{}' must have at least one qubit", name)));
        }
        if offset.checked_add(qubit_count).is_none_or(|end| end > target_qubits) {
            return Err(EmulatorError::invalid(format!(
                "nominal register '{}' [{}, {}) does not fit into a real register of {} qubits",
                name, offset, offset.saturating_add(qubit_count), target_qubits
            )));
        }
        Ok(Self {
            name: name.to_string(),
            qubit_count,
            binding: Binding::Aliased { target, offset },
        })
    }

    fn validate_shape(name: &str, qubit_count: usize) -> Result<()> {
        if name.is_empty() {
            return Err(EmulatorError::invalid("register name must not be empty"));
        }
        if qubit_count == 0 {
            return Err(EmulatorError::invalid(format!("register '{}' must have at least one qubit", name)));
        }
        if qubit_count > MAX_QUBITS {
            return Err(EmulatorError::invalid(format!(
                "register '{}' has {} qubits, the limit is {}",
                name, qubit_count, MAX_QUBITS
            )));
        }
        Ok(())
    }

    /// The register's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of qubits addressed by this register.
    pub fn size(&self) -> usize {
        self.qubit_count
    }

    /// The binding of this register.
    pub fn binding(&self) -> &Binding {
        &self.binding
    }

    /// `true` for a register that owns its state.
    pub fn is_real(&self) -> bool {
        matches!(self.binding, Binding::Owned(_))
    }

    /// Offset inside the owning real register (0 for a real register).
    pub fn offset(&self) -> usize {
        match self.binding {
            Binding::Owned(_) => 0,
            Binding::Aliased { offset, .. } => offset,
        }
    }

    /// The owned state, if this is a real register.
    pub fn state(&self) -> Option<&RegisterState> {
        match &self.binding {
            Binding::Owned(state) => Some(state),
            Binding::Aliased { .. } => None,
        }
    }

    pub(crate) fn state_mut(&mut self) -> Option<&mut RegisterState> {
        match &mut self.binding {
            Binding::Owned(state) => Some(state),
            Binding::Aliased { .. } => None,
        }
    }

    /// Joins two real registers into a new real register.
    ///
    /// `first` occupies the more significant bits: active states `s1`, `s2`
    /// map to `s1 * 2^size2 + s2` with amplitude `a1 * a2`.
    ///
    /// # Errors
    /// `InvalidArgument` if either operand is nominal, or if the joined width
    /// exceeds [`MAX_QUBITS`].
    pub fn tensor_product(first: &QubitRegister, second: &QubitRegister, new_name: &str) -> Result<QubitRegister> {
        let (Some(state1), Some(state2)) = (first.state(), second.state()) else {
            return Err(EmulatorError::invalid(format!(
                "tensor product requires two real registers, got '{}' and '{}'",
                first.name, second.name
            )));
        };
        let joined_size = first.qubit_count + second.qubit_count;
        Self::validate_shape(new_name, joined_size)?;

        let shift = second.qubit_count as u32;
        let mut joined = RegisterState::empty(joined_size);
        for (s1, a1) in state1.iter() {
            for (s2, a2) in state2.iter() {
                joined.set((s1 << shift) | s2, a1 * a2);
            }
        }
        Ok(Self {
            name: new_name.to_string(),
            qubit_count: joined_size,
            binding: Binding::Owned(joined),
        })
    }
}

impl fmt::Display for QubitRegister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.binding {
            Binding::Owned(state) => write!(f, "{}", state),
            Binding::Aliased { target, offset } => {
                write!(f, "{}[{}] -> {} @ {}", self.name, self.qubit_count, target, offset)
            }
        }
    }
}

/// Picks an outcome for `bit` from a uniform draw `sample` in `[0, 1)`.
///
/// The draw is scaled by the total mass, so rounding drift after earlier
/// collapses cannot select a branch with no weight.
pub(crate) fn sample_bit(state: &RegisterState, bit: usize, sample: f64) -> u8 {
    if sample * state.total_probability() < state.zero_probability(bit) { 0 } else { 1 }
}

/// Measures absolute bit `bit` of `state`, collapsing it onto the outcome.
///
/// Survivors are rescaled by `1/sqrt(retained mass)`. If the retained mass is
/// below `epsilon` the state is left untouched and `ArithmeticDegenerate` is
/// returned.
pub(crate) fn collapse_bit(state: &mut RegisterState, bit: usize, sample: f64, epsilon: f64) -> Result<u8> {
    let outcome = sample_bit(state, bit, sample);
    let keeps = |index: BasisIndex| ((index >> bit) & 1) as u8 == outcome;

    let retained: f64 = state
        .iter()
        .filter(|(index, _)| keeps(*index))
        .map(|(_, amp)| amp.norm_sqr())
        .sum();
    if retained < epsilon {
        return Err(EmulatorError::ArithmeticDegenerate {
            message: format!("retained probability {:e} for outcome {} of bit {} is below {:e}", retained, outcome, bit, epsilon),
        });
    }

    let scale = 1.0 / retained.sqrt();
    let survivors: Vec<_> = state.iter().filter(|(index, _)| keeps(*index)).collect();
    state.clear();
    for (index, amp) in survivors {
        state.set(index, amp * scale);
    }
    Ok(outcome)
}
