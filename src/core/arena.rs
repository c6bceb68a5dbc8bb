// src/core/arena.rs

//! Indirection table that owns every register and resolves nominal views to
//! the real register holding their amplitudes.

use super::error::{EmulatorError, Result};
use super::register::{collapse_bit, sample_bit, Binding, QubitRegister, RegisterId};
use super::state::RegisterState;
use serde::{Deserialize, Serialize};

/// Slot storage for registers, addressed by [`RegisterId`].
///
/// Slots are never reused, so a stale id resolves to an error instead of to a
/// different register. An aliased register always targets an owned one.
///
/// Removed slots stay as `None`, so the table grows with every register
/// creation and merge for the life of the arena. Growth is bounded by the
/// number of commands run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegisterArena {
    slots: Vec<Option<QubitRegister>>,
}

impl RegisterArena {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> RegisterId {
        RegisterId(self.slots.len() as u64)
    }

    fn slot(&self, id: RegisterId) -> Option<&QubitRegister> {
        self.slots.get(id.0 as usize).and_then(Option::as_ref)
    }

    fn slot_mut(&mut self, id: RegisterId) -> Option<&mut QubitRegister> {
        self.slots.get_mut(id.0 as usize).and_then(Option::as_mut)
    }

    /// Stores a real register and returns its id.
    pub fn insert_real(&mut self, register: QubitRegister) -> Result<RegisterId> {
        if !register.is_real() {
            return Err(EmulatorError::invalid(format!("'{}' is not a real register", register.name())));
        }
        let id = self.next_id();
        self.slots.push(Some(register));
        Ok(id)
    }

    /// Creates a nominal register viewing `[offset, offset + size)` of `real`.
    ///
    /// # Errors
    /// `InvalidArgument` if `real` is not a live real register or the window
    /// does not fit inside it.
    pub fn insert_nominal(&mut self, name: &str, size: usize, real: RegisterId, offset: usize) -> Result<RegisterId> {
        let register = self.nominal_for(name, size, real, offset)?;
        let id = self.next_id();
        self.slots.push(Some(register));
        Ok(id)
    }

    fn nominal_for(&self, name: &str, size: usize, real: RegisterId, offset: usize) -> Result<QubitRegister> {
        let target = self
            .slot(real)
            .filter(|reg| reg.is_real())
            .ok_or_else(|| EmulatorError::invalid(format!("nominal register '{}' needs a real register, {} is not one", name, real)))?;
        QubitRegister::nominal(name, size, real, target.size(), offset)
    }

    /// Points the nominal register `id` at a new real register and offset.
    pub(crate) fn rebind(&mut self, id: RegisterId, real: RegisterId, offset: usize) -> Result<()> {
        let current = self.get(id)?;
        if current.is_real() {
            return Err(EmulatorError::invalid(format!("cannot rebind real register '{}'", current.name())));
        }
        let replacement = self.nominal_for(current.name(), current.size(), real, offset)?;
        if let Some(slot) = self.slot_mut(id) {
            *slot = replacement;
        }
        Ok(())
    }

    /// Removes a register, returning it.
    pub fn remove(&mut self, id: RegisterId) -> Option<QubitRegister> {
        self.slots.get_mut(id.0 as usize).and_then(Option::take)
    }

    /// Looks up a register.
    pub fn get(&self, id: RegisterId) -> Result<&QubitRegister> {
        self.slot(id).ok_or_else(|| EmulatorError::unknown_register(id.to_string()))
    }

    /// Resolves any register to `(real register id, offset inside it)`.
    pub fn resolve(&self, id: RegisterId) -> Result<(RegisterId, usize)> {
        match self.get(id)?.binding() {
            Binding::Owned(_) => Ok((id, 0)),
            Binding::Aliased { target, offset } => Ok((*target, *offset)),
        }
    }

    /// The state seen through register `id`, always the owning real register's.
    pub fn state(&self, id: RegisterId) -> Result<&RegisterState> {
        let (real, _) = self.resolve(id)?;
        self.get(real)?
            .state()
            .ok_or_else(|| EmulatorError::invalid(format!("{} does not own a state", real)))
    }

    /// Mutable access to the state behind register `id`.
    pub fn state_mut(&mut self, id: RegisterId) -> Result<&mut RegisterState> {
        let (real, _) = self.resolve(id)?;
        self.slot_mut(real)
            .and_then(QubitRegister::state_mut)
            .ok_or_else(|| EmulatorError::invalid(format!("{} does not own a state", real)))
    }

    fn absolute_bit(&self, id: RegisterId, index: usize) -> Result<usize> {
        let register = self.get(id)?;
        if index >= register.size() {
            return Err(EmulatorError::IndexOutOfBounds {
                register: register.name().to_string(),
                index,
                size: register.size(),
            });
        }
        Ok(register.offset() + index)
    }

    /// Measures qubit `index` of register `id`, collapsing the shared state.
    ///
    /// `sample` is a uniform draw in `[0, 1)`; outcome 0 is chosen when it is
    /// below `P(0)`.
    pub fn measure_qubit(&mut self, id: RegisterId, index: usize, sample: f64, epsilon: f64) -> Result<u8> {
        let bit = self.absolute_bit(id, index)?;
        collapse_bit(self.state_mut(id)?, bit, sample, epsilon)
    }

    /// Draws an outcome for qubit `index` of register `id` without collapsing.
    pub fn sample_qubit(&self, id: RegisterId, index: usize, sample: f64) -> Result<u8> {
        let bit = self.absolute_bit(id, index)?;
        Ok(sample_bit(self.state(id)?, bit, sample))
    }

    /// Number of live registers.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Returns `true` if no register is live.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
