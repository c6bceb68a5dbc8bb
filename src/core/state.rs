// src/core/state.rs

use super::complex::{Amplitude, AmplitudeExt, ONE};
use super::store::{AmplitudeStore, BasisIndex};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// The superposition held by a real register: the set of populated basis
/// states plus their amplitudes.
///
/// Both halves are only mutated together, so an index is active exactly when
/// its stored amplitude is not an exact zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterState {
    /// Basis indices with a non-zero amplitude, ascending.
    active: BTreeSet<BasisIndex>,
    /// Sparse amplitude storage.
    amplitudes: AmplitudeStore,
    /// Width in qubits, used for rendering.
    qubit_count: usize,
}

impl RegisterState {
    /// The `|0...0>` state over `qubit_count` qubits.
    pub fn ground(qubit_count: usize) -> Self {
        let mut state = Self::empty(qubit_count);
        state.set(0, ONE);
        state
    }

    /// A state with no populated basis index.
    pub fn empty(qubit_count: usize) -> Self {
        Self {
            active: BTreeSet::new(),
            amplitudes: AmplitudeStore::new(),
            qubit_count,
        }
    }

    /// Builds a state from explicit `(index, amplitude)` entries. Later entries
    /// overwrite earlier ones; zero entries are skipped.
    pub fn from_entries<I>(qubit_count: usize, entries: I) -> Self
    where
        I: IntoIterator<Item = (BasisIndex, Amplitude)>,
    {
        let mut state = Self::empty(qubit_count);
        for (index, amp) in entries {
            state.set(index, amp);
        }
        state
    }

    /// Number of qubits this state spans.
    pub fn qubit_count(&self) -> usize {
        self.qubit_count
    }

    /// Amplitude of `index` (zero when inactive).
    pub fn amplitude(&self, index: BasisIndex) -> Amplitude {
        self.amplitudes.get(index)
    }

    /// Sets the amplitude of `index`, activating or deactivating it.
    pub fn set(&mut self, index: BasisIndex, amp: Amplitude) {
        if amp.is_exact_zero() {
            self.active.remove(&index);
        } else {
            self.active.insert(index);
        }
        self.amplitudes.set(index, amp);
    }

    /// Adds `amp` onto the amplitude of `index`. An exact cancellation
    /// deactivates the index.
    pub fn accumulate(&mut self, index: BasisIndex, amp: Amplitude) {
        let sum = self.amplitudes.get(index) + amp;
        self.set(index, sum);
    }

    /// Removes every basis state.
    pub fn clear(&mut self) {
        self.active.clear();
        self.amplitudes.clear();
    }

    /// Populated basis indices, ascending.
    pub fn active_states(&self) -> &BTreeSet<BasisIndex> {
        &self.active
    }

    /// Read access to the underlying store.
    pub fn amplitudes(&self) -> &AmplitudeStore {
        &self.amplitudes
    }

    /// Number of populated basis states.
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Returns `true` if no basis state is populated.
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// `(index, amplitude)` pairs for every active state, ascending.
    pub fn iter(&self) -> impl Iterator<Item = (BasisIndex, Amplitude)> + '_ {
        self.active.iter().map(|&index| (index, self.amplitudes.get(index)))
    }

    /// Owned copy of the state as an ordered map.
    pub fn to_map(&self) -> BTreeMap<BasisIndex, Amplitude> {
        self.iter().collect()
    }

    /// Sum of `|amplitude|^2` over active states.
    pub fn total_probability(&self) -> f64 {
        self.iter().map(|(_, amp)| amp.norm_sqr()).sum()
    }

    /// Probability that bit `bit` reads 0.
    pub fn zero_probability(&self, bit: usize) -> f64 {
        self.iter()
            .filter(|(index, _)| (index >> bit) & 1 == 0)
            .map(|(_, amp)| amp.norm_sqr())
            .sum()
    }
}

/// Formats `index` as a fixed-width binary string, most significant bit first.
pub fn basis_label(index: BasisIndex, width: usize) -> String {
    (0..width).rev().map(|bit| if (index >> bit) & 1 == 1 { '1' } else { '0' }).collect()
}

impl fmt::Display for RegisterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (index, amp)) in self.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "|{}>: {}", basis_label(index, self.qubit_count), amp.display())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::complex::ZERO;
    use num_complex::Complex;
    use std::f64::consts::FRAC_1_SQRT_2;

    #[test]
    fn test_ground_state() {
        let state = RegisterState::ground(3);
        assert_eq!(state.len(), 1);
        assert!(state.active_states().contains(&0));
        assert_eq!(state.amplitude(0), ONE);
        assert_eq!(state.to_string(), "|000>: 1.00 + 0.00i");
    }

    #[test]
    fn test_active_set_tracks_store() {
        let mut state = RegisterState::empty(2);
        state.set(2, Complex::new(0.6, 0.0));
        state.set(1, Complex::new(0.0, 0.8));
        assert_eq!(state.active_states().iter().copied().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(state.amplitudes().len(), 2);

        state.set(2, ZERO);
        assert_eq!(state.len(), 1);
        assert_eq!(state.amplitudes().len(), 1);
    }

    #[test]
    fn test_accumulate_cancellation_drops_index() {
        let mut state = RegisterState::empty(1);
        state.accumulate(1, Complex::new(FRAC_1_SQRT_2, 0.0));
        state.accumulate(1, Complex::new(-FRAC_1_SQRT_2, 0.0));
        assert!(state.is_empty());
    }

    #[test]
    fn test_zero_probability() {
        let half = Complex::new(0.5, 0.0);
        let state = RegisterState::from_entries(2, [(0, half), (1, half), (2, half), (3, half)]);
        assert!((state.zero_probability(0) - 0.5).abs() < 1e-12);
        assert!((state.total_probability() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_display_lists_states_in_order() {
        let state = RegisterState::from_entries(2, [(3, Complex::new(0.0, -FRAC_1_SQRT_2)), (0, Complex::new(FRAC_1_SQRT_2, 0.0))]);
        assert_eq!(state.to_string(), "|00>: 0.71 + 0.00i\n|11>: 0.00 - 0.71i");
    }

    #[test]
    fn test_basis_label_width() {
        assert_eq!(basis_label(5, 4), "0101");
        assert_eq!(basis_label(0, 1), "0");
        assert_eq!(basis_label(1, 0), "");
    }
}
