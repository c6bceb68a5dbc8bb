// src/validation/mod.rs

//! Provides functions to validate a `RegisterState`.

use crate::core::constants::emulator_constants::AMPLITUDE_EPSILON;
use crate::core::store::BasisIndex;
use crate::core::{AmplitudeExt, EmulatorError, RegisterState};
use std::collections::BTreeMap;

/// Sum of squared amplitude magnitudes over the active states.
pub fn total_probability(state: &RegisterState) -> f64 {
    state.total_probability()
}

/// Probability of each active basis state.
pub fn probabilities(state: &RegisterState) -> BTreeMap<BasisIndex, f64> {
    state.iter().map(|(index, amp)| (index, amp.norm_sqr())).collect()
}

/// Checks if the state is normalized (sum of squared amplitudes ≈ 1.0).
///
/// # Arguments
/// * `state` - The `RegisterState` to check.
/// * `tolerance` - Allowed deviation from 1.0. Defaults to `AMPLITUDE_EPSILON`.
///
/// # Returns
/// * `Ok(())` if normalized within tolerance.
/// * `Err(EmulatorError::ArithmeticDegenerate)` otherwise.
pub fn check_normalization(state: &RegisterState, tolerance: Option<f64>) -> Result<(), EmulatorError> {
    let effective_tolerance = tolerance.unwrap_or(AMPLITUDE_EPSILON);
    let norm_sq = total_probability(state);
    if (norm_sq - 1.0).abs() > effective_tolerance {
        Err(EmulatorError::ArithmeticDegenerate {
            message: format!("State normalization failed. Sum(|c_i|^2) = {} (Deviation > {})", norm_sq, effective_tolerance),
        })
    } else {
        Ok(())
    }
}

/// Checks that the active set and the amplitude store describe the same
/// states: every active index has a non-zero stored amplitude and the store
/// holds nothing else.
pub fn check_consistency(state: &RegisterState) -> Result<(), EmulatorError> {
    let stored = state.amplitudes().len();
    if stored != state.len() {
        return Err(EmulatorError::ArithmeticDegenerate {
            message: format!("{} active states but {} stored amplitudes", state.len(), stored),
        });
    }
    if let Some(index) = state.active_states().iter().find(|&&index| state.amplitudes().get(index).is_exact_zero()) {
        return Err(EmulatorError::ArithmeticDegenerate {
            message: format!("active state {} has no stored amplitude", index),
        });
    }
    Ok(())
}

/// Runs every check with default tolerances.
pub fn validate_state(state: &RegisterState) -> Result<(), EmulatorError> {
    check_consistency(state)?;
    check_normalization(state, None)
}
