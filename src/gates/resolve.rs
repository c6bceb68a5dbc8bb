// src/gates/resolve.rs

use super::Gate;
use crate::core::error::{EmulatorError, Result};
use std::collections::BTreeSet;

/// Builds a [`Gate`] from its name and absolute target bits.
///
/// A leading `C` wraps the rest of the name in a [`Gate::Controlled`] whose
/// control is the first target, so `CNOT`, `CCX` and `CSWAP` all resolve.
/// `INC`/`DEC` act on the whole register and ignore their targets apart from
/// the bounds check. They have no controlled form.
///
/// # Errors
/// `UnknownGate` for an unrecognised name. `InvalidArgument` for a wrong
/// number of targets, a missing phase, a repeated target, a target at or
/// beyond `register_size`, or a controlled `INC`/`DEC`.
pub fn resolve(name: &str, phase: Option<f64>, targets: &[usize], register_size: usize) -> Result<Gate> {
    if let Some(&bit) = targets.iter().find(|&&bit| bit >= register_size) {
        return Err(EmulatorError::invalid(format!(
            "gate {} targets bit {} of a {}-qubit register",
            name, bit, register_size
        )));
    }
    let mut seen = BTreeSet::new();
    if let Some(&bit) = targets.iter().find(|&&bit| !seen.insert(bit)) {
        return Err(EmulatorError::invalid(format!("gate {} uses bit {} more than once", name, bit)));
    }
    resolve_named(name, phase, targets, register_size)
}

fn resolve_named(name: &str, phase: Option<f64>, targets: &[usize], register_size: usize) -> Result<Gate> {
    let single = || match targets {
        [target] => Ok(*target),
        _ => Err(arity(name, 1, targets.len())),
    };
    match name {
        "X" | "NOT" => Ok(Gate::X { target: single()? }),
        "Y" => Ok(Gate::Y { target: single()? }),
        "Z" => Ok(Gate::Z { target: single()? }),
        "H" => Ok(Gate::H { target: single()? }),
        "S" => Ok(Gate::S { target: single()? }),
        "T" => Ok(Gate::T { target: single()? }),
        "P" => {
            let phase = phase.ok_or_else(|| EmulatorError::invalid("gate P requires a phase"))?;
            Ok(Gate::Phase { target: single()?, phase })
        }
        "SWAP" => match targets {
            [first, second] => Ok(Gate::Swap { first: *first, second: *second }),
            _ => Err(arity(name, 2, targets.len())),
        },
        "INC" => Ok(Gate::Increment { qubit_count: register_size }),
        "DEC" => Ok(Gate::Decrement { qubit_count: register_size }),
        _ => match name.strip_prefix('C') {
            Some(inner) if !inner.is_empty() => {
                // The control bit belongs to the register INC/DEC shift.
                if matches!(inner.trim_start_matches('C'), "INC" | "DEC") {
                    return Err(EmulatorError::invalid(format!("{} cannot be controlled", inner.trim_start_matches('C'))));
                }
                let (&control, rest) = targets.split_first().ok_or_else(|| {
                    EmulatorError::invalid(format!("controlled gate {} needs a control target", name))
                })?;
                if rest.is_empty() {
                    return Err(EmulatorError::invalid(format!("controlled gate {} needs a target after the control", name)));
                }
                let inner = resolve_named(inner, phase, rest, register_size)?;
                Ok(Gate::Controlled { control, inner: Box::new(inner) })
            }
            _ => Err(EmulatorError::UnknownGate { name: name.to_string() }),
        },
    }
}

fn arity(name: &str, expected: usize, got: usize) -> EmulatorError {
    EmulatorError::invalid(format!("gate {} takes {} target(s), got {}", name, expected, got))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_basic_names() -> Result<()> {
        assert_eq!(resolve("X", None, &[2], 3)?, Gate::X { target: 2 });
        assert_eq!(resolve("NOT", None, &[0], 1)?, Gate::X { target: 0 });
        assert_eq!(resolve("H", None, &[1], 2)?, Gate::H { target: 1 });
        assert_eq!(resolve("P", Some(0.5), &[0], 1)?, Gate::Phase { target: 0, phase: 0.5 });
        assert_eq!(resolve("SWAP", None, &[0, 2], 3)?, Gate::Swap { first: 0, second: 2 });
        assert_eq!(resolve("INC", None, &[0], 4)?, Gate::Increment { qubit_count: 4 });
        Ok(())
    }

    #[test]
    fn test_resolve_controlled_prefix() -> Result<()> {
        assert_eq!(
            resolve("CNOT", None, &[0, 1], 2)?,
            Gate::Controlled { control: 0, inner: Box::new(Gate::X { target: 1 }) }
        );
        let toffoli = resolve("CCX", None, &[2, 0, 1], 3)?;
        assert_eq!(
            toffoli,
            Gate::Controlled {
                control: 2,
                inner: Box::new(Gate::Controlled { control: 0, inner: Box::new(Gate::X { target: 1 }) }),
            }
        );
        assert!(matches!(resolve("CSWAP", None, &[0, 1, 2], 3)?, Gate::Controlled { control: 0, .. }));
        assert!(matches!(resolve("CP", Some(1.0), &[1, 0], 2)?, Gate::Controlled { control: 1, .. }));
        Ok(())
    }

    #[test]
    fn test_resolve_unknown_names() {
        assert!(matches!(resolve("Q", None, &[0], 1), Err(EmulatorError::UnknownGate { .. })));
        assert!(matches!(resolve("x", None, &[0], 1), Err(EmulatorError::UnknownGate { .. })));
        assert!(matches!(resolve("C", None, &[0], 1), Err(EmulatorError::UnknownGate { .. })));
        assert!(matches!(resolve("CQ", None, &[0, 1], 2), Err(EmulatorError::UnknownGate { .. })));
    }

    #[test]
    fn test_resolve_invalid_arguments() {
        let invalid = |result: Result<Gate>| matches!(result, Err(EmulatorError::InvalidArgument { .. }));
        assert!(invalid(resolve("X", None, &[0, 1], 2)));
        assert!(invalid(resolve("SWAP", None, &[0], 2)));
        assert!(invalid(resolve("P", None, &[0], 1)));
        assert!(invalid(resolve("CNOT", None, &[0], 1)));
        assert!(invalid(resolve("CNOT", None, &[1, 1], 2)));
        assert!(invalid(resolve("SWAP", None, &[0, 3], 3)));
    }

    #[test]
    fn test_increment_has_no_controlled_form() {
        let invalid = |result: Result<Gate>| matches!(result, Err(EmulatorError::InvalidArgument { .. }));
        assert!(invalid(resolve("CINC", None, &[0], 2)));
        assert!(invalid(resolve("CDEC", None, &[1], 2)));
        assert!(invalid(resolve("CCINC", None, &[0, 1], 3)));
        assert!(invalid(resolve("CDEC", None, &[0, 1], 2)));
    }
}
