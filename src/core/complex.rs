// src/core/complex.rs

//! Amplitude arithmetic on top of `num_complex::Complex<f64>`.

use super::constants::emulator_constants::AMPLITUDE_EPSILON;
use num_complex::Complex;
use num_traits::Zero;
use std::fmt;

/// A basis-state amplitude.
pub type Amplitude = Complex<f64>;

/// The additive identity amplitude.
pub const ZERO: Amplitude = Complex::new(0.0, 0.0);
/// The multiplicative identity amplitude.
pub const ONE: Amplitude = Complex::new(1.0, 0.0);
/// The imaginary unit.
pub const I: Amplitude = Complex::new(0.0, 1.0);

/// Helpers the emulator needs beyond the `num-complex` operators.
pub trait AmplitudeExt {
    /// Component-wise equality within [`AMPLITUDE_EPSILON`].
    fn approx_eq(&self, other: &Amplitude) -> bool;
    /// True only for an exact `0 + 0i`. Used for sparsity decisions.
    fn is_exact_zero(&self) -> bool;
    /// Renders the amplitude as `re ± |im|i` with two decimals.
    fn display(&self) -> AmplitudeDisplay;
}

impl AmplitudeExt for Amplitude {
    fn approx_eq(&self, other: &Amplitude) -> bool {
        (self.re - other.re).abs() < AMPLITUDE_EPSILON && (self.im - other.im).abs() < AMPLITUDE_EPSILON
    }

    fn is_exact_zero(&self) -> bool {
        self.is_zero()
    }

    fn display(&self) -> AmplitudeDisplay {
        AmplitudeDisplay(*self)
    }
}

/// `e^(i·phase)`
pub fn exp_i(phase: f64) -> Amplitude {
    Complex::new(phase.cos(), phase.sin())
}

/// Display adapter returned by [`AmplitudeExt::display`].
pub struct AmplitudeDisplay(Amplitude);

impl fmt::Display for AmplitudeDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0.im.is_sign_negative() && self.0.im != 0.0 { '-' } else { '+' };
        write!(f, "{:.2} {} {:.2}i", self.0.re, sign, self.0.im.abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_1_SQRT_2, PI};

    #[test]
    fn test_approx_eq_tolerance() {
        let a = Complex::new(0.5, -0.25);
        assert!(a.approx_eq(&Complex::new(0.5 + 1e-12, -0.25)));
        assert!(!a.approx_eq(&Complex::new(0.5 + 1e-6, -0.25)));
    }

    #[test]
    fn test_exact_zero_is_strict() {
        assert!(ZERO.is_exact_zero());
        assert!(!Complex::new(1e-300, 0.0).is_exact_zero());
    }

    #[test]
    fn test_exp_i_quarter_turn() {
        assert!(exp_i(PI / 2.0).approx_eq(&I));
        assert!(exp_i(PI / 4.0).approx_eq(&Complex::new(FRAC_1_SQRT_2, FRAC_1_SQRT_2)));
    }

    #[test]
    fn test_display_format() {
        assert_eq!(ONE.display().to_string(), "1.00 + 0.00i");
        assert_eq!(Complex::new(-0.5, -0.707).display().to_string(), "-0.50 - 0.71i");
        assert_eq!(Complex::new(0.0, -0.0).display().to_string(), "0.00 + 0.00i");
    }
}
