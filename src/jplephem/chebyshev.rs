//! Chebyshev polynomial functionality for ephemeris interpolation
//!
//! SPK types 2 and 3 store each coordinate of a body over one interval as a
//! Chebyshev series in a normalized time variable x in [-1, 1]. This module
//! evaluates such series and their derivatives without allocating.

use crate::jplephem::errors::{JplephemError, Result};

/// Chebyshev series view over a slice of coefficients
///
/// The coefficients are ordered from lowest to highest degree:
/// [c₀, c₁, c₂, ..., cₙ] where the series is
/// f(x) = c₀·T₀(x) + c₁·T₁(x) + c₂·T₂(x) + ... + cₙ·Tₙ(x)
#[derive(Debug, Clone, Copy)]
pub struct ChebyshevPolynomial<'a> {
    coefficients: &'a [f64],
}

impl<'a> ChebyshevPolynomial<'a> {
    pub fn new(coefficients: &'a [f64]) -> Self {
        Self { coefficients }
    }

    /// Evaluate the series at x using Clenshaw's recurrence
    pub fn evaluate(&self, x: f64) -> f64 {
        let Some((&c0, rest)) = self.coefficients.split_first() else {
            return 0.0;
        };

        let two_x = 2.0 * x;
        let mut b1 = 0.0;
        let mut b2 = 0.0;
        for &c in rest.iter().rev() {
            let b0 = c + two_x * b1 - b2;
            b2 = b1;
            b1 = b0;
        }
        c0 + x * b1 - b2
    }

    /// Derivative of the series with respect to x
    ///
    /// Carries T_k and T'_k forward together using
    /// T'_{k+1} = 2·T_k + 2x·T'_k − T'_{k-1}.
    pub fn derivative(&self, x: f64) -> f64 {
        if self.coefficients.len() < 2 {
            return 0.0;
        }

        let (mut t_prev, mut t) = (1.0, x);
        let (mut d_prev, mut d) = (0.0, 1.0);
        let mut sum = self.coefficients[1];

        for &c in &self.coefficients[2..] {
            let t_next = 2.0 * x * t - t_prev;
            let d_next = 2.0 * t + 2.0 * x * d - d_prev;
            t_prev = t;
            t = t_next;
            d_prev = d;
            d = d_next;
            sum += c * d;
        }
        sum
    }

    /// Get the degree of the polynomial
    pub fn degree(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }
}

/// Time normalization for Chebyshev polynomial evaluation
///
/// Maps `time` to [-1, 1] given the interval midpoint and radius (half-length).
/// Values a hair outside the interval caused by rounding are clamped.
pub fn normalize_time(time: f64, midpoint: f64, radius: f64) -> Result<f64> {
    if radius <= 0.0 {
        return Err(JplephemError::InvalidFormat(format!(
            "non-positive Chebyshev interval radius {radius}"
        )));
    }

    let normalized = (time - midpoint) / radius;
    if normalized.abs() > 1.0 + 1e-9 {
        return Err(JplephemError::InvalidFormat(format!(
            "time {time} falls outside record {midpoint}±{radius}"
        )));
    }

    Ok(normalized.clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_chebyshev_constant() {
        let coefficients = [5.0];
        let poly = ChebyshevPolynomial::new(&coefficients);

        assert_eq!(poly.evaluate(-1.0), 5.0);
        assert_eq!(poly.evaluate(0.0), 5.0);
        assert_eq!(poly.evaluate(1.0), 5.0);
        assert_eq!(poly.derivative(0.0), 0.0);
        assert_eq!(poly.degree(), 0);
    }

    #[test]
    fn test_chebyshev_linear() {
        // 3·T0 + 2·T1 = 3 + 2x
        let coefficients = [3.0, 2.0];
        let poly = ChebyshevPolynomial::new(&coefficients);

        assert_eq!(poly.evaluate(-1.0), 1.0);
        assert_eq!(poly.evaluate(0.0), 3.0);
        assert_eq!(poly.evaluate(1.0), 5.0);
        assert_eq!(poly.derivative(0.3), 2.0);
    }

    #[test]
    fn test_chebyshev_matches_explicit_polynomials() {
        // T2 = 2x² − 1, T3 = 4x³ − 3x
        let coefficients = [1.0, -0.5, 0.25, 2.0];
        let poly = ChebyshevPolynomial::new(&coefficients);

        for &x in &[-1.0, -0.4, 0.0, 0.35, 0.9, 1.0] {
            let t2 = 2.0 * x * x - 1.0;
            let t3 = 4.0 * x * x * x - 3.0 * x;
            let expected = 1.0 - 0.5 * x + 0.25 * t2 + 2.0 * t3;
            assert_relative_eq!(poly.evaluate(x), expected, epsilon = 1e-12);

            let d_expected = -0.5 + 0.25 * 4.0 * x + 2.0 * (12.0 * x * x - 3.0);
            assert_relative_eq!(poly.derivative(x), d_expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_normalize_time() {
        assert_relative_eq!(normalize_time(15.0, 10.0, 5.0).unwrap(), 1.0);
        assert_relative_eq!(normalize_time(7.5, 10.0, 5.0).unwrap(), -0.5);
        assert!(normalize_time(16.0, 10.0, 5.0).is_err());
        assert!(normalize_time(10.0, 10.0, 0.0).is_err());
    }
}
