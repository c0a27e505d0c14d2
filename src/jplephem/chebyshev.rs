//! Chebyshev polynomial functionality for ephemeris interpolation
//!
//! SPK types 2 and 3 store each coordinate as a Chebyshev series over a fixed
//! time window. Evaluation uses the Clenshaw recurrence, which produces the
//! value and its derivative in a single backward pass.

/// Chebyshev series of the first kind
///
/// The coefficients are ordered from lowest to highest degree:
/// f(x) = c₀·T₀(x) + c₁·T₁(x) + ... + cₙ·Tₙ(x)
#[derive(Debug, Clone, Copy)]
pub struct ChebyshevPolynomial<'a> {
    coefficients: &'a [f64],
}

impl<'a> ChebyshevPolynomial<'a> {
    /// Wrap a coefficient slice borrowed from segment data
    pub fn new(coefficients: &'a [f64]) -> Self {
        Self { coefficients }
    }

    /// Evaluate the series at x in [-1, 1]
    pub fn evaluate(&self, x: f64) -> f64 {
        self.evaluate_with_derivative(x).0
    }

    /// Evaluate the series and its derivative with respect to x
    pub fn evaluate_with_derivative(&self, x: f64) -> (f64, f64) {
        let n = self.coefficients.len();
        match n {
            0 => return (0.0, 0.0),
            1 => return (self.coefficients[0], 0.0),
            _ => {}
        }

        // b_k = c_k + 2x b_{k+1} - b_{k+2}
        // d_k = 2 b_{k+1} + 2x d_{k+1} - d_{k+2}
        let two_x = 2.0 * x;
        let (mut b1, mut b2) = (0.0, 0.0);
        let (mut d1, mut d2) = (0.0, 0.0);
        for &c in self.coefficients[1..].iter().rev() {
            let b0 = c + two_x * b1 - b2;
            let d0 = 2.0 * b1 + two_x * d1 - d2;
            b2 = b1;
            b1 = b0;
            d2 = d1;
            d1 = d0;
        }

        let value = self.coefficients[0] + x * b1 - b2;
        let derivative = b1 + x * d1 - d2;
        (value, derivative)
    }

    /// Get the degree of the polynomial
    pub fn degree(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }
}

/// Map a time onto the [-1, 1] interval of a record
pub fn normalize_time(time: f64, midpoint: f64, radius: f64) -> f64 {
    (time - midpoint) / radius
}
