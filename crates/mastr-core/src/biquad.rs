//! Biquad (bi-quadratic) filter structure.
//!
//! Provides the generic second-order recursive filter that every designer in
//! [`design`](crate::design) configures. The structure carries a wet/dry pair
//! on top of the usual five coefficients so additive shelf responses can be
//! built from a band-limited section.

use crate::math::flush_denormal;

/// Coefficients for one [`Biquad`] section.
///
/// `a*` weight the current and past inputs, `b*` weight past outputs.
/// `c0` scales the filtered ("wet") signal and `d0` the original ("dry")
/// signal when the section output is mixed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coefficients {
    /// Feed-forward weight of `x[n]`.
    pub a0: f64,
    /// Feed-forward weight of `x[n-1]`.
    pub a1: f64,
    /// Feed-forward weight of `x[n-2]`.
    pub a2: f64,
    /// Feedback weight of `y[n-1]`.
    pub b1: f64,
    /// Feedback weight of `y[n-2]`.
    pub b2: f64,
    /// Wet gain.
    pub c0: f64,
    /// Dry gain.
    pub d0: f64,
}

impl Coefficients {
    /// Passthrough: `y[n] = x[n]`, fully wet.
    pub const IDENTITY: Self = Self {
        a0: 1.0,
        a1: 0.0,
        a2: 0.0,
        b1: 0.0,
        b2: 0.0,
        c0: 1.0,
        d0: 0.0,
    };

    /// True when every coefficient is finite.
    pub fn is_finite(&self) -> bool {
        [self.a0, self.a1, self.a2, self.b1, self.b2, self.c0, self.d0]
            .iter()
            .all(|c| c.is_finite())
    }

    /// True when both poles lie strictly inside the unit circle
    /// (`|b2| < 1` and `|b1| < 1 + b2`).
    pub fn is_stable(&self) -> bool {
        self.b2.abs() < 1.0 && self.b1.abs() < 1.0 + self.b2
    }
}

impl Default for Coefficients {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Generic biquad filter coefficients and state.
///
/// Implements the Direct Form I difference equation:
/// ```text
/// y[n] = a0*x[n] + a1*x[n-1] + a2*x[n-2]
///                - b1*y[n-1] - b2*y[n-2]
/// ```
///
/// History is owned by one instance and never shared across channels.
///
/// # Example
///
/// ```rust
/// use mastr_core::{Biquad, Coefficients};
///
/// let mut bq = Biquad::new(Coefficients { a0: 0.5, ..Coefficients::IDENTITY });
/// assert_eq!(bq.process(1.0), 0.5);
/// ```
#[derive(Debug, Clone)]
pub struct Biquad {
    coeffs: Coefficients,

    /// Input history: x[n-1], x[n-2]
    x1: f64,
    x2: f64,

    /// Output history: y[n-1], y[n-2]
    y1: f64,
    y2: f64,
}

impl Biquad {
    /// Creates a biquad with the given coefficients and zeroed history.
    pub fn new(coeffs: Coefficients) -> Self {
        Self {
            coeffs,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    /// Replaces the coefficients, keeping history.
    pub fn set_coefficients(&mut self, coeffs: Coefficients) {
        self.coeffs = coeffs;
    }

    /// Current coefficients.
    pub fn coefficients(&self) -> &Coefficients {
        &self.coeffs
    }

    /// Runs the difference equation for one sample and shifts history.
    ///
    /// Outputs with `0 < |y| < FLT_MIN` are stored and returned as exactly zero.
    #[inline]
    pub fn process(&mut self, input: f64) -> f64 {
        let c = &self.coeffs;
        let output = flush_denormal(
            c.a0 * input + c.a1 * self.x1 + c.a2 * self.x2 - c.b1 * self.y1 - c.b2 * self.y2,
        );

        self.y2 = self.y1;
        self.y1 = output;
        self.x2 = self.x1;
        self.x1 = input;

        output
    }

    /// Runs [`process`](Self::process) and applies the wet/dry mix:
    /// `y·c0 + x·d0`.
    #[inline]
    pub fn process_mixed(&mut self, input: f64) -> f64 {
        let wet = self.process(input);
        wet * self.coeffs.c0 + input * self.coeffs.d0
    }

    /// Zeroes the four history cells without touching coefficients.
    pub fn flush(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }
}

impl Default for Biquad {
    fn default() -> Self {
        Self::new(Coefficients::IDENTITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::FLT_MIN;

    fn sample_coeffs() -> Coefficients {
        Coefficients {
            a0: 0.2,
            a1: 0.3,
            a2: 0.1,
            b1: -0.5,
            b2: 0.25,
            c0: 1.0,
            d0: 0.0,
        }
    }

    #[test]
    fn test_biquad_passthrough() {
        let mut biquad = Biquad::default();

        for i in 0..10 {
            let input = f64::from(i) * 0.1;
            assert_eq!(biquad.process(input), input);
        }
    }

    #[test]
    fn test_impulse_response_matches_difference_equation() {
        let c = sample_coeffs();
        let mut biquad = Biquad::new(c);

        let y0 = biquad.process(1.0);
        let y1 = biquad.process(0.0);
        let y2 = biquad.process(0.0);
        let y3 = biquad.process(0.0);

        let e0 = c.a0;
        let e1 = c.a1 - c.b1 * e0;
        let e2 = c.a2 - c.b1 * e1 - c.b2 * e0;
        let e3 = -c.b1 * e2 - c.b2 * e1;

        assert_eq!(y0, e0);
        assert_eq!(y1, e1);
        assert_eq!(y2, e2);
        assert_eq!(y3, e3);
    }

    #[test]
    fn test_biquad_flush() {
        let mut biquad = Biquad::new(sample_coeffs());

        for _ in 0..10 {
            biquad.process(1.0);
        }

        biquad.flush();

        assert_eq!(biquad.x1, 0.0);
        assert_eq!(biquad.x2, 0.0);
        assert_eq!(biquad.y1, 0.0);
        assert_eq!(biquad.y2, 0.0);
        assert_eq!(*biquad.coefficients(), sample_coeffs());
    }

    #[test]
    fn test_flush_restarts_identically() {
        let mut biquad = Biquad::new(sample_coeffs());
        let first: [f64; 4] = core::array::from_fn(|i| biquad.process(if i == 0 { 1.0 } else { 0.0 }));
        biquad.flush();
        let second: [f64; 4] = core::array::from_fn(|i| biquad.process(if i == 0 { 1.0 } else { 0.0 }));
        assert_eq!(first, second);
    }

    #[test]
    fn test_denormal_output_is_zeroed() {
        let mut biquad = Biquad::new(Coefficients {
            a0: 1e-20,
            ..Coefficients::IDENTITY
        });

        // 1e-20 * 1e-20 = 1e-40, below FLT_MIN
        let out = biquad.process(1e-20);
        assert_eq!(out, 0.0);
        assert_eq!(biquad.y1, 0.0);

        let out = biquad.process(-1e-20);
        assert_eq!(out, 0.0);

        // Exactly FLT_MIN survives
        let mut unity = Biquad::default();
        assert_eq!(unity.process(FLT_MIN), FLT_MIN);
    }

    #[test]
    fn test_wet_dry_mix() {
        let mut shelf = Biquad::new(Coefficients {
            a0: 0.5,
            c0: 2.0,
            d0: 1.0,
            ..Coefficients::IDENTITY
        });

        // wet = 0.5, out = 0.5*2 + 1*1
        assert_eq!(shelf.process_mixed(1.0), 2.0);
    }

    #[test]
    fn test_coefficients_is_finite() {
        assert!(Coefficients::IDENTITY.is_finite());
        let bad = Coefficients {
            b1: f64::NAN,
            ..Coefficients::IDENTITY
        };
        assert!(!bad.is_finite());
    }

    #[test]
    fn test_coefficients_is_stable() {
        assert!(Coefficients::IDENTITY.is_stable());
        assert!(sample_coeffs().is_stable());
        let ringing = Coefficients {
            b1: -2.01,
            b2: 0.999,
            ..Coefficients::IDENTITY
        };
        assert!(!ringing.is_stable());
    }
}
