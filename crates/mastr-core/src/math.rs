//! Small numeric helpers shared by every processor.
//!
//! # Level Conversions
//!
//! - [`db_to_linear`] / [`linear_to_db`] - Convert between dB and linear gain
//!
//! # Utilities
//!
//! - [`flush_denormal`] - Snap sub-`FLT_MIN` residues to exactly zero
//! - [`lerp_between`] - Two-point (degree-1 Lagrange) interpolation

use libm::{log10, pow};

/// Smallest positive normal single-precision float.
///
/// Recursive state below this magnitude is flushed to zero. The threshold is the
/// single-precision one even though processing runs in `f64`, so residues are
/// cleared long before they would reach the double-precision subnormal range.
pub const FLT_MIN: f64 = 1.175494351e-38;

/// Convert decibels to linear gain: `10^(db/20)`.
///
/// # Example
/// ```rust
/// use mastr_core::db_to_linear;
///
/// assert!((db_to_linear(0.0) - 1.0).abs() < 1e-12);
/// assert!((db_to_linear(-6.0206) - 0.5).abs() < 1e-4);
/// ```
#[inline]
pub fn db_to_linear(db: f64) -> f64 {
    pow(10.0, db / 20.0)
}

/// Convert linear gain to decibels: `20·log10(linear)`.
///
/// Non-positive input yields `-inf`; callers that need a floor apply it
/// themselves (see [`EnvelopeDetector`](crate::EnvelopeDetector)).
#[inline]
pub fn linear_to_db(linear: f64) -> f64 {
    20.0 * log10(linear)
}

/// Replace values with `0 < |x| < FLT_MIN` by exactly `0.0`.
///
/// # Example
/// ```rust
/// use mastr_core::flush_denormal;
///
/// assert_eq!(flush_denormal(1e-40), 0.0);
/// assert_eq!(flush_denormal(-1e-40), 0.0);
/// assert_eq!(flush_denormal(0.5), 0.5);
/// ```
#[inline]
pub fn flush_denormal(x: f64) -> f64 {
    if x != 0.0 && x.abs() < FLT_MIN { 0.0 } else { x }
}

/// Evaluate the straight line through `(x0, y0)` and `(x1, y1)` at `x`.
///
/// This is the two-point Lagrange form
/// `y0·(x − x1)/(x0 − x1) + y1·(x − x0)/(x1 − x0)`. Coincident abscissae
/// return `y0`.
#[inline]
pub fn lerp_between(x0: f64, y0: f64, x1: f64, y1: f64, x: f64) -> f64 {
    let span = x1 - x0;
    if span == 0.0 {
        return y0;
    }
    y0 * (x - x1) / (x0 - x1) + y1 * (x - x0) / span
}
