//! Designed filters ready to drop into a processing chain.

use crate::biquad::{Biquad, Coefficients};
use crate::design;
use crate::effect::Effect;
use crate::error::DspError;

/// Which response to design, with its parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterSpec {
    /// 2-pole Butterworth high-pass.
    HighPass {
        /// Cutoff in Hz.
        freq: f64,
    },
    /// 2-pole Butterworth low-pass.
    LowPass {
        /// Cutoff in Hz.
        freq: f64,
    },
    /// Notch around `freq`.
    BandStop {
        /// Center in Hz.
        freq: f64,
        /// Quality factor.
        q: f64,
    },
    /// Constant-Q peaking EQ.
    Parametric {
        /// Center in Hz.
        freq: f64,
        /// Boost (positive) or cut (negative) in dB.
        gain_db: f64,
        /// Quality factor.
        q: f64,
    },
    /// First-order low shelf realized as a wet/dry mix.
    LowShelf {
        /// Shelf frequency in Hz.
        freq: f64,
        /// Shelf gain in dB.
        gain_db: f64,
    },
}

impl FilterSpec {
    /// Compute coefficients at `sample_rate`.
    pub fn design(&self, sample_rate: f64) -> Result<Coefficients, DspError> {
        match *self {
            Self::HighPass { freq } => design::high_pass(sample_rate, freq),
            Self::LowPass { freq } => design::low_pass(sample_rate, freq),
            Self::BandStop { freq, q } => design::band_stop(sample_rate, freq, q),
            Self::Parametric { freq, gain_db, q } => {
                design::parametric(sample_rate, freq, gain_db, q)
            }
            Self::LowShelf { freq, gain_db } => design::low_shelf(sample_rate, freq, gain_db),
        }
    }

    /// Short display name, used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::HighPass { .. } => "high-pass",
            Self::LowPass { .. } => "low-pass",
            Self::BandStop { .. } => "band-stop",
            Self::Parametric { .. } => "parametric",
            Self::LowShelf { .. } => "low-shelf",
        }
    }
}

/// A [`Biquad`] configured from a [`FilterSpec`], applying the wet/dry mix
/// on every sample.
#[derive(Debug, Clone)]
pub struct Filter {
    spec: FilterSpec,
    sample_rate: f64,
    biquad: Biquad,
}

impl Filter {
    /// Design `spec` at `sample_rate`. Fails on out-of-range parameters.
    pub fn new(spec: FilterSpec, sample_rate: f64) -> Result<Self, DspError> {
        let coeffs = spec.design(sample_rate)?;
        Ok(Self {
            spec,
            sample_rate,
            biquad: Biquad::new(coeffs),
        })
    }

    /// The response this filter was designed for.
    pub fn spec(&self) -> &FilterSpec {
        &self.spec
    }

    /// Sample rate the coefficients were computed at.
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// The designed coefficients.
    pub fn coefficients(&self) -> &Coefficients {
        self.biquad.coefficients()
    }
}

impl Effect for Filter {
    #[inline]
    fn process(&mut self, input: f64) -> f64 {
        self.biquad.process_mixed(input)
    }

    fn reset(&mut self) {
        self.biquad.flush();
    }
}
