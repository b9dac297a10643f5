//! Config validation.
//!
//! Checks everything that can be decided without knowing the input file:
//! positive frequencies and Q, sane compressor settings, a supported bit
//! depth. Nyquist limits depend on each file's sample rate and are enforced
//! when the chain is built.
//!
//! # Example
//!
//! ```rust
//! use mastr_config::{MasteringConfig, validate_config};
//!
//! let config = MasteringConfig::from_toml("[hpf]\nfreq = 40.0\n").unwrap();
//! validate_config(&config).expect("valid config");
//!
//! let config = MasteringConfig::from_toml("[hpf]\nfreq = -1.0\n").unwrap();
//! assert!(validate_config(&config).is_err());
//! ```

use thiserror::Error;

use mastr_core::LOOKAHEAD_CAPACITY_SECS;

use crate::config::MasteringConfig;

/// Bit depths the writer supports.
pub const SUPPORTED_BIT_DEPTHS: [u16; 3] = [16, 24, 32];

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// A field holds a value outside its allowed range.
    #[error("[{section}] {field} = {value}: {reason}")]
    InvalidValue {
        /// Config section, e.g. `compressor` or `parametric.1`.
        section: String,
        /// Field name within the section.
        field: &'static str,
        /// The rejected value.
        value: f64,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Collects every problem in one pass instead of stopping at the first.
#[derive(Default)]
struct Collector {
    errors: Vec<ValidationError>,
}

impl Collector {
    fn check(
        &mut self,
        ok: bool,
        section: &str,
        field: &'static str,
        value: f64,
        reason: &'static str,
    ) {
        if !ok {
            self.errors.push(ValidationError::InvalidValue {
                section: section.to_string(),
                field,
                value,
                reason,
            });
        }
    }

    fn positive(&mut self, section: &str, field: &'static str, value: f64) {
        self.check(
            value.is_finite() && value > 0.0,
            section,
            field,
            value,
            "must be positive",
        );
    }

    fn finite(&mut self, section: &str, field: &'static str, value: f64) {
        self.check(value.is_finite(), section, field, value, "must be finite");
    }

    fn finish(mut self) -> ValidationResult<()> {
        match self.errors.len() {
            0 => Ok(()),
            1 => Err(self.errors.remove(0)),
            _ => Err(ValidationError::Multiple(self.errors)),
        }
    }
}

/// Validate a whole config.
///
/// Returns the single error, or [`ValidationError::Multiple`] when more than
/// one field is wrong.
pub fn validate_config(config: &MasteringConfig) -> ValidationResult<()> {
    let mut c = Collector::default();

    let master = &config.master;
    c.finite("master", "gain", master.gain);
    c.check(
        SUPPORTED_BIT_DEPTHS.contains(&master.bit_depth),
        "master",
        "bit_depth",
        f64::from(master.bit_depth),
        "must be 16, 24 or 32",
    );
    if let Some(rate) = master.sample_rate {
        c.check(
            rate > 0,
            "master",
            "sample_rate",
            f64::from(rate),
            "must be positive",
        );
    }
    c.finite("master", "integrated_loudness", master.integrated_loudness);
    c.finite("master", "loudness_range", master.loudness_range);
    c.finite("master", "true_peak", master.true_peak);
    c.finite("master", "peak_norm", master.peak_norm);

    if let Some(hpf) = &config.hpf {
        c.positive("hpf", "freq", hpf.freq);
    }
    if let Some(lpf) = &config.lpf {
        c.positive("lpf", "freq", lpf.freq);
    }

    for (i, band) in config.parametric.iter().enumerate() {
        let section = format!("parametric.{i}");
        c.positive(&section, "freq", band.freq);
        c.finite(&section, "gain", band.gain);
        c.positive(&section, "q", band.q);
    }

    for (i, band) in config.band_stop.iter().enumerate() {
        let section = format!("band_stop.{i}");
        c.positive(&section, "freq", band.freq);
        c.positive(&section, "q", band.q);
    }

    if let Some(shelf) = &config.low_shelf {
        c.positive("low_shelf", "freq", shelf.freq);
        c.finite("low_shelf", "gain", shelf.gain);
    }

    if let Some(comp) = &config.compressor {
        c.finite("compressor", "threshold", comp.threshold);
        c.check(
            comp.ratio.is_finite() && comp.ratio >= 1.0,
            "compressor",
            "ratio",
            comp.ratio,
            "must be >= 1",
        );
        c.positive("compressor", "attack", comp.attack);
        c.positive("compressor", "release", comp.release);
        c.check(
            comp.knee.is_finite() && comp.knee >= 0.0,
            "compressor",
            "knee",
            comp.knee,
            "must be >= 0",
        );
        c.check(
            comp.lookahead.is_finite()
                && comp.lookahead >= 0.0
                && comp.lookahead < LOOKAHEAD_CAPACITY_SECS * 1000.0,
            "compressor",
            "lookahead",
            comp.lookahead,
            "must be in [0, 300) ms",
        );
        c.finite("compressor", "input_gain", comp.input_gain);
        c.finite("compressor", "output_gain", comp.output_gain);
    }

    c.finish()
}
