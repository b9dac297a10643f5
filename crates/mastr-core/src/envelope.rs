//! Envelope detector for dynamics processing.
//!
//! Converts an instantaneous signal into a slowly varying level using separate
//! attack and release time constants. Two time-constant conventions are
//! available:
//!
//! | Convention | `TC` | Target residual |
//! |------------|------|-----------------|
//! | [`TimeConstant::Digital`] | `log10(0.01) = −2.0` | 1% |
//! | [`TimeConstant::Analog`] | `log10(0.367) ≈ −0.4353` | 36.7% (one RC constant) |
//!
//! Per-sample smoothing coefficient: `exp(TC / (T_ms · sample_rate · 0.001))`.
//!
//! The targets are base-10 logarithms fed through a natural exponential, so
//! after exactly `T` ms of a step the residual is `e^TC` (13.5% digital,
//! 64.7% analog). The digital detector reaches its 1% target after roughly
//! `2.3·T`.

use libm::{exp, pow};

use crate::error::{DspError, check_sample_rate, check_time_ms};
use crate::math::{flush_denormal, linear_to_db};

/// Log-domain target for the digital convention.
pub const DIGITAL_TC: f64 = -2.0;

/// Log-domain target for the analog convention.
pub const ANALOG_TC: f64 = -0.43533393574791066201247090699309;

/// Floor reported in log mode when the envelope is zero.
pub const LOG_FLOOR_DB: f64 = -96.0;

/// How the input is rectified before smoothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DetectionMode {
    /// `|x|`
    Peak,
    /// `|x|²`
    MeanSquare,
    /// `(|x|²)^0.5`, numerically the same as [`Peak`](Self::Peak) per sample.
    #[default]
    Rms,
}

impl DetectionMode {
    /// Rectify one sample.
    #[inline]
    pub fn rectify(self, input: f64) -> f64 {
        let magnitude = input.abs();
        match self {
            Self::Peak => magnitude,
            Self::MeanSquare => magnitude * magnitude,
            Self::Rms => pow(magnitude * magnitude, 0.5),
        }
    }
}

/// Time-constant convention used to derive the smoothing coefficients.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimeConstant {
    /// `TC = −2.0`.
    #[default]
    Digital,
    /// `TC ≈ −0.4353`, the classic RC charge curve.
    Analog,
}

impl TimeConstant {
    /// The log-domain target for this convention.
    pub fn log_target(self) -> f64 {
        match self {
            Self::Digital => DIGITAL_TC,
            Self::Analog => ANALOG_TC,
        }
    }

    /// Per-sample smoothing coefficient for a time in milliseconds.
    #[inline]
    pub fn coefficient(self, time_ms: f64, sample_rate: f64) -> f64 {
        exp(self.log_target() / (time_ms * sample_rate * 0.001))
    }
}

/// Attack/release envelope detector.
///
/// The stored envelope is always in `[0, 1]`. With log output enabled,
/// [`detect`](Self::detect) returns `20·log10(envelope)` floored at
/// [`LOG_FLOOR_DB`].
///
/// # Example
///
/// ```rust
/// use mastr_core::{DetectionMode, EnvelopeDetector, TimeConstant};
///
/// let mut env = EnvelopeDetector::new(48000.0, 10.0, 100.0).unwrap();
/// env.set_detection_mode(DetectionMode::Peak);
/// let level = env.detect(0.5);
/// assert!(level > 0.0 && level < 0.5);
/// ```
#[derive(Debug, Clone)]
pub struct EnvelopeDetector {
    /// Current envelope level (linear, clamped to [0, 1])
    envelope: f64,
    attack_coeff: f64,
    release_coeff: f64,
    sample_rate: f64,
    attack_ms: f64,
    release_ms: f64,
    mode: DetectionMode,
    time_constant: TimeConstant,
    log_output: bool,
}

impl EnvelopeDetector {
    /// Creates a linear-output RMS detector with the digital convention.
    pub fn new(sample_rate: f64, attack_ms: f64, release_ms: f64) -> Result<Self, DspError> {
        check_sample_rate(sample_rate)?;
        check_time_ms("attack", attack_ms)?;
        check_time_ms("release", release_ms)?;

        let mut detector = Self {
            envelope: 0.0,
            attack_coeff: 0.0,
            release_coeff: 0.0,
            sample_rate,
            attack_ms,
            release_ms,
            mode: DetectionMode::default(),
            time_constant: TimeConstant::default(),
            log_output: false,
        };
        detector.recalculate_coefficients();
        Ok(detector)
    }

    /// Builder: set the detection mode.
    pub fn with_detection_mode(mut self, mode: DetectionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Builder: set the time-constant convention.
    pub fn with_time_constant(mut self, time_constant: TimeConstant) -> Self {
        self.set_time_constant(time_constant);
        self
    }

    /// Builder: enable or disable dB output.
    pub fn with_log_output(mut self, log_output: bool) -> Self {
        self.log_output = log_output;
        self
    }

    /// Set the attack time in milliseconds.
    pub fn set_attack_ms(&mut self, attack_ms: f64) -> Result<(), DspError> {
        check_time_ms("attack", attack_ms)?;
        self.attack_ms = attack_ms;
        self.recalculate_coefficients();
        Ok(())
    }

    /// Attack time in milliseconds.
    pub fn attack_ms(&self) -> f64 {
        self.attack_ms
    }

    /// Set the release time in milliseconds.
    pub fn set_release_ms(&mut self, release_ms: f64) -> Result<(), DspError> {
        check_time_ms("release", release_ms)?;
        self.release_ms = release_ms;
        self.recalculate_coefficients();
        Ok(())
    }

    /// Release time in milliseconds.
    pub fn release_ms(&self) -> f64 {
        self.release_ms
    }

    /// Update the sample rate and re-derive both coefficients.
    pub fn set_sample_rate(&mut self, sample_rate: f64) -> Result<(), DspError> {
        check_sample_rate(sample_rate)?;
        self.sample_rate = sample_rate;
        self.recalculate_coefficients();
        Ok(())
    }

    /// Switch between digital and analog time constants.
    pub fn set_time_constant(&mut self, time_constant: TimeConstant) {
        self.time_constant = time_constant;
        self.recalculate_coefficients();
    }

    /// Current time-constant convention.
    pub fn time_constant(&self) -> TimeConstant {
        self.time_constant
    }

    /// Set the detection mode.
    pub fn set_detection_mode(&mut self, mode: DetectionMode) {
        self.mode = mode;
    }

    /// Current detection mode.
    pub fn detection_mode(&self) -> DetectionMode {
        self.mode
    }

    /// Enable or disable dB output.
    pub fn set_log_output(&mut self, log_output: bool) {
        self.log_output = log_output;
    }

    /// Whether [`detect`](Self::detect) reports dB.
    pub fn log_output(&self) -> bool {
        self.log_output
    }

    /// Attack smoothing coefficient.
    pub fn attack_coefficient(&self) -> f64 {
        self.attack_coeff
    }

    /// Release smoothing coefficient.
    pub fn release_coefficient(&self) -> f64 {
        self.release_coeff
    }

    /// Process one sample and return the detector value.
    ///
    /// Linear mode returns the envelope in `[0, 1]`; log mode returns dB.
    #[inline]
    pub fn detect(&mut self, input: f64) -> f64 {
        let rectified = self.mode.rectify(input);

        let coeff = if rectified > self.envelope {
            self.attack_coeff
        } else {
            self.release_coeff
        };

        let smoothed = coeff * (self.envelope - rectified) + rectified;
        self.envelope = flush_denormal(smoothed).clamp(0.0, 1.0);

        if self.log_output {
            if self.envelope <= 0.0 {
                LOG_FLOOR_DB
            } else {
                linear_to_db(self.envelope)
            }
        } else {
            self.envelope
        }
    }

    /// Current linear envelope without processing new input.
    pub fn envelope(&self) -> f64 {
        self.envelope
    }

    /// Reset the envelope to zero.
    pub fn reset(&mut self) {
        self.envelope = 0.0;
    }

    fn recalculate_coefficients(&mut self) {
        self.attack_coeff = self.time_constant.coefficient(self.attack_ms, self.sample_rate);
        self.release_coeff = self
            .time_constant
            .coefficient(self.release_ms, self.sample_rate);
    }
}
