//! Feed-forward dynamics compressor with straight-line soft knee and lookahead.
//!
//! # Signal Flow
//!
//! ```text
//! Input ─┬─ × input gain → Envelope (dB) → Gain Computer ─┐
//!        │                                                 × → × output gain → Output
//!        └─────────────── Lookahead Delay ─────────────────┘
//! ```
//!
//! The detector sees the gained signal while the *original* sample travels
//! through the lookahead delay, so gain changes land slightly ahead of the
//! transients that caused them.
//!
//! # Parameters
//!
//! | Parameter | Constraint | Default |
//! |-----------|------------|---------|
//! | Threshold | finite dB | -18.0 |
//! | Ratio | ≥ 1 | 4.0 |
//! | Attack | > 0 ms | 10.0 |
//! | Release | > 0 ms | 100.0 |
//! | Knee | ≥ 0 dB | 0.0 |
//! | Lookahead | 0 to < 300 ms | 0.0 |
//! | Input / output gain | finite dB | 0.0 |
//!
//! # Gain Computer
//!
//! Slope `CS = 1 − 1/ratio` (`1` when limiting). Inside the knee the slope is
//! interpolated on a straight line from `0` at `T − knee/2` to `CS` at
//! `min(0, T + knee/2)`. Gain reduction is `min(0, CS·(T − det))` dB.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::delay::DelayLine;
use crate::effect::{Effect, FrameEffect};
use crate::envelope::{DetectionMode, EnvelopeDetector, TimeConstant};
use crate::error::DspError;
use crate::math::{db_to_linear, lerp_between};

/// Lookahead buffer size in seconds.
pub const LOOKAHEAD_CAPACITY_SECS: f64 = 0.3;

const DEFAULT_THRESHOLD_DB: f64 = -18.0;
const DEFAULT_RATIO: f64 = 4.0;
const DEFAULT_ATTACK_MS: f64 = 10.0;
const DEFAULT_RELEASE_MS: f64 = 100.0;

/// Static gain reduction in dB (always `≤ 0`) for a detector value in dB.
///
/// # Example
///
/// ```rust
/// use mastr_core::compressor::gain_reduction_db;
///
/// // 6 dB over a -18 dB threshold at 4:1, hard knee
/// let gr = gain_reduction_db(-12.0, -18.0, 4.0, 0.0, false);
/// assert!((gr + 4.5).abs() < 1e-12);
/// ```
pub fn gain_reduction_db(
    detector_db: f64,
    threshold_db: f64,
    ratio: f64,
    knee_db: f64,
    limit: bool,
) -> f64 {
    let mut slope = if limit { 1.0 } else { 1.0 - 1.0 / ratio };

    let half_knee = knee_db / 2.0;
    if knee_db > 0.0
        && detector_db > threshold_db - half_knee
        && detector_db < threshold_db + half_knee
    {
        let lower = threshold_db - half_knee;
        let upper = (threshold_db + half_knee).min(0.0);
        slope = lerp_between(lower, 0.0, upper, slope, detector_db);
    }

    (slope * (threshold_db - detector_db)).min(0.0)
}

/// Linear gain factor `10^(gain_reduction_db/20)` for a detector value in dB.
#[inline]
pub fn compute_gain(
    detector_db: f64,
    threshold_db: f64,
    ratio: f64,
    knee_db: f64,
    limit: bool,
) -> f64 {
    db_to_linear(gain_reduction_db(
        detector_db,
        threshold_db,
        ratio,
        knee_db,
        limit,
    ))
}

#[derive(Debug, Clone, Copy)]
struct GainComputer {
    threshold_db: f64,
    ratio: f64,
    knee_db: f64,
    limit: bool,
}

impl GainComputer {
    #[inline]
    fn gain_reduction_db(&self, detector_db: f64) -> f64 {
        gain_reduction_db(
            detector_db,
            self.threshold_db,
            self.ratio,
            self.knee_db,
            self.limit,
        )
    }
}

/// Mono compressor: one envelope detector, one lookahead delay.
///
/// The detector runs in RMS mode with the digital time constant and dB
/// output, so the threshold and knee are in dB.
///
/// # Example
///
/// ```rust
/// use mastr_core::{Compressor, Effect};
///
/// let mut comp = Compressor::new(48000.0).unwrap();
/// comp.set_threshold_db(-20.0).unwrap();
/// comp.set_ratio(4.0).unwrap();
/// comp.set_knee_db(6.0).unwrap();
/// comp.set_lookahead_ms(2.0).unwrap();
///
/// let output = comp.process(0.5);
/// assert!(output.is_finite());
/// assert_eq!(comp.latency_samples(), 96);
/// ```
#[derive(Debug, Clone)]
pub struct Compressor {
    detector: EnvelopeDetector,
    lookahead: DelayLine,
    gain_computer: GainComputer,
    sample_rate: f64,
    input_gain_db: f64,
    input_gain: f64,
    output_gain_db: f64,
    output_gain: f64,
    /// Last computed gain reduction in dB (always non-positive).
    last_gain_reduction_db: f64,
}

impl Compressor {
    /// Create a compressor with default settings.
    pub fn new(sample_rate: f64) -> Result<Self, DspError> {
        let detector = EnvelopeDetector::new(sample_rate, DEFAULT_ATTACK_MS, DEFAULT_RELEASE_MS)?
            .with_detection_mode(DetectionMode::Rms)
            .with_time_constant(TimeConstant::Digital)
            .with_log_output(true);
        let lookahead = DelayLine::from_time(sample_rate, LOOKAHEAD_CAPACITY_SECS)?;

        Ok(Self {
            detector,
            lookahead,
            gain_computer: GainComputer {
                threshold_db: DEFAULT_THRESHOLD_DB,
                ratio: DEFAULT_RATIO,
                knee_db: 0.0,
                limit: false,
            },
            sample_rate,
            input_gain_db: 0.0,
            input_gain: 1.0,
            output_gain_db: 0.0,
            output_gain: 1.0,
            last_gain_reduction_db: 0.0,
        })
    }

    /// Set threshold in dB.
    pub fn set_threshold_db(&mut self, threshold_db: f64) -> Result<(), DspError> {
        if !threshold_db.is_finite() {
            return Err(DspError::InvalidGain(threshold_db));
        }
        self.gain_computer.threshold_db = threshold_db;
        Ok(())
    }

    /// Threshold in dB.
    pub fn threshold_db(&self) -> f64 {
        self.gain_computer.threshold_db
    }

    /// Set compression ratio (`≥ 1`).
    pub fn set_ratio(&mut self, ratio: f64) -> Result<(), DspError> {
        if !ratio.is_finite() || ratio < 1.0 {
            return Err(DspError::InvalidRatio(ratio));
        }
        self.gain_computer.ratio = ratio;
        Ok(())
    }

    /// Compression ratio.
    pub fn ratio(&self) -> f64 {
        self.gain_computer.ratio
    }

    /// Set knee width in dB (`0` = hard knee).
    pub fn set_knee_db(&mut self, knee_db: f64) -> Result<(), DspError> {
        if !knee_db.is_finite() || knee_db < 0.0 {
            return Err(DspError::InvalidKnee(knee_db));
        }
        self.gain_computer.knee_db = knee_db;
        Ok(())
    }

    /// Knee width in dB.
    pub fn knee_db(&self) -> f64 {
        self.gain_computer.knee_db
    }

    /// Hard-limit mode: slope `1` regardless of ratio.
    pub fn set_limit(&mut self, limit: bool) {
        self.gain_computer.limit = limit;
    }

    /// Whether hard-limit mode is on.
    pub fn limit(&self) -> bool {
        self.gain_computer.limit
    }

    /// Set attack time in milliseconds.
    pub fn set_attack_ms(&mut self, attack_ms: f64) -> Result<(), DspError> {
        self.detector.set_attack_ms(attack_ms)
    }

    /// Set release time in milliseconds.
    pub fn set_release_ms(&mut self, release_ms: f64) -> Result<(), DspError> {
        self.detector.set_release_ms(release_ms)
    }

    /// Set lookahead in milliseconds. Must be below 300 ms.
    pub fn set_lookahead_ms(&mut self, lookahead_ms: f64) -> Result<(), DspError> {
        self.lookahead.set_delay_ms(lookahead_ms)
    }

    /// Lookahead in milliseconds.
    pub fn lookahead_ms(&self) -> f64 {
        self.lookahead.delay_ms()
    }

    /// Set input gain in dB, applied before detection only.
    pub fn set_input_gain_db(&mut self, gain_db: f64) -> Result<(), DspError> {
        if !gain_db.is_finite() {
            return Err(DspError::InvalidGain(gain_db));
        }
        self.input_gain_db = gain_db;
        self.input_gain = db_to_linear(gain_db);
        Ok(())
    }

    /// Input gain in dB.
    pub fn input_gain_db(&self) -> f64 {
        self.input_gain_db
    }

    /// Set output gain in dB.
    pub fn set_output_gain_db(&mut self, gain_db: f64) -> Result<(), DspError> {
        if !gain_db.is_finite() {
            return Err(DspError::InvalidGain(gain_db));
        }
        self.output_gain_db = gain_db;
        self.output_gain = db_to_linear(gain_db);
        Ok(())
    }

    /// Output gain in dB.
    pub fn output_gain_db(&self) -> f64 {
        self.output_gain_db
    }

    /// Set the detector's rectification mode.
    pub fn set_detection_mode(&mut self, mode: DetectionMode) {
        self.detector.set_detection_mode(mode);
    }

    /// Switch the detector between digital and analog time constants.
    pub fn set_time_constant(&mut self, time_constant: TimeConstant) {
        self.detector.set_time_constant(time_constant);
    }

    /// The envelope detector driving this compressor.
    pub fn detector(&self) -> &EnvelopeDetector {
        &self.detector
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Returns the last computed gain reduction in dB (always non-positive).
    ///
    /// A value of 0.0 means no compression is occurring.
    pub fn gain_reduction_db(&self) -> f64 {
        self.last_gain_reduction_db
    }

    /// Run the detector and gain computer on one sample and return the
    /// linear gain factor. Does not touch the lookahead delay.
    #[inline]
    pub fn gain_for(&mut self, input: f64) -> f64 {
        let detector_db = self.detector.detect(input * self.input_gain);
        let gain_reduction_db = self.gain_computer.gain_reduction_db(detector_db);
        self.last_gain_reduction_db = gain_reduction_db;
        db_to_linear(gain_reduction_db)
    }

    #[inline]
    fn apply(&self, gain: f64, delayed: f64) -> f64 {
        gain * delayed * self.output_gain
    }
}

impl Effect for Compressor {
    #[inline]
    fn process(&mut self, input: f64) -> f64 {
        let gain = self.gain_for(input);
        let delayed = self.lookahead.process(input);
        self.apply(gain, delayed)
    }

    fn reset(&mut self) {
        self.detector.reset();
        self.lookahead.reset();
        self.last_gain_reduction_db = 0.0;
    }

    fn latency_samples(&self) -> usize {
        self.lookahead.latency_samples()
    }
}

/// Dual-mono compressor for interleaved audio.
///
/// Channel 0 drives the detector; every channel passes through its own
/// lookahead delay and receives the same gain.
///
/// # Example
///
/// ```rust
/// use mastr_core::{Compressor, FrameEffect, LinkedCompressor};
///
/// let comp = Compressor::new(48000.0).unwrap();
/// let mut linked = LinkedCompressor::new(comp, 2);
/// let mut frame = [0.25, -0.25];
/// linked.process_frame(&mut frame);
/// assert_eq!(frame[0], -frame[1]);
/// ```
#[derive(Debug, Clone)]
pub struct LinkedCompressor {
    compressor: Compressor,
    /// Lookahead for channels 1..n
    followers: Vec<DelayLine>,
}

impl LinkedCompressor {
    /// Wrap a configured compressor for `channels` interleaved channels.
    pub fn new(compressor: Compressor, channels: usize) -> Self {
        let mut lookahead = compressor.lookahead.clone();
        lookahead.reset();
        let followers = core::iter::repeat_n(lookahead, channels.saturating_sub(1)).collect();
        Self {
            compressor,
            followers,
        }
    }

    /// The driving compressor.
    pub fn compressor(&self) -> &Compressor {
        &self.compressor
    }

    /// Number of channels handled.
    pub fn channels(&self) -> usize {
        self.followers.len() + 1
    }
}

impl FrameEffect for LinkedCompressor {
    #[inline]
    fn process_frame(&mut self, frame: &mut [f64]) {
        let Some((first, rest)) = frame.split_first_mut() else {
            return;
        };

        let gain = self.compressor.gain_for(*first);
        let delayed = self.compressor.lookahead.process(*first);
        *first = self.compressor.apply(gain, delayed);

        for (sample, lookahead) in rest.iter_mut().zip(self.followers.iter_mut()) {
            let delayed = lookahead.process(*sample);
            *sample = self.compressor.apply(gain, delayed);
        }
    }

    fn reset(&mut self) {
        Effect::reset(&mut self.compressor);
        for lookahead in &mut self.followers {
            lookahead.reset();
        }
    }

    fn latency_samples(&self) -> usize {
        self.compressor.latency_samples()
    }
}
