//! Fractional delay line.
//!
//! A fixed-capacity circular buffer with a read index trailing the write
//! index by the configured delay. Used by the compressor to realign the dry
//! signal with its detector (lookahead).
//!
//! # Interpolation
//!
//! Delays that are not a whole number of samples blend the sample at the
//! read index with the one before it:
//!
//! ```text
//! y = (1 − frac)·buf[read] + frac·buf[read − 1]
//! ```
//!
//! where `frac` is the fractional part of the delay in samples.

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

use libm::floor;

use crate::effect::Effect;
use crate::error::{DspError, check_sample_rate};
use crate::math::{db_to_linear, lerp_between};

/// Circular-buffer delay with fractional read-out and output attenuation.
///
/// A delay of zero is a hard bypass: the input passes through unchanged,
/// without attenuation, while still being written to the buffer.
///
/// # Memory
///
/// The buffer is allocated once in [`new`](Self::new) and never reallocates.
///
/// # Example
///
/// ```rust
/// use mastr_core::{DelayLine, Effect};
///
/// let mut delay = DelayLine::new(64, 1000.0).unwrap();
/// delay.set_delay_ms(3.0).unwrap(); // 3 samples at 1 kHz
///
/// let out: Vec<f64> = [1.0, 0.0, 0.0, 0.0, 0.0]
///     .iter()
///     .map(|&x| delay.process(x))
///     .collect();
/// assert_eq!(out, [0.0, 0.0, 0.0, 1.0, 0.0]);
/// ```
#[derive(Debug, Clone)]
pub struct DelayLine {
    buffer: Vec<f64>,
    write_index: usize,
    /// Trails `write_index` by `floor(delay_samples)`
    read_index: usize,
    sample_rate: f64,
    delay_ms: f64,
    delay_samples: f64,
    attenuation_db: f64,
    attenuation: f64,
}

impl DelayLine {
    /// Creates a delay holding up to `capacity` samples, with zero delay and
    /// 0 dB attenuation. A capacity of zero is raised to one.
    pub fn new(capacity: usize, sample_rate: f64) -> Result<Self, DspError> {
        check_sample_rate(sample_rate)?;
        Ok(Self {
            buffer: vec![0.0; capacity.max(1)],
            write_index: 0,
            read_index: 0,
            sample_rate,
            delay_ms: 0.0,
            delay_samples: 0.0,
            attenuation_db: 0.0,
            attenuation: 1.0,
        })
    }

    /// Creates a delay able to hold `max_seconds` at `sample_rate`.
    pub fn from_time(sample_rate: f64, max_seconds: f64) -> Result<Self, DspError> {
        check_sample_rate(sample_rate)?;
        let capacity = (sample_rate * max_seconds.max(0.0)) as usize;
        Self::new(capacity, sample_rate)
    }

    /// Set the delay in milliseconds.
    ///
    /// Fails if the delay is negative, not finite, or does not fit in the
    /// buffer; the previous delay is kept on failure.
    pub fn set_delay_ms(&mut self, delay_ms: f64) -> Result<(), DspError> {
        let delay_samples = self.samples_for(delay_ms, self.sample_rate)?;
        self.delay_ms = delay_ms;
        self.delay_samples = delay_samples;
        self.update_read_index();
        Ok(())
    }

    /// Configured delay in milliseconds.
    pub fn delay_ms(&self) -> f64 {
        self.delay_ms
    }

    /// Configured delay in (possibly fractional) samples.
    pub fn delay_samples(&self) -> f64 {
        self.delay_samples
    }

    /// Set the output attenuation in dB (0 dB = unity).
    pub fn set_attenuation_db(&mut self, attenuation_db: f64) -> Result<(), DspError> {
        if !attenuation_db.is_finite() {
            return Err(DspError::InvalidGain(attenuation_db));
        }
        self.attenuation_db = attenuation_db;
        self.attenuation = db_to_linear(attenuation_db);
        Ok(())
    }

    /// Output attenuation in dB.
    pub fn attenuation_db(&self) -> f64 {
        self.attenuation_db
    }

    /// Change the sample rate, re-deriving the delay in samples from the
    /// configured milliseconds.
    pub fn set_sample_rate(&mut self, sample_rate: f64) -> Result<(), DspError> {
        check_sample_rate(sample_rate)?;
        let delay_samples = self.samples_for(self.delay_ms, sample_rate)?;
        self.sample_rate = sample_rate;
        self.delay_samples = delay_samples;
        self.update_read_index();
        Ok(())
    }

    /// Maximum delay capacity in samples.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Store `input` at the write index and advance both indices.
    #[inline]
    pub fn write_and_advance(&mut self, input: f64) {
        let len = self.buffer.len();
        self.buffer[self.write_index] = input;
        self.write_index = (self.write_index + 1) % len;
        self.read_index = (self.read_index + 1) % len;
    }

    /// Read the delayed sample for the next write.
    ///
    /// For delays under one sample the newest slot has not been written yet;
    /// [`process`](Effect::process) substitutes the live input in that case.
    #[inline]
    pub fn read(&self) -> f64 {
        self.interpolate(self.buffer[self.read_index])
    }

    /// One-off lookup `delay_ms` behind the most recently written sample,
    /// without moving either index.
    ///
    /// `read_at_ms(0.0)` is the last sample written.
    pub fn read_at_ms(&self, delay_ms: f64) -> Result<f64, DspError> {
        if !delay_ms.is_finite() || delay_ms < 0.0 {
            return Err(DspError::InvalidDelay(delay_ms));
        }
        let len = self.buffer.len();
        let delay_samples = delay_ms * self.sample_rate / 1000.0;
        // Needs the slot one further back for interpolation
        if delay_samples >= (len - 1) as f64 {
            return Err(DspError::DelayExceedsCapacity {
                requested: delay_samples,
                capacity: len,
            });
        }

        let whole = floor(delay_samples);
        let offset = whole as usize;
        let index = (self.write_index + 2 * len - 1 - offset) % len;
        let previous = (index + len - 1) % len;
        Ok(lerp_between(
            0.0,
            self.buffer[index],
            1.0,
            self.buffer[previous],
            delay_samples - whole,
        ))
    }

    fn interpolate(&self, newest: f64) -> f64 {
        let len = self.buffer.len();
        let previous = self.buffer[(self.read_index + len - 1) % len];
        let frac = self.delay_samples - floor(self.delay_samples);
        lerp_between(0.0, newest, 1.0, previous, frac)
    }

    fn samples_for(&self, delay_ms: f64, sample_rate: f64) -> Result<f64, DspError> {
        if !delay_ms.is_finite() || delay_ms < 0.0 {
            return Err(DspError::InvalidDelay(delay_ms));
        }
        let delay_samples = delay_ms * sample_rate / 1000.0;
        if delay_samples >= self.buffer.len() as f64 {
            return Err(DspError::DelayExceedsCapacity {
                requested: delay_samples,
                capacity: self.buffer.len(),
            });
        }
        Ok(delay_samples)
    }

    fn update_read_index(&mut self) {
        let len = self.buffer.len();
        let whole = floor(self.delay_samples) as usize;
        self.read_index = (self.write_index + len - whole) % len;
    }
}

impl Effect for DelayLine {
    #[inline]
    fn process(&mut self, input: f64) -> f64 {
        if self.delay_samples == 0.0 {
            self.write_and_advance(input);
            return input;
        }

        let newest = if self.read_index == self.write_index {
            input
        } else {
            self.buffer[self.read_index]
        };
        let output = self.attenuation * self.interpolate(newest);
        self.write_and_advance(input);
        output
    }

    fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_index = 0;
        self.update_read_index();
    }

    fn latency_samples(&self) -> usize {
        libm::round(self.delay_samples) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn impulse_response(delay: &mut DelayLine, len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| delay.process(if i == 0 { 1.0 } else { 0.0 }))
            .collect()
    }

    #[test]
    fn test_integer_delay_impulse() {
        let mut delay = DelayLine::new(100, 48000.0).unwrap();
        delay.set_delay_ms(0.5).unwrap(); // 24 samples
        assert_eq!(delay.delay_samples(), 24.0);

        let out = impulse_response(&mut delay, 50);
        for (i, &y) in out.iter().enumerate() {
            let expected = if i == 24 { 1.0 } else { 0.0 };
            assert_eq!(y, expected, "sample {i}");
        }
        assert_eq!(delay.latency_samples(), 24);
    }

    #[test]
    fn test_fractional_delay_splits_impulse() {
        let mut delay = DelayLine::new(16, 1000.0).unwrap();
        delay.set_delay_ms(2.25).unwrap();

        let out = impulse_response(&mut delay, 6);
        assert_eq!(out, [0.0, 0.0, 0.75, 0.25, 0.0, 0.0]);
    }

    #[test]
    fn test_sub_sample_delay_uses_live_input() {
        let mut delay = DelayLine::new(8, 1000.0).unwrap();
        delay.set_delay_ms(0.5).unwrap();

        let out = impulse_response(&mut delay, 4);
        assert_eq!(out, [0.5, 0.5, 0.0, 0.0]);
    }

    #[test]
    fn test_zero_delay_is_bypass() {
        let mut delay = DelayLine::new(8, 1000.0).unwrap();
        delay.set_attenuation_db(-6.0).unwrap();
        for x in [0.3, -0.7, 1.0] {
            assert_eq!(delay.process(x), x);
        }
        // Samples were still written
        assert_eq!(delay.read_at_ms(0.0).unwrap(), 1.0);
        assert_eq!(delay.read_at_ms(1.0).unwrap(), -0.7);
    }

    #[test]
    fn test_attenuation_scales_output() {
        let mut delay = DelayLine::new(8, 1000.0).unwrap();
        delay.set_delay_ms(1.0).unwrap();
        delay.set_attenuation_db(-20.0).unwrap();
        delay.process(1.0);
        assert!((delay.process(0.0) - 0.1).abs() < 1e-12);
        assert_eq!(delay.attenuation_db(), -20.0);
    }

    #[test]
    fn test_wraps_around_buffer() {
        let mut delay = DelayLine::new(4, 1000.0).unwrap();
        delay.set_delay_ms(3.0).unwrap();

        let input: Vec<f64> = (1..=12).map(f64::from).collect();
        let output: Vec<f64> = input.iter().map(|&x| delay.process(x)).collect();
        assert_eq!(&output[3..], &input[..9]);
    }

    #[test]
    fn test_rejects_bad_delays() {
        let mut delay = DelayLine::new(10, 1000.0).unwrap();
        assert_eq!(delay.set_delay_ms(-1.0), Err(DspError::InvalidDelay(-1.0)));
        assert!(delay.set_delay_ms(f64::NAN).is_err());
        assert_eq!(
            delay.set_delay_ms(10.0),
            Err(DspError::DelayExceedsCapacity {
                requested: 10.0,
                capacity: 10
            })
        );
        assert!(delay.set_delay_ms(9.5).is_ok());
        assert_eq!(delay.delay_ms(), 9.5);
    }

    #[test]
    fn test_sample_rate_change_rederives_delay() {
        let mut delay = DelayLine::new(100, 1000.0).unwrap();
        delay.set_delay_ms(10.0).unwrap();
        delay.set_sample_rate(2000.0).unwrap();
        assert_eq!(delay.delay_samples(), 20.0);

        // 10 ms at 20 kHz needs 200 samples; the old rate is kept
        assert!(delay.set_sample_rate(20000.0).is_err());
        assert_eq!(delay.delay_samples(), 20.0);
    }

    #[test]
    fn test_read_at_ms_interpolates() {
        let mut delay = DelayLine::new(8, 1000.0).unwrap();
        for x in [1.0, 2.0, 3.0, 4.0] {
            delay.write_and_advance(x);
        }
        assert_eq!(delay.read_at_ms(0.0).unwrap(), 4.0);
        assert_eq!(delay.read_at_ms(2.0).unwrap(), 2.0);
        assert_eq!(delay.read_at_ms(1.5).unwrap(), 2.5);
        assert!(delay.read_at_ms(7.0).is_err());
        assert!(delay.read_at_ms(-0.1).is_err());
    }

    #[test]
    fn test_reset_clears_buffer_and_keeps_delay() {
        let mut delay = DelayLine::new(16, 1000.0).unwrap();
        delay.set_delay_ms(2.0).unwrap();
        for _ in 0..5 {
            delay.process(1.0);
        }
        delay.reset();
        let out = impulse_response(&mut delay, 4);
        assert_eq!(out, [0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_from_time_capacity() {
        let delay = DelayLine::from_time(1000.0, 0.25).unwrap();
        assert_eq!(delay.capacity(), 250);
        assert!(DelayLine::new(4, 0.0).is_err());
    }
}
