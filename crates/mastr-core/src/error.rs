//! DSP Error Types

use thiserror::Error;

/// Parameter validation failures raised while configuring a processor.
///
/// Processing itself never fails; every check happens when a filter is
/// designed or a detector, delay or compressor is (re)configured.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DspError {
    /// Sample rate must be positive and finite.
    #[error("sample rate must be positive, got {0}")]
    InvalidSampleRate(f64),

    /// Frequency outside the open interval `(0, sample_rate / 2)`.
    #[error("frequency {frequency} Hz must lie strictly between 0 and Nyquist ({nyquist} Hz)")]
    InvalidFrequency {
        /// Requested frequency in Hz.
        frequency: f64,
        /// Nyquist limit for the sample rate in use.
        nyquist: f64,
    },

    /// Q must be positive and finite.
    #[error("Q must be positive, got {0}")]
    InvalidQ(f64),

    /// Gain must be finite.
    #[error("gain must be finite, got {0} dB")]
    InvalidGain(f64),

    /// Attack, release or other time constant must be positive.
    #[error("{name} must be positive, got {value} ms")]
    InvalidTime {
        /// Which time parameter was rejected.
        name: &'static str,
        /// Rejected value in milliseconds.
        value: f64,
    },

    /// Compression ratio must be at least 1.
    #[error("ratio must be >= 1, got {0}")]
    InvalidRatio(f64),

    /// Knee width must be non-negative.
    #[error("knee width must be >= 0, got {0} dB")]
    InvalidKnee(f64),

    /// Designed coefficients are NaN or infinite.
    #[error("invalid filter coefficients for frequency {frequency} Hz at sample rate {sample_rate} Hz")]
    InvalidCoefficients {
        /// Frequency the design was attempted for.
        frequency: f64,
        /// Sample rate the design was attempted for.
        sample_rate: f64,
    },

    /// Delay is negative or not finite.
    #[error("delay must be finite and >= 0, got {0} ms")]
    InvalidDelay(f64),

    /// Requested delay does not fit in the circular buffer.
    #[error("delay of {requested} samples exceeds buffer capacity of {capacity} samples")]
    DelayExceedsCapacity {
        /// Requested delay in samples.
        requested: f64,
        /// Buffer capacity in samples.
        capacity: usize,
    },
}

/// Reject non-positive or non-finite sample rates.
pub(crate) fn check_sample_rate(sample_rate: f64) -> Result<(), DspError> {
    if sample_rate.is_finite() && sample_rate > 0.0 {
        Ok(())
    } else {
        Err(DspError::InvalidSampleRate(sample_rate))
    }
}

/// Reject non-positive or non-finite times in milliseconds.
pub(crate) fn check_time_ms(name: &'static str, value: f64) -> Result<(), DspError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(DspError::InvalidTime { name, value })
    }
}

#[cfg(test)]
mod tests {
    extern crate alloc;
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_error_display() {
        let err = DspError::InvalidFrequency {
            frequency: 30000.0,
            nyquist: 24000.0,
        };
        assert!(err.to_string().contains("30000"));
        assert!(err.to_string().contains("24000"));

        let err = DspError::InvalidTime {
            name: "attack",
            value: 0.0,
        };
        assert_eq!(err.to_string(), "attack must be positive, got 0 ms");
    }

    #[test]
    fn test_checks() {
        assert!(check_sample_rate(48000.0).is_ok());
        assert!(check_sample_rate(0.0).is_err());
        assert!(check_sample_rate(f64::NAN).is_err());
        assert!(check_time_ms("release", 1.0).is_ok());
        assert!(check_time_ms("release", -1.0).is_err());
        assert!(check_time_ms("release", f64::INFINITY).is_err());
    }
}
