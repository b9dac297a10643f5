//! Audio I/O layer for mastr.
//!
//! This crate provides:
//!
//! - **WAV file I/O**: [`read_wav`] and [`write_wav`] for loading/saving
//!   interleaved multi-channel audio as `f64`
//! - **Buffer processing**: [`ProcessingEngine`] for running a stage list
//!   over a whole file in blocks
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mastr_io::{read_wav, write_wav, ProcessingEngine};
//!
//! let (samples, spec) = read_wav("input.wav")?;
//!
//! let mut engine = ProcessingEngine::new(usize::from(spec.channels));
//! engine.add_stage(Box::new(chain));
//! let processed = engine.process_file(&samples)?;
//!
//! write_wav("output.wav", &processed, spec)?;
//! ```

mod engine;
mod wav;

pub use engine::{DEFAULT_BLOCK_FRAMES, ProcessingEngine};
pub use wav::{WavFormat, WavInfo, WavSpec, read_wav, read_wav_info, write_wav};

/// Error types for audio I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// The requested output bit depth cannot be written.
    #[error("Unsupported bit depth: {0} (expected 16, 24 or 32)")]
    UnsupportedBitDepth(u16),

    /// Buffer length is not a whole number of frames.
    #[error("Buffer of {samples} samples does not hold whole frames of {channels} channels")]
    ChannelMismatch {
        /// Buffer length in samples.
        samples: usize,
        /// Expected channel count.
        channels: usize,
    },
}

/// Convenience result type for audio I/O operations.
pub type Result<T> = std::result::Result<T, Error>;
