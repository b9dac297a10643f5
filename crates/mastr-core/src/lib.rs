//! Mastr Core - per-sample DSP engine for offline mastering
//!
//! This crate holds the numerical heart of the mastering pipeline. Everything
//! here is a plain value type driven one sample at a time; nothing performs
//! I/O or reads configuration.
//!
//! # Building Blocks
//!
//! ## Filters
//!
//! - [`Biquad`] - Two-pole/two-zero recursive filter with a wet/dry output mix
//! - [`Coefficients`] - The seven numbers that configure a [`Biquad`]
//! - [`design`] - Pure coefficient recipes: Butterworth high/low-pass, band-stop,
//!   constant-Q parametric EQ and low shelf
//! - [`FilterSpec`] / [`Filter`] - A designed filter ready to run as an [`Effect`]
//!
//! ## Dynamics
//!
//! - [`EnvelopeDetector`] - Peak / mean-square / RMS envelope with digital or
//!   analog time constants and optional dB output
//! - [`DelayLine`] - Circular buffer with fractional read-out, used as the
//!   compressor lookahead
//! - [`Compressor`] - Feed-forward compressor with straight-line soft knee
//!   and lookahead compensation
//! - [`LinkedCompressor`] - Dual-mono wrapper: one detector, shared gain
//!
//! ## Effect System
//!
//! - [`Effect`] - Mono sample processor
//! - [`FrameEffect`] - Processor for one interleaved frame of N channels
//! - [`DualMono`] - Runs one independent [`Effect`] per channel
//!
//! # no_std Support
//!
//! The crate is `no_std` compatible. Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! mastr-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use mastr_core::{Effect, Filter, FilterSpec};
//!
//! let mut hpf = Filter::new(FilterSpec::HighPass { freq: 40.0 }, 48000.0).unwrap();
//! let mut buffer = vec![0.25; 256];
//! hpf.process_block_inplace(&mut buffer);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod biquad;
pub mod compressor;
pub mod delay;
pub mod design;
pub mod effect;
pub mod envelope;
pub mod error;
pub mod filter;
pub mod math;

// Re-export main types at crate root
pub use biquad::{Biquad, Coefficients};
pub use compressor::{Compressor, LOOKAHEAD_CAPACITY_SECS, LinkedCompressor, compute_gain};
pub use delay::DelayLine;
pub use design::{band_stop, high_pass, low_pass, low_shelf, parametric};
pub use effect::{DualMono, Effect, FrameEffect};
pub use envelope::{ANALOG_TC, DIGITAL_TC, DetectionMode, EnvelopeDetector, LOG_FLOOR_DB, TimeConstant};
pub use error::DspError;
pub use filter::{Filter, FilterSpec};
pub use math::{FLT_MIN, db_to_linear, flush_denormal, lerp_between, linear_to_db};
