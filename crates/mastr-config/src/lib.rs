//! Configuration, validation and chain building for mastr.
//!
//! A mastering run is described by one TOML file ([`MasteringConfig`]) that
//! applies to every input in a batch. This crate loads and validates that
//! file and turns it into a [`ProcessingChain`] once a file's sample rate
//! and channel count are known.
//!
//! # Features
//!
//! - **Config format**: `[master]` output settings plus optional filter,
//!   EQ and compressor sections
//! - **Validation**: Range checks that do not depend on the input file
//! - **Chains**: Dual-mono filters and a linked compressor over interleaved
//!   audio, in a fixed stage order
//!
//! # Example
//!
//! ```rust
//! use mastr_config::{MasteringConfig, ProcessingChain, validate_config};
//!
//! let config = MasteringConfig::from_toml(r#"
//!     [master]
//!     gain = 0.9
//!
//!     [hpf]
//!     freq = 40.0
//!
//!     [compressor]
//!     threshold = -18.0
//!     ratio = 3.0
//!     attack = 10.0
//!     release = 120.0
//! "#).unwrap();
//! validate_config(&config).unwrap();
//!
//! let mut chain = ProcessingChain::from_config(&config, 44100.0, 2).unwrap();
//! let mut audio = vec![0.0; 512];
//! chain.process_buffer(&mut audio);
//! ```

mod chain;
mod config;
mod error;

/// Config validation.
pub mod validation;

pub use chain::ProcessingChain;
pub use config::{
    BandStopBand, CompressorSettings, CutoffSettings, Detection, MasterSettings,
    MasteringConfig, ParametricBand, ShelfSettings,
};
pub use error::ConfigError;
pub use validation::{SUPPORTED_BIT_DEPTHS, ValidationError, ValidationResult, validate_config};
