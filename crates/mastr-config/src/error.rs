//! Error types for configuration operations.

use std::path::PathBuf;
use thiserror::Error;

use mastr_core::DspError;

/// Anything that stops a mastering config from becoming a chain.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read or written.
    #[error("cannot {action} '{path}': {source}")]
    Io {
        /// `"read"` or `"write"`.
        action: &'static str,
        /// The config file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for this schema.
    #[error("malformed config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Serialization to TOML failed.
    #[error("cannot serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A parameter is out of range.
    #[error("invalid config: {0}")]
    Validation(#[from] crate::validation::ValidationError),

    /// A stage rejected its parameters at the file's sample rate.
    #[error("cannot build stage '{stage}': {source}")]
    Stage {
        /// Stage name as reported by the chain.
        stage: String,
        /// Underlying DSP parameter error.
        #[source]
        source: DspError,
    },
}

impl ConfigError {
    /// The file at `path` could not be read.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::Io {
            action: "read",
            path: path.into(),
            source,
        }
    }

    /// The file at `path` could not be written.
    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::Io {
            action: "write",
            path: path.into(),
            source,
        }
    }

    /// Wrap a DSP error raised while building `stage`.
    pub fn stage(stage: impl Into<String>, source: DspError) -> Self {
        ConfigError::Stage {
            stage: stage.into(),
            source,
        }
    }
}
