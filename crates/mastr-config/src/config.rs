//! Mastering config file format.

use serde::{Deserialize, Serialize};
use std::path::Path;

use mastr_core::DetectionMode;

use crate::error::ConfigError;

/// One mastering recipe, applied identically to every file in a batch.
///
/// # TOML Format
///
/// ```toml
/// [master]
/// gain = 1.0
/// bit_depth = 24
/// sample_rate = 44100
/// normalize = true
///
/// [hpf]
/// freq = 40.0
///
/// [[parametric]]
/// freq = 3000.0
/// gain = -3.0
/// q = 1.4
///
/// [compressor]
/// threshold = -18.0
/// ratio = 4.0
/// attack = 10.0
/// release = 120.0
/// knee = 6.0
/// lookahead = 2.0
/// ```
///
/// Every section except `[master]` is optional; an absent section means the
/// stage is not built.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MasteringConfig {
    /// Output format and level settings.
    #[serde(default)]
    pub master: MasterSettings,

    /// High-pass filter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hpf: Option<CutoffSettings>,

    /// Low-pass filter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lpf: Option<CutoffSettings>,

    /// Parametric EQ bands, applied in file order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parametric: Vec<ParametricBand>,

    /// Notch bands, applied in file order after the parametric bands.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub band_stop: Vec<BandStopBand>,

    /// Low shelf.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_shelf: Option<ShelfSettings>,

    /// Compressor, always last in the chain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compressor: Option<CompressorSettings>,
}

/// `[master]` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MasterSettings {
    /// Linear gain applied before any stage.
    #[serde(default = "default_gain")]
    pub gain: f64,

    /// Output bit depth: 16, 24 or 32 (IEEE float).
    #[serde(default = "default_bit_depth")]
    pub bit_depth: u16,

    /// Output sample rate. Converted with ffmpeg when it differs from the
    /// input; `None` keeps the input rate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<u32>,

    /// Run loudness and peak normalization after processing.
    #[serde(default)]
    pub normalize: bool,

    /// Integrated loudness target in LUFS.
    #[serde(default = "default_integrated_loudness")]
    pub integrated_loudness: f64,

    /// Loudness range target in LU.
    #[serde(default = "default_loudness_range")]
    pub loudness_range: f64,

    /// Maximum true peak in dBTP.
    #[serde(default = "default_true_peak")]
    pub true_peak: f64,

    /// Final sample-peak normalization level in dBFS.
    #[serde(default = "default_peak_norm")]
    pub peak_norm: f64,
}

fn default_gain() -> f64 {
    1.0
}

fn default_bit_depth() -> u16 {
    16
}

fn default_integrated_loudness() -> f64 {
    -16.0
}

fn default_loudness_range() -> f64 {
    11.0
}

fn default_true_peak() -> f64 {
    -1.5
}

fn default_peak_norm() -> f64 {
    -1.0
}

impl Default for MasterSettings {
    fn default() -> Self {
        Self {
            gain: default_gain(),
            bit_depth: default_bit_depth(),
            sample_rate: None,
            normalize: false,
            integrated_loudness: default_integrated_loudness(),
            loudness_range: default_loudness_range(),
            true_peak: default_true_peak(),
            peak_norm: default_peak_norm(),
        }
    }
}

/// `[hpf]` / `[lpf]` section.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CutoffSettings {
    /// Cutoff frequency in Hz.
    pub freq: f64,
}

/// One `[[parametric]]` band.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ParametricBand {
    /// Center frequency in Hz.
    pub freq: f64,
    /// Boost or cut in dB.
    pub gain: f64,
    /// Quality factor.
    pub q: f64,
}

/// One `[[band_stop]]` band.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BandStopBand {
    /// Center frequency in Hz.
    pub freq: f64,
    /// Quality factor.
    pub q: f64,
}

/// `[low_shelf]` section.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ShelfSettings {
    /// Shelf frequency in Hz.
    pub freq: f64,
    /// Shelf gain in dB.
    pub gain: f64,
}

/// Detector rectification as written in the config.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Detection {
    /// Absolute value.
    Peak,
    /// Square.
    MeanSquare,
    /// Root of the square.
    #[default]
    Rms,
}

impl From<Detection> for DetectionMode {
    fn from(detection: Detection) -> Self {
        match detection {
            Detection::Peak => DetectionMode::Peak,
            Detection::MeanSquare => DetectionMode::MeanSquare,
            Detection::Rms => DetectionMode::Rms,
        }
    }
}

/// `[compressor]` section. Times in ms, levels in dB.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CompressorSettings {
    /// Threshold in dB.
    pub threshold: f64,
    /// Compression ratio.
    pub ratio: f64,
    /// Attack in ms.
    pub attack: f64,
    /// Release in ms.
    pub release: f64,
    /// Knee width in dB.
    #[serde(default)]
    pub knee: f64,
    /// Lookahead in ms.
    #[serde(default)]
    pub lookahead: f64,
    /// Gain into the detector in dB.
    #[serde(default)]
    pub input_gain: f64,
    /// Gain after compression in dB.
    #[serde(default)]
    pub output_gain: f64,
    /// Detector rectification.
    #[serde(default)]
    pub detection: Detection,
    /// Use the analog time-constant convention.
    #[serde(default)]
    pub analog: bool,
    /// Hard-limit instead of compressing by `ratio`.
    #[serde(default)]
    pub limit: bool,
}

impl MasteringConfig {
    /// Load a config from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let config = Self::from_toml(&content)?;
        tracing::debug!(path = %path.display(), stages = config.stage_count(), "loaded config");
        Ok(config)
    }

    /// Parse a config from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the config to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Number of processing stages the config describes.
    pub fn stage_count(&self) -> usize {
        usize::from(self.hpf.is_some())
            + usize::from(self.lpf.is_some())
            + self.parametric.len()
            + self.band_stop.len()
            + usize::from(self.low_shelf.is_some())
            + usize::from(self.compressor.is_some())
    }
}
