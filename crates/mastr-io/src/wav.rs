//! WAV file reading and writing.
//!
//! Samples travel as interleaved `f64` in `[-1, 1)`. Integer PCM is scaled by
//! `2^(bits - 1)` on the way in and clamped to the integer range on the way
//! out. 32-bit output is IEEE float and is written unclamped.

use crate::{Error, Result};
use hound::{SampleFormat, WavReader, WavWriter};
use std::path::Path;

/// Sample encoding of a WAV file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WavFormat {
    /// Integer PCM.
    Pcm,
    /// IEEE float.
    IeeeFloat,
}

/// Channel layout, rate and depth of a WAV file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavSpec {
    /// Interleaved channel count.
    pub channels: u16,
    /// Frames per second.
    pub sample_rate: u32,
    /// Bits per sample. Written files support 16, 24 and 32 (float).
    pub bits_per_sample: u16,
}

impl Default for WavSpec {
    fn default() -> Self {
        Self {
            channels: 2,
            sample_rate: 44100,
            bits_per_sample: 16,
        }
    }
}

impl WavSpec {
    /// Encoding used when writing with this spec: 32 bits is float, the
    /// rest integer PCM.
    pub fn write_format(&self) -> WavFormat {
        if self.bits_per_sample == 32 {
            WavFormat::IeeeFloat
        } else {
            WavFormat::Pcm
        }
    }
}

impl From<hound::WavSpec> for WavSpec {
    fn from(spec: hound::WavSpec) -> Self {
        Self {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
        }
    }
}

impl From<WavSpec> for hound::WavSpec {
    fn from(spec: WavSpec) -> Self {
        let sample_format = match spec.write_format() {
            WavFormat::IeeeFloat => SampleFormat::Float,
            WavFormat::Pcm => SampleFormat::Int,
        };
        hound::WavSpec {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
            sample_format,
        }
    }
}

/// Header summary, read without decoding any samples.
#[derive(Debug, Clone)]
pub struct WavInfo {
    /// Interleaved channel count.
    pub channels: u16,
    /// Frames per second.
    pub sample_rate: u32,
    /// Bits per sample.
    pub bits_per_sample: u16,
    /// Frames (samples per channel).
    pub num_frames: u64,
    /// Length in seconds.
    pub duration_secs: f64,
    /// Stored encoding.
    pub format: WavFormat,
}

/// Read the header of a WAV file.
pub fn read_wav_info<P: AsRef<Path>>(path: P) -> Result<WavInfo> {
    let reader = WavReader::open(path)?;
    let hound_spec = reader.spec();
    let spec = WavSpec::from(hound_spec);
    let num_frames = u64::from(reader.len()) / u64::from(spec.channels.max(1));

    Ok(WavInfo {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: spec.bits_per_sample,
        num_frames,
        duration_secs: num_frames as f64 / f64::from(spec.sample_rate),
        format: match hound_spec.sample_format {
            SampleFormat::Float => WavFormat::IeeeFloat,
            SampleFormat::Int => WavFormat::Pcm,
        },
    })
}

/// Full-scale value for integer PCM of `bits` bits.
fn full_scale(bits: u16) -> f64 {
    (1i64 << (bits.clamp(1, 32) - 1)) as f64
}

/// Read a WAV file as interleaved `f64` samples along with its spec.
///
/// All channels are kept; frame `n` of channel `c` is at
/// `samples[n * channels + c]`.
pub fn read_wav<P: AsRef<Path>>(path: P) -> Result<(Vec<f64>, WavSpec)> {
    let path = path.as_ref();
    let reader = WavReader::open(path)?;
    let hound_spec = reader.spec();
    let spec = WavSpec::from(hound_spec);

    let samples: Vec<f64> = match hound_spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .map(|s| s.map(f64::from))
            .collect::<std::result::Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            let max_val = full_scale(spec.bits_per_sample);
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| f64::from(v) / max_val))
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };

    tracing::debug!(
        path = %path.display(),
        channels = spec.channels,
        sample_rate = spec.sample_rate,
        bits = spec.bits_per_sample,
        samples = samples.len(),
        "read wav"
    );
    Ok((samples, spec))
}

/// Write interleaved samples to a WAV file.
///
/// # Errors
///
/// [`Error::UnsupportedBitDepth`] unless `spec.bits_per_sample` is 16, 24 or
/// 32, and [`Error::ChannelMismatch`] if `samples` is not a whole number of
/// frames.
pub fn write_wav<P: AsRef<Path>>(path: P, samples: &[f64], spec: WavSpec) -> Result<()> {
    if !matches!(spec.bits_per_sample, 16 | 24 | 32) {
        return Err(Error::UnsupportedBitDepth(spec.bits_per_sample));
    }
    let channels = usize::from(spec.channels);
    if channels == 0 || samples.len() % channels != 0 {
        return Err(Error::ChannelMismatch {
            samples: samples.len(),
            channels,
        });
    }

    let path = path.as_ref();
    let mut writer = WavWriter::create(path, hound::WavSpec::from(spec))?;

    if spec.bits_per_sample == 32 {
        for &sample in samples {
            writer.write_sample(sample as f32)?;
        }
    } else {
        let max_val = full_scale(spec.bits_per_sample);
        for &sample in samples {
            let int_sample = (sample * max_val).round().clamp(-max_val, max_val - 1.0) as i32;
            writer.write_sample(int_sample)?;
        }
    }

    writer.finalize()?;
    tracing::debug!(path = %path.display(), samples = samples.len(), "wrote wav");
    Ok(())
}
