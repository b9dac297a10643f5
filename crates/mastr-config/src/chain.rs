//! Processing chain construction.
//!
//! A [`ProcessingChain`] is what a [`MasteringConfig`] becomes once the
//! input file's sample rate and channel count are known. Stage order is
//! fixed: high-pass, low-pass, parametric bands, band-stops, low shelf,
//! compressor. The master gain is applied to every sample before the first
//! stage.
//!
//! # Example
//!
//! ```rust
//! use mastr_config::{MasteringConfig, ProcessingChain};
//!
//! let config = MasteringConfig::from_toml("[hpf]\nfreq = 40.0\n").unwrap();
//! let mut chain = ProcessingChain::from_config(&config, 48000.0, 2).unwrap();
//!
//! let mut audio = vec![0.1, -0.1, 0.2, -0.2];
//! chain.process_buffer(&mut audio);
//! assert_eq!(chain.stage_names(), vec!["hpf"]);
//! ```

use mastr_core::{
    Compressor, DualMono, Filter, FilterSpec, FrameEffect, LinkedCompressor, TimeConstant,
};

use crate::config::{CompressorSettings, MasteringConfig};
use crate::error::ConfigError;

/// One named stage of the chain.
struct Stage {
    name: String,
    effect: Box<dyn FrameEffect + Send>,
}

/// The full per-file processing chain, operating on interleaved frames.
pub struct ProcessingChain {
    stages: Vec<Stage>,
    master_gain: f64,
    channels: usize,
    sample_rate: f64,
}

impl ProcessingChain {
    /// Build every stage the config describes at `sample_rate` for
    /// `channels` interleaved channels.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Stage`] naming the first stage whose parameters
    /// the DSP layer rejects, e.g. a cutoff at or above Nyquist.
    pub fn from_config(
        config: &MasteringConfig,
        sample_rate: f64,
        channels: usize,
    ) -> Result<Self, ConfigError> {
        let mut chain = Self {
            stages: Vec::with_capacity(config.stage_count()),
            master_gain: config.master.gain,
            channels,
            sample_rate,
        };

        if let Some(hpf) = &config.hpf {
            chain.push_filter("hpf".to_string(), FilterSpec::HighPass { freq: hpf.freq })?;
        }
        if let Some(lpf) = &config.lpf {
            chain.push_filter("lpf".to_string(), FilterSpec::LowPass { freq: lpf.freq })?;
        }
        for (i, band) in config.parametric.iter().enumerate() {
            chain.push_filter(
                format!("parametric.{i}"),
                FilterSpec::Parametric {
                    freq: band.freq,
                    gain_db: band.gain,
                    q: band.q,
                },
            )?;
        }
        for (i, band) in config.band_stop.iter().enumerate() {
            chain.push_filter(
                format!("band_stop.{i}"),
                FilterSpec::BandStop {
                    freq: band.freq,
                    q: band.q,
                },
            )?;
        }
        if let Some(shelf) = &config.low_shelf {
            chain.push_filter(
                "low_shelf".to_string(),
                FilterSpec::LowShelf {
                    freq: shelf.freq,
                    gain_db: shelf.gain,
                },
            )?;
        }
        if let Some(settings) = &config.compressor {
            let compressor = build_compressor(settings, sample_rate)
                .map_err(|e| ConfigError::stage("compressor", e))?;
            tracing::debug!(
                threshold_db = settings.threshold,
                ratio = settings.ratio,
                lookahead_ms = settings.lookahead,
                "built compressor"
            );
            chain.stages.push(Stage {
                name: "compressor".to_string(),
                effect: Box::new(LinkedCompressor::new(compressor, channels)),
            });
        }

        Ok(chain)
    }

    fn push_filter(&mut self, name: String, spec: FilterSpec) -> Result<(), ConfigError> {
        let filter =
            Filter::new(spec, self.sample_rate).map_err(|e| ConfigError::stage(&name, e))?;
        if !filter.coefficients().is_stable() {
            tracing::warn!(
                stage = %name,
                ?spec,
                sample_rate = self.sample_rate,
                "filter poles lie on or outside the unit circle; output may blow up"
            );
        }
        tracing::debug!(stage = %name, ?spec, "built filter");
        self.stages.push(Stage {
            name,
            effect: Box::new(DualMono::new(filter, self.channels)),
        });
        Ok(())
    }

    /// Process an interleaved buffer with the chain's own channel count.
    ///
    /// A trailing partial frame is left untouched.
    pub fn process_buffer(&mut self, buffer: &mut [f64]) {
        let channels = self.channels;
        self.process_interleaved(buffer, channels);
    }

    /// Number of stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Whether the chain only applies the master gain.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Stage names in processing order.
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name.as_str()).collect()
    }

    /// Interleaved channel count.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Sample rate the stages were designed for.
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Linear gain applied before the first stage.
    pub fn master_gain(&self) -> f64 {
        self.master_gain
    }
}

impl FrameEffect for ProcessingChain {
    fn process_frame(&mut self, frame: &mut [f64]) {
        for sample in frame.iter_mut() {
            *sample *= self.master_gain;
        }
        for stage in &mut self.stages {
            stage.effect.process_frame(frame);
        }
    }

    /// Runs each stage over the whole buffer in turn.
    fn process_interleaved(&mut self, buffer: &mut [f64], channels: usize) {
        if channels == 0 {
            return;
        }
        let usable = buffer.len() - buffer.len() % channels;
        let buffer = &mut buffer[..usable];

        if self.master_gain != 1.0 {
            for sample in buffer.iter_mut() {
                *sample *= self.master_gain;
            }
        }
        for stage in &mut self.stages {
            stage.effect.process_interleaved(buffer, channels);
        }
    }

    fn reset(&mut self) {
        for stage in &mut self.stages {
            stage.effect.reset();
        }
    }

    /// Total latency in frames, summed over stages.
    fn latency_samples(&self) -> usize {
        self.stages.iter().map(|s| s.effect.latency_samples()).sum()
    }
}

impl std::fmt::Debug for ProcessingChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessingChain")
            .field("stages", &self.stage_names())
            .field("master_gain", &self.master_gain)
            .field("channels", &self.channels)
            .field("sample_rate", &self.sample_rate)
            .finish()
    }
}

fn build_compressor(
    settings: &CompressorSettings,
    sample_rate: f64,
) -> Result<Compressor, mastr_core::DspError> {
    let mut comp = Compressor::new(sample_rate)?;
    comp.set_detection_mode(settings.detection.into());
    comp.set_time_constant(if settings.analog {
        TimeConstant::Analog
    } else {
        TimeConstant::Digital
    });
    comp.set_threshold_db(settings.threshold)?;
    comp.set_ratio(settings.ratio)?;
    comp.set_knee_db(settings.knee)?;
    comp.set_attack_ms(settings.attack)?;
    comp.set_release_ms(settings.release)?;
    comp.set_lookahead_ms(settings.lookahead)?;
    comp.set_input_gain_db(settings.input_gain)?;
    comp.set_output_gain_db(settings.output_gain)?;
    comp.set_limit(settings.limit);
    Ok(comp)
}
