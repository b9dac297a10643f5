//! Block-wise processing of whole files.

use mastr_core::FrameEffect;

use crate::{Error, Result};

/// Frames per block when no size is given.
pub const DEFAULT_BLOCK_FRAMES: usize = 4096;

/// Runs a list of stages over interleaved audio, one block at a time.
///
/// The engine uses `Send` bounds so a whole engine can move onto a worker
/// thread.
pub struct ProcessingEngine {
    stages: Vec<Box<dyn FrameEffect + Send>>,
    channels: usize,
    block_frames: usize,
}

impl ProcessingEngine {
    /// Create an empty engine for `channels` interleaved channels.
    pub fn new(channels: usize) -> Self {
        Self {
            stages: Vec::new(),
            channels,
            block_frames: DEFAULT_BLOCK_FRAMES,
        }
    }

    /// Use blocks of `frames` frames (at least 1).
    #[must_use]
    pub fn with_block_frames(mut self, frames: usize) -> Self {
        self.block_frames = frames.max(1);
        self
    }

    /// Interleaved channel count.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Frames per block.
    pub fn block_frames(&self) -> usize {
        self.block_frames
    }

    /// Append a stage.
    pub fn add_stage(&mut self, stage: Box<dyn FrameEffect + Send>) {
        self.stages.push(stage);
    }

    /// Get the number of stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Check if the engine has no stages.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Get the total latency in frames.
    pub fn latency_samples(&self) -> usize {
        self.stages.iter().map(|s| s.latency_samples()).sum()
    }

    /// Reset all stages.
    pub fn reset(&mut self) {
        for stage in &mut self.stages {
            stage.reset();
        }
    }

    fn check_frames(&self, len: usize) -> Result<()> {
        if self.channels == 0 || len % self.channels != 0 {
            return Err(Error::ChannelMismatch {
                samples: len,
                channels: self.channels,
            });
        }
        Ok(())
    }

    /// Process one interleaved block in place.
    pub fn process_block_inplace(&mut self, buffer: &mut [f64]) -> Result<()> {
        self.check_frames(buffer.len())?;
        for stage in &mut self.stages {
            stage.process_interleaved(buffer, self.channels);
        }
        Ok(())
    }

    /// Process an entire file's worth of samples.
    ///
    /// Returns a new vector with processed samples.
    pub fn process_file(&mut self, input: &[f64]) -> Result<Vec<f64>> {
        self.check_frames(input.len())?;

        let mut output = input.to_vec();
        let block_len = self.block_frames * self.channels;
        for block in output.chunks_mut(block_len) {
            for stage in &mut self.stages {
                stage.process_interleaved(block, self.channels);
            }
        }

        tracing::debug!(
            frames = input.len() / self.channels,
            stages = self.stages.len(),
            "processed buffer"
        );
        Ok(output)
    }
}

impl std::fmt::Debug for ProcessingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessingEngine")
            .field("stages", &self.stages.len())
            .field("channels", &self.channels)
            .field("block_frames", &self.block_frames)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mastr_core::{DualMono, Filter, FilterSpec};

    struct Scale(f64);

    impl FrameEffect for Scale {
        fn process_frame(&mut self, frame: &mut [f64]) {
            for sample in frame {
                *sample *= self.0;
            }
        }

        fn reset(&mut self) {}

        fn latency_samples(&self) -> usize {
            3
        }
    }

    #[test]
    fn test_empty_engine_is_identity() {
        let mut engine = ProcessingEngine::new(2);
        assert!(engine.is_empty());
        let input = vec![0.1, 0.2, 0.3, 0.4];
        assert_eq!(engine.process_file(&input).unwrap(), input);
    }

    #[test]
    fn test_stages_run_in_order() {
        let mut engine = ProcessingEngine::new(1);
        engine.add_stage(Box::new(Scale(2.0)));
        engine.add_stage(Box::new(Scale(0.25)));
        assert_eq!(engine.len(), 2);
        assert_eq!(engine.latency_samples(), 6);

        let output = engine.process_file(&[1.0, -1.0]).unwrap();
        assert_eq!(output, vec![0.5, -0.5]);
    }

    #[test]
    fn test_block_size_does_not_change_result() {
        let spec = FilterSpec::Parametric {
            freq: 1000.0,
            gain_db: 4.0,
            q: 0.9,
        };
        let input: Vec<f64> = (0..3001)
            .flat_map(|i| {
                let x = (i as f64 * 0.05).sin();
                [x, -0.5 * x]
            })
            .collect();

        let mut outputs = Vec::new();
        for frames in [1, 7, 64, DEFAULT_BLOCK_FRAMES] {
            let mut engine = ProcessingEngine::new(2).with_block_frames(frames);
            let filter = Filter::new(spec, 48000.0).unwrap();
            engine.add_stage(Box::new(DualMono::new(filter, 2)));
            outputs.push(engine.process_file(&input).unwrap());
        }
        for output in &outputs[1..] {
            assert_eq!(output, &outputs[0]);
        }
    }

    #[test]
    fn test_trailing_partial_block_is_processed() {
        let mut engine = ProcessingEngine::new(2).with_block_frames(100);
        engine.add_stage(Box::new(Scale(0.5)));
        let output = engine.process_file(&vec![1.0; 2 * 250]).unwrap();
        assert_eq!(output.len(), 500);
        assert!(output.iter().all(|&s| s == 0.5));
    }

    #[test]
    fn test_partial_frame_rejected() {
        let mut engine = ProcessingEngine::new(2);
        assert!(matches!(
            engine.process_file(&[0.0; 5]),
            Err(Error::ChannelMismatch {
                samples: 5,
                channels: 2
            })
        ));
        let mut block = [0.0; 3];
        assert!(engine.process_block_inplace(&mut block).is_err());

        let mut zero = ProcessingEngine::new(0);
        assert!(zero.process_file(&[]).is_err());
    }
}
