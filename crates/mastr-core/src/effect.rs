//! Core processing traits.
//!
//! [`Effect`] is the mono, one-sample-at-a-time contract every processor in
//! this crate implements. [`FrameEffect`] lifts that to interleaved audio:
//! one call handles one frame (one sample per channel).
//!
//! ## Design Decisions
//!
//! - **Dual-mono stereo**: Multichannel filtering runs one independent mono
//!   instance per channel with identical coefficients ([`DualMono`]).
//!   Dynamics share one detector across channels
//!   ([`LinkedCompressor`](crate::LinkedCompressor)).
//!
//! - **Object-safe**: Both traits work as `dyn` so a configured chain can be
//!   assembled at runtime as `Vec<Box<dyn FrameEffect + Send>>`.
//!
//! - **No sample-rate hot swap**: Chains are designed for one file at a known
//!   rate and rebuilt for the next, so neither trait carries `set_sample_rate`.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// Mono sample processor.
///
/// # Example
///
/// ```rust
/// use mastr_core::Effect;
///
/// struct Gain {
///     gain: f64,
/// }
///
/// impl Effect for Gain {
///     fn process(&mut self, input: f64) -> f64 {
///         input * self.gain
///     }
///
///     fn reset(&mut self) {}
/// }
///
/// let mut g = Gain { gain: 0.5 };
/// let mut block = [1.0, 2.0];
/// g.process_block_inplace(&mut block);
/// assert_eq!(block, [0.5, 1.0]);
/// ```
pub trait Effect {
    /// Process a single sample, advancing internal state by one step.
    fn process(&mut self, input: f64) -> f64;

    /// Process a block of samples in place.
    fn process_block_inplace(&mut self, buffer: &mut [f64]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    /// Clear history (filter state, delay contents, envelope) without
    /// touching parameters.
    fn reset(&mut self);

    /// Processing latency in samples. Default is 0.
    fn latency_samples(&self) -> usize {
        0
    }
}

/// Processor for interleaved multichannel audio.
pub trait FrameEffect {
    /// Process one frame in place. `frame.len()` is the channel count.
    fn process_frame(&mut self, frame: &mut [f64]);

    /// Process an interleaved buffer in place.
    ///
    /// A trailing partial frame is left untouched.
    fn process_interleaved(&mut self, buffer: &mut [f64], channels: usize) {
        if channels == 0 {
            return;
        }
        for frame in buffer.chunks_exact_mut(channels) {
            self.process_frame(frame);
        }
    }

    /// Clear all internal state.
    fn reset(&mut self);

    /// Processing latency in samples (frames).
    fn latency_samples(&self) -> usize {
        0
    }
}

/// One independent copy of a mono [`Effect`] per channel.
///
/// Every copy starts from the same configured prototype, so coefficients are
/// identical across channels while histories never mix.
///
/// ```rust
/// use mastr_core::{DualMono, Filter, FilterSpec, FrameEffect};
///
/// let lpf = Filter::new(FilterSpec::LowPass { freq: 8000.0 }, 48000.0).unwrap();
/// let mut stereo = DualMono::new(lpf, 2);
/// let mut frame = [0.5, -0.5];
/// stereo.process_frame(&mut frame);
/// assert_eq!(frame[0], -frame[1]);
/// ```
#[derive(Debug, Clone)]
pub struct DualMono<E> {
    channels: Vec<E>,
}

impl<E: Effect + Clone> DualMono<E> {
    /// Clone `prototype` once per channel.
    pub fn new(prototype: E, channels: usize) -> Self {
        Self {
            channels: core::iter::repeat_n(prototype, channels).collect(),
        }
    }
}

impl<E> DualMono<E> {
    /// Number of channels.
    pub fn channels(&self) -> usize {
        self.channels.len()
    }

    /// Access one channel's processor.
    pub fn channel(&self, index: usize) -> Option<&E> {
        self.channels.get(index)
    }
}

impl<E: Effect> FrameEffect for DualMono<E> {
    #[inline]
    fn process_frame(&mut self, frame: &mut [f64]) {
        for (sample, effect) in frame.iter_mut().zip(self.channels.iter_mut()) {
            *sample = effect.process(*sample);
        }
    }

    fn reset(&mut self) {
        for effect in &mut self.channels {
            effect.reset();
        }
    }

    fn latency_samples(&self) -> usize {
        self.channels
            .iter()
            .map(Effect::latency_samples)
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct Accumulate(f64);

    impl Effect for Accumulate {
        fn process(&mut self, input: f64) -> f64 {
            self.0 += input;
            self.0
        }
        fn reset(&mut self) {
            self.0 = 0.0;
        }
        fn latency_samples(&self) -> usize {
            3
        }
    }

    #[test]
    fn test_block_inplace() {
        let mut acc = Accumulate(0.0);
        let mut block = [1.0, 1.0, 1.0];
        acc.process_block_inplace(&mut block);
        assert_eq!(block, [1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_dual_mono_keeps_channels_independent() {
        let mut stereo = DualMono::new(Accumulate(0.0), 2);
        let mut buffer = [1.0, 10.0, 1.0, 10.0, 1.0, 10.0];
        stereo.process_interleaved(&mut buffer, 2);
        assert_eq!(buffer, [1.0, 10.0, 2.0, 20.0, 3.0, 30.0]);
        assert_eq!(stereo.channels(), 2);
        assert_eq!(stereo.latency_samples(), 3);
    }

    #[test]
    fn test_partial_frame_untouched() {
        let mut stereo = DualMono::new(Accumulate(0.0), 2);
        let mut buffer = [1.0, 1.0, 5.0];
        stereo.process_interleaved(&mut buffer, 2);
        assert_eq!(buffer, [1.0, 1.0, 5.0]);
    }

    #[test]
    fn test_dual_mono_reset() {
        let mut stereo = DualMono::new(Accumulate(0.0), 2);
        let mut frame = [4.0, 4.0];
        stereo.process_frame(&mut frame);
        FrameEffect::reset(&mut stereo);
        let mut frame = [1.0, 2.0];
        stereo.process_frame(&mut frame);
        assert_eq!(frame, [1.0, 2.0]);
    }
}
