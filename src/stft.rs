//! Streaming STFT analysis and synthesis for mask-based enhancement.
//!
//! [`AnalysisStream`] turns a waveform into normalised log-power features one
//! frame at a time and keeps the magnitude/phasor of the current frame.
//! [`SynthesisStream`] applies a mask to that frame and overlap-adds the
//! result.
//!
//! # Examples
//! ```
//! use maskstft::{Enhancer, StreamConfig, UnityMask, pipeline};
//!
//! let enhancer = Enhancer::<f32>::new(StreamConfig::default(), 16_000).unwrap();
//! let signal = vec![0.25f32; 1_000];
//! let (mut analysis, mut synthesis) = enhancer.open(&signal, 1).unwrap();
//! let mut engine = UnityMask::new(enhancer.geometry().bins);
//! let frames = pipeline::run(&mut analysis, &mut engine, &mut synthesis).unwrap();
//! assert_eq!(frames, synthesis.frames());
//! ```

use alloc::vec;
use alloc::vec::Vec;

use crate::error::{Error, Result};
use crate::feature::{
    apply_mask_into, log_power_into, magnitude_phasor_into, SpectralFrame,
};
use crate::frame::FrameBuffer;
use crate::normalize::OnlineNormalizer;
use crate::num::Float;
use crate::pipeline::{FrameSink, FrameSource};
use crate::synthesis::SynthesisAccumulator;
use crate::transform::{HalfSpectrum, SpectralTransform};

/// Frame buffer → transform → magnitude/phasor → log power → normaliser.
pub struct AnalysisStream<T: Float = f32> {
    frames: FrameBuffer,
    transform: SpectralTransform<T>,
    normalizer: OnlineNormalizer,
    floor_db: f64,
    next: usize,
    frame: Vec<f64>,
    spectrum: HalfSpectrum,
    current: SpectralFrame,
    feature: Vec<f64>,
}

impl<T: Float> AnalysisStream<T> {
    pub fn new(
        frames: FrameBuffer,
        transform: SpectralTransform<T>,
        normalizer: OnlineNormalizer,
        floor_db: f64,
    ) -> Result<Self> {
        if transform.dft_size() < frames.window_len() {
            return Err(Error::InvalidConfig(
                "dft size must not be shorter than the window",
            ));
        }
        let bins = transform.bins();
        if normalizer.bins() != bins {
            return Err(Error::ContractViolation {
                what: "normalizer width",
                expected: bins,
                actual: normalizer.bins(),
            });
        }
        if !floor_db.is_finite() {
            return Err(Error::InvalidConfig("spectral floor must be finite"));
        }
        Ok(Self {
            frame: vec![0.0; frames.window_len()],
            spectrum: HalfSpectrum::zeros(bins),
            current: SpectralFrame::zeros(bins),
            feature: Vec::with_capacity(bins),
            frames,
            transform,
            normalizer,
            floor_db,
            next: 0,
        })
    }

    pub fn frame_buffer(&self) -> &FrameBuffer {
        &self.frames
    }

    pub fn normalizer(&self) -> &OnlineNormalizer {
        &self.normalizer
    }

    /// Index of the next frame to be produced.
    pub fn position(&self) -> usize {
        self.next
    }

    pub fn latency(&self) -> usize {
        self.frames.latency()
    }

    /// Like [`FrameSource::next_feature`] but in double precision.
    pub fn next_feature_f64(&mut self) -> Result<Option<(usize, &[f64])>> {
        if self.next >= self.frames.frame_count() {
            return Ok(None);
        }
        let k = self.next;
        self.frames.frame_into(k, &mut self.frame)?;
        self.transform.forward_into(&self.frame, &mut self.spectrum)?;
        magnitude_phasor_into(&self.spectrum, &mut self.current)?;
        log_power_into(&self.current.magnitude, self.floor_db, &mut self.feature);
        self.normalizer.normalize(&mut self.feature)?;
        self.next += 1;
        Ok(Some((k, &self.feature)))
    }
}

impl<T: Float> FrameSource for AnalysisStream<T> {
    fn frame_count(&self) -> usize {
        self.frames.frame_count()
    }

    fn bins(&self) -> usize {
        self.transform.bins()
    }

    fn next_feature(&mut self, feature: &mut [f32]) -> Result<Option<usize>> {
        let bins = self.transform.bins();
        if feature.len() != bins {
            return Err(Error::ContractViolation {
                what: "feature",
                expected: bins,
                actual: feature.len(),
            });
        }
        match self.next_feature_f64()? {
            Some((k, values)) => {
                for (dst, &v) in feature.iter_mut().zip(values) {
                    *dst = v as f32;
                }
                Ok(Some(k))
            }
            None => Ok(None),
        }
    }

    fn current(&self) -> &SpectralFrame {
        &self.current
    }
}

/// Mask → inverse transform → overlap-add.
pub struct SynthesisStream<T: Float = f32> {
    transform: SpectralTransform<T>,
    accumulator: SynthesisAccumulator,
    spectrum: HalfSpectrum,
    time: Vec<f64>,
}

impl<T: Float> SynthesisStream<T> {
    pub fn new(transform: SpectralTransform<T>, hop: usize, frame_count: usize) -> Result<Self> {
        let dft_size = transform.dft_size();
        Ok(Self {
            accumulator: SynthesisAccumulator::new(hop, dft_size, frame_count)?,
            spectrum: HalfSpectrum::zeros(transform.bins()),
            time: vec![0.0; dft_size],
            transform,
        })
    }

    /// Frames synthesised so far.
    pub fn frames(&self) -> usize {
        self.accumulator.frames()
    }

    pub fn output(&self) -> &[f64] {
        self.accumulator.output()
    }

    pub fn into_output(self) -> Vec<f64> {
        self.accumulator.into_output()
    }
}

impl<T: Float> FrameSink for SynthesisStream<T> {
    fn consume(&mut self, frame: &SpectralFrame, mask: &[f32]) -> Result<()> {
        apply_mask_into(frame, mask, &mut self.spectrum)?;
        self.transform.inverse_into(&self.spectrum, &mut self.time)?;
        self.accumulator.push(&self.time)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::NormalizerConfig;
    use crate::pipeline::{run, UnityMask};
    use crate::window::Window;

    fn streams(signal: &[f32]) -> (AnalysisStream, SynthesisStream) {
        let window = Window::design(16, 0.5).unwrap();
        let frames = FrameBuffer::new(signal, 1, window, 8).unwrap();
        let count = frames.frame_count();
        let transform = SpectralTransform::<f32>::new(32, false).unwrap();
        let normalizer = OnlineNormalizer::new(&NormalizerConfig::default(), 17).unwrap();
        let analysis = AnalysisStream::new(frames, transform.clone(), normalizer, -120.0).unwrap();
        let synthesis = SynthesisStream::new(transform, 8, count).unwrap();
        (analysis, synthesis)
    }

    #[test]
    fn analysis_yields_every_frame_once() {
        let signal: Vec<f32> = (0..40).map(|i| (i as f32 * 0.7).sin()).collect();
        let (mut analysis, _) = streams(&signal);
        let mut feature = vec![0.0f32; 17];
        let mut seen = Vec::new();
        while let Some(k) = analysis.next_feature(&mut feature).unwrap() {
            assert!(feature.iter().all(|v| v.is_finite()));
            seen.push(k);
        }
        assert_eq!(seen, (0..analysis.frame_count()).collect::<Vec<_>>());
        assert_eq!(analysis.normalizer().frames(), seen.len());
        assert_eq!(analysis.next_feature(&mut feature).unwrap(), None);
    }

    #[test]
    fn feature_width_is_checked() {
        let (mut analysis, _) = streams(&[0.0; 16]);
        let mut short = vec![0.0f32; 16];
        assert!(matches!(
            analysis.next_feature(&mut short),
            Err(Error::ContractViolation { what: "feature", .. })
        ));
    }

    #[test]
    fn unity_mask_reconstructs_with_latency() {
        let signal: Vec<f32> = (0..64).map(|i| ((i * 5) % 13) as f32 / 13.0 - 0.5).collect();
        let (mut analysis, mut synthesis) = streams(&signal);
        let latency = analysis.latency();
        let mut engine = UnityMask::new(17);
        let n = run(&mut analysis, &mut engine, &mut synthesis).unwrap();
        assert_eq!(n, analysis.frame_count());
        let out = synthesis.into_output();
        assert_eq!(out.len(), n * 8);
        for (i, &x) in signal.iter().enumerate() {
            assert!((out[i + latency] - x as f64).abs() < 1e-5, "sample {i}");
        }
    }

    #[test]
    fn short_dft_is_rejected() {
        let window = Window::design(16, 0.5).unwrap();
        let frames = FrameBuffer::new(&[0.0f32; 8], 1, window, 8).unwrap();
        let transform = SpectralTransform::<f32>::new(8, false).unwrap();
        let normalizer = OnlineNormalizer::new(&NormalizerConfig::default(), 5).unwrap();
        let err = AnalysisStream::new(frames, transform, normalizer, -120.0)
            .err()
            .unwrap();
        assert!(err.is_configuration());
    }

    #[test]
    fn truncated_phasor_is_rejected_by_synthesis() {
        let (_, mut synthesis) = streams(&[0.0; 16]);
        let mut frame = SpectralFrame::zeros(17);
        frame.phasor.re.truncate(12);
        assert!(matches!(
            synthesis.consume(&frame, &[1.0f32; 17]),
            Err(Error::ContractViolation { what: "phasor", .. })
        ));
        assert_eq!(synthesis.frames(), 0);
    }
}
