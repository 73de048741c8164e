//! One-shot enhancement of in-memory waveforms.

use alloc::vec::Vec;

use crate::config::{StreamConfig, StreamGeometry};
use crate::error::Result;
use crate::fft::FftPlanner;
use crate::frame::FrameBuffer;
use crate::normalize::OnlineNormalizer;
use crate::num::Float;
use crate::pipeline::{run, MaskEngine};
use crate::rfft::RealFft;
use crate::stft::{AnalysisStream, SynthesisStream};
use crate::transform::SpectralTransform;
use crate::window::Window;

/// Designs the window and plans the transform once, then opens independent
/// streams that share both read-only.
#[derive(Clone)]
pub struct Enhancer<T: Float = f32> {
    config: StreamConfig,
    geometry: StreamGeometry,
    window: Window,
    rfft: RealFft<T>,
}

/// Output of [`Enhancer::enhance`].
#[derive(Clone, Debug, PartialEq)]
pub struct Enhanced {
    /// Reconstructed samples, `frames · hop` long.
    pub samples: Vec<f64>,
    pub frames: usize,
    /// Leading samples of analysis padding in `samples`.
    pub latency: usize,
}

impl Enhanced {
    /// Output aligned with the input: sample `i` corresponds to input sample
    /// `i`. At most `input_len` samples.
    pub fn aligned(&self, input_len: usize) -> &[f64] {
        let start = self.latency.min(self.samples.len());
        let end = (self.latency + input_len).min(self.samples.len());
        &self.samples[start..end]
    }
}

impl<T: Float> Enhancer<T> {
    /// Resolve `config` at `sample_rate`, design the window and plan the
    /// real FFT.
    ///
    /// Synthesis overlap-adds only two hops of each frame. A window longer
    /// than `2·hop` (hop fraction below 0.5) is accepted, but the overlap
    /// past two hops is dropped and a unity mask no longer reconstructs the
    /// input; check [`StreamGeometry::is_fully_overlapped`] when that
    /// matters.
    pub fn new(config: StreamConfig, sample_rate: u32) -> Result<Self> {
        let geometry = config.geometry(sample_rate)?;
        let window = Window::design(geometry.window_len, config.hop_fraction)?;
        let mut planner = FftPlanner::new();
        let rfft = RealFft::new(&mut planner, geometry.dft_size)?;
        Ok(Self {
            config,
            geometry,
            window,
            rfft,
        })
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    pub fn geometry(&self) -> &StreamGeometry {
        &self.geometry
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Open an analysis/synthesis stream pair over `samples`.
    pub fn open<S>(
        &self,
        samples: &[S],
        channels: usize,
    ) -> Result<(AnalysisStream<T>, SynthesisStream<T>)>
    where
        S: Copy + Into<f64>,
    {
        let g = &self.geometry;
        let frames = FrameBuffer::new(samples, channels, self.window.clone(), g.hop)?;
        let frame_count = frames.frame_count();
        let transform = SpectralTransform::from_plan(self.rfft.clone(), self.config.zero_phase)?;
        let normalizer = OnlineNormalizer::new(&self.config.normalizer, g.bins)?;
        let analysis = AnalysisStream::new(
            frames,
            transform.clone(),
            normalizer,
            self.config.spectral_floor_db,
        )?;
        let synthesis = SynthesisStream::new(transform, g.hop, frame_count)?;
        Ok((analysis, synthesis))
    }

    /// Run `samples` through `engine` and return the reconstruction.
    pub fn enhance<S, E>(&self, samples: &[S], channels: usize, engine: &mut E) -> Result<Enhanced>
    where
        S: Copy + Into<f64>,
        E: MaskEngine + ?Sized,
    {
        let (mut analysis, mut synthesis) = self.open(samples, channels)?;
        let latency = analysis.latency();
        let frames = run(&mut analysis, engine, &mut synthesis)?;
        Ok(Enhanced {
            samples: synthesis.into_output(),
            frames,
            latency,
        })
    }

    /// Enhance independent waveforms in parallel, one engine per waveform.
    #[cfg(feature = "parallel")]
    pub fn enhance_batch<S, E, F>(
        &self,
        inputs: &[&[S]],
        channels: usize,
        make_engine: F,
    ) -> Result<Vec<Enhanced>>
    where
        S: Copy + Into<f64> + Sync,
        E: MaskEngine,
        F: Fn(usize) -> E + Sync,
    {
        use rayon::prelude::*;

        inputs
            .par_iter()
            .enumerate()
            .map(|(i, samples)| {
                let mut engine = make_engine(i);
                self.enhance(samples, channels, &mut engine)
            })
            .collect()
    }
}
