//! Frame-by-frame driver between a feature source, a mask engine and a sink.
//!
//! Frames are processed strictly in order: frame `k` is analysed, masked and
//! synthesised before frame `k + 1` is produced. The engine boundary carries
//! `f32` tensors.

use alloc::vec;
use alloc::vec::Vec;

use crate::error::{Error, Result};
use crate::feature::SpectralFrame;

/// Produces one normalised feature vector per frame.
pub trait FrameSource {
    fn frame_count(&self) -> usize;

    fn bins(&self) -> usize;

    /// Write the next feature vector into `feature` and return its frame
    /// index, or `None` once every frame has been produced.
    fn next_feature(&mut self, feature: &mut [f32]) -> Result<Option<usize>>;

    /// Analysis state of the frame last returned by
    /// [`next_feature`](Self::next_feature).
    fn current(&self) -> &SpectralFrame;
}

/// Consumes one mask per frame.
pub trait FrameSink {
    fn consume(&mut self, frame: &SpectralFrame, mask: &[f32]) -> Result<()>;
}

/// Maps a feature vector to a spectral mask of the same width.
pub trait MaskEngine {
    fn bins(&self) -> usize;

    /// Lengths of the engine's auxiliary tensors, e.g. recurrent state.
    fn aux_lens(&self) -> Vec<usize> {
        Vec::new()
    }

    fn infer(&mut self, feature: &[f32], aux: &mut AuxState, mask: &mut [f32]) -> Result<()>;
}

impl<E: MaskEngine + ?Sized> MaskEngine for &mut E {
    fn bins(&self) -> usize {
        (**self).bins()
    }

    fn aux_lens(&self) -> Vec<usize> {
        (**self).aux_lens()
    }

    fn infer(&mut self, feature: &[f32], aux: &mut AuxState, mask: &mut [f32]) -> Result<()> {
        (**self).infer(feature, aux, mask)
    }
}

/// Auxiliary engine tensors carried from one frame to the next.
///
/// The engine reads the inputs and writes the outputs; after each frame the
/// outputs become the next frame's inputs. Everything is zero before the
/// first frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AuxState {
    lens: Vec<usize>,
    inputs: Vec<Vec<f32>>,
    outputs: Vec<Vec<f32>>,
}

impl AuxState {
    pub fn new(lens: &[usize]) -> Self {
        Self {
            lens: lens.to_vec(),
            inputs: lens.iter().map(|&n| vec![0.0; n]).collect(),
            outputs: lens.iter().map(|&n| vec![0.0; n]).collect(),
        }
    }

    /// Number of auxiliary tensors.
    pub fn len(&self) -> usize {
        self.lens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lens.is_empty()
    }

    pub fn input(&self, i: usize) -> &[f32] {
        &self.inputs[i]
    }

    pub fn output_mut(&mut self, i: usize) -> &mut Vec<f32> {
        &mut self.outputs[i]
    }

    /// Inputs and outputs at once, for engines that read one while writing
    /// the other.
    pub fn split(&mut self) -> (&[Vec<f32>], &mut [Vec<f32>]) {
        (self.inputs.as_slice(), self.outputs.as_mut_slice())
    }

    /// Zero every tensor.
    pub fn reset(&mut self) {
        for t in self.inputs.iter_mut().chain(self.outputs.iter_mut()) {
            t.fill(0.0);
        }
    }

    /// Hand the outputs over as the next inputs.
    pub fn commit(&mut self) -> Result<()> {
        for ((input, output), &len) in self
            .inputs
            .iter_mut()
            .zip(self.outputs.iter())
            .zip(self.lens.iter())
        {
            if output.len() != len {
                return Err(Error::ContractViolation {
                    what: "auxiliary tensor",
                    expected: len,
                    actual: output.len(),
                });
            }
            input.copy_from_slice(output);
        }
        Ok(())
    }
}

/// Drive every frame of `source` through `engine` into `sink`. Returns the
/// number of frames processed.
pub fn run<S, E, K>(source: &mut S, engine: &mut E, sink: &mut K) -> Result<usize>
where
    S: FrameSource + ?Sized,
    E: MaskEngine + ?Sized,
    K: FrameSink + ?Sized,
{
    let bins = source.bins();
    if engine.bins() != bins {
        return Err(Error::ContractViolation {
            what: "mask engine width",
            expected: bins,
            actual: engine.bins(),
        });
    }
    let mut aux = AuxState::new(&engine.aux_lens());
    let mut feature = vec![0.0f32; bins];
    let mut mask = vec![0.0f32; bins];
    let mut processed = 0;
    while let Some(index) = source.next_feature(&mut feature)? {
        if index == 0 {
            aux.reset();
        }
        engine.infer(&feature, &mut aux, &mut mask)?;
        aux.commit()?;
        sink.consume(source.current(), &mask)?;
        processed += 1;
    }
    log_debug!(
        "stream finished: {} of {} frames",
        processed,
        source.frame_count()
    );
    Ok(processed)
}

/// Mask of all ones; the stream reconstructs its input.
#[derive(Clone, Copy, Debug)]
pub struct UnityMask {
    bins: usize,
}

impl UnityMask {
    pub fn new(bins: usize) -> Self {
        Self { bins }
    }
}

impl MaskEngine for UnityMask {
    fn bins(&self) -> usize {
        self.bins
    }

    fn infer(&mut self, _feature: &[f32], _aux: &mut AuxState, mask: &mut [f32]) -> Result<()> {
        mask.fill(1.0);
        Ok(())
    }
}

/// Adapts a closure `(feature, mask)` into a stateless [`MaskEngine`].
pub struct FnMask<F> {
    bins: usize,
    f: F,
}

impl<F> FnMask<F>
where
    F: FnMut(&[f32], &mut [f32]),
{
    pub fn new(bins: usize, f: F) -> Self {
        Self { bins, f }
    }
}

impl<F> MaskEngine for FnMask<F>
where
    F: FnMut(&[f32], &mut [f32]),
{
    fn bins(&self) -> usize {
        self.bins
    }

    fn infer(&mut self, feature: &[f32], _aux: &mut AuxState, mask: &mut [f32]) -> Result<()> {
        (self.f)(feature, mask);
        Ok(())
    }
}
