//! Hop-by-hop overlap-add reconstruction.

use alloc::vec;
use alloc::vec::Vec;

use crate::error::{Error, Result};

/// Rebuilds a waveform from time frames one hop at a time.
///
/// Each pushed frame resolves `hop` output samples: its first `hop` samples
/// plus the carried tail of the previous frame. Samples `hop..2·hop` of the
/// frame become the new carry; anything past `2·hop` is dropped, which is
/// exact as long as the analysis window spans at most two hops.
#[derive(Clone, Debug)]
pub struct SynthesisAccumulator {
    hop: usize,
    frame_len: usize,
    carry: Vec<f64>,
    output: Vec<f64>,
    frames: usize,
    capacity: usize,
}

impl SynthesisAccumulator {
    /// Accumulator for `frame_count` frames of `frame_len` samples.
    /// Requires `2·hop <= frame_len`.
    pub fn new(hop: usize, frame_len: usize, frame_count: usize) -> Result<Self> {
        if hop == 0 {
            return Err(Error::InvalidConfig("hop must be positive"));
        }
        if 2 * hop > frame_len {
            return Err(Error::InvalidConfig(
                "synthesis frame must hold at least two hops",
            ));
        }
        Ok(Self {
            hop,
            frame_len,
            carry: vec![0.0; hop],
            output: Vec::with_capacity(frame_count * hop),
            frames: 0,
            capacity: frame_count,
        })
    }

    pub fn hop(&self) -> usize {
        self.hop
    }

    /// Frames pushed so far.
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Unresolved tail waiting for the next frame.
    pub fn carry(&self) -> &[f64] {
        &self.carry
    }

    /// Overlap-add `frame` and return the hop it resolves.
    pub fn push(&mut self, frame: &[f64]) -> Result<&[f64]> {
        if frame.len() != self.frame_len {
            return Err(Error::ContractViolation {
                what: "synthesis frame",
                expected: self.frame_len,
                actual: frame.len(),
            });
        }
        if self.frames >= self.capacity {
            return Err(Error::FrameOutOfRange {
                index: self.frames,
                count: self.capacity,
            });
        }
        let start = self.output.len();
        let hop = self.hop;
        self.output
            .extend(frame[..hop].iter().zip(&self.carry).map(|(x, c)| x + c));
        self.carry.copy_from_slice(&frame[hop..2 * hop]);
        self.frames += 1;
        Ok(&self.output[start..])
    }

    /// Reconstructed samples so far, `frames() · hop` long.
    pub fn output(&self) -> &[f64] {
        &self.output
    }

    pub fn into_output(self) -> Vec<f64> {
        self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carry_is_added_to_next_hop() {
        let mut acc = SynthesisAccumulator::new(2, 4, 3).unwrap();
        assert_eq!(acc.push(&[1.0, 2.0, 3.0, 4.0]).unwrap(), &[1.0, 2.0]);
        assert_eq!(acc.carry(), &[3.0, 4.0]);
        assert_eq!(acc.push(&[10.0, 20.0, 30.0, 40.0]).unwrap(), &[13.0, 24.0]);
        assert_eq!(acc.push(&[0.0; 4]).unwrap(), &[30.0, 40.0]);
        assert_eq!(acc.output(), &[1.0, 2.0, 13.0, 24.0, 30.0, 40.0]);
    }

    #[test]
    fn samples_past_two_hops_are_dropped() {
        let mut acc = SynthesisAccumulator::new(2, 6, 2).unwrap();
        acc.push(&[1.0, 1.0, 1.0, 1.0, 9.0, 9.0]).unwrap();
        acc.push(&[1.0; 6]).unwrap();
        assert_eq!(acc.into_output(), vec![1.0, 1.0, 2.0, 2.0]);
    }

    #[test]
    fn rejects_short_frames_and_overflow() {
        let mut acc = SynthesisAccumulator::new(2, 4, 1).unwrap();
        assert!(matches!(
            acc.push(&[0.0; 3]),
            Err(Error::ContractViolation { expected: 4, actual: 3, .. })
        ));
        acc.push(&[0.0; 4]).unwrap();
        assert_eq!(
            acc.push(&[0.0; 4]).unwrap_err(),
            Error::FrameOutOfRange { index: 1, count: 1 }
        );
    }

    #[test]
    fn hop_larger_than_half_frame_is_rejected() {
        let err = SynthesisAccumulator::new(3, 5, 4).unwrap_err();
        assert!(err.is_configuration());
    }
}
