//! Zero-padded signal store that yields windowed frames at a fixed hop.

use alloc::vec;
use alloc::vec::Vec;

use crate::error::{Error, Result};
use crate::window::Window;

/// Holds one waveform padded so that every sample is covered by at least one
/// window, and hands out windowed frames `0..frame_count`.
///
/// The left padding is `window_len - hop`, so the last `hop` samples of frame
/// zero are the first `hop` samples of the signal. The right padding makes the
/// last frame end exactly at the end of the padded buffer.
#[derive(Clone, Debug)]
pub struct FrameBuffer {
    padded: Vec<f64>,
    window: Window,
    hop: usize,
    channels: usize,
    signal_len: usize,
    frame_count: usize,
}

impl FrameBuffer {
    /// Interleaved multi-channel input is framed as a single sequence of
    /// `samples.len()` values; `samples.len()` must be a multiple of
    /// `channels`.
    pub fn new<S>(samples: &[S], channels: usize, window: Window, hop: usize) -> Result<Self>
    where
        S: Copy + Into<f64>,
    {
        let window_len = window.len();
        if channels == 0 {
            return Err(Error::InvalidConfig("channel count must be positive"));
        }
        if samples.len() % channels != 0 {
            return Err(Error::InvalidConfig(
                "sample count must be a multiple of the channel count",
            ));
        }
        if window_len == 0 {
            return Err(Error::InvalidConfig("window length must be positive"));
        }
        if hop == 0 || hop > window_len {
            return Err(Error::InvalidConfig("hop must lie in [1, window length]"));
        }
        if window.hop().is_some_and(|h| h != hop) {
            return Err(Error::InvalidConfig(
                "hop differs from the hop the window was designed for",
            ));
        }

        let signal_len = samples.len();
        let pad_left = window_len - hop;
        let frame_count = (signal_len + pad_left).div_ceil(hop);
        let padded_len = match frame_count {
            0 => 0,
            n => (n - 1) * hop + window_len,
        };
        let mut padded = vec![0.0; padded_len];
        for (dst, &s) in padded[pad_left..].iter_mut().zip(samples) {
            *dst = s.into();
        }
        Ok(Self {
            padded,
            window,
            hop,
            channels,
            signal_len,
            frame_count,
        })
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Samples of left padding; an output sample `t` of overlap-add synthesis
    /// corresponds to input sample `t - latency()`.
    pub fn latency(&self) -> usize {
        self.window.len() - self.hop
    }

    pub fn padded_len(&self) -> usize {
        self.padded.len()
    }

    pub fn signal_len(&self) -> usize {
        self.signal_len
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn hop(&self) -> usize {
        self.hop
    }

    pub fn window_len(&self) -> usize {
        self.window.len()
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Write windowed frame `k` into `out`, which must be `window_len()` long.
    pub fn frame_into(&self, k: usize, out: &mut [f64]) -> Result<()> {
        if k >= self.frame_count {
            return Err(Error::FrameOutOfRange {
                index: k,
                count: self.frame_count,
            });
        }
        let len = self.window.len();
        if out.len() != len {
            return Err(Error::ContractViolation {
                what: "frame buffer",
                expected: len,
                actual: out.len(),
            });
        }
        let start = k * self.hop;
        let segment = &self.padded[start..start + len];
        for ((o, &x), &w) in out.iter_mut().zip(segment).zip(self.window.as_slice()) {
            *o = x * w;
        }
        Ok(())
    }

    /// Windowed frame `k` in a fresh buffer.
    pub fn frame(&self, k: usize) -> Result<Vec<f64>> {
        let mut out = vec![0.0; self.window.len()];
        self.frame_into(k, &mut out)?;
        Ok(out)
    }
}
