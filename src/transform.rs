//! Frame ↔ half-spectrum adapter over [`RealFft`].
//!
//! Frames and spectra cross this boundary as `f64`; the transform itself runs
//! in `T` (`f32` unless a double precision stream is requested).

use alloc::vec;
use alloc::vec::Vec;

use crate::error::{Error, Result};
use crate::fft::FftPlanner;
use crate::num::{Complex, Float};
use crate::rfft::RealFft;

/// Non-redundant half of a real DFT, `dft_size/2 + 1` bins.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HalfSpectrum {
    pub re: Vec<f64>,
    pub im: Vec<f64>,
}

impl HalfSpectrum {
    pub fn zeros(bins: usize) -> Self {
        Self {
            re: vec![0.0; bins],
            im: vec![0.0; bins],
        }
    }

    pub fn bins(&self) -> usize {
        self.re.len()
    }
}

/// Forward and inverse real DFT of a fixed size, with per-stream buffers.
#[derive(Clone)]
pub struct SpectralTransform<T: Float = f32> {
    rfft: RealFft<T>,
    zero_phase: bool,
    time: Vec<T>,
    spectrum: Vec<Complex<T>>,
}

impl<T: Float> SpectralTransform<T> {
    pub fn new(dft_size: usize, zero_phase: bool) -> Result<Self> {
        let mut planner = FftPlanner::new();
        Self::from_plan(RealFft::new(&mut planner, dft_size)?, zero_phase)
    }

    /// Build on an already planned real FFT, typically a clone sharing the
    /// twiddle tables of other streams.
    pub fn from_plan(rfft: RealFft<T>, zero_phase: bool) -> Result<Self> {
        let dft_size = rfft.len();
        if dft_size < 2 {
            return Err(Error::InvalidConfig("dft size must be at least 2"));
        }
        Ok(Self {
            time: vec![T::zero(); dft_size],
            spectrum: vec![Complex::zero(); rfft.bins()],
            rfft,
            zero_phase,
        })
    }

    pub fn dft_size(&self) -> usize {
        self.rfft.len()
    }

    pub fn bins(&self) -> usize {
        self.rfft.bins()
    }

    pub fn zero_phase(&self) -> bool {
        self.zero_phase
    }

    pub fn forward(&mut self, frame: &[f64]) -> Result<HalfSpectrum> {
        let mut out = HalfSpectrum::zeros(self.bins());
        self.forward_into(frame, &mut out)?;
        Ok(out)
    }

    /// Transform `frame` into `out`.
    ///
    /// Frames longer than the DFT are truncated. Shorter frames are
    /// zero-padded at the end, or, in zero-phase mode, rotated so that the
    /// sample at `len/2` lands on index zero and the first half wraps to the
    /// end of the buffer.
    pub fn forward_into(&mut self, frame: &[f64], out: &mut HalfSpectrum) -> Result<()> {
        let bins = self.bins();
        if out.re.len() != bins || out.im.len() != bins {
            return Err(Error::ContractViolation {
                what: "half spectrum",
                expected: bins,
                actual: out.re.len().min(out.im.len()),
            });
        }
        let n = self.time.len();
        self.time.fill(T::zero());
        if !self.zero_phase || frame.len() >= n {
            for (t, &x) in self.time.iter_mut().zip(frame) {
                *t = T::from_f64(x);
            }
        } else {
            let offset = frame.len() / 2;
            let (head, tail) = frame.split_at(offset);
            for (t, &x) in self.time.iter_mut().zip(tail) {
                *t = T::from_f64(x);
            }
            for (t, &x) in self.time[n - offset..].iter_mut().zip(head) {
                *t = T::from_f64(x);
            }
        }
        self.rfft.forward(&self.time, &mut self.spectrum)?;
        for (i, c) in self.spectrum.iter().enumerate() {
            out.re[i] = c.re.to_f64();
            out.im[i] = c.im.to_f64();
        }
        Ok(())
    }

    pub fn inverse(&mut self, spectrum: &HalfSpectrum) -> Result<Vec<f64>> {
        let mut out = vec![0.0; self.dft_size()];
        self.inverse_into(spectrum, &mut out)?;
        Ok(out)
    }

    /// Exact inverse of [`forward_into`](Self::forward_into) without the
    /// zero-phase rotation; `out` must be `dft_size()` long. No synthesis
    /// window is applied.
    pub fn inverse_into(&mut self, spectrum: &HalfSpectrum, out: &mut [f64]) -> Result<()> {
        let bins = self.bins();
        if spectrum.re.len() != bins || spectrum.im.len() != bins {
            return Err(Error::ContractViolation {
                what: "half spectrum",
                expected: bins,
                actual: spectrum.re.len().min(spectrum.im.len()),
            });
        }
        if out.len() != self.time.len() {
            return Err(Error::ContractViolation {
                what: "time frame",
                expected: self.time.len(),
                actual: out.len(),
            });
        }
        for (c, (&re, &im)) in self
            .spectrum
            .iter_mut()
            .zip(spectrum.re.iter().zip(&spectrum.im))
        {
            *c = Complex::new(T::from_f64(re), T::from_f64(im));
        }
        self.rfft.inverse(&self.spectrum, &mut self.time)?;
        for (o, t) in out.iter_mut().zip(&self.time) {
            *o = t.to_f64();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn impulse_is_flat() {
        let mut st = SpectralTransform::<f64>::new(16, false).unwrap();
        let mut frame = vec![0.0; 10];
        frame[0] = 2.0;
        let spec = st.forward(&frame).unwrap();
        assert_eq!(spec.bins(), 9);
        for i in 0..9 {
            assert!((spec.re[i] - 2.0).abs() < 1e-12);
            assert!(spec.im[i].abs() < 1e-12);
        }
    }

    #[test]
    fn long_frames_are_truncated() {
        let mut st = SpectralTransform::<f64>::new(8, false).unwrap();
        let long: Vec<f64> = (0..12).map(|i| i as f64).collect();
        let a = st.forward(&long).unwrap();
        let b = st.forward(&long[..8]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn zero_phase_symmetric_frame_has_real_spectrum() {
        let mut st = SpectralTransform::<f64>::new(32, true).unwrap();
        // Symmetric about index 4, which zero-phase layout moves to index 0.
        let frame = [0.1, 0.4, 0.7, 0.9, 1.0, 0.9, 0.7, 0.4, 0.1];
        let spec = st.forward(&frame).unwrap();
        for im in &spec.im {
            assert!(im.abs() < 1e-12);
        }
        assert!((spec.re[0] - frame.iter().sum::<f64>()).abs() < 1e-12);
    }

    #[test]
    fn zero_phase_layout_wraps_first_half() {
        let mut st = SpectralTransform::<f64>::new(8, true).unwrap();
        let spec = st.forward(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        let time = st.inverse(&spec).unwrap();
        let expected = [3.0, 4.0, 0.0, 0.0, 0.0, 0.0, 1.0, 2.0];
        for (a, b) in time.iter().zip(expected.iter()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn single_precision_inverse_recovers_frame() {
        let mut st = SpectralTransform::<f32>::new(512, false).unwrap();
        let frame: Vec<f64> = (0..320).map(|i| libm::sin(i as f64 * 0.05)).collect();
        let spec = st.forward(&frame).unwrap();
        let time = st.inverse(&spec).unwrap();
        for (i, t) in time.iter().enumerate() {
            let x = frame.get(i).copied().unwrap_or(0.0);
            assert!((t - x).abs() < 1e-4, "sample {i}");
        }
    }

    #[test]
    fn sizes_are_checked() {
        assert!(SpectralTransform::<f32>::new(7, false).is_err());
        let mut st = SpectralTransform::<f32>::new(8, false).unwrap();
        let mut bad = HalfSpectrum::zeros(4);
        assert!(matches!(
            st.forward_into(&[0.0; 8], &mut bad),
            Err(Error::ContractViolation { expected: 5, actual: 4, .. })
        ));
        let mut out = [0.0; 7];
        assert!(st.inverse_into(&HalfSpectrum::zeros(5), &mut out).is_err());
    }
}
