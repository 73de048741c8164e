//! Real-input FFT via the half-length complex packing trick.
//!
//! An even-length real signal `x` of length `N` is packed as
//! `z[k] = x[2k] + i·x[2k+1]`, transformed with an `N/2`-point complex FFT
//! and split into the `N/2 + 1` non-redundant bins. The inverse runs the
//! same steps backwards.

use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;

use crate::fft::{FftError, FftPlan, FftPlanner};
use crate::num::{Complex, Float};

/// Forward and inverse real transform of a fixed even length.
#[derive(Clone)]
pub struct RealFft<T: Float> {
    len: usize,
    half: FftPlan<T>,
    twiddles: Arc<[Complex<T>]>,
    packed: Vec<Complex<T>>,
}

impl<T: Float> RealFft<T> {
    /// Plan a real transform of `len` points. `len` must be even and at
    /// least 2.
    pub fn new(planner: &mut FftPlanner<T>, len: usize) -> Result<Self, FftError> {
        if len == 0 {
            return Err(FftError::EmptyInput);
        }
        if len % 2 != 0 {
            return Err(FftError::InvalidValue);
        }
        let m = len / 2;
        Ok(Self {
            len,
            half: planner.plan(m)?,
            twiddles: planner.real_twiddles(m)?,
            packed: vec![Complex::zero(); m],
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of output bins, `len/2 + 1`.
    pub fn bins(&self) -> usize {
        self.len / 2 + 1
    }

    pub fn forward(&mut self, input: &[T], output: &mut [Complex<T>]) -> Result<(), FftError> {
        if input.len() != self.len || output.len() != self.bins() {
            return Err(FftError::MismatchedLengths);
        }
        let m = self.len / 2;
        for (z, pair) in self.packed.iter_mut().zip(input.chunks_exact(2)) {
            *z = Complex::new(pair[0], pair[1]);
        }
        self.half.fft(&mut self.packed)?;

        let half = T::from_f64(0.5);
        let z0 = self.packed[0];
        output[0] = Complex::new(z0.re + z0.im, T::zero());
        output[m] = Complex::new(z0.re - z0.im, T::zero());
        for k in 1..m {
            let a = self.packed[k];
            let b = self.packed[m - k].conj();
            let s = a + b;
            let t = self.twiddles[k] * (a - b);
            output[k] = Complex::new((s.re + t.im) * half, (s.im - t.re) * half);
        }
        Ok(())
    }

    /// Inverse transform, normalised by `1/len`. The imaginary parts of the
    /// DC and Nyquist bins are ignored.
    pub fn inverse(&mut self, input: &[Complex<T>], output: &mut [T]) -> Result<(), FftError> {
        if input.len() != self.bins() || output.len() != self.len {
            return Err(FftError::MismatchedLengths);
        }
        let m = self.len / 2;
        let half = T::from_f64(0.5);
        let (x0, xm) = (input[0].re, input[m].re);
        self.packed[0] = Complex::new((x0 + xm) * half, (x0 - xm) * half);
        for k in 1..m {
            let a = input[k];
            let b = input[m - k].conj();
            let s = a + b;
            let t = self.twiddles[k].conj() * (a - b);
            self.packed[k] = Complex::new((s.re - t.im) * half, (s.im + t.re) * half);
        }
        self.half.ifft(&mut self.packed)?;
        for (pair, z) in output.chunks_exact_mut(2).zip(self.packed.iter()) {
            pair[0] = z.re;
            pair[1] = z.im;
        }
        Ok(())
    }
}
