//! Complex Fast Fourier Transform kernels.
//!
//! Power-of-two lengths run through a radix-2 Stockham auto-sort pass; every
//! other length is reformulated with Bluestein's chirp-z algorithm over a
//! padded power-of-two convolution. Twiddle tables are built once by an
//! [`FftPlanner`] and shared between plans as `Arc` slices, while each
//! [`FftPlan`] owns the scratch it needs, so a stream never touches another
//! stream's buffers.

use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use hashbrown::HashMap;

use crate::num::{Complex, Float};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FftError {
    EmptyInput,
    MismatchedLengths,
    InvalidValue,
}

impl fmt::Display for FftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FftError::EmptyInput => write!(f, "transform input is empty"),
            FftError::MismatchedLengths => write!(f, "buffer length does not match the plan"),
            FftError::InvalidValue => write!(f, "transform length is not supported"),
        }
    }
}

impl core::error::Error for FftError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum TableKey {
    /// `exp(-2πi·k/n)` for `k = 0..n/2`, used by the Stockham stages.
    Stage(usize),
    /// `exp(-πi·k/m)` for `k = 0..m`, used to split/merge a packed real FFT.
    Real(usize),
    /// Bluestein chirp `exp(-πi·k²/n)` for `k = 0..n`.
    Chirp(usize),
    /// Spectrum of the conjugate chirp, padded to the convolution length.
    ChirpSpectrum(usize),
}

/// Cache of immutable twiddle tables keyed by kind and transform length.
pub struct FftPlanner<T: Float> {
    cache: HashMap<TableKey, Arc<[Complex<T>]>>,
}

impl<T: Float> Default for FftPlanner<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Float> FftPlanner<T> {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
        }
    }

    /// Number of tables currently cached.
    pub fn cached_tables(&self) -> usize {
        self.cache.len()
    }

    /// Stage twiddles for a power-of-two transform of length `n`.
    pub fn stage_twiddles(&mut self, n: usize) -> Result<Arc<[Complex<T>]>, FftError> {
        if n == 0 || !n.is_power_of_two() {
            return Err(FftError::InvalidValue);
        }
        self.table(TableKey::Stage(n), || rotation_table(n / 2, n, T::from_f64(2.0)))
    }

    /// Split/merge twiddles for a real transform built on an `m`-point
    /// complex FFT.
    pub fn real_twiddles(&mut self, m: usize) -> Result<Arc<[Complex<T>]>, FftError> {
        if m == 0 {
            return Err(FftError::InvalidValue);
        }
        self.table(TableKey::Real(m), || rotation_table(m, m, T::one()))
    }

    fn chirp(&mut self, n: usize) -> Result<Arc<[Complex<T>]>, FftError> {
        self.table(TableKey::Chirp(n), || {
            let n_t = T::from_usize(n).ok_or(FftError::InvalidValue)?;
            let wrap = 2 * n;
            let mut chirp = Vec::with_capacity(n);
            for k in 0..n {
                // k² mod 2n keeps the angle small without changing the phase.
                let sq = (k * k) % wrap;
                let sq_t = T::from_usize(sq).ok_or(FftError::InvalidValue)?;
                chirp.push(Complex::expi(-(T::pi() * sq_t / n_t)));
            }
            Ok(chirp)
        })
    }

    fn chirp_spectrum(
        &mut self,
        n: usize,
        chirp: &[Complex<T>],
        m: usize,
    ) -> Result<Arc<[Complex<T>]>, FftError> {
        if let Some(table) = self.cache.get(&TableKey::ChirpSpectrum(n)) {
            return Ok(Arc::clone(table));
        }
        let twiddles = self.stage_twiddles(m)?;
        let mut kernel = vec![Complex::zero(); m];
        kernel[0] = chirp[0].conj();
        for k in 1..n {
            kernel[k] = chirp[k].conj();
            kernel[m - k] = chirp[k].conj();
        }
        let mut scratch = vec![Complex::zero(); m];
        stockham(&mut kernel, &mut scratch, &twiddles);
        let table: Arc<[Complex<T>]> = Arc::from(kernel);
        self.cache
            .insert(TableKey::ChirpSpectrum(n), Arc::clone(&table));
        Ok(table)
    }

    fn table<F>(&mut self, key: TableKey, build: F) -> Result<Arc<[Complex<T>]>, FftError>
    where
        F: FnOnce() -> Result<Vec<Complex<T>>, FftError>,
    {
        if let Some(table) = self.cache.get(&key) {
            return Ok(Arc::clone(table));
        }
        let table: Arc<[Complex<T>]> = Arc::from(build()?);
        self.cache.insert(key, Arc::clone(&table));
        Ok(table)
    }

    /// Plan a complex transform of length `n`.
    pub fn plan(&mut self, n: usize) -> Result<FftPlan<T>, FftError> {
        if n == 0 {
            return Err(FftError::EmptyInput);
        }
        let kernel = if n == 1 {
            Kernel::Identity
        } else if n.is_power_of_two() {
            Kernel::Stockham {
                twiddles: self.stage_twiddles(n)?,
            }
        } else {
            let m = (2 * n - 1).next_power_of_two();
            let chirp = self.chirp(n)?;
            let spectrum = self.chirp_spectrum(n, &chirp, m)?;
            Kernel::Bluestein {
                chirp,
                spectrum,
                twiddles: self.stage_twiddles(m)?,
                work: vec![Complex::zero(); m],
            }
        };
        let scratch_len = match &kernel {
            Kernel::Identity => 0,
            Kernel::Stockham { .. } => n,
            Kernel::Bluestein { spectrum, .. } => spectrum.len(),
        };
        Ok(FftPlan {
            len: n,
            kernel,
            scratch: vec![Complex::zero(); scratch_len],
        })
    }
}

/// `table[k] = exp(-sign·πi·k/span)` for `k = 0..count`, with `sign = 2`
/// for stage tables (`exp(-2πi·k/n)`) and `1` for the real split tables.
fn rotation_table<T: Float>(
    count: usize,
    span: usize,
    factor: T,
) -> Result<Vec<Complex<T>>, FftError> {
    let span_t = T::from_usize(span).ok_or(FftError::InvalidValue)?;
    let mut table = Vec::with_capacity(count);
    for k in 0..count {
        let k_t = T::from_usize(k).ok_or(FftError::InvalidValue)?;
        table.push(Complex::expi(-(factor * T::pi() * k_t / span_t)));
    }
    Ok(table)
}

#[derive(Clone)]
enum Kernel<T: Float> {
    Identity,
    Stockham {
        twiddles: Arc<[Complex<T>]>,
    },
    Bluestein {
        chirp: Arc<[Complex<T>]>,
        spectrum: Arc<[Complex<T>]>,
        twiddles: Arc<[Complex<T>]>,
        work: Vec<Complex<T>>,
    },
}

/// A complex FFT of fixed length. Cloning shares the tables and gives the
/// clone its own scratch.
#[derive(Clone)]
pub struct FftPlan<T: Float> {
    len: usize,
    kernel: Kernel<T>,
    scratch: Vec<Complex<T>>,
}

impl<T: Float> FftPlan<T> {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Forward transform in place (unnormalised, `exp(-2πi·kt/n)` kernel).
    pub fn fft(&mut self, data: &mut [Complex<T>]) -> Result<(), FftError> {
        if data.len() != self.len {
            return Err(FftError::MismatchedLengths);
        }
        match &mut self.kernel {
            Kernel::Identity => {}
            Kernel::Stockham { twiddles } => stockham(data, &mut self.scratch, twiddles),
            Kernel::Bluestein {
                chirp,
                spectrum,
                twiddles,
                work,
            } => bluestein(data, chirp, spectrum, twiddles, work, &mut self.scratch),
        }
        Ok(())
    }

    /// Inverse transform in place, normalised by `1/n`.
    pub fn ifft(&mut self, data: &mut [Complex<T>]) -> Result<(), FftError> {
        if data.len() != self.len {
            return Err(FftError::MismatchedLengths);
        }
        let scale = T::one() / T::from_usize(self.len).ok_or(FftError::InvalidValue)?;
        for c in data.iter_mut() {
            *c = c.conj();
        }
        self.fft(data)?;
        for c in data.iter_mut() {
            *c = c.conj().scale(scale);
        }
        Ok(())
    }
}

/// Radix-2 Stockham auto-sort FFT. `data.len()` must be a power of two,
/// `scratch` at least as long, and `twiddles` the stage table for that length.
fn stockham<T: Float>(data: &mut [Complex<T>], scratch: &mut [Complex<T>], twiddles: &[Complex<T>]) {
    let n = data.len();
    let scratch = &mut scratch[..n];
    let mut in_data = true;
    // n1 = number of groups, n2 = half-size of each group in this pass.
    let mut n1 = 1usize;
    let mut n2 = n;
    while n1 < n {
        n2 >>= 1;
        if in_data {
            stockham_pass(data, scratch, twiddles, n1, n2);
        } else {
            stockham_pass(scratch, data, twiddles, n1, n2);
        }
        in_data = !in_data;
        n1 <<= 1;
    }
    if !in_data {
        data.copy_from_slice(scratch);
    }
}

#[inline]
fn stockham_pass<T: Float>(
    src: &[Complex<T>],
    dst: &mut [Complex<T>],
    twiddles: &[Complex<T>],
    n1: usize,
    n2: usize,
) {
    for k in 0..n1 {
        // exp(-2πi·k/(2·n1)) == table[k·n2]
        let w = twiddles[k * n2];
        let base0 = 2 * k * n2;
        let base1 = base0 + n2;
        let out0 = k * n2;
        let out1 = (k + n1) * n2;
        for j in 0..n2 {
            let u = src[base0 + j];
            let v = src[base1 + j] * w;
            dst[out0 + j] = u + v;
            dst[out1 + j] = u - v;
        }
    }
}

fn bluestein<T: Float>(
    data: &mut [Complex<T>],
    chirp: &[Complex<T>],
    spectrum: &[Complex<T>],
    twiddles: &[Complex<T>],
    work: &mut [Complex<T>],
    scratch: &mut [Complex<T>],
) {
    let n = data.len();
    let m = spectrum.len();
    for (w, (x, c)) in work.iter_mut().zip(data.iter().zip(chirp.iter())) {
        *w = *x * *c;
    }
    for w in work[n..].iter_mut() {
        *w = Complex::zero();
    }
    stockham(work, scratch, twiddles);
    // Circular convolution with the conjugate chirp; the inverse runs through
    // the forward kernel on conjugated data.
    for (w, s) in work.iter_mut().zip(spectrum.iter()) {
        *w = (*w * *s).conj();
    }
    stockham(work, scratch, twiddles);
    let scale = T::one() / T::from_f64(m as f64);
    for (x, (w, c)) in data.iter_mut().zip(work.iter().zip(chirp.iter())) {
        *x = w.conj().scale(scale) * *c;
    }
}
