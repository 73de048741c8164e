//! Analysis window design with constant overlap-add validation.
//!
//! A [`Window`] is designed once per stream geometry and then shared
//! read-only by every stream built from it.

use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;
use core::f64::consts::PI;

use crate::error::{Error, Result};
use crate::num::math;

/// Largest spread allowed between folded overlap-add sums.
pub const COLA_TOLERANCE: f64 = 1e-5;

/// Symmetric Hamming window of length `len`.
pub fn hamming(len: usize) -> Vec<f64> {
    hamming_span(len, len)
}

/// First `size` coefficients of a symmetric Hamming window spanning `span`
/// points. `span` is raised to `size` if smaller.
pub fn hamming_span(size: usize, span: usize) -> Vec<f64> {
    let span = span.max(size);
    if size < 1 || span < 1 {
        return Vec::new();
    }
    if span == 1 {
        return vec![1.0];
    }
    let denom = (span - 1) as f64;
    (0..size)
        .map(|i| 0.54 - 0.46 * math::cos(2.0 * PI * i as f64 / denom))
        .collect()
}

/// Overlap-add amplitude of `window` at `hop`, or `None` if shifted copies
/// do not sum to a constant within [`COLA_TOLERANCE`].
///
/// Copies shifted forward and backward by every multiple of `hop` that
/// still overlaps the window are folded onto one window length.
pub fn cola_amplitude(window: &[f64], hop: usize) -> Option<f64> {
    let len = window.len();
    if len == 0 || hop == 0 {
        return None;
    }
    let mut folded = window.to_vec();
    let mut shift = hop;
    while shift < len {
        for i in shift..len {
            folded[i] += window[i - shift];
        }
        shift += hop;
    }
    let mut shift = len.saturating_sub(hop);
    while shift > 0 {
        for j in 0..shift {
            folded[j] += window[len - shift + j];
        }
        shift = shift.saturating_sub(hop);
    }
    let amplitude = folded[0];
    let constant = folded
        .iter()
        .all(|v| math::abs(v - amplitude) <= COLA_TOLERANCE);
    (constant && amplitude > 0.0).then_some(amplitude)
}

/// Immutable window coefficients, together with the hop they were
/// validated for.
#[derive(Clone, Debug, PartialEq)]
pub struct Window {
    coeffs: Arc<[f64]>,
    hop: Option<usize>,
}

impl Window {
    /// Design a Hamming window of `len` samples that overlap-adds to exactly
    /// one at `hop = round(hop_fraction · len)`.
    ///
    /// A `hop_fraction` of zero yields a plain symmetric Hamming window with
    /// no overlap-add guarantee.
    pub fn design(len: usize, hop_fraction: f64) -> Result<Self> {
        if len == 0 {
            return Err(Error::InvalidConfig("window length must be positive"));
        }
        if !hop_fraction.is_finite() || !(0.0..=1.0).contains(&hop_fraction) {
            return Err(Error::InvalidConfig("hop fraction must lie in [0, 1]"));
        }
        if hop_fraction == 0.0 {
            return Ok(Self {
                coeffs: Arc::from(hamming(len)),
                hop: None,
            });
        }
        // An odd virtual span keeps the window exactly symmetric.
        let mut coeffs = hamming_span(len, len + 1 - len % 2);
        if len % 2 == 1 {
            coeffs[0] *= 0.5;
            coeffs[len - 1] *= 0.5;
        }
        let hop = math::round(hop_fraction * len as f64) as usize;
        if hop == 0 {
            return Err(Error::InvalidConfig("hop rounds to zero samples"));
        }
        Self::normalized(coeffs, hop)
    }

    /// Validate arbitrary coefficients for overlap-add at `hop` and rescale
    /// them to unit amplitude.
    pub fn from_coefficients(coeffs: Vec<f64>, hop: usize) -> Result<Self> {
        if coeffs.is_empty() {
            return Err(Error::InvalidConfig("window length must be positive"));
        }
        if hop == 0 {
            return Err(Error::InvalidConfig("hop must be positive"));
        }
        Self::normalized(coeffs, hop)
    }

    fn normalized(mut coeffs: Vec<f64>, hop: usize) -> Result<Self> {
        let window_len = coeffs.len();
        let amplitude =
            cola_amplitude(&coeffs, hop).ok_or(Error::ColaViolation { window_len, hop })?;
        let scale = 1.0 / amplitude;
        for c in coeffs.iter_mut() {
            *c *= scale;
        }
        log_debug!(
            "window: len {} hop {} overlap-add amplitude {:.6}",
            window_len,
            hop,
            amplitude
        );
        Ok(Self {
            coeffs: Arc::from(coeffs),
            hop: Some(hop),
        })
    }

    pub fn len(&self) -> usize {
        self.coeffs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coeffs.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.coeffs
    }

    /// Hop the window was validated for, `None` for a plain window.
    pub fn hop(&self) -> Option<usize> {
        self.hop
    }
}
