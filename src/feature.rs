//! Magnitude/phase split, log-power features and mask application.

use alloc::vec::Vec;
use core::f64::consts::LOG10_E;

use crate::error::{Error, Result};
use crate::num::math;
use crate::transform::HalfSpectrum;

/// Floor used when a frame has no positive power at all, in dB.
pub const SILENT_FLOOR_DB: f64 = -80.0;

/// Convert a level in dB of power to the natural-log domain used by
/// [`log_power`].
pub fn db_to_ln(db: f64) -> f64 {
    db / (10.0 * LOG10_E)
}

/// Analysis-side state of one frame: magnitude and unit phasor per bin.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SpectralFrame {
    pub magnitude: Vec<f64>,
    /// Unit-length phasor per bin, `(1, 0)` where the magnitude is zero.
    pub phasor: HalfSpectrum,
}

impl SpectralFrame {
    pub fn zeros(bins: usize) -> Self {
        let mut phasor = HalfSpectrum::zeros(bins);
        phasor.re.fill(1.0);
        Self {
            magnitude: alloc::vec![0.0; bins],
            phasor,
        }
    }

    pub fn bins(&self) -> usize {
        self.magnitude.len()
    }
}

pub fn magnitude_phasor(spectrum: &HalfSpectrum) -> Result<SpectralFrame> {
    let mut frame = SpectralFrame::zeros(spectrum.bins());
    magnitude_phasor_into(spectrum, &mut frame)?;
    Ok(frame)
}

/// Split `spectrum` into magnitude and unit phasor, resizing `out` if needed.
/// The real and imaginary halves must have the same length.
pub fn magnitude_phasor_into(spectrum: &HalfSpectrum, out: &mut SpectralFrame) -> Result<()> {
    let bins = spectrum.bins();
    if spectrum.im.len() != bins {
        return Err(Error::ContractViolation {
            what: "half spectrum",
            expected: bins,
            actual: spectrum.im.len(),
        });
    }
    out.magnitude.resize(bins, 0.0);
    out.phasor.re.resize(bins, 0.0);
    out.phasor.im.resize(bins, 0.0);
    for i in 0..bins {
        let (re, im) = (spectrum.re[i], spectrum.im[i]);
        let mag = math::hypot(re, im);
        out.magnitude[i] = mag;
        if mag != 0.0 {
            out.phasor.re[i] = re / mag;
            out.phasor.im[i] = im / mag;
        } else {
            out.phasor.re[i] = 1.0;
            out.phasor.im[i] = 0.0;
        }
    }
    Ok(())
}

pub fn log_power(magnitude: &[f64], floor_db: f64) -> Vec<f64> {
    let mut out = alloc::vec![0.0; magnitude.len()];
    log_power_into(magnitude, floor_db, &mut out);
    out
}

/// Natural log of the power `magnitude²`, written into `out`.
///
/// Zero-power bins take `ln(min positive power) + floor_db` (in the log
/// domain). A frame without any positive power is filled with
/// [`SILENT_FLOOR_DB`]. `out` is resized to `magnitude.len()`.
pub fn log_power_into(magnitude: &[f64], floor_db: f64, out: &mut Vec<f64>) {
    out.clear();
    out.extend(magnitude.iter().map(|m| m * m));
    let min_positive = out
        .iter()
        .copied()
        .filter(|&p| p > 0.0)
        .fold(f64::INFINITY, f64::min);
    if !min_positive.is_finite() {
        out.fill(db_to_ln(SILENT_FLOOR_DB));
        return;
    }
    let floor = math::ln(min_positive) + db_to_ln(floor_db);
    for p in out.iter_mut() {
        *p = if *p == 0.0 { floor } else { math::ln(*p) };
    }
}

/// Rebuild a half spectrum as `magnitude · mask · phasor`.
pub fn apply_mask<M>(frame: &SpectralFrame, mask: &[M]) -> Result<HalfSpectrum>
where
    M: Copy + Into<f64>,
{
    let mut out = HalfSpectrum::zeros(frame.bins());
    apply_mask_into(frame, mask, &mut out)?;
    Ok(out)
}

pub fn apply_mask_into<M>(frame: &SpectralFrame, mask: &[M], out: &mut HalfSpectrum) -> Result<()>
where
    M: Copy + Into<f64>,
{
    let bins = frame.bins();
    if mask.len() != bins {
        return Err(Error::ContractViolation {
            what: "mask",
            expected: bins,
            actual: mask.len(),
        });
    }
    for half in [&frame.phasor.re, &frame.phasor.im] {
        if half.len() != bins {
            return Err(Error::ContractViolation {
                what: "phasor",
                expected: bins,
                actual: half.len(),
            });
        }
    }
    out.re.resize(bins, 0.0);
    out.im.resize(bins, 0.0);
    for (i, &g) in mask.iter().enumerate() {
        let scaled = frame.magnitude[i] * g.into();
        out.re[i] = scaled * frame.phasor.re[i];
        out.im[i] = scaled * frame.phasor.im[i];
    }
    Ok(())
}
