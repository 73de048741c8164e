//! Causal per-bin mean/variance normalisation with two forgetting regimes.
//!
//! Statistics decay with `α_init = exp(-frame_shift/tau_init)` for the first
//! `ceil(t_init/frame_shift)` frames and with `α = exp(-frame_shift/tau)`
//! afterwards. Each call only sees the current frame and the state left by
//! earlier frames.

use alloc::vec::Vec;

use crate::error::{Error, Result};
use crate::num::math;

/// Variances below this are clamped before taking the square root.
pub const VARIANCE_FLOOR: f64 = 1e-12;

/// Time constants of the normaliser, all in seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct NormalizerConfig {
    /// Time between consecutive frames.
    pub frame_shift: f64,
    pub tau: f64,
    pub tau_init: f64,
    /// Length of the initial fast-adapting regime.
    pub t_init: f64,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            frame_shift: 0.01,
            tau: 3.0,
            tau_init: 0.1,
            t_init: 0.1,
        }
    }
}

impl NormalizerConfig {
    pub fn validate(&self) -> Result<()> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.frame_shift) {
            return Err(Error::InvalidConfig("normalizer frame shift must be positive"));
        }
        if !positive(self.tau) || !positive(self.tau_init) {
            return Err(Error::InvalidConfig(
                "normalizer time constants must be positive",
            ));
        }
        if !self.t_init.is_finite() || self.t_init < 0.0 {
            return Err(Error::InvalidConfig(
                "normalizer initial period must be non-negative",
            ));
        }
        Ok(())
    }

    /// Number of leading frames that use [`alpha_init`](Self::alpha_init).
    pub fn init_frames(&self) -> usize {
        math::ceil(self.t_init / self.frame_shift) as usize
    }

    pub fn alpha(&self) -> f64 {
        math::exp(-self.frame_shift / self.tau)
    }

    pub fn alpha_init(&self) -> f64 {
        math::exp(-self.frame_shift / self.tau_init)
    }
}

/// Running normaliser for one stream.
#[derive(Clone, Debug)]
pub struct OnlineNormalizer {
    alpha: f64,
    alpha_init: f64,
    init_frames: usize,
    mean: Vec<f64>,
    power: Vec<f64>,
    frames: usize,
}

impl OnlineNormalizer {
    pub fn new(config: &NormalizerConfig, bins: usize) -> Result<Self> {
        config.validate()?;
        if bins == 0 {
            return Err(Error::InvalidConfig("normalizer needs at least one bin"));
        }
        Ok(Self {
            alpha: config.alpha(),
            alpha_init: config.alpha_init(),
            init_frames: config.init_frames(),
            mean: alloc::vec![0.0; bins],
            power: alloc::vec![0.0; bins],
            frames: 0,
        })
    }

    pub fn bins(&self) -> usize {
        self.mean.len()
    }

    /// Frames normalised so far.
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Running mean per bin.
    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    /// Running second moment per bin.
    pub fn power(&self) -> &[f64] {
        &self.power
    }

    /// Decay applied to the next frame.
    pub fn current_alpha(&self) -> f64 {
        if self.frames < self.init_frames {
            self.alpha_init
        } else {
            self.alpha
        }
    }

    /// Forget all statistics; the next frame seeds them again.
    pub fn reset(&mut self) {
        self.mean.fill(0.0);
        self.power.fill(0.0);
        self.frames = 0;
    }

    /// Update the statistics with `feature` and normalise it in place.
    ///
    /// The first frame seeds the mean with itself and the second moment with
    /// its square, so it normalises to zero.
    pub fn normalize(&mut self, feature: &mut [f64]) -> Result<()> {
        if feature.len() != self.mean.len() {
            return Err(Error::ContractViolation {
                what: "normalizer feature",
                expected: self.mean.len(),
                actual: feature.len(),
            });
        }
        if self.frames == 0 {
            self.mean.copy_from_slice(feature);
            for (p, &f) in self.power.iter_mut().zip(feature.iter()) {
                *p = f * f;
            }
        }
        if self.frames == self.init_frames {
            log_trace!(
                "normalizer: frame {} switches to steady decay {:.6}",
                self.frames,
                self.alpha
            );
        }
        let alpha = self.current_alpha();
        let beta = 1.0 - alpha;
        for ((f, m), p) in feature
            .iter_mut()
            .zip(self.mean.iter_mut())
            .zip(self.power.iter_mut())
        {
            *m = alpha * *m + beta * *f;
            *p = alpha * *p + beta * *f * *f;
            let variance = (*p - *m * *m).max(VARIANCE_FLOOR);
            *f = (*f - *m) / math::sqrt(variance);
        }
        self.frames += 1;
        Ok(())
    }
}
