//! Stream configuration and its resolution to sample counts.

use crate::error::{Error, Result};
use crate::normalize::NormalizerConfig;
use crate::num::math;

/// User-facing stream parameters. Durations are in seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct StreamConfig {
    pub window_seconds: f64,
    /// Hop as a fraction of the window length.
    pub hop_fraction: f64,
    pub dft_size: usize,
    /// Level of zero-power bins relative to the quietest non-zero bin, dB.
    pub spectral_floor_db: f64,
    pub zero_phase: bool,
    pub normalizer: NormalizerConfig,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            window_seconds: 0.02,
            hop_fraction: 0.5,
            dft_size: 512,
            spectral_floor_db: -120.0,
            zero_phase: false,
            normalizer: NormalizerConfig::default(),
        }
    }
}

/// Sample-domain geometry of a stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreamGeometry {
    pub sample_rate: u32,
    pub window_len: usize,
    pub hop: usize,
    pub dft_size: usize,
    pub bins: usize,
}

impl StreamGeometry {
    /// Whether the two-hop carry of synthesis covers the whole window.
    /// When it does not, window samples past `2·hop` are not overlap-added.
    pub fn is_fully_overlapped(&self) -> bool {
        self.window_len <= 2 * self.hop
    }

    /// Analysis latency in samples.
    pub fn latency(&self) -> usize {
        self.window_len - self.hop
    }

    /// Frames needed to cover `samples` input samples.
    pub fn frame_count(&self, samples: usize) -> usize {
        (samples + self.latency()).div_ceil(self.hop)
    }
}

impl StreamConfig {
    /// Resolve durations against `sample_rate` and check that the stream can
    /// be built.
    pub fn geometry(&self, sample_rate: u32) -> Result<StreamGeometry> {
        if sample_rate == 0 {
            return Err(Error::InvalidConfig("sample rate must be positive"));
        }
        if !self.window_seconds.is_finite() || self.window_seconds <= 0.0 {
            return Err(Error::InvalidConfig("window duration must be positive"));
        }
        let window_len = math::round(self.window_seconds * f64::from(sample_rate)) as usize;
        if window_len == 0 {
            return Err(Error::InvalidConfig("window rounds to zero samples"));
        }
        if !self.hop_fraction.is_finite() || self.hop_fraction <= 0.0 || self.hop_fraction > 1.0 {
            return Err(Error::InvalidConfig("hop fraction must lie in (0, 1]"));
        }
        let hop = math::round(self.hop_fraction * window_len as f64) as usize;
        if hop == 0 {
            return Err(Error::InvalidConfig("hop rounds to zero samples"));
        }
        if self.dft_size < 2 || self.dft_size % 2 != 0 {
            return Err(Error::InvalidConfig("dft size must be even and at least 2"));
        }
        if self.dft_size < window_len {
            return Err(Error::InvalidConfig("dft size must not be shorter than the window"));
        }
        if 2 * hop > self.dft_size {
            return Err(Error::InvalidConfig("dft size must hold two hops"));
        }
        self.normalizer.validate()?;

        let geometry = StreamGeometry {
            sample_rate,
            window_len,
            hop,
            dft_size: self.dft_size,
            bins: self.dft_size / 2 + 1,
        };
        if !geometry.is_fully_overlapped() {
            log_warn!(
                "window of {} samples spans more than two hops of {}; synthesis drops the excess overlap",
                window_len,
                hop
            );
        }
        log_debug!(
            "geometry: window {} hop {} dft {} bins {} latency {}",
            window_len,
            hop,
            geometry.dft_size,
            geometry.bins,
            geometry.latency()
        );
        Ok(geometry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_at_16k() {
        let g = StreamConfig::default().geometry(16_000).unwrap();
        assert_eq!(g.window_len, 320);
        assert_eq!(g.hop, 160);
        assert_eq!(g.bins, 257);
        assert_eq!(g.latency(), 160);
        assert_eq!(g.frame_count(10_000), 64);
        assert!(g.is_fully_overlapped());
    }

    #[test]
    fn quarter_hop_is_flagged_not_rejected() {
        let cfg = StreamConfig {
            hop_fraction: 0.25,
            ..StreamConfig::default()
        };
        let g = cfg.geometry(16_000).unwrap();
        assert_eq!(g.hop, 80);
        assert!(!g.is_fully_overlapped());
    }

    #[test]
    fn rejected_geometries() {
        let base = StreamConfig::default();
        let cases = [
            StreamConfig { hop_fraction: 0.0, ..base },
            StreamConfig { hop_fraction: f64::NAN, ..base },
            StreamConfig { dft_size: 256, ..base },
            StreamConfig { dft_size: 513, ..base },
            StreamConfig { window_seconds: 0.0, ..base },
            StreamConfig { window_seconds: 0.03, hop_fraction: 1.0, ..base },
        ];
        for cfg in cases {
            let err = cfg.geometry(16_000).unwrap_err();
            assert!(err.is_configuration(), "{cfg:?}");
        }
        assert!(base.geometry(0).is_err());
    }
}
