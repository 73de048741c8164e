//! # maskstft - Streaming STFT front/back end for mask-based speech enhancement
//!
//! Turns a waveform into causally normalised log-power feature frames, hands
//! each frame to a mask engine, and rebuilds the enhanced waveform from the
//! returned masks by overlap-add.
//!
//! ## Features
//!
//! - **COLA window design**: Hamming windows validated and rescaled for
//!   constant overlap-add at the configured hop
//! - **Real FFT engine**: radix-2 Stockham and Bluestein kernels with shared,
//!   cached twiddle tables, in `f32` or `f64`
//! - **Online normalisation**: per-bin exponential mean/variance with a fast
//!   initial regime
//! - **Pluggable engines**: any [`MaskEngine`] can sit between analysis and
//!   synthesis, with opaque auxiliary state carried between frames
//! - **Batch processing** of independent waveforms (optional)
//!
//! ## Cargo Features
//!
//! - `std` (default): Use the standard library's float math; without it the
//!   crate is `no_std` and uses `libm`
//! - `parallel`: Process independent waveforms with Rayon
//! - `verbose-logging`: Emit diagnostics through the `log` facade
//! - `serde`: Serialize/deserialize [`StreamConfig`]
//!
//! ## Example
//!
//! ```
//! use maskstft::{Enhancer, StreamConfig, UnityMask};
//!
//! let enhancer = Enhancer::<f32>::new(StreamConfig::default(), 16_000).unwrap();
//! let input: Vec<f32> = (0..4_000).map(|i| (i as f32 * 0.01).sin()).collect();
//! let out = enhancer.enhance(&input, 1, &mut UnityMask::new(257)).unwrap();
//! let aligned = out.aligned(input.len());
//! assert!((aligned[1_000] as f32 - input[1_000]).abs() < 1e-4);
//! ```
//!
//! ## License
//!
//! Licensed under either of
//! - Apache License, Version 2.0 ([LICENSE-APACHE](LICENSE-APACHE) or https://www.apache.org/licenses/LICENSE-2.0)
//! - MIT license ([LICENSE-MIT](LICENSE-MIT) or https://opensource.org/licenses/MIT)
//!
//! at your option.

#![no_std]
extern crate alloc;
#[cfg(any(feature = "std", test))]
extern crate std;

#[macro_use]
mod logging;

/// Scalar and complex number primitives
pub mod num;

/// Fast Fourier Transform (FFT) kernels and planner
///
/// Radix-2 Stockham for power-of-two lengths, Bluestein for the rest.
pub mod fft;

/// Real-input FFT built on a half-length complex FFT
pub mod rfft;

/// Error types
pub mod error;

/// Window design with constant overlap-add validation
pub mod window;

/// Padded signal store yielding windowed frames
pub mod frame;

/// Frame ↔ half-spectrum transform
pub mod transform;

/// Magnitude/phasor split, log-power features and mask application
pub mod feature;

/// Causal mean/variance normalisation
pub mod normalize;

/// Overlap-add synthesis
pub mod synthesis;

/// Stream configuration
pub mod config;

/// Source / engine / sink interfaces and the frame driver
pub mod pipeline;

/// Analysis and synthesis streams
pub mod stft;

/// Whole-waveform convenience API
pub mod enhancer;

pub use config::{StreamConfig, StreamGeometry};
pub use enhancer::{Enhanced, Enhancer};
pub use error::{Error, Result};
pub use feature::SpectralFrame;
pub use fft::{FftError, FftPlanner};
pub use normalize::{NormalizerConfig, OnlineNormalizer};
pub use num::{Complex, Complex32, Complex64, Float};
pub use pipeline::{AuxState, FnMask, FrameSink, FrameSource, MaskEngine, UnityMask};
pub use stft::{AnalysisStream, SynthesisStream};
pub use transform::{HalfSpectrum, SpectralTransform};
pub use window::Window;

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn noise(len: usize, seed: u64) -> Vec<f32> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..len).map(|_| rng.gen_range(-0.5..0.5)).collect()
    }

    #[test]
    fn noise_roundtrip_f32() {
        let enhancer = Enhancer::<f32>::new(StreamConfig::default(), 16_000).unwrap();
        let input = noise(5_000, 7);
        let out = enhancer
            .enhance(&input, 1, &mut UnityMask::new(257))
            .unwrap();
        for (a, &x) in out.aligned(input.len()).iter().zip(&input) {
            assert!((a - x as f64).abs() < 1e-5);
        }
    }

    #[test]
    fn zero_phase_stream_is_finite() {
        let config = StreamConfig {
            zero_phase: true,
            ..StreamConfig::default()
        };
        let enhancer = Enhancer::<f64>::new(config, 16_000).unwrap();
        let input = noise(2_000, 3);
        let (mut analysis, _) = enhancer.open(&input, 1).unwrap();
        let mut feature = [0.0f32; 257];
        while analysis.next_feature(&mut feature).unwrap().is_some() {
            assert!(feature.iter().all(|v| v.is_finite()));
        }
    }

    #[test]
    fn silent_input_has_finite_features() {
        let enhancer = Enhancer::<f32>::new(StreamConfig::default(), 8_000).unwrap();
        let (mut analysis, _) = enhancer.open(&[0i16; 800], 1).unwrap();
        while let Some((_, feature)) = analysis.next_feature_f64().unwrap() {
            assert!(feature.iter().all(|v| v.is_finite()));
        }
    }
}
