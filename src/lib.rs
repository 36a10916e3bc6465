//! # sigframe - audio signals and STFT framing for Rust
//!
//! An in-memory audio signal container paired with a short-time Fourier
//! transform engine: framing, windowing, reflection removal, weighted
//! overlap-add reconstruction and time-frequency masking. It is the numeric
//! layer source-separation algorithms sit on.
//!
//! ## Features
//!
//! - **Multi-channel sample buffers** with an active region, crop/pad/gain,
//!   arithmetic and fixed-point conversion for codec boundaries
//! - **STFT/ISTFT** with any window/hop/FFT size; non power-of-two FFTs go
//!   through Bluestein's algorithm
//! - **Window functions**: Rectangular, Hann, Hamming, Blackman, Triangular,
//!   Kaiser, Tukey
//! - **Masks**: real, complex or a whole spectrogram, applied element-wise
//! - **Parallel channels** (optional)
//!
//! ## Cargo Features
//!
//! - `parallel`: run per-channel transforms on Rayon
//!
//! ## Example
//!
//! ```
//! use sigframe::{AudioSignal, SampleBuffer, SignalConfig, SignalSource, StftParams, StoreMode, WindowType};
//!
//! let samples: Vec<f64> = (0..4096)
//!     .map(|i| (2.0 * std::f64::consts::PI * 440.0 * i as f64 / 8_000.0).sin())
//!     .collect();
//! let buffer = SampleBuffer::from_mono(samples.clone(), 8_000).unwrap();
//! let params = StftParams::new(256, 64, WindowType::Hann).unwrap();
//! let config = SignalConfig::default().with_stft(params);
//!
//! let mut signal = AudioSignal::new(SignalSource::FromSamples(buffer), config).unwrap();
//! signal.stft(StoreMode::Replace).unwrap();
//! let rebuilt = signal.istft(StoreMode::Store, None).unwrap();
//! assert_eq!(rebuilt.len(), samples.len());
//! ```
//!
//! ## Logging
//!
//! Diagnostics go through the [`log`](https://crates.io/crates/log) facade:
//! corrective adjustments (auto-transposed input, samples with no window
//! energy) are `warn!`, transform dimensions are `debug!` and FFT planner
//! cache misses are `trace!`. The crate never installs a logger.

/// Complex numbers used by every spectral buffer.
pub mod num;

/// Fast Fourier Transform (FFT) implementations
///
/// Radix-2 Stockham for powers of two, Bluestein for every other size.
pub mod fft;

/// Real-input FFT helpers: half spectra and their conjugate-symmetric
/// reconstruction.
pub mod rfft;

/// Window functions for signal processing
pub mod window;

/// Channel validation, averaging and ordered per-channel dispatch.
pub mod channel;

/// Time-domain sample buffers.
pub mod buffer;

/// STFT parameters and frame arithmetic.
pub mod params;

/// Complex `(bins, frames, channels)` arrays.
pub mod spectrogram;

/// Forward Short-Time Fourier Transform
pub mod stft;

/// Inverse Short-Time Fourier Transform
pub mod istft;

/// Time-frequency masks.
pub mod mask;

/// The audio signal object and its I/O collaborators.
pub mod signal;

/// Per-signal settings and file load options.
pub mod config;

/// Error type and result alias.
pub mod error;

pub use buffer::{BitDepth, FixedPointSamples, LengthPolicy, SampleBuffer};
pub use config::{LoadOptions, SignalConfig, DEFAULT_SAMPLE_RATE};
pub use error::{ErrorKind, Result, SignalError};
pub use fft::{FftError, FftPlanner};
pub use mask::{ComplexMask, Mask, MaskValues, RealMask};
pub use num::Complex64;
pub use params::StftParams;
pub use signal::{
    AudioDecoder, AudioSignal, AudioWriter, DecodedAudio, Resampler, SignalSource, SignalState,
    StoreMode,
};
pub use spectrogram::{Spectrogram, TfArray, TfShape};
pub use window::WindowType;

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn noise(channels: usize, len: usize, seed: u64) -> SampleBuffer {
        let mut rng = StdRng::seed_from_u64(seed);
        let rows = (0..channels)
            .map(|_| (0..len).map(|_| rng.gen_range(-1.0..1.0)).collect())
            .collect();
        SampleBuffer::from_rows(rows, 16_000, false).unwrap()
    }

    #[test]
    fn test_stft_is_linear() {
        let a = noise(2, 500, 1);
        let b = noise(2, 500, 2);
        let params = StftParams::new(64, 16, WindowType::Hann).unwrap();
        let sa = stft::forward(&a, &params).unwrap();
        let sb = stft::forward(&b, &params).unwrap();
        let sum = stft::forward(&a.add(&b).unwrap(), &params).unwrap();
        for ((x, y), z) in sa.as_slice().iter().zip(sb.as_slice()).zip(sum.as_slice()) {
            assert!((*x + *y - *z).norm() < 1e-9);
        }
    }

    #[test]
    fn test_scaled_roundtrip() {
        let x = noise(1, 1000, 3);
        let params = StftParams::new(100, 25, WindowType::Hamming).unwrap();
        let spec = stft::forward(&x.scale(3.0).unwrap(), &params).unwrap();
        let y = istft::inverse(&spec, &params, 16_000, Some(x.len())).unwrap();
        for (a, b) in x.channel(0).unwrap().iter().zip(y.channel(0).unwrap()) {
            assert!((3.0 * a - b).abs() < 1e-9, "{} vs {}", 3.0 * a, b);
        }
    }

    #[test]
    fn test_masked_sum_restores_signal() {
        let x = noise(2, 800, 4);
        let params = StftParams::new(128, 32, WindowType::Hann).unwrap();
        let config = SignalConfig::default().with_stft(params);
        let mut signal = AudioSignal::new(SignalSource::FromSamples(x.clone()), config).unwrap();
        let spec = signal.stft(StoreMode::Store).unwrap();
        let low = RealMask::binary(spec.shape(), |b, _, _| b < 20).unwrap();

        let mut a = signal.apply_mask(&low).unwrap();
        let mut b = signal.apply_mask(&low.complement()).unwrap();
        let ya = a.istft(StoreMode::Store, None).unwrap();
        let yb = b.istft(StoreMode::Store, None).unwrap();
        assert_eq!(ya.len(), x.len());
        let sum = ya.add(&yb).unwrap();
        for (c, ch) in x.channels().enumerate() {
            for (p, q) in ch.iter().zip(sum.channel(c).unwrap()) {
                assert!((p - q).abs() < 1e-9);
            }
        }
    }
}
