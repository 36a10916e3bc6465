//! Immutable STFT configuration.

use crate::error::{Result, SignalError};
use crate::rfft::half_len;
use crate::window::WindowType;

/// Length of the default analysis window, in seconds. The default window is
/// the next power of two at or above this duration.
pub const DEFAULT_WINDOW_SECONDS: f64 = 0.040;

/// Window length, hop, window type, FFT size and reflection policy for a
/// forward/inverse transform pair.
///
/// Construct with [`StftParams::new`] or [`StftParams::for_sample_rate`] and
/// adjust with the `with_*` methods; every constructor validates, so a value
/// of this type always describes a usable transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StftParams {
    window_length: usize,
    hop_length: usize,
    window_type: WindowType,
    fft_bins: usize,
    remove_reflection: bool,
    center: bool,
}

impl StftParams {
    /// `fft_bins` defaults to `window_length`; reflection removal and
    /// centering are on.
    pub fn new(window_length: usize, hop_length: usize, window_type: WindowType) -> Result<Self> {
        Self {
            window_length,
            hop_length,
            window_type,
            fft_bins: window_length,
            remove_reflection: true,
            center: true,
        }
        .validated()
    }

    /// Defaults for a sample rate: a ~40 ms power-of-two Hamming window with
    /// 50% overlap.
    pub fn for_sample_rate(sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(SignalError::invalid_argument("sample rate must be positive"));
        }
        let target = (DEFAULT_WINDOW_SECONDS * sample_rate as f64).ceil() as usize;
        let window_length = target.max(2).next_power_of_two();
        Self::new(window_length, window_length / 2, WindowType::default())
    }

    pub fn with_fft_bins(mut self, fft_bins: usize) -> Result<Self> {
        self.fft_bins = fft_bins;
        self.validated()
    }

    pub fn with_hop_length(mut self, hop_length: usize) -> Result<Self> {
        self.hop_length = hop_length;
        self.validated()
    }

    pub fn with_window_type(mut self, window_type: WindowType) -> Self {
        self.window_type = window_type;
        self
    }

    pub fn with_remove_reflection(mut self, remove_reflection: bool) -> Self {
        self.remove_reflection = remove_reflection;
        self
    }

    /// Pad `window_length - hop_length` zeros in front of the signal before
    /// framing, so windows that vanish at their first sample still cover the
    /// start of the signal. The inverse transform drops the same padding.
    /// Without it, sample 0 is only reconstructed by windows that are
    /// non-zero at their first sample.
    pub fn with_center(mut self, center: bool) -> Self {
        self.center = center;
        self
    }

    fn validated(self) -> Result<Self> {
        if self.window_length == 0 {
            return Err(SignalError::invalid_argument(
                "window length must be positive",
            ));
        }
        if self.hop_length == 0 {
            return Err(SignalError::invalid_argument("hop length must be positive"));
        }
        if self.fft_bins < self.window_length {
            return Err(SignalError::Configuration(format!(
                "fft size {} is smaller than window length {}",
                self.fft_bins, self.window_length
            )));
        }
        Ok(self)
    }

    pub fn window_length(&self) -> usize {
        self.window_length
    }

    pub fn hop_length(&self) -> usize {
        self.hop_length
    }

    pub fn window_type(&self) -> WindowType {
        self.window_type
    }

    pub fn fft_bins(&self) -> usize {
        self.fft_bins
    }

    pub fn remove_reflection(&self) -> bool {
        self.remove_reflection
    }

    pub fn center(&self) -> bool {
        self.center
    }

    /// Leading zero padding applied before framing.
    pub fn center_padding(&self) -> usize {
        if self.center {
            self.window_length.saturating_sub(self.hop_length)
        } else {
            0
        }
    }

    /// Frequency bins produced per frame.
    pub fn bins_per_frame(&self) -> usize {
        if self.remove_reflection {
            half_len(self.fft_bins)
        } else {
            self.fft_bins
        }
    }

    /// Frames needed to cover `signal_len` samples (plus centering padding).
    ///
    /// This is `floor((L' - window) / hop) + 1` where `L'` is the length
    /// after zero-padding the tail up to the end of the last frame, i.e. the
    /// last frame may run past the signal end.
    pub fn frame_count(&self, signal_len: usize) -> usize {
        if signal_len == 0 {
            return 0;
        }
        let padded = signal_len + self.center_padding();
        if padded <= self.window_length {
            1
        } else {
            (padded - self.window_length).div_ceil(self.hop_length) + 1
        }
    }

    /// Length of the overlap-added output for `frames` frames, before the
    /// centering padding is removed.
    pub fn reconstructed_len(&self, frames: usize) -> usize {
        if frames == 0 {
            0
        } else {
            (frames - 1) * self.hop_length + self.window_length
        }
    }

    pub fn window(&self) -> Vec<f64> {
        self.window_type.generate(self.window_length)
    }
}
