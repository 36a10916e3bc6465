//! Per-signal configuration.

use crate::error::{Result, SignalError};
use crate::params::StftParams;

/// Sample rate assumed when a source carries none.
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Settings threaded through every [`AudioSignal`](crate::AudioSignal).
///
/// ```
/// use sigframe::{SignalConfig, StftParams, WindowType};
///
/// let params = StftParams::new(1024, 256, WindowType::Hann).unwrap();
/// let config = SignalConfig::default()
///     .with_stft(params)
///     .with_auto_transpose(false);
/// assert_eq!(config.stft_params_for(22_050).unwrap(), params);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalConfig {
    pub default_sample_rate: u32,
    /// Transform parameters. `None` derives them from the signal's sample
    /// rate with [`StftParams::for_sample_rate`].
    pub stft: Option<StftParams>,
    /// Transpose 2-D input whose first dimension is the longer one.
    pub auto_transpose: bool,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            default_sample_rate: DEFAULT_SAMPLE_RATE,
            stft: None,
            auto_transpose: true,
        }
    }
}

impl SignalConfig {
    pub fn with_default_sample_rate(mut self, sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(SignalError::invalid_argument("sample rate must be positive"));
        }
        self.default_sample_rate = sample_rate;
        Ok(self)
    }

    pub fn with_stft(mut self, params: StftParams) -> Self {
        self.stft = Some(params);
        self
    }

    pub fn with_auto_transpose(mut self, auto_transpose: bool) -> Self {
        self.auto_transpose = auto_transpose;
        self
    }

    /// The configured parameters, or the defaults for `sample_rate`.
    pub fn stft_params_for(&self, sample_rate: u32) -> Result<StftParams> {
        match self.stft {
            Some(params) => Ok(params),
            None => StftParams::for_sample_rate(sample_rate),
        }
    }
}

/// Section of a decoded file to keep, and the rate to deliver it at.
///
/// Used by [`AudioSignal::load_with`](crate::AudioSignal::load_with).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LoadOptions {
    /// Start of the section in seconds.
    pub offset_secs: f64,
    /// Length of the section in seconds. `None` reads to the end.
    pub duration_secs: Option<f64>,
    /// Resample to this rate when the file was decoded at another one.
    pub sample_rate: Option<u32>,
}

impl LoadOptions {
    pub fn with_offset(mut self, seconds: f64) -> Result<Self> {
        if seconds.is_nan() || seconds < 0.0 {
            return Err(SignalError::invalid_argument(format!(
                "offset must be a non-negative number of seconds, got {}",
                seconds
            )));
        }
        self.offset_secs = seconds;
        Ok(self)
    }

    pub fn with_duration(mut self, seconds: f64) -> Result<Self> {
        if seconds.is_nan() || seconds < 0.0 {
            return Err(SignalError::invalid_argument(format!(
                "duration must be a non-negative number of seconds, got {}",
                seconds
            )));
        }
        self.duration_secs = Some(seconds);
        Ok(self)
    }

    pub fn with_sample_rate(mut self, sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(SignalError::invalid_argument("sample rate must be positive"));
        }
        self.sample_rate = Some(sample_rate);
        Ok(self)
    }

    /// Sample range `[start, end)` of a `len`-sample signal at
    /// `sample_rate` covered by the offset and duration.
    ///
    /// An offset past the end is an error; a section running past the end
    /// is cut at the end with a warning.
    pub fn section(&self, len: usize, sample_rate: u32) -> Result<(usize, usize)> {
        let rate = sample_rate as f64;
        let file_secs = len as f64 / rate;
        if self.offset_secs.is_nan() || self.offset_secs < 0.0 || self.offset_secs > file_secs {
            return Err(SignalError::invalid_argument(format!(
                "offset {}s is outside a {:.3}s signal",
                self.offset_secs, file_secs
            )));
        }
        let start = ((self.offset_secs * rate).floor() as usize).min(len);
        let end = match self.duration_secs {
            None => len,
            Some(d) if d.is_nan() || d < 0.0 => {
                return Err(SignalError::invalid_argument(format!(
                    "duration must be a non-negative number of seconds, got {}",
                    d
                )))
            }
            Some(d) if self.offset_secs + d >= file_secs => {
                if self.offset_secs + d > file_secs {
                    log::warn!(
                        "offset {}s + duration {}s runs past the {:.3}s signal; reading to the end",
                        self.offset_secs,
                        d,
                        file_secs
                    );
                }
                len
            }
            Some(d) => (start + (d * rate).floor() as usize).min(len),
        };
        Ok((start, end))
    }
}
