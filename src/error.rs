//! Error types shared by the buffer, transform and mask layers.

use thiserror::Error;

use crate::fft::FftError;

/// Result alias used across the crate.
pub type Result<T, E = SignalError> = core::result::Result<T, E>;

/// Coarse classification of a [`SignalError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad channel index, non-positive window/hop, mask shape mismatch, ...
    InvalidArgument,
    /// Missing time/frequency data, mutating a narrowed signal, ...
    InvalidState,
    /// Non-finite samples.
    Numeric,
    /// Inconsistent transform configuration (FFT size below window length).
    Configuration,
    /// A decoder, writer or resampler collaborator failed.
    External,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SignalError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid channel {index}: signal has {count} channel(s) (0-based)")]
    InvalidChannel { index: usize, count: usize },

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("non-finite sample in channel {channel} at index {index}")]
    NonFinite { channel: usize, index: usize },

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("fft error: {0}")]
    Fft(#[from] FftError),

    #[error("external collaborator failed: {0}")]
    External(String),
}

impl SignalError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SignalError::InvalidArgument(_) | SignalError::InvalidChannel { .. } => {
                ErrorKind::InvalidArgument
            }
            SignalError::InvalidState(_) => ErrorKind::InvalidState,
            SignalError::NonFinite { .. } => ErrorKind::Numeric,
            SignalError::Configuration(_) => ErrorKind::Configuration,
            SignalError::Fft(FftError::EmptyInput) => ErrorKind::InvalidState,
            SignalError::Fft(FftError::MismatchedLengths) => ErrorKind::InvalidArgument,
            SignalError::External(_) => ErrorKind::External,
        }
    }

    pub(crate) fn invalid_argument(msg: impl Into<String>) -> Self {
        SignalError::InvalidArgument(msg.into())
    }

    pub(crate) fn invalid_state(msg: impl Into<String>) -> Self {
        SignalError::InvalidState(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            SignalError::InvalidChannel { index: 2, count: 1 }.kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            SignalError::NonFinite {
                channel: 0,
                index: 3
            }
            .kind(),
            ErrorKind::Numeric
        );
        assert_eq!(
            SignalError::from(FftError::EmptyInput).kind(),
            ErrorKind::InvalidState
        );
    }

    #[test]
    fn test_display_mentions_channel_count() {
        let err = SignalError::InvalidChannel { index: 4, count: 2 };
        assert_eq!(
            err.to_string(),
            "invalid channel 4: signal has 2 channel(s) (0-based)"
        );
    }
}
