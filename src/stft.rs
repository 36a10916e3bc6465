//! Forward Short-Time Fourier Transform.
//!
//! Each channel is cut into `window_length` frames every `hop_length`
//! samples, starting at the first padding sample when `center` is set (the
//! default), else at sample 0. The last frame is zero-padded past the end
//! of the signal. Frames are windowed, zero-padded to `fft_bins` and
//! transformed; with reflection removal only bins `[0, fft_bins/2]` are kept.

use crate::buffer::SampleBuffer;
use crate::channel::dispatch;
use crate::error::{Result, SignalError};
use crate::fft::FftPlanner;
use crate::num::Complex64;
use crate::params::StftParams;
use crate::rfft::rfft;
use crate::spectrogram::Spectrogram;

/// Yields successive windowed frames of one channel.
///
/// Positions are measured in the padded signal: `pad` virtual zeros
/// followed by `samples` followed by as many zeros as the last frame needs.
pub(crate) struct FrameStream<'a> {
    samples: &'a [f64],
    window: &'a [f64],
    hop: usize,
    pad: usize,
    next: usize,
    count: usize,
}

impl<'a> FrameStream<'a> {
    pub(crate) fn new(samples: &'a [f64], window: &'a [f64], params: &StftParams) -> Self {
        Self {
            samples,
            window,
            hop: params.hop_length(),
            pad: params.center_padding(),
            next: 0,
            count: params.frame_count(samples.len()),
        }
    }

    /// Write the next windowed frame into `out` (`window.len()` long).
    /// Returns `false` once every frame has been produced.
    pub(crate) fn next_frame(&mut self, out: &mut [f64]) -> bool {
        if self.next >= self.count {
            return false;
        }
        let start = self.next * self.hop;
        for (i, (o, &w)) in out.iter_mut().zip(self.window.iter()).enumerate() {
            let x = (start + i)
                .checked_sub(self.pad)
                .and_then(|idx| self.samples.get(idx))
                .copied()
                .unwrap_or(0.0);
            *o = x * w;
        }
        self.next += 1;
        true
    }
}

/// STFT of one channel. Returns `frames * bins` values, frame after frame.
pub fn stft_channel(
    samples: &[f64],
    params: &StftParams,
    window: &[f64],
    planner: &mut FftPlanner,
) -> Result<Vec<Complex64>> {
    if window.len() != params.window_length() {
        return Err(SignalError::invalid_argument(format!(
            "window has {} samples, expected {}",
            window.len(),
            params.window_length()
        )));
    }
    let n = params.fft_bins();
    let bins = params.bins_per_frame();
    let frames = params.frame_count(samples.len());
    let mut out = Vec::with_capacity(frames * bins);
    let mut frame = vec![0.0; params.window_length()];
    let mut spectrum = Vec::with_capacity(n);
    let mut stream = FrameStream::new(samples, window, params);
    while stream.next_frame(&mut frame) {
        rfft(planner, &frame, n, &mut spectrum)?;
        out.extend_from_slice(&spectrum[..bins]);
    }
    Ok(out)
}

/// STFT of every channel of the active region of `buffer`.
pub fn forward(buffer: &SampleBuffer, params: &StftParams) -> Result<Spectrogram> {
    if buffer.is_empty() {
        return Err(SignalError::invalid_state("no signal to transform"));
    }
    let window = params.window();
    let bins = params.bins_per_frame();
    let frames = params.frame_count(buffer.len());
    log::debug!(
        "stft: {} channel(s) x {} samples -> {} bins x {} frames (window {} {}, hop {}, fft {})",
        buffer.num_channels(),
        buffer.len(),
        bins,
        frames,
        params.window_type(),
        params.window_length(),
        params.hop_length(),
        params.fft_bins()
    );
    let channels = dispatch(buffer.num_channels(), |c| {
        let mut planner = FftPlanner::new();
        stft_channel(buffer.channel(c)?, params, &window, &mut planner)
    })?;
    Spectrogram::from_channels(bins, frames, channels)
}
