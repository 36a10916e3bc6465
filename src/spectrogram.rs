//! Time-frequency arrays.
//!
//! A [`TfArray`] is a dense `(bins, frames, channels)` array stored
//! channel-major with each frame contiguous: element `(b, f, c)` lives at
//! `(c * frames + f) * bins + b`. [`Spectrogram`] is the complex STFT
//! output; magnitude and power views are real `TfArray<f64>`s with the same
//! shape.

use core::ops::{AddAssign, Mul};

use crate::channel::{mean_across, verify_channel};
use crate::error::{Result, SignalError};
use crate::num::Complex64;

/// Complex STFT data.
pub type Spectrogram = TfArray<Complex64>;

/// Dimensions of a time-frequency array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TfShape {
    pub bins: usize,
    pub frames: usize,
    pub channels: usize,
}

impl TfShape {
    pub const fn new(bins: usize, frames: usize, channels: usize) -> Self {
        Self {
            bins,
            frames,
            channels,
        }
    }

    /// Total element count.
    pub const fn len(&self) -> usize {
        self.bins * self.frames * self.channels
    }

    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Elements per channel.
    pub const fn channel_len(&self) -> usize {
        self.bins * self.frames
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TfArray<T> {
    data: Vec<T>,
    shape: TfShape,
}

impl<T: Copy> TfArray<T> {
    /// Wrap `data` already laid out channel, frame, bin.
    pub fn from_raw(shape: TfShape, data: Vec<T>) -> Result<Self> {
        if shape.channels == 0 {
            return Err(SignalError::invalid_argument(
                "a time-frequency array needs at least one channel",
            ));
        }
        if data.len() != shape.len() {
            return Err(SignalError::invalid_argument(format!(
                "{} values do not fill a {}x{}x{} array",
                data.len(),
                shape.bins,
                shape.frames,
                shape.channels
            )));
        }
        Ok(Self { data, shape })
    }

    pub fn filled(shape: TfShape, value: T) -> Result<Self> {
        Self::from_raw(shape, vec![value; shape.len()])
    }

    /// Stack per-channel blocks of `frames * bins` values.
    pub fn from_channels(bins: usize, frames: usize, channels: Vec<Vec<T>>) -> Result<Self> {
        let shape = TfShape::new(bins, frames, channels.len());
        if let Some(bad) = channels.iter().position(|c| c.len() != shape.channel_len()) {
            return Err(SignalError::invalid_argument(format!(
                "channel {} holds {} values, expected {} bins x {} frames",
                bad,
                channels[bad].len(),
                bins,
                frames
            )));
        }
        Self::from_raw(shape, channels.into_iter().flatten().collect())
    }

    /// Promote a 2-D `rows[bin][frame]` matrix to a one-channel array.
    pub fn from_matrix(rows: Vec<Vec<T>>) -> Result<Self> {
        let bins = rows.len();
        let frames = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|r| r.len() != frames) {
            return Err(SignalError::invalid_argument(
                "every frequency row must have the same number of frames",
            ));
        }
        let mut data = Vec::with_capacity(bins * frames);
        for f in 0..frames {
            data.extend(rows.iter().map(|row| row[f]));
        }
        Self::from_raw(TfShape::new(bins, frames, 1), data)
    }

    pub fn shape(&self) -> TfShape {
        self.shape
    }

    pub fn num_bins(&self) -> usize {
        self.shape.bins
    }

    pub fn num_frames(&self) -> usize {
        self.shape.frames
    }

    pub fn num_channels(&self) -> usize {
        self.shape.channels
    }

    pub fn is_empty(&self) -> bool {
        self.shape.is_empty()
    }

    /// Every value in storage order.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_raw(self) -> (TfShape, Vec<T>) {
        (self.shape, self.data)
    }

    #[inline]
    fn offset(&self, bin: usize, frame: usize, channel: usize) -> Option<usize> {
        let s = self.shape;
        (bin < s.bins && frame < s.frames && channel < s.channels)
            .then(|| (channel * s.frames + frame) * s.bins + bin)
    }

    pub fn get(&self, bin: usize, frame: usize, channel: usize) -> Option<T> {
        self.offset(bin, frame, channel).map(|i| self.data[i])
    }

    pub fn get_mut(&mut self, bin: usize, frame: usize, channel: usize) -> Option<&mut T> {
        self.offset(bin, frame, channel).map(move |i| &mut self.data[i])
    }

    /// Frames of channel `n`, back to back.
    pub fn channel_data(&self, n: usize) -> Result<&[T]> {
        verify_channel(n, self.shape.channels)?;
        let len = self.shape.channel_len();
        Ok(&self.data[n * len..(n + 1) * len])
    }

    pub fn channel_data_mut(&mut self, n: usize) -> Result<&mut [T]> {
        verify_channel(n, self.shape.channels)?;
        let len = self.shape.channel_len();
        Ok(&mut self.data[n * len..(n + 1) * len])
    }

    /// Bins of one frame.
    pub fn frame(&self, channel: usize, frame: usize) -> Result<&[T]> {
        let data = self.channel_data(channel)?;
        if frame >= self.shape.frames {
            return Err(SignalError::invalid_argument(format!(
                "frame {} out of range ({} frames)",
                frame, self.shape.frames
            )));
        }
        let bins = self.shape.bins;
        Ok(&data[frame * bins..(frame + 1) * bins])
    }

    /// Channel `n` as its own one-channel array.
    pub fn channel(&self, n: usize) -> Result<Self> {
        let data = self.channel_data(n)?.to_vec();
        Self::from_raw(TfShape::new(self.shape.bins, self.shape.frames, 1), data)
    }

    /// Channel `n` as a `rows[bin][frame]` matrix.
    pub fn to_matrix(&self, n: usize) -> Result<Vec<Vec<T>>> {
        let data = self.channel_data(n)?;
        let bins = self.shape.bins;
        Ok((0..bins)
            .map(|b| data.iter().skip(b).step_by(bins.max(1)).copied().collect())
            .collect())
    }

    pub fn map<U: Copy>(&self, f: impl Fn(T) -> U) -> TfArray<U> {
        TfArray {
            data: self.data.iter().map(|&x| f(x)).collect(),
            shape: self.shape,
        }
    }
}

impl<T> TfArray<T>
where
    T: Copy + Default + AddAssign + Mul<f64, Output = T>,
{
    /// Average across channels into a one-channel array.
    pub fn to_one_channel(&self) -> Self {
        let len = self.shape.channel_len();
        let rows = self.data.chunks_exact(len.max(1)).take(self.shape.channels);
        let data = mean_across(rows, len);
        Self {
            data,
            shape: TfShape::new(self.shape.bins, self.shape.frames, 1),
        }
    }
}

impl TfArray<Complex64> {
    /// `|X|` per element.
    pub fn magnitude(&self) -> TfArray<f64> {
        self.map(Complex64::norm)
    }

    /// `|X|²` per element.
    pub fn power(&self) -> TfArray<f64> {
        self.map(Complex64::norm_sqr)
    }
}
