//! Time-domain sample storage.
//!
//! A [`SampleBuffer`] holds `channels x length` finite `f64` samples in one
//! channel-major vector together with the sample rate and an *active
//! region*: a `[start, end)` window that every read accessor and transform
//! sees. Narrowing the active region discards nothing, but the in-place
//! mutators and arithmetic refuse to run until it is reset.

use core::fmt;

use crate::channel::{mean_across, verify_channel};
use crate::error::{Result, SignalError};

/// How [`SampleBuffer::add_with`] treats operands of different lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LengthPolicy {
    /// Lengths must match.
    #[default]
    Strict,
    /// The shorter operand is padded with zeros.
    ZeroFill,
    /// The result has the shorter length.
    Truncate,
}

/// Integer sample width at the codec boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BitDepth {
    Eight,
    Sixteen,
    TwentyFour,
    ThirtyTwo,
}

impl BitDepth {
    pub fn from_bits(bits: u32) -> Result<Self> {
        match bits {
            8 => Ok(BitDepth::Eight),
            16 => Ok(BitDepth::Sixteen),
            24 => Ok(BitDepth::TwentyFour),
            32 => Ok(BitDepth::ThirtyTwo),
            other => Err(SignalError::invalid_argument(format!(
                "unsupported bit depth {} (expected 8, 16, 24 or 32)",
                other
            ))),
        }
    }

    pub fn bits(self) -> u32 {
        match self {
            BitDepth::Eight => 8,
            BitDepth::Sixteen => 16,
            BitDepth::TwentyFour => 24,
            BitDepth::ThirtyTwo => 32,
        }
    }

    /// `2^(bits - 1)`, the value full scale maps to.
    pub fn full_scale(self) -> f64 {
        (1u64 << (self.bits() - 1)) as f64
    }

    fn min_value(self) -> f64 {
        -self.full_scale()
    }

    fn max_value(self) -> f64 {
        self.full_scale() - 1.0
    }
}

impl TryFrom<u32> for BitDepth {
    type Error = SignalError;

    fn try_from(bits: u32) -> Result<Self> {
        BitDepth::from_bits(bits)
    }
}

/// Quantized samples handed to an [`AudioWriter`](crate::AudioWriter).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedPointSamples {
    channels: Vec<Vec<i32>>,
    bit_depth: BitDepth,
    sample_rate: u32,
}

impl FixedPointSamples {
    pub fn channels(&self) -> &[Vec<i32>] {
        &self.channels
    }

    pub fn bit_depth(&self) -> BitDepth {
        self.bit_depth
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    pub fn len(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Frame-interleaved samples (`L R L R ...`), the order most codecs want.
    pub fn interleaved(&self) -> Vec<i32> {
        let len = self.len();
        let mut out = Vec::with_capacity(len * self.channels.len());
        for i in 0..len {
            out.extend(self.channels.iter().map(|ch| ch[i]));
        }
        out
    }
}

/// Multi-channel real samples with a sample rate and an active region.
#[derive(Clone, PartialEq)]
pub struct SampleBuffer {
    /// Channel-major samples; channel `c` is `data[c * full_len..(c + 1) * full_len]`.
    data: Vec<f64>,
    num_channels: usize,
    full_len: usize,
    sample_rate: u32,
    active_start: usize,
    active_end: usize,
}

impl fmt::Debug for SampleBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SampleBuffer")
            .field("num_channels", &self.num_channels)
            .field("full_len", &self.full_len)
            .field("sample_rate", &self.sample_rate)
            .field("active", &(self.active_start..self.active_end))
            .finish()
    }
}

fn check_sample_rate(sample_rate: u32) -> Result<()> {
    if sample_rate == 0 {
        Err(SignalError::invalid_argument("sample rate must be positive"))
    } else {
        Ok(())
    }
}

fn check_finite(data: &[f64], len: usize) -> Result<()> {
    match data.iter().position(|x| !x.is_finite()) {
        None => Ok(()),
        Some(pos) => {
            let (channel, index) = if len == 0 { (0, pos) } else { (pos / len, pos % len) };
            Err(SignalError::NonFinite { channel, index })
        }
    }
}

impl SampleBuffer {
    fn from_parts(data: Vec<f64>, num_channels: usize, len: usize, sample_rate: u32) -> Result<Self> {
        check_sample_rate(sample_rate)?;
        if num_channels == 0 {
            return Err(SignalError::invalid_argument(
                "a sample buffer needs at least one channel",
            ));
        }
        debug_assert_eq!(data.len(), num_channels * len);
        check_finite(&data, len)?;
        Ok(Self {
            data,
            num_channels,
            full_len: len,
            sample_rate,
            active_start: 0,
            active_end: len,
        })
    }

    /// Build from rows of samples.
    ///
    /// Rows are channels. When `auto_transpose` is set and there are more
    /// rows than samples per row, the input is assumed to be
    /// `(samples, channels)` and is transposed with a warning.
    pub fn from_rows(rows: Vec<Vec<f64>>, sample_rate: u32, auto_transpose: bool) -> Result<Self> {
        check_sample_rate(sample_rate)?;
        let row_len = match rows.first() {
            Some(row) => row.len(),
            None => {
                return Err(SignalError::invalid_argument(
                    "a sample buffer needs at least one channel",
                ))
            }
        };
        if let Some(bad) = rows.iter().position(|r| r.len() != row_len) {
            return Err(SignalError::invalid_argument(format!(
                "row {} has {} samples, expected {}",
                bad,
                rows[bad].len(),
                row_len
            )));
        }

        if auto_transpose && row_len > 0 && rows.len() > row_len {
            log::warn!(
                "input has {} rows of {} samples; transposing to {} channel(s)",
                rows.len(),
                row_len,
                row_len
            );
            let len = rows.len();
            let mut data = vec![0.0; len * row_len];
            for (i, row) in rows.iter().enumerate() {
                for (c, &x) in row.iter().enumerate() {
                    data[c * len + i] = x;
                }
            }
            return Self::from_parts(data, row_len, len, sample_rate);
        }

        let num_channels = rows.len();
        let data: Vec<f64> = rows.into_iter().flatten().collect();
        Self::from_parts(data, num_channels, row_len, sample_rate)
    }

    /// One channel of samples.
    pub fn from_mono(samples: Vec<f64>, sample_rate: u32) -> Result<Self> {
        let len = samples.len();
        Self::from_parts(samples, 1, len, sample_rate)
    }

    /// De-interleave `L R L R ...` frames into channels.
    pub fn from_interleaved(samples: &[f64], num_channels: usize, sample_rate: u32) -> Result<Self> {
        if num_channels == 0 {
            return Err(SignalError::invalid_argument(
                "a sample buffer needs at least one channel",
            ));
        }
        if samples.len() % num_channels != 0 {
            return Err(SignalError::invalid_argument(format!(
                "{} interleaved samples do not divide into {} channels",
                samples.len(),
                num_channels
            )));
        }
        let len = samples.len() / num_channels;
        let mut data = vec![0.0; samples.len()];
        for (i, frame) in samples.chunks_exact(num_channels).enumerate() {
            for (c, &x) in frame.iter().enumerate() {
                data[c * len + i] = x;
            }
        }
        Self::from_parts(data, num_channels, len, sample_rate)
    }

    /// Silence of the given shape.
    pub fn zeros(num_channels: usize, len: usize, sample_rate: u32) -> Result<Self> {
        Self::from_parts(vec![0.0; num_channels * len], num_channels, len, sample_rate)
    }

    /// Rescale integer samples by `2^(bits - 1)`.
    pub fn from_fixed_point(rows: &[Vec<i32>], bit_depth: BitDepth, sample_rate: u32) -> Result<Self> {
        let scale = 1.0 / bit_depth.full_scale();
        let rows: Vec<Vec<f64>> = rows
            .iter()
            .map(|row| row.iter().map(|&x| x as f64 * scale).collect())
            .collect();
        Self::from_rows(rows, sample_rate, false)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    pub fn is_mono(&self) -> bool {
        self.num_channels == 1
    }

    pub fn is_stereo(&self) -> bool {
        self.num_channels == 2
    }

    /// Length of the active region.
    pub fn len(&self) -> usize {
        self.active_end - self.active_start
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Length of the stored samples, ignoring the active region.
    pub fn full_len(&self) -> usize {
        self.full_len
    }

    /// Duration of the active region in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.len() as f64 / self.sample_rate as f64
    }

    pub fn active_start(&self) -> usize {
        self.active_start
    }

    pub fn active_end(&self) -> usize {
        self.active_end
    }

    /// Restrict reads to `[start, end)`. `end` is clamped to the stored
    /// length and `start` to `end`; nothing is discarded.
    pub fn set_active_region(&mut self, start: usize, end: usize) {
        self.active_end = end.min(self.full_len);
        self.active_start = start.min(self.active_end);
    }

    pub fn reset_active_region(&mut self) {
        self.active_start = 0;
        self.active_end = self.full_len;
    }

    pub fn active_region_is_default(&self) -> bool {
        self.active_start == 0 && self.active_end == self.full_len
    }

    fn require_default_region(&self, op: &str) -> Result<()> {
        if self.active_region_is_default() {
            Ok(())
        } else {
            Err(SignalError::invalid_state(format!(
                "cannot {} while the active region is narrowed to {}..{}",
                op, self.active_start, self.active_end
            )))
        }
    }

    #[inline]
    fn row(&self, c: usize) -> &[f64] {
        &self.data[c * self.full_len..(c + 1) * self.full_len]
    }

    /// Active region of channel `n`.
    pub fn channel(&self, n: usize) -> Result<&[f64]> {
        verify_channel(n, self.num_channels)?;
        Ok(&self.row(n)[self.active_start..self.active_end])
    }

    /// Active region of every channel, in order.
    pub fn channels(&self) -> impl ExactSizeIterator<Item = &[f64]> + '_ {
        (0..self.num_channels).map(move |c| &self.row(c)[self.active_start..self.active_end])
    }

    /// Active region as frame-interleaved samples.
    pub fn to_interleaved(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.len() * self.num_channels);
        for i in self.active_start..self.active_end {
            out.extend((0..self.num_channels).map(|c| self.data[c * self.full_len + i]));
        }
        out
    }

    /// Channel average of the active region.
    pub fn to_mono(&self) -> Vec<f64> {
        mean_across(self.channels(), self.len())
    }

    /// Channel average of the active region as a one-channel buffer.
    pub fn to_mono_buffer(&self) -> Result<SampleBuffer> {
        SampleBuffer::from_mono(self.to_mono(), self.sample_rate)
    }

    /// Largest absolute sample in the active region.
    pub fn peak(&self) -> f64 {
        self.channels()
            .flat_map(|ch| ch.iter())
            .fold(0.0, |m: f64, &x| m.max(x.abs()))
    }

    /// Root mean square over every channel of the active region.
    pub fn rms(&self) -> f64 {
        let count = self.len() * self.num_channels;
        if count == 0 {
            return 0.0;
        }
        let sum: f64 = self.channels().flat_map(|ch| ch.iter()).map(|x| x * x).sum();
        (sum / count as f64).sqrt()
    }

    /// Timestamp in seconds of each active sample, evenly spaced from 0 to
    /// the duration inclusive.
    pub fn time_vector(&self) -> Vec<f64> {
        linspace(0.0, self.duration_secs(), self.len())
    }

    /// Replace the stored samples with `rows` (each `len` long); resets the
    /// active region.
    fn replace_rows(&mut self, len: usize, mut fill: impl FnMut(usize, &[f64], &mut Vec<f64>)) {
        let mut data = Vec::with_capacity(self.num_channels * len);
        for c in 0..self.num_channels {
            let before = data.len();
            fill(c, self.row(c), &mut data);
            debug_assert_eq!(data.len() - before, len);
        }
        self.data = data;
        self.full_len = len;
        self.reset_active_region();
    }

    /// Append `other` after the current samples.
    pub fn concat(&mut self, other: &SampleBuffer) -> Result<()> {
        self.require_default_region("concatenate")?;
        self.check_compatible(other)?;
        let len = self.full_len + other.len();
        self.replace_rows(len, |c, row, out| {
            out.extend_from_slice(row);
            out.extend_from_slice(&other.row(c)[other.active_start..other.active_end]);
        });
        Ok(())
    }

    /// Keep only the first `n` samples.
    pub fn truncate_samples(&mut self, n: usize) -> Result<()> {
        if n > self.full_len {
            return Err(SignalError::invalid_argument(format!(
                "cannot truncate {} samples to {}",
                self.full_len, n
            )));
        }
        self.require_default_region("truncate")?;
        self.replace_rows(n, |_, row, out| out.extend_from_slice(&row[..n]));
        Ok(())
    }

    /// Keep only the first `seconds` of audio.
    pub fn truncate_seconds(&mut self, seconds: f64) -> Result<()> {
        if seconds.is_nan() || seconds < 0.0 || seconds > self.duration_secs() {
            return Err(SignalError::invalid_argument(format!(
                "cannot truncate a {:.3}s signal to {}s",
                self.duration_secs(),
                seconds
            )));
        }
        let n = (seconds * self.sample_rate as f64).floor() as usize;
        self.truncate_samples(n.min(self.full_len))
    }

    /// Drop `before` samples from the start and `after` from the end.
    pub fn crop(&mut self, before: usize, after: usize) -> Result<()> {
        self.require_default_region("crop")?;
        let len = self.full_len;
        match before.checked_add(after) {
            Some(total) if total <= len => {
                let keep = len - total;
                self.replace_rows(keep, |_, row, out| {
                    out.extend_from_slice(&row[before..before + keep])
                });
                Ok(())
            }
            _ => Err(SignalError::invalid_argument(format!(
                "cannot crop {} + {} samples from a signal of {}",
                before, after, len
            ))),
        }
    }

    /// Insert `before` zeros at the start and `after` at the end.
    pub fn zero_pad(&mut self, before: usize, after: usize) -> Result<()> {
        self.require_default_region("zero-pad")?;
        let len = self.full_len + before + after;
        self.replace_rows(len, |_, row, out| {
            out.extend(core::iter::repeat(0.0).take(before));
            out.extend_from_slice(row);
            out.extend(core::iter::repeat(0.0).take(after));
        });
        Ok(())
    }

    /// Divide by the peak if it exceeds 1.0. Returns whether anything was
    /// scaled.
    pub fn peak_normalize(&mut self) -> Result<bool> {
        self.require_default_region("normalize")?;
        let peak = self.peak();
        if peak > 1.0 {
            let inv = 1.0 / peak;
            self.data.iter_mut().for_each(|x| *x *= inv);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Multiply every sample by `gain` in place. Fails without touching the
    /// samples if any product overflows.
    pub fn apply_gain(&mut self, gain: f64) -> Result<()> {
        check_gain(gain)?;
        self.require_default_region("apply gain")?;
        let scaled: Vec<f64> = self.data.iter().map(|x| x * gain).collect();
        check_finite(&scaled, self.full_len)?;
        self.data = scaled;
        Ok(())
    }

    /// A new buffer holding the active region multiplied by `gain`.
    pub fn scale(&self, gain: f64) -> Result<SampleBuffer> {
        check_gain(gain)?;
        let mut data = Vec::with_capacity(self.len() * self.num_channels);
        for ch in self.channels() {
            data.extend(ch.iter().map(|x| x * gain));
        }
        Self::from_parts(data, self.num_channels, self.len(), self.sample_rate)
    }

    fn check_compatible(&self, other: &SampleBuffer) -> Result<()> {
        if self.num_channels != other.num_channels {
            return Err(SignalError::invalid_argument(format!(
                "channel count mismatch: {} vs {}",
                self.num_channels, other.num_channels
            )));
        }
        if self.sample_rate != other.sample_rate {
            return Err(SignalError::invalid_argument(format!(
                "sample rate mismatch: {} vs {}",
                self.sample_rate, other.sample_rate
            )));
        }
        Ok(())
    }

    /// Element-wise sum. Lengths must match.
    pub fn add(&self, other: &SampleBuffer) -> Result<SampleBuffer> {
        self.combine(other, LengthPolicy::Strict, 1.0)
    }

    /// Element-wise difference. Lengths must match.
    pub fn subtract(&self, other: &SampleBuffer) -> Result<SampleBuffer> {
        self.combine(other, LengthPolicy::Strict, -1.0)
    }

    /// Element-wise sum, reconciling lengths according to `policy`.
    pub fn add_with(&self, other: &SampleBuffer, policy: LengthPolicy) -> Result<SampleBuffer> {
        self.combine(other, policy, 1.0)
    }

    /// Element-wise difference, reconciling lengths according to `policy`.
    pub fn subtract_with(&self, other: &SampleBuffer, policy: LengthPolicy) -> Result<SampleBuffer> {
        self.combine(other, policy, -1.0)
    }

    fn combine(&self, other: &SampleBuffer, policy: LengthPolicy, sign: f64) -> Result<SampleBuffer> {
        self.require_default_region("do arithmetic")?;
        other.require_default_region("do arithmetic")?;
        self.check_compatible(other)?;
        let (a, b) = (self.full_len, other.full_len);
        let len = match policy {
            _ if a == b => a,
            LengthPolicy::Strict => {
                return Err(SignalError::invalid_argument(format!(
                    "cannot combine signals of length {} and {}",
                    a, b
                )))
            }
            LengthPolicy::ZeroFill => a.max(b),
            LengthPolicy::Truncate => a.min(b),
        };
        let mut data = Vec::with_capacity(len * self.num_channels);
        for c in 0..self.num_channels {
            let (x, y) = (self.row(c), other.row(c));
            data.extend((0..len).map(|i| {
                x.get(i).copied().unwrap_or(0.0) + sign * y.get(i).copied().unwrap_or(0.0)
            }));
        }
        Self::from_parts(data, self.num_channels, len, self.sample_rate)
    }

    /// Deep comparison of samples, sample rate and active region.
    pub fn equals(&self, other: &SampleBuffer) -> bool {
        self == other
    }

    /// Quantize the active region: multiply by `2^(bits - 1)`, truncate
    /// toward zero and saturate to the depth's range.
    pub fn to_fixed_point(&self, bit_depth: BitDepth) -> FixedPointSamples {
        let scale = bit_depth.full_scale();
        let (lo, hi) = (bit_depth.min_value(), bit_depth.max_value());
        let channels = self
            .channels()
            .map(|ch| {
                ch.iter()
                    .map(|&x| (x * scale).trunc().clamp(lo, hi) as i32)
                    .collect()
            })
            .collect();
        FixedPointSamples {
            channels,
            bit_depth,
            sample_rate: self.sample_rate,
        }
    }
}

fn check_gain(gain: f64) -> Result<()> {
    if gain.is_finite() {
        Ok(())
    } else {
        Err(SignalError::invalid_argument(format!(
            "gain must be finite, got {}",
            gain
        )))
    }
}

/// `n` evenly spaced values from `start` to `end` inclusive.
pub(crate) fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}
