//! Inverse Short-Time Fourier Transform with weighted overlap-add.
//!
//! Every frame is rebuilt to a full `fft_bins` spectrum (from its
//! non-redundant half when reflection was removed), inverse transformed,
//! cut to `window_length`, multiplied by the synthesis window and added at
//! `k * hop_length`. The sum is divided by the overlapped squared window,
//! which undoes the analysis and synthesis windows for any window/hop pair
//! whose squared windows never vanish together.

use crate::buffer::SampleBuffer;
use crate::channel::dispatch;
use crate::error::{Result, SignalError};
use crate::fft::FftPlanner;
use crate::num::Complex64;
use crate::params::StftParams;
use crate::rfft::{expand_half_spectrum, half_len, irfft};
use crate::spectrogram::Spectrogram;

/// Summed squared window below which a sample is left unnormalized.
pub const WINDOW_ENERGY_FLOOR: f64 = 1e-30;

/// Overlap-added samples of one channel plus the number of positions whose
/// window energy was below [`WINDOW_ENERGY_FLOOR`].
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelSynthesis {
    pub samples: Vec<f64>,
    pub unnormalized: usize,
}

fn check_bins(bins: usize, params: &StftParams) -> Result<()> {
    let n = params.fft_bins();
    if bins == n || bins == half_len(n) {
        Ok(())
    } else {
        Err(SignalError::invalid_argument(format!(
            "{} bins match neither the half ({}) nor the full ({}) spectrum of a {}-point fft",
            bins,
            half_len(n),
            n,
            n
        )))
    }
}

/// Inverse STFT of one channel stored as `frames` blocks of `bins` values.
///
/// The output has `(frames - 1) * hop + window` samples and still includes
/// any `center` padding.
pub fn istft_channel(
    data: &[Complex64],
    bins: usize,
    params: &StftParams,
    window: &[f64],
    planner: &mut FftPlanner,
) -> Result<ChannelSynthesis> {
    check_bins(bins, params)?;
    if bins == 0 || data.is_empty() {
        return Err(SignalError::invalid_state("no spectrum to invert"));
    }
    if data.len() % bins != 0 {
        return Err(SignalError::invalid_argument(format!(
            "{} values are not a whole number of {}-bin frames",
            data.len(),
            bins
        )));
    }
    let n = params.fft_bins();
    let hop = params.hop_length();
    let win_len = params.window_length();
    if window.len() != win_len {
        return Err(SignalError::invalid_argument(format!(
            "window has {} samples, expected {}",
            window.len(),
            win_len
        )));
    }

    let frames = data.len() / bins;
    let out_len = params.reconstructed_len(frames);
    let mut samples = vec![0.0; out_len];
    let mut energy = vec![0.0; out_len];
    let mut spectrum = Vec::with_capacity(n);
    let mut time = vec![0.0; win_len];

    for (k, frame) in data.chunks_exact(bins).enumerate() {
        if bins == n {
            spectrum.clear();
            spectrum.extend_from_slice(frame);
        } else {
            expand_half_spectrum(frame, n, &mut spectrum)?;
        }
        irfft(planner, &mut spectrum, &mut time)?;
        let start = k * hop;
        let span = start..start + win_len;
        for (((out, e), &x), &w) in samples[span.clone()]
            .iter_mut()
            .zip(energy[span].iter_mut())
            .zip(time.iter())
            .zip(window.iter())
        {
            *out += x * w;
            *e += w * w;
        }
    }

    let mut unnormalized = 0;
    for (out, &e) in samples.iter_mut().zip(energy.iter()) {
        if e > WINDOW_ENERGY_FLOOR {
            *out /= e;
        } else {
            unnormalized += 1;
        }
    }
    Ok(ChannelSynthesis {
        samples,
        unnormalized,
    })
}

/// Inverse STFT of every channel of `spectrogram`.
///
/// `center` padding is removed, then the output is truncated or zero-padded
/// to `target_len` when given.
pub fn inverse(
    spectrogram: &Spectrogram,
    params: &StftParams,
    sample_rate: u32,
    target_len: Option<usize>,
) -> Result<SampleBuffer> {
    let shape = spectrogram.shape();
    if shape.bins == 0 || shape.frames == 0 {
        return Err(SignalError::invalid_state("no spectrum to invert"));
    }
    check_bins(shape.bins, params)?;
    log::debug!(
        "istft: {} channel(s) x {} bins x {} frames (window {} {}, hop {}, fft {})",
        shape.channels,
        shape.bins,
        shape.frames,
        params.window_type(),
        params.window_length(),
        params.hop_length(),
        params.fft_bins()
    );

    let window = params.window();
    let pad = params.center_padding();
    let synthesized = dispatch(shape.channels, |c| {
        let mut planner = FftPlanner::new();
        istft_channel(
            spectrogram.channel_data(c)?,
            shape.bins,
            params,
            &window,
            &mut planner,
        )
    })?;

    let unnormalized: usize = synthesized.iter().map(|s| s.unnormalized).sum();
    if unnormalized > 0 {
        log::warn!(
            "istft: {} sample(s) had zero window energy and were left unnormalized",
            unnormalized
        );
    }

    let rows = synthesized
        .into_iter()
        .map(|s| {
            let mut row: Vec<f64> = s.samples.into_iter().skip(pad).collect();
            if let Some(len) = target_len {
                row.resize(len, 0.0);
            }
            row
        })
        .collect();
    SampleBuffer::from_rows(rows, sample_rate, false)
}
