//! Real-input FFT helpers built on top of the complex FFT.
//!
//! A real frame of length `n` has a conjugate-symmetric spectrum, so bins
//! `[0, n/2]` carry all of its information. These helpers convert between a
//! real frame, its full spectrum and its non-redundant half.

use crate::fft::{FftError, FftPlanner};
use crate::num::Complex64;

/// Number of non-redundant bins of a real `n`-point transform.
#[inline]
pub const fn half_len(n: usize) -> usize {
    n / 2 + 1
}

/// Forward transform of a real frame, zero-padded to `n` points.
///
/// `buf` is resized to `n` and receives the full spectrum. Frames longer
/// than `n` are rejected with [`FftError::MismatchedLengths`].
pub fn rfft(
    planner: &mut FftPlanner,
    input: &[f64],
    n: usize,
    buf: &mut Vec<Complex64>,
) -> Result<(), FftError> {
    if input.len() > n {
        return Err(FftError::MismatchedLengths);
    }
    buf.clear();
    buf.extend(input.iter().map(|&x| Complex64::from_real(x)));
    buf.resize(n, Complex64::ZERO);
    planner.fft(buf)
}

/// Rebuild a full `n`-point spectrum from its bins `[0, n/2]`.
///
/// Bin `k > n/2` is the conjugate of bin `n - k`.
pub fn expand_half_spectrum(
    half: &[Complex64],
    n: usize,
    out: &mut Vec<Complex64>,
) -> Result<(), FftError> {
    if n == 0 {
        return Err(FftError::EmptyInput);
    }
    if half.len() != half_len(n) {
        return Err(FftError::MismatchedLengths);
    }
    out.clear();
    out.extend_from_slice(half);
    out.extend((half_len(n)..n).map(|k| half[n - k].conj()));
    Ok(())
}

/// Inverse transform of a full spectrum, keeping the real part of the first
/// `output.len()` samples.
pub fn irfft(
    planner: &mut FftPlanner,
    spectrum: &mut [Complex64],
    output: &mut [f64],
) -> Result<(), FftError> {
    if output.len() > spectrum.len() {
        return Err(FftError::MismatchedLengths);
    }
    planner.ifft(spectrum)?;
    for (out, c) in output.iter_mut().zip(spectrum.iter()) {
        *out = c.re;
    }
    Ok(())
}
