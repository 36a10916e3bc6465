//! Fast Fourier Transform (FFT) algorithms.
//!
//! Power-of-two lengths run through a radix-2
//! [Stockham](https://en.wikipedia.org/wiki/Cooley%E2%80%93Tukey_FFT_algorithm)
//! auto-sort FFT; every other length goes through Bluestein's chirp-z
//! algorithm on top of it. A [`FftPlanner`] caches twiddle tables and
//! Bluestein chirps per size so repeated frames of the same length only pay
//! for the butterflies.

use std::sync::Arc;

use hashbrown::HashMap;
use thiserror::Error;

use crate::num::Complex64;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FftError {
    #[error("empty input")]
    EmptyInput,
    #[error("mismatched lengths")]
    MismatchedLengths,
}

type BluesteinPair = (Arc<[Complex64]>, Arc<[Complex64]>);

/// Per-size cache of FFT tables plus a reusable scratch buffer.
///
/// A planner is cheap to create and is owned by whoever runs the transform;
/// it is never shared between threads.
pub struct FftPlanner {
    /// Twiddle tables keyed by transform size `n`. The table for `n` has
    /// `n/2` entries holding `exp(-2πi k / n)`.
    cache: HashMap<usize, Arc<[Complex64]>>,
    /// Chirp and FFT-of-kernel pairs keyed by the (non power-of-two) size.
    bluestein_cache: HashMap<usize, BluesteinPair>,
    scratch: Vec<Complex64>,
}

impl Default for FftPlanner {
    fn default() -> Self {
        Self::new()
    }
}

impl FftPlanner {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
            bluestein_cache: HashMap::new(),
            scratch: Vec::new(),
        }
    }

    /// Retrieve the twiddle table for a power-of-two size `n`.
    pub fn get_twiddles(&mut self, n: usize) -> Arc<[Complex64]> {
        if let Some(table) = self.cache.get(&n) {
            return Arc::clone(table);
        }
        log::trace!("fft planner: building twiddle table for n={}", n);
        let table: Arc<[Complex64]> = (0..n / 2).map(|k| Complex64::twiddle(k, n)).collect();
        self.cache.insert(n, Arc::clone(&table));
        table
    }

    fn get_bluestein(&mut self, n: usize) -> BluesteinPair {
        if let Some((chirp, kernel)) = self.bluestein_cache.get(&n) {
            return (Arc::clone(chirp), Arc::clone(kernel));
        }
        log::trace!("fft planner: building bluestein chirp for n={}", n);
        let m = (2 * n - 1).next_power_of_two();
        let period = 2 * n;
        let mut chirp = Vec::with_capacity(n);
        let mut kernel = Vec::with_capacity(m);
        for i in 0..n {
            // i² mod 2n keeps the angle small; exp(iπ i²/n) has period 2n in i².
            let angle = core::f64::consts::PI * ((i * i) % period) as f64 / n as f64;
            chirp.push(Complex64::expi(-angle));
            kernel.push(Complex64::expi(angle));
        }
        kernel.resize(m, Complex64::ZERO);
        for i in 1..n {
            kernel[m - i] = kernel[i];
        }
        self.stockham(&mut kernel);
        let pair: BluesteinPair = (Arc::from(chirp), Arc::from(kernel));
        self.bluestein_cache
            .insert(n, (Arc::clone(&pair.0), Arc::clone(&pair.1)));
        pair
    }

    /// In-place forward FFT of any non-empty length.
    pub fn fft(&mut self, input: &mut [Complex64]) -> Result<(), FftError> {
        let n = input.len();
        if n == 0 {
            return Err(FftError::EmptyInput);
        }
        if n == 1 {
            return Ok(());
        }
        if n.is_power_of_two() {
            self.stockham(input);
        } else {
            self.bluestein(input);
        }
        Ok(())
    }

    /// In-place inverse FFT, scaled by `1/n`.
    pub fn ifft(&mut self, input: &mut [Complex64]) -> Result<(), FftError> {
        let n = input.len();
        if n == 0 {
            return Err(FftError::EmptyInput);
        }
        for c in input.iter_mut() {
            c.im = -c.im;
        }
        self.fft(input)?;
        let scale = 1.0 / n as f64;
        for c in input.iter_mut() {
            c.re *= scale;
            c.im = -c.im * scale;
        }
        Ok(())
    }

    /// Out-of-place forward FFT; `output` must match `input` in length.
    pub fn fft_out_of_place(
        &mut self,
        input: &[Complex64],
        output: &mut [Complex64],
    ) -> Result<(), FftError> {
        if input.len() != output.len() {
            return Err(FftError::MismatchedLengths);
        }
        output.copy_from_slice(input);
        self.fft(output)
    }

    /// Stockham auto-sort FFT using a double-buffered approach.
    fn stockham(&mut self, input: &mut [Complex64]) {
        let n = input.len();
        let twiddles = self.get_twiddles(n);
        let mut scratch = core::mem::take(&mut self.scratch);
        scratch.clear();
        scratch.resize(n, Complex64::ZERO);

        // n1 = number of groups, n2 = size of each group in this pass.
        let mut in_input = true;
        let mut n1 = 1usize;
        let mut n2 = n;
        while n1 < n {
            n2 >>= 1;
            if in_input {
                butterfly_pass(input, &mut scratch, &twiddles, n1, n2);
            } else {
                butterfly_pass(&scratch, input, &twiddles, n1, n2);
            }
            in_input = !in_input;
            n1 <<= 1;
        }

        // If result is in scratch, copy back to input.
        if !in_input {
            input.copy_from_slice(&scratch[..n]);
        }
        self.scratch = scratch;
    }

    /// Bluestein's algorithm for non-power-of-two sizes.
    fn bluestein(&mut self, input: &mut [Complex64]) {
        let (chirp, kernel) = self.get_bluestein(input.len());
        let m = kernel.len();
        let mut a: Vec<Complex64> = input
            .iter()
            .zip(chirp.iter())
            .map(|(&x, &c)| x * c)
            .collect();
        a.resize(m, Complex64::ZERO);
        self.stockham(&mut a);
        for (ai, &bi) in a.iter_mut().zip(kernel.iter()) {
            *ai = (*ai * bi).conj();
        }
        self.stockham(&mut a);
        let scale = 1.0 / m as f64;
        for ((out, &ai), &c) in input.iter_mut().zip(a.iter()).zip(chirp.iter()) {
            *out = ai.conj().scale(scale) * c;
        }
    }
}

/// One radix-2 Stockham pass: twiddle for group `k` is
/// `exp(-2πi * k / (2*n1)) = table[k * n2]`.
#[inline]
fn butterfly_pass(
    src: &[Complex64],
    dst: &mut [Complex64],
    twiddles: &[Complex64],
    n1: usize,
    n2: usize,
) {
    for k in 0..n1 {
        let w = twiddles[k * n2];
        let base0 = 2 * k * n2;
        let base1 = base0 + n2;
        let dst0 = k * n2;
        let dst1 = (k + n1) * n2;
        for j in 0..n2 {
            let u = src[base0 + j];
            let v = src[base1 + j] * w;
            dst[dst0 + j] = u + v;
            dst[dst1 + j] = u - v;
        }
    }
}
