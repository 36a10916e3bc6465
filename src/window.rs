//! Window functions for STFT framing.
//!
//! Hann, Hamming and Blackman are generated in their periodic (DFT-even)
//! form, which is what makes them constant-overlap-add at the usual hop
//! ratios. Triangular, Kaiser and Tukey are symmetric.

use core::f64::consts::PI;
use core::fmt;
use core::str::FromStr;

use crate::error::SignalError;

/// Leading cosine coefficient for the Blackman window.
const BLACKMAN_A0: f64 = 0.42;
/// Second cosine coefficient for the Blackman window.
const BLACKMAN_A1: f64 = 0.5;
/// Third cosine coefficient for the Blackman window.
const BLACKMAN_A2: f64 = 0.08;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum WindowType {
    Rectangular,
    Hann,
    #[default]
    Hamming,
    Blackman,
    /// Bartlett (triangular) window.
    Triangular,
    /// Kaiser window with shape parameter `beta`.
    Kaiser { beta: f64 },
    /// Tukey window with taper fraction `alpha`, clamped to `[0, 1]`.
    Tukey { alpha: f64 },
}

impl WindowType {
    /// Generate this window with `len` samples.
    pub fn generate(self, len: usize) -> Vec<f64> {
        match self {
            WindowType::Rectangular => vec![1.0; len],
            WindowType::Hann => cosine_sum(len, &[0.5, 0.5]),
            WindowType::Hamming => cosine_sum(len, &[0.54, 0.46]),
            WindowType::Blackman => cosine_sum(len, &[BLACKMAN_A0, BLACKMAN_A1, BLACKMAN_A2]),
            WindowType::Triangular => triangular(len),
            WindowType::Kaiser { beta } => kaiser(len, beta),
            WindowType::Tukey { alpha } => tukey(len, alpha),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            WindowType::Rectangular => "rectangular",
            WindowType::Hann => "hann",
            WindowType::Hamming => "hamming",
            WindowType::Blackman => "blackman",
            WindowType::Triangular => "triangular",
            WindowType::Kaiser { .. } => "kaiser",
            WindowType::Tukey { .. } => "tukey",
        }
    }
}

impl fmt::Display for WindowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowType::Kaiser { beta } => write!(f, "kaiser({})", beta),
            WindowType::Tukey { alpha } => write!(f, "tukey({})", alpha),
            other => f.write_str(other.name()),
        }
    }
}

/// Parses `rectangular`, `hann`, `hamming`, `blackman`, `triangular`,
/// `kaiser` (beta 8.6) and `tukey` (alpha 0.5), case-insensitively.
impl FromStr for WindowType {
    type Err = SignalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rectangular" | "rect" | "boxcar" => Ok(WindowType::Rectangular),
            "hann" | "hanning" => Ok(WindowType::Hann),
            "hamming" => Ok(WindowType::Hamming),
            "blackman" => Ok(WindowType::Blackman),
            "triangular" | "bartlett" => Ok(WindowType::Triangular),
            "kaiser" => Ok(WindowType::Kaiser { beta: 8.6 }),
            "tukey" => Ok(WindowType::Tukey { alpha: 0.5 }),
            other => Err(SignalError::invalid_argument(format!(
                "unknown window type '{}'",
                other
            ))),
        }
    }
}

/// Periodic generalized cosine window `Σ (-1)^k a_k cos(2πk i / len)`.
fn cosine_sum(len: usize, coeffs: &[f64]) -> Vec<f64> {
    let step = 2.0 * PI / len as f64;
    (0..len)
        .map(|i| {
            coeffs
                .iter()
                .enumerate()
                .map(|(k, &a)| {
                    let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
                    sign * a * (step * (k * i) as f64).cos()
                })
                .sum()
        })
        .collect()
}

fn triangular(len: usize) -> Vec<f64> {
    if len <= 1 {
        return vec![1.0; len];
    }
    let half = (len as f64 - 1.0) / 2.0;
    (0..len)
        .map(|i| 1.0 - ((i as f64 - half) / half).abs())
        .collect()
}

fn bessel0(x: f64) -> f64 {
    // Approximate I0(x) using a series expansion
    let mut sum = 1.0;
    let y = x * x / 4.0;
    let mut t = y;
    let mut k = 1.0;
    for n in 1..30 {
        k *= n as f64;
        sum += t / (k * k);
        t *= y;
    }
    sum
}

fn kaiser(len: usize, beta: f64) -> Vec<f64> {
    if len <= 1 {
        return vec![1.0; len];
    }
    let denom = bessel0(beta);
    let m = (len - 1) as f64 / 2.0;
    (0..len)
        .map(|i| {
            let r = (i as f64 - m) / m;
            bessel0(beta * (1.0 - r * r).max(0.0).sqrt()) / denom
        })
        .collect()
}

fn tukey(len: usize, alpha: f64) -> Vec<f64> {
    if len <= 1 {
        return vec![1.0; len];
    }
    let alpha = alpha.clamp(0.0, 1.0);
    let span = len as f64 - 1.0;
    // Number of samples in each cosine taper region.
    let edge = (alpha * span / 2.0).floor() as usize;
    (0..len)
        .map(|n| {
            if n < edge {
                0.5 * (1.0 + (PI * (2.0 * n as f64 / (alpha * span) - 1.0)).cos())
            } else if n < len - edge {
                1.0
            } else {
                0.5 * (1.0 + (PI * (2.0 * n as f64 / (alpha * span) - 2.0 / alpha + 1.0)).cos())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hann() {
        let w = WindowType::Hann.generate(8);
        assert_eq!(w.len(), 8);
        assert!(w[0].abs() < 1e-12);
        assert!((w[4] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_hann_is_cola_at_half_hop() {
        let n = 16;
        let w = WindowType::Hann.generate(n);
        for i in 0..n / 2 {
            assert!((w[i] + w[i + n / 2] - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_hamming_and_blackman_ranges() {
        let h = WindowType::Hamming.generate(8);
        assert!(h.iter().all(|&x| (0.0..=1.0 + 1e-12).contains(&x)));
        assert!((h[0] - 0.08).abs() < 1e-12);
        let b = WindowType::Blackman.generate(8);
        assert!(b.iter().all(|&x| (-1e-12..=1.0 + 1e-12).contains(&x)));
    }

    #[test]
    fn test_kaiser_peak_and_symmetry() {
        let w = WindowType::Kaiser { beta: 5.0 }.generate(9);
        assert!((w[4] - 1.0).abs() < 1e-12);
        for (a, b) in w.iter().zip(w.iter().rev()) {
            assert!((a - b).abs() < 1e-12);
        }
        assert!(w.iter().all(|x| x.is_finite()));
    }

    #[test]
    fn test_tukey_alpha_clamp() {
        assert_eq!(
            WindowType::Tukey { alpha: -0.5 }.generate(8),
            WindowType::Tukey { alpha: 0.0 }.generate(8)
        );
        assert_eq!(WindowType::Tukey { alpha: 0.0 }.generate(8), vec![1.0; 8]);
    }

    #[test]
    fn test_degenerate_lengths() {
        for wt in [
            WindowType::Rectangular,
            WindowType::Hann,
            WindowType::Triangular,
            WindowType::Kaiser { beta: 3.0 },
            WindowType::Tukey { alpha: 0.5 },
        ] {
            assert!(wt.generate(0).is_empty());
            assert_eq!(wt.generate(1).len(), 1);
        }
        assert_eq!(WindowType::Triangular.generate(1), vec![1.0]);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("Hann".parse::<WindowType>().unwrap(), WindowType::Hann);
        assert_eq!(
            "bartlett".parse::<WindowType>().unwrap(),
            WindowType::Triangular
        );
        assert!("gaussian".parse::<WindowType>().is_err());
    }
}
