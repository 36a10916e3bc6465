//! Complex arithmetic used by every spectral buffer in the crate.
//!
//! Samples are `f64` throughout, so there is a single concrete complex type
//! rather than a generic one.

use core::f64::consts::PI;

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Complex64 {
    pub re: f64,
    pub im: f64,
}

impl Complex64 {
    pub const ZERO: Self = Self { re: 0.0, im: 0.0 };
    pub const ONE: Self = Self { re: 1.0, im: 0.0 };

    #[inline(always)]
    pub const fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    #[inline(always)]
    pub const fn from_real(re: f64) -> Self {
        Self { re, im: 0.0 }
    }

    pub fn zero() -> Self {
        Self::ZERO
    }

    /// `exp(i * theta)`.
    #[inline(always)]
    pub fn expi(theta: f64) -> Self {
        let (sin, cos) = theta.sin_cos();
        Self { re: cos, im: sin }
    }

    /// `exp(-2πi * k / n)` evaluated directly rather than by recurrence, so
    /// large tables do not accumulate rounding error.
    #[inline]
    pub fn twiddle(k: usize, n: usize) -> Self {
        Self::expi(-2.0 * PI * k as f64 / n as f64)
    }

    #[inline(always)]
    pub fn conj(self) -> Self {
        Self {
            re: self.re,
            im: -self.im,
        }
    }

    #[inline(always)]
    pub fn norm_sqr(self) -> f64 {
        self.re.mul_add(self.re, self.im * self.im)
    }

    /// Magnitude, computed with `hypot` to avoid overflow on large bins.
    #[inline(always)]
    pub fn norm(self) -> f64 {
        self.re.hypot(self.im)
    }

    #[inline(always)]
    pub fn scale(self, k: f64) -> Self {
        Self {
            re: self.re * k,
            im: self.im * k,
        }
    }

    #[inline(always)]
    pub fn is_finite(self) -> bool {
        self.re.is_finite() && self.im.is_finite()
    }
}

impl From<f64> for Complex64 {
    fn from(re: f64) -> Self {
        Self::from_real(re)
    }
}

impl core::ops::Neg for Complex64 {
    type Output = Self;
    #[inline(always)]
    fn neg(self) -> Self {
        Self {
            re: -self.re,
            im: -self.im,
        }
    }
}

impl core::ops::Add for Complex64 {
    type Output = Self;
    #[inline(always)]
    fn add(self, other: Self) -> Self {
        Self {
            re: self.re + other.re,
            im: self.im + other.im,
        }
    }
}

impl core::ops::AddAssign for Complex64 {
    #[inline(always)]
    fn add_assign(&mut self, other: Self) {
        self.re += other.re;
        self.im += other.im;
    }
}

impl core::ops::Sub for Complex64 {
    type Output = Self;
    #[inline(always)]
    fn sub(self, other: Self) -> Self {
        Self {
            re: self.re - other.re,
            im: self.im - other.im,
        }
    }
}

impl core::ops::Mul for Complex64 {
    type Output = Self;
    #[inline(always)]
    fn mul(self, other: Self) -> Self {
        Self {
            re: self.re.mul_add(other.re, -(self.im * other.im)),
            im: self.re.mul_add(other.im, self.im * other.re),
        }
    }
}

impl core::ops::MulAssign for Complex64 {
    #[inline(always)]
    fn mul_assign(&mut self, other: Self) {
        *self = *self * other;
    }
}

impl core::ops::Mul<f64> for Complex64 {
    type Output = Self;
    #[inline(always)]
    fn mul(self, k: f64) -> Self {
        self.scale(k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mul_matches_definition() {
        let a = Complex64::new(1.5, -2.0);
        let b = Complex64::new(-0.5, 3.0);
        let c = a * b;
        assert!((c.re - (1.5 * -0.5 - (-2.0 * 3.0))).abs() < 1e-12);
        assert!((c.im - (1.5 * 3.0 + -2.0 * -0.5)).abs() < 1e-12);
    }

    #[test]
    fn test_conj_and_norm() {
        let a = Complex64::new(3.0, 4.0);
        assert_eq!(a.conj(), Complex64::new(3.0, -4.0));
        assert!((a.norm() - 5.0).abs() < 1e-12);
        assert!((a.norm_sqr() - 25.0).abs() < 1e-12);
    }

    #[test]
    fn test_twiddle_quarter_turn() {
        let w = Complex64::twiddle(1, 4);
        assert!(w.re.abs() < 1e-15);
        assert!((w.im + 1.0).abs() < 1e-15);
    }
}
