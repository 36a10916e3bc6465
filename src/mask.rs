//! Time-frequency masks.
//!
//! Separation algorithms hand their masks to the core through the [`Mask`]
//! trait: a shape plus values in [`TfArray`] storage order. Masks are never
//! broadcast; the shape must match the spectrogram exactly.

use crate::error::{Result, SignalError};
use crate::num::Complex64;
use crate::spectrogram::{Spectrogram, TfArray, TfShape};

/// Mask values in `(channel, frame, bin)` storage order.
#[derive(Debug, Clone, Copy)]
pub enum MaskValues<'a> {
    Real(&'a [f64]),
    Complex(&'a [Complex64]),
}

/// Anything that can be multiplied element-wise into a [`Spectrogram`].
pub trait Mask {
    fn shape(&self) -> TfShape;
    fn values(&self) -> MaskValues<'_>;
}

/// Real-valued gain per time-frequency cell.
#[derive(Debug, Clone, PartialEq)]
pub struct RealMask(TfArray<f64>);

impl RealMask {
    pub fn new(shape: TfShape, values: Vec<f64>) -> Result<Self> {
        TfArray::from_raw(shape, values).map(RealMask)
    }

    /// A mask that passes everything through.
    pub fn ones(shape: TfShape) -> Result<Self> {
        TfArray::filled(shape, 1.0).map(RealMask)
    }

    /// Build from `f(bin, frame, channel)`.
    pub fn from_fn(shape: TfShape, f: impl Fn(usize, usize, usize) -> f64) -> Result<Self> {
        let mut values = Vec::with_capacity(shape.len());
        for c in 0..shape.channels {
            for t in 0..shape.frames {
                values.extend((0..shape.bins).map(|b| f(b, t, c)));
            }
        }
        Self::new(shape, values)
    }

    /// `1.0` where `keep` holds, `0.0` elsewhere.
    pub fn binary(shape: TfShape, keep: impl Fn(usize, usize, usize) -> bool) -> Result<Self> {
        Self::from_fn(shape, |b, t, c| if keep(b, t, c) { 1.0 } else { 0.0 })
    }

    /// `1 - m` per cell, the mask of everything this one removes.
    pub fn complement(&self) -> Self {
        RealMask(self.0.map(|m| 1.0 - m))
    }

    pub fn as_array(&self) -> &TfArray<f64> {
        &self.0
    }
}

impl From<TfArray<f64>> for RealMask {
    fn from(array: TfArray<f64>) -> Self {
        RealMask(array)
    }
}

impl Mask for RealMask {
    fn shape(&self) -> TfShape {
        self.0.shape()
    }

    fn values(&self) -> MaskValues<'_> {
        MaskValues::Real(self.0.as_slice())
    }
}

/// Complex-valued gain per time-frequency cell.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexMask(TfArray<Complex64>);

impl ComplexMask {
    pub fn new(shape: TfShape, values: Vec<Complex64>) -> Result<Self> {
        TfArray::from_raw(shape, values).map(ComplexMask)
    }

    pub fn as_array(&self) -> &TfArray<Complex64> {
        &self.0
    }
}

impl From<TfArray<Complex64>> for ComplexMask {
    fn from(array: TfArray<Complex64>) -> Self {
        ComplexMask(array)
    }
}

impl Mask for ComplexMask {
    fn shape(&self) -> TfShape {
        self.0.shape()
    }

    fn values(&self) -> MaskValues<'_> {
        MaskValues::Complex(self.0.as_slice())
    }
}

impl Mask for Spectrogram {
    fn shape(&self) -> TfShape {
        TfArray::shape(self)
    }

    fn values(&self) -> MaskValues<'_> {
        MaskValues::Complex(self.as_slice())
    }
}

/// Element-wise product of `spectrogram` and `mask` as a new spectrogram.
pub fn apply<M: Mask + ?Sized>(spectrogram: &Spectrogram, mask: &M) -> Result<Spectrogram> {
    let shape = spectrogram.shape();
    if mask.shape() != shape {
        return Err(SignalError::invalid_argument(format!(
            "mask shape {:?} does not match spectrogram shape {:?}",
            mask.shape(),
            shape
        )));
    }
    let src = spectrogram.as_slice();
    let data: Vec<Complex64> = match mask.values() {
        MaskValues::Real(m) => src.iter().zip(m).map(|(&x, &g)| x * g).collect(),
        MaskValues::Complex(m) => src.iter().zip(m).map(|(&x, &g)| x * g).collect(),
    };
    Spectrogram::from_raw(shape, data)
}
