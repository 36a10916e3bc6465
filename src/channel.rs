//! Per-channel helpers shared by the buffer, spectrogram and transforms.

use core::ops::{AddAssign, Mul};

use crate::error::{Result, SignalError};

/// Fail with [`SignalError::InvalidChannel`] unless `index < count`.
#[inline]
pub fn verify_channel(index: usize, count: usize) -> Result<()> {
    if index < count {
        Ok(())
    } else {
        Err(SignalError::InvalidChannel { index, count })
    }
}

/// Element-wise mean of equally long rows. Returns `len` zeros when `rows`
/// is empty.
pub fn mean_across<'a, T, I>(rows: I, len: usize) -> Vec<T>
where
    T: Copy + Default + AddAssign + Mul<f64, Output = T> + 'a,
    I: IntoIterator<Item = &'a [T]>,
{
    let mut acc = vec![T::default(); len];
    let mut count = 0usize;
    for row in rows {
        for (a, &x) in acc.iter_mut().zip(row.iter()) {
            *a += x;
        }
        count += 1;
    }
    if count > 1 {
        let inv = 1.0 / count as f64;
        for a in acc.iter_mut() {
            *a = *a * inv;
        }
    }
    acc
}

/// Run `task` once per channel index and collect the results in channel
/// order. The first error wins.
///
/// With the `parallel` feature the tasks run on the rayon pool; each task
/// must own whatever scratch state it needs (FFT planners included).
#[cfg(not(feature = "parallel"))]
pub fn dispatch<T, F>(count: usize, task: F) -> Result<Vec<T>>
where
    T: Send,
    F: Fn(usize) -> Result<T> + Send + Sync,
{
    (0..count).map(task).collect()
}

/// Run `task` once per channel index and collect the results in channel
/// order. The first error wins.
///
/// With the `parallel` feature the tasks run on the rayon pool; each task
/// must own whatever scratch state it needs (FFT planners included).
#[cfg(feature = "parallel")]
pub fn dispatch<T, F>(count: usize, task: F) -> Result<Vec<T>>
where
    T: Send,
    F: Fn(usize) -> Result<T> + Send + Sync,
{
    use rayon::prelude::*;
    if count > 1 {
        log::trace!("dispatching {} channels on rayon", count);
    }
    (0..count).into_par_iter().map(task).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::num::Complex64;

    #[test]
    fn test_verify_channel() {
        assert!(verify_channel(0, 1).is_ok());
        let err = verify_channel(2, 2).unwrap_err();
        assert_eq!(err, SignalError::InvalidChannel { index: 2, count: 2 });
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_mean_across_real() {
        let a = [1.0, 2.0, 3.0];
        let b = [3.0, 4.0, 5.0];
        let m = mean_across([&a[..], &b[..]], 3);
        assert_eq!(m, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_mean_across_single_row_is_identity() {
        let a = [0.1, -0.2, 0.3];
        assert_eq!(mean_across([&a[..]], 3), a.to_vec());
    }

    #[test]
    fn test_mean_across_complex() {
        let a = [Complex64::new(1.0, 1.0)];
        let b = [Complex64::new(3.0, -1.0)];
        let m = mean_across([&a[..], &b[..]], 1);
        assert_eq!(m, vec![Complex64::new(2.0, 0.0)]);
    }

    #[test]
    fn test_dispatch_keeps_channel_order() {
        let out = dispatch(16, |c| Ok(c * 10)).unwrap();
        assert_eq!(out, (0..16).map(|c| c * 10).collect::<Vec<_>>());
    }

    #[test]
    fn test_dispatch_propagates_error() {
        let res: Result<Vec<usize>> = dispatch(4, |c| {
            if c == 2 {
                Err(SignalError::invalid_state("boom"))
            } else {
                Ok(c)
            }
        });
        assert_eq!(res.unwrap_err().kind(), ErrorKind::InvalidState);
    }
}
