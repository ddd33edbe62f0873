//! Axis handling shared by every FFT variant
//!
//! Backends provide a forward radix-2 kernel over one `(re, im)` sequence.
//! This module walks the requested axes of an N-D array, applies that kernel
//! to every 1-D lane, and derives the inverse and real-input transforms:
//!
//! - inverse: conjugate, forward transform, conjugate, divide by `n`
//! - real forward: keep the first `n/2 + 1` bins of the last axis
//! - real inverse: rebuild the full spectrum from conjugate symmetry

use crate::array::ArrayData;
use crate::error::{NumliteError, Result};

/// A forward transform over one complex sequence, in place.
pub type Kernel<'a> = dyn FnMut(&mut [f64], &mut [f64]) -> Result<()> + 'a;

/// Transform lengths must be non-zero powers of two.
pub fn check_length(n: usize) -> Result<()> {
    if n == 0 || !n.is_power_of_two() {
        return Err(NumliteError::InvalidLength(n));
    }
    Ok(())
}

/// Validate explicit axes or default to every axis.
pub fn resolve_axes(axes: Option<&[usize]>, ndim: usize) -> Result<Vec<usize>> {
    let axes = match axes {
        Some(axes) => axes.to_vec(),
        None => (0..ndim).collect(),
    };
    if axes.is_empty() {
        return Err(NumliteError::InvalidShape(
            "transform needs at least one axis".into(),
        ));
    }
    for (i, &axis) in axes.iter().enumerate() {
        if axis >= ndim {
            return Err(NumliteError::InvalidAxis { axis, ndim });
        }
        if axes[..i].contains(&axis) {
            return Err(NumliteError::InvalidArgument(format!(
                "axis {} repeated in {:?}",
                axis, axes
            )));
        }
    }
    Ok(axes)
}

/// Split complex data held in C order.
#[derive(Debug, Clone)]
struct ComplexField {
    shape: Vec<usize>,
    re: Vec<f64>,
    im: Vec<f64>,
}

impl ComplexField {
    fn from_real(arr: &ArrayData) -> Self {
        let re = arr.to_f64_vec();
        let im = vec![0.0; re.len()];
        Self {
            shape: arr.shape().to_vec(),
            re,
            im,
        }
    }

    fn from_interleaved(arr: &ArrayData) -> Result<Self> {
        match arr.shape().split_last() {
            Some((2, shape)) => {
                let data = arr.to_f64_vec();
                let (re, im) = data.chunks_exact(2).map(|c| (c[0], c[1])).unzip();
                Ok(Self {
                    shape: shape.to_vec(),
                    re,
                    im,
                })
            }
            _ => Err(NumliteError::InvalidShape(format!(
                "expected interleaved complex input with a trailing axis of 2, got {:?}",
                arr.shape()
            ))),
        }
    }

    fn into_interleaved(self) -> Result<ArrayData> {
        let mut data = Vec::with_capacity(self.re.len() * 2);
        for (re, im) in self.re.iter().zip(&self.im) {
            data.push(*re);
            data.push(*im);
        }
        let mut shape = self.shape;
        shape.push(2);
        ArrayData::from_vec(data, shape)
    }

    fn into_real(self) -> Result<ArrayData> {
        ArrayData::from_vec(self.re, self.shape)
    }

    /// `(outer, len, inner)` such that element `k` of lane `(o, i)` lives at
    /// `(o * len + k) * inner + i`.
    fn lanes(&self, axis: usize) -> (usize, usize, usize) {
        let outer = self.shape[..axis].iter().product();
        let inner = self.shape[axis + 1..].iter().product();
        (outer, self.shape[axis], inner)
    }

    fn transform_axis(&mut self, axis: usize, inverse: bool, kernel: &mut Kernel<'_>) -> Result<()> {
        let (outer, n, inner) = self.lanes(axis);
        check_length(n)?;
        let scale = 1.0 / n as f64;
        let mut lane_re = vec![0.0; n];
        let mut lane_im = vec![0.0; n];

        for o in 0..outer {
            for i in 0..inner {
                let base = o * n * inner + i;
                for k in 0..n {
                    lane_re[k] = self.re[base + k * inner];
                    lane_im[k] = self.im[base + k * inner];
                }
                if inverse {
                    lane_im.iter_mut().for_each(|v| *v = -*v);
                }
                kernel(&mut lane_re, &mut lane_im)?;
                for k in 0..n {
                    let idx = base + k * inner;
                    if inverse {
                        self.re[idx] = lane_re[k] * scale;
                        self.im[idx] = -lane_im[k] * scale;
                    } else {
                        self.re[idx] = lane_re[k];
                        self.im[idx] = lane_im[k];
                    }
                }
            }
        }
        Ok(())
    }

    /// Rebuild the axis with `new_len` entries, `source(k)` naming where
    /// entry `k` comes from and whether to conjugate it.
    fn rebuild_axis(&mut self, axis: usize, new_len: usize, source: impl Fn(usize) -> Option<(usize, bool)>) {
        let (outer, n, inner) = self.lanes(axis);
        let total = outer * new_len * inner;
        let mut re = vec![0.0; total];
        let mut im = vec![0.0; total];

        for o in 0..outer {
            for k in 0..new_len {
                let Some((src, conj)) = source(k) else { continue };
                if src >= n {
                    continue;
                }
                for i in 0..inner {
                    let from = (o * n + src) * inner + i;
                    let to = (o * new_len + k) * inner + i;
                    re[to] = self.re[from];
                    im[to] = if conj { -self.im[from] } else { self.im[from] };
                }
            }
        }

        self.shape[axis] = new_len;
        self.re = re;
        self.im = im;
    }

    /// Keep the first `n/2 + 1` bins of a transformed axis.
    fn keep_half_spectrum(&mut self, axis: usize) {
        let bins = self.shape[axis] / 2 + 1;
        self.rebuild_axis(axis, bins, |k| Some((k, false)));
    }

    /// Expand a half spectrum to `n` bins using `X[n-k] = conj(X[k])`.
    fn mirror_conjugates(&mut self, axis: usize, n: usize) {
        self.rebuild_axis(axis, n, |k| {
            if k <= n / 2 {
                Some((k, false))
            } else {
                Some((n - k, true))
            }
        });
    }
}

/// Forward transform of real input over `axes`.
pub fn forward(arr: &ArrayData, axes: &[usize], kernel: &mut Kernel<'_>) -> Result<ArrayData> {
    let mut field = ComplexField::from_real(arr);
    for &axis in axes {
        field.transform_axis(axis, false, kernel)?;
    }
    field.into_interleaved()
}

/// Inverse transform of interleaved complex input over `axes`.
pub fn inverse(arr: &ArrayData, axes: &[usize], kernel: &mut Kernel<'_>) -> Result<ArrayData> {
    let mut field = ComplexField::from_interleaved(arr)?;
    for &axis in axes {
        field.transform_axis(axis, true, kernel)?;
    }
    field.into_interleaved()
}

/// Real-input transform: half spectrum along the last of `axes`.
pub fn forward_real(arr: &ArrayData, axes: &[usize], kernel: &mut Kernel<'_>) -> Result<ArrayData> {
    let (&last, rest) = axes
        .split_last()
        .ok_or_else(|| NumliteError::InvalidShape("transform needs at least one axis".into()))?;
    let mut field = ComplexField::from_real(arr);
    field.transform_axis(last, false, kernel)?;
    field.keep_half_spectrum(last);
    for &axis in rest {
        field.transform_axis(axis, false, kernel)?;
    }
    field.into_interleaved()
}

/// Inverse of [`forward_real`]; `n` is the output length along the last axis.
pub fn inverse_real(
    arr: &ArrayData,
    axes: &[usize],
    n: Option<usize>,
    kernel: &mut Kernel<'_>,
) -> Result<ArrayData> {
    let (&last, rest) = axes
        .split_last()
        .ok_or_else(|| NumliteError::InvalidShape("transform needs at least one axis".into()))?;
    let mut field = ComplexField::from_interleaved(arr)?;
    for &axis in rest {
        field.transform_axis(axis, true, kernel)?;
    }
    let bins = field.shape[last];
    let n = n.unwrap_or(2 * bins.saturating_sub(1));
    check_length(n)?;
    field.mirror_conjugates(last, n);
    field.transform_axis(last, true, kernel)?;
    field.into_real()
}

/// Sample frequencies for an `n`-point transform with spacing `d`.
pub fn fftfreq(n: usize, d: f64) -> ArrayData {
    let scale = 1.0 / (n as f64 * d);
    let data: Vec<f64> = (0..n)
        .map(|k| {
            let k = if k < n.div_ceil(2) { k as f64 } else { k as f64 - n as f64 };
            k * scale
        })
        .collect();
    ArrayData::from_slice(&data)
}

/// Non-negative sample frequencies matching [`forward_real`] output.
pub fn rfftfreq(n: usize, d: f64) -> ArrayData {
    if n == 0 {
        return ArrayData::from_slice(&[]);
    }
    let scale = 1.0 / (n as f64 * d);
    let data: Vec<f64> = (0..=n / 2).map(|k| k as f64 * scale).collect();
    ArrayData::from_slice(&data)
}
