//! The strided array value shared by every backend

use std::sync::Arc;

use crate::dtype::{Buffer, DType, Element};
use crate::error::{NumliteError, Result};

/// C-contiguous element strides for `shape`.
pub fn contiguous_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![1; shape.len()];
    for i in (0..shape.len().saturating_sub(1)).rev() {
        strides[i] = strides[i + 1] * shape[i + 1];
    }
    strides
}

/// An N-dimensional strided view over an immutable, shared element buffer.
///
/// The buffer sits behind an [`Arc`] and is never mutated once wrapped, so
/// views produced by [`reshape`](Self::reshape), [`transposed`](Self::transposed),
/// [`permuted`](Self::permuted), [`slice_axis`](Self::slice_axis) and
/// [`broadcast_to`](Self::broadcast_to) alias the original storage without any
/// way to write through them. Every other operation allocates a new buffer.
///
/// Strides are counted in elements, not bytes. The dtype is the buffer's
/// element kind and cannot change for the lifetime of the value.
#[derive(Debug, Clone)]
pub struct ArrayData {
    buffer: Arc<Buffer>,
    shape: Vec<usize>,
    strides: Vec<usize>,
    offset: usize,
}

impl ArrayData {
    /// Wrap a buffer as a fresh C-contiguous array.
    pub fn new(buffer: Buffer, shape: Vec<usize>) -> Result<Self> {
        let expected: usize = shape.iter().product();
        if buffer.len() != expected {
            return Err(NumliteError::InvalidShape(format!(
                "Data length {} doesn't match shape {:?} (expected {})",
                buffer.len(),
                shape,
                expected
            )));
        }
        let strides = contiguous_strides(&shape);
        Ok(Self {
            buffer: Arc::new(buffer),
            shape,
            strides,
            offset: 0,
        })
    }

    /// Build a view over an existing buffer, checking that every addressable
    /// element lies inside it.
    pub fn from_parts(
        buffer: Arc<Buffer>,
        shape: Vec<usize>,
        strides: Vec<usize>,
        offset: usize,
    ) -> Result<Self> {
        if shape.len() != strides.len() {
            return Err(NumliteError::InvalidShape(format!(
                "shape {:?} and strides {:?} differ in rank",
                shape, strides
            )));
        }
        if shape.iter().all(|&d| d > 0) {
            let last = offset
                + shape
                    .iter()
                    .zip(&strides)
                    .map(|(&d, &s)| (d - 1) * s)
                    .sum::<usize>();
            if last >= buffer.len() {
                return Err(NumliteError::InvalidShape(format!(
                    "view reaches element {} of a buffer holding {}",
                    last,
                    buffer.len()
                )));
            }
        }
        Ok(Self {
            buffer,
            shape,
            strides,
            offset,
        })
    }

    pub fn from_vec<T: Element>(data: Vec<T>, shape: Vec<usize>) -> Result<Self> {
        Self::new(T::into_buffer(data), shape)
    }

    /// Build an array of `dtype` from `f64` values, casting each element.
    pub fn from_f64(data: &[f64], shape: Vec<usize>, dtype: DType) -> Result<Self> {
        Self::new(Buffer::from_f64(data, dtype), shape)
    }

    /// One-dimensional `float64` array.
    pub fn from_slice(data: &[f64]) -> Self {
        Self {
            buffer: Arc::new(Buffer::Float64(data.to_vec())),
            shape: vec![data.len()],
            strides: vec![1],
            offset: 0,
        }
    }

    pub fn zeros(shape: Vec<usize>, dtype: DType) -> Self {
        Self::full(shape, 0.0, dtype)
    }

    pub fn full(shape: Vec<usize>, value: f64, dtype: DType) -> Self {
        let len = shape.iter().product();
        let strides = contiguous_strides(&shape);
        Self {
            buffer: Arc::new(Buffer::from_f64(&vec![value; len], dtype)),
            shape,
            strides,
            offset: 0,
        }
    }

    /// Zero-dimensional array holding a single value.
    pub fn scalar(value: f64, dtype: DType) -> Self {
        Self::full(Vec::new(), value, dtype)
    }

    pub fn eye(n: usize, dtype: DType) -> Self {
        let mut data = vec![0.0; n * n];
        for i in 0..n {
            data[i * n + i] = 1.0;
        }
        Self {
            buffer: Arc::new(Buffer::from_f64(&data, dtype)),
            shape: vec![n, n],
            strides: vec![n, 1],
            offset: 0,
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn dtype(&self) -> DType {
        self.buffer.dtype()
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Total number of logical elements.
    pub fn size(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// The underlying storage, shared with any views of this array.
    pub fn buffer(&self) -> &Arc<Buffer> {
        &self.buffer
    }

    /// Whether both arrays address the same storage.
    pub fn shares_buffer_with(&self, other: &ArrayData) -> bool {
        Arc::ptr_eq(&self.buffer, &other.buffer)
    }

    /// Whether logical C order walks the buffer with unit steps.
    ///
    /// Axes of length one are ignored since their stride is never applied.
    pub fn is_contiguous(&self) -> bool {
        let mut expected = 1;
        for (&dim, &stride) in self.shape.iter().zip(&self.strides).rev() {
            if dim == 0 {
                return true;
            }
            if dim != 1 && stride != expected {
                return false;
            }
            expected *= dim;
        }
        true
    }

    /// Flat buffer offset of the element at `indices`.
    pub fn offset_of(&self, indices: &[usize]) -> Result<usize> {
        if indices.len() != self.ndim() {
            return Err(NumliteError::InvalidArgument(format!(
                "expected {} indices, got {}",
                self.ndim(),
                indices.len()
            )));
        }
        let mut flat = self.offset;
        for (axis, ((&index, &size), &stride)) in
            indices.iter().zip(&self.shape).zip(&self.strides).enumerate()
        {
            if index >= size {
                return Err(NumliteError::IndexError { index, axis, size });
            }
            flat += index * stride;
        }
        Ok(flat)
    }

    /// Element at `indices`, widened to `f64`.
    pub fn get(&self, indices: &[usize]) -> Result<f64> {
        let flat = self.offset_of(indices)?;
        self.buffer.get_f64(flat).ok_or(NumliteError::IndexError {
            index: flat,
            axis: 0,
            size: self.buffer.len(),
        })
    }

    /// Buffer offsets of every element in logical C order.
    pub fn offsets(&self) -> StridedOffsets<'_> {
        StridedOffsets::new(self)
    }

    /// Copy the logical contents out as `f64`, honouring strides and offset.
    pub fn to_f64_vec(&self) -> Vec<f64> {
        let size = self.size();
        if self.is_contiguous() {
            if let Some(data) = self.buffer.as_f64_slice() {
                return data[self.offset..self.offset + size].to_vec();
            }
        }
        self.offsets()
            .map(|i| self.buffer.get_f64(i).unwrap_or(f64::NAN))
            .collect()
    }

    /// A C-contiguous copy, or a cheap clone when already laid out that way.
    pub fn to_contiguous(&self) -> ArrayData {
        if self.is_contiguous() && self.offset == 0 && self.buffer.len() == self.size() {
            let mut out = self.clone();
            out.strides = contiguous_strides(&self.shape);
            return out;
        }
        self.materialize(self.dtype())
    }

    /// Copy into a new array of a different element kind.
    pub fn astype(&self, dtype: DType) -> ArrayData {
        self.materialize(dtype)
    }

    fn materialize(&self, dtype: DType) -> ArrayData {
        let data = self.to_f64_vec();
        Self {
            buffer: Arc::new(Buffer::from_f64(&data, dtype)),
            shape: self.shape.clone(),
            strides: contiguous_strides(&self.shape),
            offset: 0,
        }
    }

    /// Give the same elements a new shape.
    ///
    /// Returns a view sharing this buffer when the array is contiguous,
    /// otherwise a reshaped copy.
    pub fn reshape(&self, shape: Vec<usize>) -> Result<ArrayData> {
        let new_size: usize = shape.iter().product();
        if new_size != self.size() {
            return Err(NumliteError::InvalidShape(format!(
                "cannot reshape array of size {} into shape {:?}",
                self.size(),
                shape
            )));
        }
        let base = if self.is_contiguous() {
            self.clone()
        } else {
            self.to_contiguous()
        };
        let strides = contiguous_strides(&shape);
        Ok(Self {
            buffer: base.buffer,
            shape,
            strides,
            offset: base.offset,
        })
    }

    /// View with axes reordered; `axes[i]` names the source axis placed at `i`.
    pub fn permuted(&self, axes: &[usize]) -> Result<ArrayData> {
        let ndim = self.ndim();
        if axes.len() != ndim {
            return Err(NumliteError::InvalidArgument(format!(
                "permutation {:?} does not match {} dimensions",
                axes, ndim
            )));
        }
        let mut seen = vec![false; ndim];
        for &axis in axes {
            if axis >= ndim {
                return Err(NumliteError::InvalidAxis { axis, ndim });
            }
            if std::mem::replace(&mut seen[axis], true) {
                return Err(NumliteError::InvalidArgument(format!(
                    "axis {} repeated in permutation {:?}",
                    axis, axes
                )));
            }
        }
        Ok(Self {
            buffer: Arc::clone(&self.buffer),
            shape: axes.iter().map(|&a| self.shape[a]).collect(),
            strides: axes.iter().map(|&a| self.strides[a]).collect(),
            offset: self.offset,
        })
    }

    /// View with the axis order reversed.
    pub fn transposed(&self) -> ArrayData {
        let mut out = self.clone();
        out.shape.reverse();
        out.strides.reverse();
        out
    }

    /// View of `start..end` stepping by `step` along one axis.
    pub fn slice_axis(&self, axis: usize, start: usize, end: usize, step: usize) -> Result<ArrayData> {
        let ndim = self.ndim();
        if axis >= ndim {
            return Err(NumliteError::InvalidAxis { axis, ndim });
        }
        let size = self.shape[axis];
        if step == 0 {
            return Err(NumliteError::InvalidArgument("slice step must be positive".into()));
        }
        if start > end || end > size {
            return Err(NumliteError::IndexError {
                index: end.max(start),
                axis,
                size,
            });
        }
        let len = (end - start).div_ceil(step);
        let mut out = self.clone();
        if len > 0 {
            out.offset += start * self.strides[axis];
        }
        out.shape[axis] = len;
        out.strides[axis] = self.strides[axis] * step;
        Ok(out)
    }

    /// Read-only view expanded to `shape` (see [`crate::broadcast::broadcast_to`]).
    pub fn broadcast_to(&self, shape: &[usize]) -> Result<ArrayData> {
        crate::broadcast::broadcast_to(self, shape)
    }

    /// Rank-2 dimensions, or `ShapeMismatch` for any other rank.
    pub fn matrix_dims(&self) -> Result<(usize, usize)> {
        match self.shape.as_slice() {
            &[m, n] => Ok((m, n)),
            other => Err(NumliteError::ShapeMismatch {
                left: other.to_vec(),
                right: vec![0, 0],
            }),
        }
    }

    pub(crate) fn with_layout(&self, shape: Vec<usize>, strides: Vec<usize>) -> ArrayData {
        Self {
            buffer: Arc::clone(&self.buffer),
            shape,
            strides,
            offset: self.offset,
        }
    }
}

impl PartialEq for ArrayData {
    fn eq(&self, other: &Self) -> bool {
        self.shape == other.shape
            && self.dtype() == other.dtype()
            && self.to_f64_vec() == other.to_f64_vec()
    }
}

/// Iterator over buffer offsets in logical C order.
pub struct StridedOffsets<'a> {
    shape: &'a [usize],
    strides: &'a [usize],
    index: Vec<usize>,
    next: Option<usize>,
}

impl<'a> StridedOffsets<'a> {
    fn new(array: &'a ArrayData) -> Self {
        let next = if array.size() == 0 {
            None
        } else {
            Some(array.offset)
        };
        Self {
            shape: &array.shape,
            strides: &array.strides,
            index: vec![0; array.ndim()],
            next,
        }
    }
}

impl Iterator for StridedOffsets<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let current = self.next?;
        let mut flat = current;
        let mut axis = self.shape.len();
        loop {
            if axis == 0 {
                self.next = None;
                break;
            }
            axis -= 1;
            self.index[axis] += 1;
            flat += self.strides[axis];
            if self.index[axis] < self.shape[axis] {
                self.next = Some(flat);
                break;
            }
            flat -= self.index[axis] * self.strides[axis];
            self.index[axis] = 0;
        }
        Some(current)
    }
}
