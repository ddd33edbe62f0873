//! NumPy-style broadcasting
//!
//! Broadcasting rules (from NumPy):
//! 1. If arrays have different number of dimensions, prepend 1s to the smaller shape
//! 2. Arrays are compatible if for each dimension:
//!    - Dimensions are equal, OR
//!    - One of them is 1
//! 3. Result dimension is the non-1 size on each axis (so `(0, 1)` gives 0)
//!
//! Expansion never copies: a broadcast axis gets stride 0, so every index
//! along it reads the same element. The resulting views are read-only like
//! every other [`ArrayData`].

use crate::array::ArrayData;
use crate::error::{NumliteError, Result};

/// Compute the broadcast shape of two input shapes.
///
/// # Examples
///
/// - `[3, 1] + [1, 4] → [3, 4]`
/// - `[3, 4] + [4] → [3, 4]`
/// - `[3, 4] + [2, 4] → Error (incompatible)`
pub fn broadcast_shapes(shape_a: &[usize], shape_b: &[usize]) -> Result<Vec<usize>> {
    let ndim_a = shape_a.len();
    let ndim_b = shape_b.len();
    let ndim_out = ndim_a.max(ndim_b);

    let mut result = vec![0; ndim_out];

    // Iterate from right to left (trailing dimensions)
    for i in 0..ndim_out {
        let dim_a = if i < ndim_a { shape_a[ndim_a - 1 - i] } else { 1 };
        let dim_b = if i < ndim_b { shape_b[ndim_b - 1 - i] } else { 1 };

        result[ndim_out - 1 - i] = if dim_a == dim_b || dim_b == 1 {
            dim_a
        } else if dim_a == 1 {
            dim_b
        } else {
            return Err(NumliteError::shape_mismatch(shape_a, shape_b));
        };
    }

    Ok(result)
}

/// Fold [`broadcast_shapes`] over any number of shapes.
pub fn broadcast_shapes_many(shapes: &[&[usize]]) -> Result<Vec<usize>> {
    shapes
        .iter()
        .try_fold(Vec::new(), |acc, shape| broadcast_shapes(&acc, shape))
}

/// View of `array` expanded to `target_shape`.
///
/// Axes of size 1 stretched to a larger size get stride 0, matching axes keep
/// their stride, and missing leading axes are added with stride 0. Any other
/// combination fails with `ShapeMismatch`.
pub fn broadcast_to(array: &ArrayData, target_shape: &[usize]) -> Result<ArrayData> {
    if array.shape() == target_shape {
        return Ok(array.clone());
    }

    let ndim = array.ndim();
    let ndim_out = target_shape.len();
    if ndim > ndim_out {
        return Err(NumliteError::shape_mismatch(array.shape(), target_shape));
    }

    let lead = ndim_out - ndim;
    let mut strides = vec![0; ndim_out];
    for (axis, &target) in target_shape.iter().enumerate().skip(lead) {
        let dim = array.shape()[axis - lead];
        let stride = array.strides()[axis - lead];
        strides[axis] = if dim == target {
            stride
        } else if dim == 1 {
            0
        } else {
            return Err(NumliteError::shape_mismatch(array.shape(), target_shape));
        };
    }

    Ok(array.with_layout(target_shape.to_vec(), strides))
}

/// Broadcast two arrays against each other, returning views of the joint shape.
pub fn broadcast_pair(a: &ArrayData, b: &ArrayData) -> Result<(ArrayData, ArrayData)> {
    if a.shape() == b.shape() {
        return Ok((a.clone(), b.clone()));
    }
    let shape = broadcast_shapes(a.shape(), b.shape())?;
    log::trace!("broadcasting {:?} and {:?} to {:?}", a.shape(), b.shape(), shape);
    Ok((broadcast_to(a, &shape)?, broadcast_to(b, &shape)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtype::DType;

    fn arr(data: Vec<f64>, shape: Vec<usize>) -> ArrayData {
        ArrayData::from_vec(data, shape).unwrap()
    }

    #[test]
    fn test_broadcast_shapes_same() {
        let result = broadcast_shapes(&[3, 4], &[3, 4]).unwrap();
        assert_eq!(result, vec![3, 4]);
    }

    #[test]
    fn test_broadcast_shapes_scalar() {
        assert_eq!(broadcast_shapes(&[], &[3, 4]).unwrap(), vec![3, 4]);
        assert_eq!(broadcast_shapes(&[3, 4], &[]).unwrap(), vec![3, 4]);
    }

    #[test]
    fn test_broadcast_shapes_trailing() {
        assert_eq!(broadcast_shapes(&[3, 4], &[4]).unwrap(), vec![3, 4]);
        assert_eq!(broadcast_shapes(&[4], &[3, 4]).unwrap(), vec![3, 4]);
    }

    #[test]
    fn test_broadcast_shapes_ones() {
        assert_eq!(broadcast_shapes(&[3, 1], &[1, 4]).unwrap(), vec![3, 4]);
        assert_eq!(
            broadcast_shapes(&[1, 3, 1], &[2, 1, 4]).unwrap(),
            vec![2, 3, 4]
        );
    }

    #[test]
    fn test_broadcast_shapes_unit_axis_yields_to_zero() {
        assert_eq!(broadcast_shapes(&[0, 3], &[0, 3]).unwrap(), vec![0, 3]);
        assert_eq!(broadcast_shapes(&[0, 3], &[1, 3]).unwrap(), vec![0, 3]);
        assert_eq!(broadcast_shapes(&[1], &[0]).unwrap(), vec![0]);
        assert!(broadcast_shapes(&[0], &[2]).is_err());
    }

    #[test]
    fn test_broadcast_to_zero_length_axis() {
        let one = arr(vec![7.0], vec![1]);
        let target = broadcast_shapes(&[0], one.shape()).unwrap();
        let view = broadcast_to(&one, &target).unwrap();
        assert_eq!(view.shape(), &[0]);
        assert!(view.to_f64_vec().is_empty());

        let empty = arr(vec![], vec![0]);
        assert!(broadcast_to(&empty, &[1]).is_err());
    }

    #[test]
    fn test_broadcast_shapes_incompatible() {
        let err = broadcast_shapes(&[3, 4], &[2, 4]).unwrap_err();
        assert_eq!(err, NumliteError::shape_mismatch(&[3, 4], &[2, 4]));
        assert!(broadcast_shapes(&[3], &[4]).is_err());
    }

    #[test]
    fn test_broadcast_shapes_many() {
        let shapes: [&[usize]; 3] = [&[4, 1], &[3], &[2, 1, 1]];
        assert_eq!(broadcast_shapes_many(&shapes).unwrap(), vec![2, 4, 3]);
    }

    #[test]
    fn test_broadcast_to_uses_zero_strides() {
        let row = arr(vec![1.0, 2.0, 3.0], vec![1, 3]);
        let view = broadcast_to(&row, &[2, 3]).unwrap();
        assert_eq!(view.shape(), &[2, 3]);
        assert_eq!(view.strides(), &[0, 1]);
        assert!(view.shares_buffer_with(&row));
        assert_eq!(view.to_f64_vec(), vec![1.0, 2.0, 3.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_broadcast_to_expand_cols() {
        let col = arr(vec![1.0, 2.0], vec![2, 1]);
        let view = broadcast_to(&col, &[2, 3]).unwrap();
        assert_eq!(view.strides(), &[1, 0]);
        assert_eq!(view.to_f64_vec(), vec![1.0, 1.0, 1.0, 2.0, 2.0, 2.0]);
    }

    #[test]
    fn test_broadcast_to_add_dims() {
        let v = arr(vec![1.0, 2.0, 3.0], vec![3]);
        let view = v.broadcast_to(&[2, 3]).unwrap();
        assert_eq!(view.strides(), &[0, 1]);
        assert_eq!(view.get(&[1, 2]).unwrap(), 3.0);
    }

    #[test]
    fn test_broadcast_to_rejects_non_unit_axis() {
        let v = arr(vec![1.0, 2.0], vec![2]);
        assert!(broadcast_to(&v, &[2, 3]).is_err());
        assert!(broadcast_to(&v, &[]).is_err());
    }

    #[test]
    fn test_broadcast_scalar_array() {
        let s = ArrayData::scalar(5.0, DType::Int16);
        let view = broadcast_to(&s, &[2, 2]).unwrap();
        assert_eq!(view.dtype(), DType::Int16);
        assert_eq!(view.to_f64_vec(), vec![5.0; 4]);
    }

    #[test]
    fn test_broadcast_pair() {
        let col = arr(vec![1.0, 2.0], vec![2, 1]);
        let row = arr(vec![10.0, 20.0, 30.0], vec![1, 3]);
        let (a, b) = broadcast_pair(&col, &row).unwrap();
        assert_eq!(a.shape(), &[2, 3]);
        assert_eq!(b.shape(), &[2, 3]);
        assert_eq!(b.to_f64_vec(), vec![10.0, 20.0, 30.0, 10.0, 20.0, 30.0]);
    }
}
