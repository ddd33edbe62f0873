//! Conversions between `ArrayData` and ndarray

use ndarray::{Array2, ArrayD, IxDyn};
use numlite_core::{ArrayData, DType, NumliteError, Result};

/// Owned f64 copy in logical order.
pub fn to_ndarray(arr: &ArrayData) -> Result<ArrayD<f64>> {
    ArrayD::from_shape_vec(IxDyn(arr.shape()), arr.to_f64_vec())
        .map_err(|e| NumliteError::InvalidShape(e.to_string()))
}

/// Owned f64 copy of a rank-2 array.
pub fn to_matrix(arr: &ArrayData) -> Result<Array2<f64>> {
    let (m, n) = arr.matrix_dims()?;
    Array2::from_shape_vec((m, n), arr.to_f64_vec())
        .map_err(|e| NumliteError::InvalidShape(e.to_string()))
}

/// Copy `data` into a fresh contiguous array of `dtype`.
pub fn from_ndarray(data: &ArrayD<f64>, dtype: DType) -> Result<ArrayData> {
    let values: Vec<f64> = data.iter().copied().collect();
    ArrayData::from_f64(&values, data.shape().to_vec(), dtype)
}

pub fn from_matrix(data: &Array2<f64>, dtype: DType) -> Result<ArrayData> {
    let values: Vec<f64> = data.iter().copied().collect();
    ArrayData::from_f64(&values, data.shape().to_vec(), dtype)
}
