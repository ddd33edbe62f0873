//! Construction from nested literal data

use crate::array::ArrayData;
use crate::dtype::DType;
use crate::error::{NumliteError, Result};

/// A nested literal: scalars at the leaves, lists at every other level.
///
/// Integer leaves and float leaves are kept apart so the element kind can be
/// inferred the way NumPy does for Python literals.
#[derive(Debug, Clone, PartialEq)]
pub enum Nested {
    Int(i64),
    Float(f64),
    List(Vec<Nested>),
}

impl From<i32> for Nested {
    fn from(v: i32) -> Self {
        Nested::Int(v as i64)
    }
}

impl From<i64> for Nested {
    fn from(v: i64) -> Self {
        Nested::Int(v)
    }
}

impl From<f32> for Nested {
    fn from(v: f32) -> Self {
        Nested::Float(v as f64)
    }
}

impl From<f64> for Nested {
    fn from(v: f64) -> Self {
        Nested::Float(v)
    }
}

impl<T: Into<Nested>> From<Vec<T>> for Nested {
    fn from(items: Vec<T>) -> Self {
        Nested::List(items.into_iter().map(Into::into).collect())
    }
}

impl Nested {
    /// Shape implied by the first element at each level.
    fn leading_shape(&self) -> Vec<usize> {
        let mut shape = Vec::new();
        let mut node = self;
        while let Nested::List(items) = node {
            shape.push(items.len());
            match items.first() {
                Some(first) => node = first,
                None => break,
            }
        }
        shape
    }

    fn flatten_into(&self, shape: &[usize], depth: usize, out: &mut Vec<f64>, saw_float: &mut bool) -> Result<()> {
        match self {
            Nested::Int(v) if depth == shape.len() => out.push(*v as f64),
            Nested::Float(v) if depth == shape.len() => {
                *saw_float = true;
                out.push(*v);
            }
            Nested::List(items) if depth < shape.len() && items.len() == shape[depth] => {
                for item in items {
                    item.flatten_into(shape, depth + 1, out, saw_float)?;
                }
            }
            _ => {
                return Err(NumliteError::InvalidShape(format!(
                    "ragged nested data: expected shape {:?} at depth {}",
                    shape, depth
                )))
            }
        }
        Ok(())
    }

    /// Flattened values, inferred shape, and whether any leaf was a float.
    fn flatten(&self) -> Result<(Vec<f64>, Vec<usize>, bool)> {
        let shape = self.leading_shape();
        let mut data = Vec::with_capacity(shape.iter().product());
        let mut saw_float = false;
        self.flatten_into(&shape, 0, &mut data, &mut saw_float)?;
        Ok((data, shape, saw_float))
    }
}

impl ArrayData {
    /// Build an array from nested literal data.
    ///
    /// The dtype is `int32` when every leaf is an integer and `float64`
    /// otherwise, including for empty input. Ragged input fails with `InvalidShape`.
    pub fn from_nested(data: impl Into<Nested>) -> Result<ArrayData> {
        let (values, shape, saw_float) = data.into().flatten()?;
        let dtype = if saw_float || values.is_empty() {
            DType::Float64
        } else {
            DType::Int32
        };
        ArrayData::from_f64(&values, shape, dtype)
    }

    /// Build an array from nested literal data with an explicit dtype.
    pub fn from_nested_with_dtype(data: impl Into<Nested>, dtype: DType) -> Result<ArrayData> {
        let (values, shape, _) = data.into().flatten()?;
        ArrayData::from_f64(&values, shape, dtype)
    }
}
