//! Error types for numlite

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NumliteError {
    #[error("Shape mismatch: cannot combine {left:?} with {right:?}")]
    ShapeMismatch { left: Vec<usize>, right: Vec<usize> },

    #[error("Invalid shape: {0}")]
    InvalidShape(String),

    #[error("Index out of bounds: index {index} for axis {axis} of size {size}")]
    IndexError {
        index: usize,
        axis: usize,
        size: usize,
    },

    #[error("Invalid axis: {axis} for array with {ndim} dimensions")]
    InvalidAxis { axis: usize, ndim: usize },

    #[error("Invalid FFT length {0}: must be a non-zero power of 2")]
    InvalidLength(usize),

    #[error("Matrix is singular")]
    SingularMatrix,

    #[error("Matrix is not positive definite")]
    NotPositiveDefinite,

    #[error("Unsupported matrix size for {op}: {shape:?}")]
    UnsupportedSize { op: &'static str, shape: Vec<usize> },

    #[error("Reduction {0} is undefined on an empty array")]
    EmptyArray(&'static str),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Backend {0} is not ready; initialize it first")]
    BackendNotReady(&'static str),

    #[error("Native module failed to load: {0}")]
    UninitializedModule(String),

    #[error("Unknown backend: {0}")]
    UnknownBackend(String),
}

impl NumliteError {
    /// Shorthand for a [`NumliteError::ShapeMismatch`] between two shapes.
    pub fn shape_mismatch(left: &[usize], right: &[usize]) -> Self {
        NumliteError::ShapeMismatch {
            left: left.to_vec(),
            right: right.to_vec(),
        }
    }

    pub fn unsupported(op: &'static str, shape: &[usize]) -> Self {
        NumliteError::UnsupportedSize {
            op,
            shape: shape.to_vec(),
        }
    }
}

pub type Result<T> = std::result::Result<T, NumliteError>;
