//! numlite core - the strided array value, broadcasting, and backend traits
//!
//! This crate defines the data model every backend shares and the trait
//! interface that all backends must implement. It enables pluggable backends
//! (portable reference, natively accelerated) with a consistent API.

pub mod array;
pub mod backend;
pub mod broadcast;
pub mod chain;
pub mod dtype;
pub mod error;
pub mod fft;
pub mod nested;
pub mod ops;
pub mod tolerance;

pub use array::{contiguous_strides, ArrayData};
pub use backend::{Backend, BackendKind};
pub use broadcast::{broadcast_pair, broadcast_shapes, broadcast_to};
pub use dtype::{Buffer, DType, Element};
pub use error::{NumliteError, Result};
pub use nested::Nested;
pub use ops::{BinaryOp, Operand, Readiness, UnaryOp};
pub use tolerance::{allclose, Tolerance, DEFAULT_ATOL, DEFAULT_RTOL};
