//! numlite - N-dimensional numeric arrays with a pluggable compute backend
//!
//! Arrays are [`ArrayData`] values: an immutable, reference-counted buffer
//! viewed through a shape and strides. Operations are free functions that
//! dispatch to the process-wide backend:
//!
//! ```
//! use numlite::ArrayData;
//!
//! let a = ArrayData::from_nested(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
//! let b = numlite::add(&a, 10.0).unwrap();
//! assert_eq!(b.to_f64_vec(), vec![11.0, 12.0, 13.0, 14.0]);
//! assert_eq!(numlite::det(&a).unwrap().round(), -2.0);
//! ```
//!
//! # Backends
//!
//! Two variants implement the same operation set. The reference backend is
//! portable and always available. The accelerated backend runs the compiled
//! kernels of `numlite-wasm` and has to be initialized before use. The first
//! operation (or an explicit [`init_backend`]) tries the accelerated variant
//! once and falls back to the reference one for the rest of the process if
//! that fails. Set `NUMLITE_BACKEND=reference` to skip loading entirely.

pub mod config;
pub mod manager;
pub mod ops;

pub use config::{BackendPreference, ManagerConfig, BACKEND_ENV_VAR};
pub use manager::{
    get_backend, init_backend, init_backend_blocking, manager, reinitialize, set_backend,
    BackendManager,
};
pub use ops::*;

pub use numlite_core::{
    broadcast_shapes, broadcast_to, ArrayData, Backend, BackendKind, DType, Nested, NumliteError,
    Operand, Result, Tolerance, DEFAULT_ATOL, DEFAULT_RTOL,
};
pub use numlite_cpu::ReferenceBackend;

#[cfg(feature = "accelerated")]
pub use numlite_accel::{AcceleratedBackend, KernelLoader, KernelModule};
