//! Accelerated backend for numlite
//!
//! Drives the native kernel module through its flat `f64` ABI. The module
//! is loaded once by an asynchronous [`AcceleratedBackend::init`]; until
//! that succeeds every operation fails with `BackendNotReady`. Routines
//! the module does not export (QR, eig, SVD, slogdet) run on the reference
//! kernels once the readiness check has passed.

mod backend;
mod module;

pub use backend::AcceleratedBackend;
pub use module::{BundledLoader, KernelLoader, KernelModule, LoadFuture, NativeModule};
