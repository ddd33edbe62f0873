//! Reference backend for numlite
//!
//! Pure Rust, synchronous, always available. Uses ndarray for elementwise
//! work and reductions, and hand-written kernels for the FFT and the small
//! dense linear-algebra routines. It is the correctness oracle the
//! accelerated backend is checked against and the universal fallback.

mod array;
mod broadcast;
pub mod fft;
pub mod linalg;
mod math;
mod stats;

pub use array::{from_matrix, from_ndarray, to_matrix, to_ndarray};
pub use broadcast::broadcast_binary_op;

use numlite_core::{Backend, BackendKind, Readiness};

/// Reference backend using ndarray
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceBackend;

impl ReferenceBackend {
    pub fn new() -> Self {
        Self
    }
}

/// Always ready: nothing to initialize.
impl Readiness for ReferenceBackend {}

impl Backend for ReferenceBackend {
    fn name(&self) -> &'static str {
        "reference"
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Reference
    }

    fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_reference_backend_is_object_safe() {
        let backend: Arc<dyn Backend> = Arc::new(ReferenceBackend::new());
        assert_eq!(backend.name(), "reference");
        assert_eq!(backend.kind(), BackendKind::Reference);
        assert!(backend.is_ready());
    }
}
