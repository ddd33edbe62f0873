//! Native kernel module for numlite
//!
//! Flat functions over `f64` buffers, exported with wasm-bindgen so the same
//! code ships as a WebAssembly module (cdylib) and links natively (rlib).
//! Callers own layout: every buffer is contiguous, row-major, and already
//! broadcast to matching lengths. Length preconditions are asserted; the
//! accelerated backend validates shapes before calling in.

use wasm_bindgen::prelude::*;

mod elementwise;
mod fft;
mod linalg;
mod reduce;

pub use elementwise::*;
pub use fft::*;
pub use linalg::*;
pub use reduce::*;

/// Bumped whenever an export changes signature or meaning.
pub const ABI_VERSION: u32 = 1;

/// Initialize panic hook for better error messages
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

#[wasm_bindgen(js_name = abiVersion)]
pub fn abi_version() -> u32 {
    ABI_VERSION
}

/// Smoke test run by the loader before the module is marked ready.
#[wasm_bindgen(js_name = selfTest)]
pub fn self_test() -> bool {
    let product = matmul(&[1.0, 2.0, 3.0, 4.0], &[5.0, 6.0, 7.0, 8.0], 2, 2, 2);
    let spectrum = fft(&[1.0, 0.0, 2.0, 0.0, 3.0, 0.0, 4.0, 0.0]);
    let close = |a: f64, b: f64| (a - b).abs() < 1e-12;

    product == [19.0, 22.0, 43.0, 50.0]
        && close(spectrum[0], 10.0)
        && close(spectrum[1], 0.0)
        && close(spectrum[2], -2.0)
        && close(spectrum[3], 2.0)
        && close(sum(&[0.5, 0.25, 0.25]), 1.0)
        && det(&[4.0, 7.0, 2.0, 6.0], 2) == 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_test_passes() {
        assert!(self_test());
        assert_eq!(abi_version(), ABI_VERSION);
    }
}
