//! The kernel module seam and its loaders

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use numlite_core::{BinaryOp, Result, UnaryOp};

/// The flat `f64` ABI of a compiled kernel module.
///
/// Buffers are contiguous and row-major; callers validate lengths and
/// shapes before calling in. Failures are signalled in-band the way the
/// module exports them: an empty vector from `inv` (singular) and
/// `cholesky` (not positive definite).
pub trait KernelModule: Send + Sync {
    fn abi_version(&self) -> u32;

    /// Numeric smoke test run before the module is marked ready.
    fn self_test(&self) -> bool;

    fn binary(&self, op: BinaryOp, a: &[f64], b: &[f64]) -> Vec<f64>;
    fn binary_scalar(&self, op: BinaryOp, a: &[f64], scalar: f64) -> Vec<f64>;
    fn unary(&self, op: UnaryOp, a: &[f64]) -> Vec<f64>;
    fn clip(&self, a: &[f64], min: f64, max: f64) -> Vec<f64>;

    fn sum(&self, a: &[f64]) -> f64;
    fn prod(&self, a: &[f64]) -> f64;
    fn mean(&self, a: &[f64]) -> f64;
    fn variance(&self, a: &[f64]) -> f64;
    fn std(&self, a: &[f64]) -> f64;
    fn min(&self, a: &[f64]) -> f64;
    fn max(&self, a: &[f64]) -> f64;
    fn argmin(&self, a: &[f64]) -> usize;
    fn argmax(&self, a: &[f64]) -> usize;

    fn matmul(&self, a: &[f64], b: &[f64], m: usize, k: usize, n: usize) -> Vec<f64>;
    fn dot(&self, a: &[f64], b: &[f64]) -> f64;
    fn outer(&self, a: &[f64], b: &[f64]) -> Vec<f64>;
    fn trace(&self, a: &[f64], m: usize, n: usize) -> f64;
    fn det(&self, a: &[f64], n: usize) -> f64;
    fn inv(&self, a: &[f64], n: usize) -> Vec<f64>;
    fn cholesky(&self, a: &[f64], n: usize) -> Vec<f64>;

    /// Forward transform of an interleaved `(re, im)` buffer.
    fn fft(&self, buf: &[f64]) -> Vec<f64>;
}

pub type LoadFuture<'a> = Pin<Box<dyn Future<Output = Result<Arc<dyn KernelModule>>> + Send + 'a>>;

/// Produces a kernel module, possibly asynchronously.
pub trait KernelLoader: Send + Sync {
    fn name(&self) -> &str;

    fn load(&self) -> LoadFuture<'_>;
}

/// The module compiled into this binary from `numlite-wasm`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeModule;

/// Loads [`NativeModule`]; the ABI and self-test checks happen in
/// [`AcceleratedBackend::init`](crate::AcceleratedBackend::init).
///
/// The module is linked in, so the returned future is already complete.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledLoader;

impl KernelLoader for BundledLoader {
    fn name(&self) -> &str {
        "bundled"
    }

    fn load(&self) -> LoadFuture<'_> {
        numlite_wasm::init();
        let module: Arc<dyn KernelModule> = Arc::new(NativeModule);
        Box::pin(std::future::ready(Ok(module)))
    }
}

fn binary_array_kernel(op: BinaryOp) -> fn(&[f64], &[f64]) -> Vec<f64> {
    use numlite_wasm as k;
    match op {
        BinaryOp::Add => k::add_arrays,
        BinaryOp::Sub => k::sub_arrays,
        BinaryOp::Mul => k::mul_arrays,
        BinaryOp::Div => k::div_arrays,
        BinaryOp::Pow => k::pow_arrays,
        BinaryOp::Maximum => k::maximum_arrays,
        BinaryOp::Minimum => k::minimum_arrays,
    }
}

fn binary_scalar_kernel(op: BinaryOp) -> fn(&[f64], f64) -> Vec<f64> {
    use numlite_wasm as k;
    match op {
        BinaryOp::Add => k::add_scalar,
        BinaryOp::Sub => k::sub_scalar,
        BinaryOp::Mul => k::mul_scalar,
        BinaryOp::Div => k::div_scalar,
        BinaryOp::Pow => k::pow_scalar,
        BinaryOp::Maximum => k::maximum_scalar,
        BinaryOp::Minimum => k::minimum_scalar,
    }
}

fn unary_kernel(op: UnaryOp) -> fn(&[f64]) -> Vec<f64> {
    use numlite_wasm as k;
    match op {
        UnaryOp::Sin => k::sin_array,
        UnaryOp::Cos => k::cos_array,
        UnaryOp::Tan => k::tan_array,
        UnaryOp::Arcsin => k::arcsin_array,
        UnaryOp::Arccos => k::arccos_array,
        UnaryOp::Arctan => k::arctan_array,
        UnaryOp::Sinh => k::sinh_array,
        UnaryOp::Cosh => k::cosh_array,
        UnaryOp::Tanh => k::tanh_array,
        UnaryOp::Arcsinh => k::arcsinh_array,
        UnaryOp::Arccosh => k::arccosh_array,
        UnaryOp::Arctanh => k::arctanh_array,
        UnaryOp::Exp => k::exp_array,
        UnaryOp::Exp2 => k::exp2_array,
        UnaryOp::Expm1 => k::expm1_array,
        UnaryOp::Log => k::log_array,
        UnaryOp::Log2 => k::log2_array,
        UnaryOp::Log10 => k::log10_array,
        UnaryOp::Log1p => k::log1p_array,
        UnaryOp::Sqrt => k::sqrt_array,
        UnaryOp::Cbrt => k::cbrt_array,
        UnaryOp::Square => k::square_array,
        UnaryOp::Abs => k::abs_array,
        UnaryOp::Sign => k::sign_array,
        UnaryOp::Neg => k::neg_array,
        UnaryOp::Reciprocal => k::reciprocal_array,
        UnaryOp::Floor => k::floor_array,
        UnaryOp::Ceil => k::ceil_array,
        UnaryOp::Round => k::round_array,
        UnaryOp::Trunc => k::trunc_array,
    }
}

impl KernelModule for NativeModule {
    fn abi_version(&self) -> u32 {
        numlite_wasm::abi_version()
    }

    fn self_test(&self) -> bool {
        numlite_wasm::self_test()
    }

    fn binary(&self, op: BinaryOp, a: &[f64], b: &[f64]) -> Vec<f64> {
        binary_array_kernel(op)(a, b)
    }

    fn binary_scalar(&self, op: BinaryOp, a: &[f64], scalar: f64) -> Vec<f64> {
        binary_scalar_kernel(op)(a, scalar)
    }

    fn unary(&self, op: UnaryOp, a: &[f64]) -> Vec<f64> {
        unary_kernel(op)(a)
    }

    fn clip(&self, a: &[f64], min: f64, max: f64) -> Vec<f64> {
        numlite_wasm::clip(a, min, max)
    }

    fn sum(&self, a: &[f64]) -> f64 {
        numlite_wasm::sum(a)
    }

    fn prod(&self, a: &[f64]) -> f64 {
        numlite_wasm::prod(a)
    }

    fn mean(&self, a: &[f64]) -> f64 {
        numlite_wasm::mean(a)
    }

    fn variance(&self, a: &[f64]) -> f64 {
        numlite_wasm::variance(a)
    }

    fn std(&self, a: &[f64]) -> f64 {
        numlite_wasm::std(a)
    }

    fn min(&self, a: &[f64]) -> f64 {
        numlite_wasm::min(a)
    }

    fn max(&self, a: &[f64]) -> f64 {
        numlite_wasm::max(a)
    }

    fn argmin(&self, a: &[f64]) -> usize {
        numlite_wasm::argmin(a)
    }

    fn argmax(&self, a: &[f64]) -> usize {
        numlite_wasm::argmax(a)
    }

    fn matmul(&self, a: &[f64], b: &[f64], m: usize, k: usize, n: usize) -> Vec<f64> {
        numlite_wasm::matmul(a, b, m, k, n)
    }

    fn dot(&self, a: &[f64], b: &[f64]) -> f64 {
        numlite_wasm::dot(a, b)
    }

    fn outer(&self, a: &[f64], b: &[f64]) -> Vec<f64> {
        numlite_wasm::outer(a, b)
    }

    fn trace(&self, a: &[f64], m: usize, n: usize) -> f64 {
        numlite_wasm::trace(a, m, n)
    }

    fn det(&self, a: &[f64], n: usize) -> f64 {
        numlite_wasm::det(a, n)
    }

    fn inv(&self, a: &[f64], n: usize) -> Vec<f64> {
        numlite_wasm::inv(a, n)
    }

    fn cholesky(&self, a: &[f64], n: usize) -> Vec<f64> {
        numlite_wasm::cholesky(a, n)
    }

    fn fft(&self, buf: &[f64]) -> Vec<f64> {
        numlite_wasm::fft(buf)
    }
}
