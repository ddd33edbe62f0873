//! The accelerated backend

use std::sync::{Arc, OnceLock};

use numlite_core::fft::check_length;
use numlite_core::ops::{BinaryOp, FftOps, LinalgOps, MathOps, Operand, StatsOps, UnaryOp};
use numlite_core::{
    broadcast_pair, ArrayData, Backend, BackendKind, DType, NumliteError, Readiness, Result,
};
use numlite_cpu::ReferenceBackend;

use crate::module::{BundledLoader, KernelLoader, KernelModule};

/// Backend that runs on the native kernel module.
///
/// Construction is cheap and never fails; the module is attached by
/// [`init`](Self::init). Once attached it stays attached for the lifetime
/// of the value.
pub struct AcceleratedBackend {
    loader: Box<dyn KernelLoader>,
    module: OnceLock<Arc<dyn KernelModule>>,
    reference: ReferenceBackend,
}

impl Default for AcceleratedBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AcceleratedBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AcceleratedBackend")
            .field("loader", &self.loader.name())
            .field("ready", &self.module.get().is_some())
            .finish()
    }
}

impl AcceleratedBackend {
    /// Backend using the module bundled with this build.
    pub fn new() -> Self {
        Self::with_loader(BundledLoader)
    }

    pub fn with_loader(loader: impl KernelLoader + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            module: OnceLock::new(),
            reference: ReferenceBackend,
        }
    }

    /// Load and verify the kernel module.
    ///
    /// The module must report ABI version [`numlite_wasm::ABI_VERSION`] and
    /// pass its self-test; anything else fails with `UninitializedModule`
    /// and leaves the backend not ready. Calling this again after success
    /// does nothing.
    pub async fn init(&self) -> Result<()> {
        if self.module.get().is_some() {
            return Ok(());
        }
        log::debug!("loading kernel module with the {} loader", self.loader.name());

        let module = self.loader.load().await.map_err(|e| match e {
            NumliteError::UninitializedModule(_) => e,
            other => NumliteError::UninitializedModule(other.to_string()),
        })?;

        let version = module.abi_version();
        if version != numlite_wasm::ABI_VERSION {
            return Err(NumliteError::UninitializedModule(format!(
                "kernel module ABI version {} does not match expected {}",
                version,
                numlite_wasm::ABI_VERSION
            )));
        }
        if !module.self_test() {
            return Err(NumliteError::UninitializedModule(
                "kernel module failed its self-test".into(),
            ));
        }

        // A concurrent init may have won; either module is equivalent.
        let _ = self.module.set(module);
        log::debug!("kernel module ready (ABI v{})", version);
        Ok(())
    }

    fn module(&self) -> Result<&dyn KernelModule> {
        self.module
            .get()
            .map(|m| m.as_ref())
            .ok_or(NumliteError::BackendNotReady("accelerated"))
    }
}

fn square_dim(arr: &ArrayData) -> Result<usize> {
    let (m, n) = arr.matrix_dims()?;
    if m != n {
        return Err(NumliteError::shape_mismatch(arr.shape(), &[m, m]));
    }
    Ok(n)
}

fn closed_form_dim(arr: &ArrayData, op: &'static str) -> Result<usize> {
    let n = square_dim(arr)?;
    if n != 2 && n != 3 {
        return Err(NumliteError::unsupported(op, arr.shape()));
    }
    Ok(n)
}

fn nonempty(arr: &ArrayData, op: &'static str) -> Result<Vec<f64>> {
    if arr.is_empty() {
        return Err(NumliteError::EmptyArray(op));
    }
    Ok(arr.to_f64_vec())
}

impl Readiness for AcceleratedBackend {
    fn ensure_ready(&self) -> Result<()> {
        self.module().map(|_| ())
    }
}

impl Backend for AcceleratedBackend {
    fn name(&self) -> &'static str {
        "accelerated"
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Accelerated
    }

    fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}

impl MathOps for AcceleratedBackend {
    fn binary(&self, op: BinaryOp, a: &ArrayData, b: Operand<'_>) -> Result<ArrayData> {
        let module = self.module()?;
        let dtype = op.result_dtype(a.dtype());
        match b {
            Operand::Scalar(scalar) => {
                let out = module.binary_scalar(op, &a.to_f64_vec(), scalar);
                ArrayData::from_f64(&out, a.shape().to_vec(), dtype)
            }
            Operand::Array(b) => {
                let (a, b) = broadcast_pair(a, b)?;
                log::trace!("accelerated {} over {:?}", op.name(), a.shape());
                let out = module.binary(op, &a.to_f64_vec(), &b.to_f64_vec());
                ArrayData::from_f64(&out, a.shape().to_vec(), dtype)
            }
        }
    }

    fn unary(&self, op: UnaryOp, arr: &ArrayData) -> Result<ArrayData> {
        let out = self.module()?.unary(op, &arr.to_f64_vec());
        ArrayData::from_f64(&out, arr.shape().to_vec(), op.result_dtype(arr.dtype()))
    }

    fn clip(&self, arr: &ArrayData, min: f64, max: f64) -> Result<ArrayData> {
        let out = self.module()?.clip(&arr.to_f64_vec(), min, max);
        ArrayData::from_f64(&out, arr.shape().to_vec(), arr.dtype())
    }
}

impl StatsOps for AcceleratedBackend {
    fn sum(&self, arr: &ArrayData) -> Result<f64> {
        Ok(self.module()?.sum(&arr.to_f64_vec()))
    }

    fn prod(&self, arr: &ArrayData) -> Result<f64> {
        Ok(self.module()?.prod(&arr.to_f64_vec()))
    }

    fn mean(&self, arr: &ArrayData) -> Result<f64> {
        Ok(self.module()?.mean(&arr.to_f64_vec()))
    }

    fn var(&self, arr: &ArrayData) -> Result<f64> {
        Ok(self.module()?.variance(&arr.to_f64_vec()))
    }

    fn std(&self, arr: &ArrayData) -> Result<f64> {
        Ok(self.module()?.std(&arr.to_f64_vec()))
    }

    fn min(&self, arr: &ArrayData) -> Result<f64> {
        let module = self.module()?;
        Ok(module.min(&nonempty(arr, "min")?))
    }

    fn max(&self, arr: &ArrayData) -> Result<f64> {
        let module = self.module()?;
        Ok(module.max(&nonempty(arr, "max")?))
    }

    fn argmin(&self, arr: &ArrayData) -> Result<usize> {
        let module = self.module()?;
        Ok(module.argmin(&nonempty(arr, "argmin")?))
    }

    fn argmax(&self, arr: &ArrayData) -> Result<usize> {
        let module = self.module()?;
        Ok(module.argmax(&nonempty(arr, "argmax")?))
    }
}

impl LinalgOps for AcceleratedBackend {
    fn matmul(&self, a: &ArrayData, b: &ArrayData) -> Result<ArrayData> {
        let module = self.module()?;
        let (m, k) = a.matrix_dims()?;
        let (k2, n) = b.matrix_dims()?;
        if k != k2 {
            return Err(NumliteError::shape_mismatch(a.shape(), b.shape()));
        }
        let out = module.matmul(&a.to_f64_vec(), &b.to_f64_vec(), m, k, n);
        ArrayData::from_f64(&out, vec![m, n], a.dtype())
    }

    fn inner(&self, a: &ArrayData, b: &ArrayData) -> Result<f64> {
        let module = self.module()?;
        if a.size() != b.size() {
            return Err(NumliteError::shape_mismatch(a.shape(), b.shape()));
        }
        Ok(module.dot(&a.to_f64_vec(), &b.to_f64_vec()))
    }

    fn outer(&self, a: &ArrayData, b: &ArrayData) -> Result<ArrayData> {
        let out = self.module()?.outer(&a.to_f64_vec(), &b.to_f64_vec());
        ArrayData::from_f64(&out, vec![a.size(), b.size()], a.dtype())
    }

    /// Reversed-axes view, as in the reference backend.
    fn transpose(&self, arr: &ArrayData) -> Result<ArrayData> {
        self.module()?;
        Ok(arr.transposed())
    }

    fn trace(&self, arr: &ArrayData) -> Result<f64> {
        let module = self.module()?;
        let (m, n) = arr.matrix_dims()?;
        Ok(module.trace(&arr.to_f64_vec(), m, n))
    }

    fn det(&self, arr: &ArrayData) -> Result<f64> {
        let module = self.module()?;
        let n = closed_form_dim(arr, "det")?;
        Ok(module.det(&arr.to_f64_vec(), n))
    }

    fn inv(&self, arr: &ArrayData) -> Result<ArrayData> {
        let module = self.module()?;
        let n = closed_form_dim(arr, "inv")?;
        let out = module.inv(&arr.to_f64_vec(), n);
        if out.is_empty() {
            return Err(NumliteError::SingularMatrix);
        }
        ArrayData::from_f64(&out, vec![n, n], DType::Float64)
    }

    fn slogdet(&self, arr: &ArrayData) -> Result<(f64, f64)> {
        self.module()?;
        self.reference.slogdet(arr)
    }

    fn qr(&self, arr: &ArrayData) -> Result<(ArrayData, ArrayData)> {
        self.module()?;
        self.reference.qr(arr)
    }

    fn cholesky(&self, arr: &ArrayData) -> Result<ArrayData> {
        let module = self.module()?;
        let n = square_dim(arr)?;
        if n == 0 {
            return Ok(ArrayData::zeros(vec![0, 0], DType::Float64));
        }
        let out = module.cholesky(&arr.to_f64_vec(), n);
        if out.is_empty() {
            return Err(NumliteError::NotPositiveDefinite);
        }
        ArrayData::from_f64(&out, vec![n, n], DType::Float64)
    }

    fn eig(&self, arr: &ArrayData) -> Result<(f64, ArrayData)> {
        self.module()?;
        self.reference.eig(arr)
    }

    fn svd(&self, arr: &ArrayData) -> Result<(ArrayData, ArrayData, ArrayData)> {
        self.module()?;
        self.reference.svd(arr)
    }
}

impl FftOps for AcceleratedBackend {
    fn fft_kernel(&self, re: &mut [f64], im: &mut [f64]) -> Result<()> {
        let module = self.module()?;
        if re.len() != im.len() {
            return Err(NumliteError::InvalidArgument(format!(
                "real and imaginary parts differ in length: {} vs {}",
                re.len(),
                im.len()
            )));
        }
        check_length(re.len())?;

        let interleaved: Vec<f64> = re.iter().zip(im.iter()).flat_map(|(&r, &i)| [r, i]).collect();
        let out = module.fft(&interleaved);
        for (k, pair) in out.chunks_exact(2).enumerate() {
            re[k] = pair[0];
            im[k] = pair[1];
        }
        Ok(())
    }
}
