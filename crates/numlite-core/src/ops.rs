//! Operation traits that backends implement
//!
//! Every trait is object safe so a backend can be selected at runtime and
//! held as `Arc<dyn Backend>`. Required methods are the ones a variant must
//! provide itself; the provided methods are thin conveniences layered on top
//! and behave identically for every variant.

use crate::array::ArrayData;
use crate::chain;
use crate::dtype::DType;
use crate::error::{NumliteError, Result};
use crate::fft;

/// Right-hand side of an elementwise binary operation.
#[derive(Debug, Clone, Copy)]
pub enum Operand<'a> {
    Scalar(f64),
    Array(&'a ArrayData),
}

impl From<f64> for Operand<'_> {
    fn from(v: f64) -> Self {
        Operand::Scalar(v)
    }
}

impl From<i32> for Operand<'_> {
    fn from(v: i32) -> Self {
        Operand::Scalar(v as f64)
    }
}

impl<'a> From<&'a ArrayData> for Operand<'a> {
    fn from(a: &'a ArrayData) -> Self {
        Operand::Array(a)
    }
}

/// Elementwise binary operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Maximum,
    Minimum,
}

impl BinaryOp {
    #[inline]
    pub fn apply(self, x: f64, y: f64) -> f64 {
        match self {
            BinaryOp::Add => x + y,
            BinaryOp::Sub => x - y,
            BinaryOp::Mul => x * y,
            BinaryOp::Div => x / y,
            BinaryOp::Pow => x.powf(y),
            BinaryOp::Maximum => x.max(y),
            BinaryOp::Minimum => x.min(y),
        }
    }

    /// Result dtype: the left operand's, except that division promotes
    /// integer kinds to `float64`.
    pub fn result_dtype(self, left: DType) -> DType {
        match self {
            BinaryOp::Div if left.is_integer() => DType::Float64,
            _ => left,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mul => "mul",
            BinaryOp::Div => "div",
            BinaryOp::Pow => "pow",
            BinaryOp::Maximum => "maximum",
            BinaryOp::Minimum => "minimum",
        }
    }
}

/// Elementwise math functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Sin,
    Cos,
    Tan,
    Arcsin,
    Arccos,
    Arctan,
    Sinh,
    Cosh,
    Tanh,
    Arcsinh,
    Arccosh,
    Arctanh,
    Exp,
    Exp2,
    Expm1,
    Log,
    Log2,
    Log10,
    Log1p,
    Sqrt,
    Cbrt,
    Square,
    Abs,
    Sign,
    Neg,
    Reciprocal,
    Floor,
    Ceil,
    Round,
    Trunc,
}

impl UnaryOp {
    pub const ALL: [UnaryOp; 30] = [
        UnaryOp::Sin,
        UnaryOp::Cos,
        UnaryOp::Tan,
        UnaryOp::Arcsin,
        UnaryOp::Arccos,
        UnaryOp::Arctan,
        UnaryOp::Sinh,
        UnaryOp::Cosh,
        UnaryOp::Tanh,
        UnaryOp::Arcsinh,
        UnaryOp::Arccosh,
        UnaryOp::Arctanh,
        UnaryOp::Exp,
        UnaryOp::Exp2,
        UnaryOp::Expm1,
        UnaryOp::Log,
        UnaryOp::Log2,
        UnaryOp::Log10,
        UnaryOp::Log1p,
        UnaryOp::Sqrt,
        UnaryOp::Cbrt,
        UnaryOp::Square,
        UnaryOp::Abs,
        UnaryOp::Sign,
        UnaryOp::Neg,
        UnaryOp::Reciprocal,
        UnaryOp::Floor,
        UnaryOp::Ceil,
        UnaryOp::Round,
        UnaryOp::Trunc,
    ];

    #[inline]
    pub fn apply(self, x: f64) -> f64 {
        match self {
            UnaryOp::Sin => x.sin(),
            UnaryOp::Cos => x.cos(),
            UnaryOp::Tan => x.tan(),
            UnaryOp::Arcsin => x.asin(),
            UnaryOp::Arccos => x.acos(),
            UnaryOp::Arctan => x.atan(),
            UnaryOp::Sinh => x.sinh(),
            UnaryOp::Cosh => x.cosh(),
            UnaryOp::Tanh => x.tanh(),
            UnaryOp::Arcsinh => x.asinh(),
            UnaryOp::Arccosh => x.acosh(),
            UnaryOp::Arctanh => x.atanh(),
            UnaryOp::Exp => x.exp(),
            UnaryOp::Exp2 => x.exp2(),
            UnaryOp::Expm1 => x.exp_m1(),
            UnaryOp::Log => x.ln(),
            UnaryOp::Log2 => x.log2(),
            UnaryOp::Log10 => x.log10(),
            UnaryOp::Log1p => x.ln_1p(),
            UnaryOp::Sqrt => x.sqrt(),
            UnaryOp::Cbrt => x.cbrt(),
            UnaryOp::Square => x * x,
            UnaryOp::Abs => x.abs(),
            UnaryOp::Sign => {
                if x > 0.0 {
                    1.0
                } else if x < 0.0 {
                    -1.0
                } else {
                    0.0
                }
            }
            UnaryOp::Neg => -x,
            UnaryOp::Reciprocal => 1.0 / x,
            UnaryOp::Floor => x.floor(),
            UnaryOp::Ceil => x.ceil(),
            UnaryOp::Round => x.round(),
            UnaryOp::Trunc => x.trunc(),
        }
    }

    /// Whether the result keeps the input dtype; all other functions
    /// produce `float64`.
    pub fn preserves_dtype(self) -> bool {
        matches!(
            self,
            UnaryOp::Square
                | UnaryOp::Abs
                | UnaryOp::Sign
                | UnaryOp::Neg
                | UnaryOp::Floor
                | UnaryOp::Ceil
                | UnaryOp::Round
                | UnaryOp::Trunc
        )
    }

    pub fn result_dtype(self, input: DType) -> DType {
        if self.preserves_dtype() {
            input
        } else {
            DType::Float64
        }
    }
}

macro_rules! unary_methods {
    ($($name:ident => $op:ident),* $(,)?) => {
        $(
            fn $name(&self, arr: &ArrayData) -> Result<ArrayData> {
                self.unary(UnaryOp::$op, arr)
            }
        )*
    };
}

macro_rules! binary_methods {
    ($($name:ident => $op:ident),* $(,)?) => {
        $(
            fn $name(&self, a: &ArrayData, b: Operand<'_>) -> Result<ArrayData> {
                self.binary(BinaryOp::$op, a, b)
            }
        )*
    };
}

/// Whether a backend can execute operations right now.
///
/// Every operation trait extends this, and the provided methods below call
/// [`ensure_ready`](Self::ensure_ready) before doing any work, so a backend
/// that needs initialization only has to override this one method.
pub trait Readiness {
    fn ensure_ready(&self) -> Result<()> {
        Ok(())
    }
}

/// Element-wise math operations
pub trait MathOps: Readiness {
    /// Apply `op` elementwise, broadcasting array operands to a joint shape.
    fn binary(&self, op: BinaryOp, a: &ArrayData, b: Operand<'_>) -> Result<ArrayData>;

    fn unary(&self, op: UnaryOp, arr: &ArrayData) -> Result<ArrayData>;

    /// Clamp every element into `[min, max]`, keeping the dtype.
    fn clip(&self, arr: &ArrayData, min: f64, max: f64) -> Result<ArrayData>;

    binary_methods! {
        add => Add,
        sub => Sub,
        mul => Mul,
        div => Div,
        pow => Pow,
        maximum => Maximum,
        minimum => Minimum,
    }

    unary_methods! {
        sin => Sin,
        cos => Cos,
        tan => Tan,
        arcsin => Arcsin,
        arccos => Arccos,
        arctan => Arctan,
        sinh => Sinh,
        cosh => Cosh,
        tanh => Tanh,
        arcsinh => Arcsinh,
        arccosh => Arccosh,
        arctanh => Arctanh,
        exp => Exp,
        exp2 => Exp2,
        expm1 => Expm1,
        log => Log,
        log2 => Log2,
        log10 => Log10,
        log1p => Log1p,
        sqrt => Sqrt,
        cbrt => Cbrt,
        square => Square,
        abs => Abs,
        sign => Sign,
        neg => Neg,
        reciprocal => Reciprocal,
        floor => Floor,
        ceil => Ceil,
        round => Round,
        trunc => Trunc,
    }
}

/// Full-array reductions
///
/// Population statistics (`ddof = 0`). `sum` of an empty array is 0, `prod`
/// is 1, `mean`/`var`/`std` are NaN, and the extrema fail with `EmptyArray`.
pub trait StatsOps: Readiness {
    fn sum(&self, arr: &ArrayData) -> Result<f64>;
    fn prod(&self, arr: &ArrayData) -> Result<f64>;
    fn mean(&self, arr: &ArrayData) -> Result<f64>;
    fn var(&self, arr: &ArrayData) -> Result<f64>;
    fn std(&self, arr: &ArrayData) -> Result<f64>;
    fn min(&self, arr: &ArrayData) -> Result<f64>;
    fn max(&self, arr: &ArrayData) -> Result<f64>;

    /// Flat index (C order) of the first minimum.
    fn argmin(&self, arr: &ArrayData) -> Result<usize>;

    /// Flat index (C order) of the first maximum.
    fn argmax(&self, arr: &ArrayData) -> Result<usize>;
}

/// Dense linear algebra
pub trait LinalgOps: Readiness {
    /// Matrix product of two rank-2 arrays; inner dimensions must match.
    fn matmul(&self, a: &ArrayData, b: &ArrayData) -> Result<ArrayData>;

    /// Sum of elementwise products of two equally sized arrays.
    fn inner(&self, a: &ArrayData, b: &ArrayData) -> Result<f64>;

    /// `[a.size(), b.size()]` table of products.
    fn outer(&self, a: &ArrayData, b: &ArrayData) -> Result<ArrayData>;

    fn transpose(&self, arr: &ArrayData) -> Result<ArrayData>;

    fn trace(&self, arr: &ArrayData) -> Result<f64>;

    /// Determinant, closed form for 2×2 and 3×3 only.
    fn det(&self, arr: &ArrayData) -> Result<f64>;

    /// Inverse, closed form (adjugate) for 2×2 and 3×3 only.
    fn inv(&self, arr: &ArrayData) -> Result<ArrayData>;

    /// `(sign, ln|det|)` by Gaussian elimination with partial pivoting.
    fn slogdet(&self, arr: &ArrayData) -> Result<(f64, f64)>;

    /// Classical Gram-Schmidt `(Q, R)`.
    fn qr(&self, arr: &ArrayData) -> Result<(ArrayData, ArrayData)>;

    /// Lower-triangular `L` with `L Lᵀ = arr`.
    fn cholesky(&self, arr: &ArrayData) -> Result<ArrayData>;

    /// Dominant eigenvalue and its unit eigenvector by power iteration.
    ///
    /// This is an approximation, not a full eigendecomposition.
    fn eig(&self, arr: &ArrayData) -> Result<(f64, ArrayData)>;

    /// `(U, S, Vt)` for 2×2 matrices only.
    fn svd(&self, arr: &ArrayData) -> Result<(ArrayData, ArrayData, ArrayData)>;

    /// Dot product (1D), matrix-vector, or matrix multiply (2D).
    fn dot(&self, a: &ArrayData, b: &ArrayData) -> Result<ArrayData> {
        self.ensure_ready()?;
        match (a.shape(), b.shape()) {
            (&[n], &[m]) => {
                if n != m {
                    return Err(NumliteError::shape_mismatch(a.shape(), b.shape()));
                }
                Ok(ArrayData::scalar(self.inner(a, b)?, a.dtype()))
            }
            (&[_, _], &[_, _]) => self.matmul(a, b),
            (&[_, k], &[n]) => {
                if k != n {
                    return Err(NumliteError::shape_mismatch(a.shape(), b.shape()));
                }
                let col = b.reshape(vec![n, 1])?;
                let out = self.matmul(a, &col)?;
                out.reshape(vec![out.shape()[0]])
            }
            (&[n], &[_, _]) => {
                let row = a.reshape(vec![1, n])?;
                let out = self.matmul(&row, b)?;
                out.reshape(vec![out.shape()[1]])
            }
            _ => Err(NumliteError::shape_mismatch(a.shape(), b.shape())),
        }
    }

    /// Product of a chain of matrices, multiplied in the order that
    /// minimises scalar multiplications.
    fn multi_dot(&self, arrays: &[ArrayData]) -> Result<ArrayData> {
        self.ensure_ready()?;
        match arrays {
            [] => Err(NumliteError::InvalidArgument(
                "multi_dot needs at least one array".into(),
            )),
            [single] => Ok(single.clone()),
            _ => {
                let dims = chain::chain_dims(arrays)?;
                let order = chain::matrix_chain_order(&dims);
                log::trace!("multi_dot over {} matrices, dims {:?}", arrays.len(), dims);
                chain::evaluate(&order, arrays, 0, arrays.len() - 1, &mut |a, b| {
                    self.matmul(a, b)
                })
            }
        }
    }
}

/// Fourier transforms
///
/// A backend supplies only the forward radix-2 kernel; every transform below
/// is built from it, so all variants share the axis handling, the inverse
/// (conjugate, transform, conjugate, scale) and the real-input packing.
/// Complex arrays carry a trailing axis of length 2 holding `(re, im)`.
pub trait FftOps: Readiness {
    /// In-place forward transform of one sequence whose length is a
    /// power of two.
    fn fft_kernel(&self, re: &mut [f64], im: &mut [f64]) -> Result<()>;

    /// Transform of real input along its last axis; output gains a
    /// trailing `(re, im)` axis and is `float64`.
    fn fft(&self, arr: &ArrayData) -> Result<ArrayData> {
        self.ensure_ready()?;
        let last = last_axis(arr)?;
        fft::forward(arr, &[last], &mut |re, im| self.fft_kernel(re, im))
    }

    /// Inverse of [`fft`](Self::fft) on interleaved complex input.
    fn ifft(&self, arr: &ArrayData) -> Result<ArrayData> {
        self.ensure_ready()?;
        let last = last_complex_axis(arr)?;
        fft::inverse(arr, &[last], &mut |re, im| self.fft_kernel(re, im))
    }

    /// First `n/2 + 1` bins of the transform of real input.
    fn rfft(&self, arr: &ArrayData) -> Result<ArrayData> {
        self.ensure_ready()?;
        let last = last_axis(arr)?;
        fft::forward_real(arr, &[last], &mut |re, im| self.fft_kernel(re, im))
    }

    /// Real signal of length `n` (default `2 * (bins - 1)`) from half-spectrum input.
    fn irfft(&self, arr: &ArrayData, n: Option<usize>) -> Result<ArrayData> {
        self.ensure_ready()?;
        let last = last_complex_axis(arr)?;
        fft::inverse_real(arr, &[last], n, &mut |re, im| self.fft_kernel(re, im))
    }

    fn fft2(&self, arr: &ArrayData) -> Result<ArrayData> {
        let axes = last_two(arr.ndim())?;
        self.fftn(arr, Some(&axes))
    }

    fn ifft2(&self, arr: &ArrayData) -> Result<ArrayData> {
        let axes = last_two(arr.ndim().saturating_sub(1))?;
        self.ifftn(arr, Some(&axes))
    }

    fn rfft2(&self, arr: &ArrayData) -> Result<ArrayData> {
        let axes = last_two(arr.ndim())?;
        self.rfftn(arr, Some(&axes))
    }

    fn irfft2(&self, arr: &ArrayData, n: Option<usize>) -> Result<ArrayData> {
        let axes = last_two(arr.ndim().saturating_sub(1))?;
        self.irfftn(arr, Some(&axes), n)
    }

    /// Transform of real input over `axes` (default: every axis).
    fn fftn(&self, arr: &ArrayData, axes: Option<&[usize]>) -> Result<ArrayData> {
        self.ensure_ready()?;
        let axes = fft::resolve_axes(axes, arr.ndim())?;
        fft::forward(arr, &axes, &mut |re, im| self.fft_kernel(re, im))
    }

    /// Inverse over `axes` of interleaved complex input (default: every
    /// axis but the trailing `(re, im)` one).
    fn ifftn(&self, arr: &ArrayData, axes: Option<&[usize]>) -> Result<ArrayData> {
        self.ensure_ready()?;
        let axes = fft::resolve_axes(axes, arr.ndim().saturating_sub(1))?;
        fft::inverse(arr, &axes, &mut |re, im| self.fft_kernel(re, im))
    }

    /// Real transform: half spectrum along the last requested axis, full
    /// transform along the others.
    fn rfftn(&self, arr: &ArrayData, axes: Option<&[usize]>) -> Result<ArrayData> {
        self.ensure_ready()?;
        let axes = fft::resolve_axes(axes, arr.ndim())?;
        fft::forward_real(arr, &axes, &mut |re, im| self.fft_kernel(re, im))
    }

    /// Inverse of [`rfftn`](Self::rfftn); `n` is the output length of the
    /// last requested axis.
    fn irfftn(&self, arr: &ArrayData, axes: Option<&[usize]>, n: Option<usize>) -> Result<ArrayData> {
        self.ensure_ready()?;
        let axes = fft::resolve_axes(axes, arr.ndim().saturating_sub(1))?;
        fft::inverse_real(arr, &axes, n, &mut |re, im| self.fft_kernel(re, im))
    }
}

fn last_axis(arr: &ArrayData) -> Result<usize> {
    arr.ndim()
        .checked_sub(1)
        .ok_or_else(|| NumliteError::InvalidShape("transform needs at least one axis".into()))
}

fn last_complex_axis(arr: &ArrayData) -> Result<usize> {
    arr.ndim().checked_sub(2).ok_or_else(|| {
        NumliteError::InvalidShape(format!(
            "expected interleaved complex input with a trailing axis of 2, got {:?}",
            arr.shape()
        ))
    })
}

fn last_two(ndim: usize) -> Result<[usize; 2]> {
    if ndim < 2 {
        return Err(NumliteError::InvalidShape(format!(
            "2-D transform needs at least 2 axes, got {}",
            ndim
        )));
    }
    Ok([ndim - 2, ndim - 1])
}
