//! Free functions dispatched to the active backend
//!
//! Each call resolves the backend through [`get_backend`], so the first
//! operation in a process triggers backend selection.

use numlite_core::ops::{FftOps, LinalgOps, MathOps, StatsOps};
use numlite_core::{ArrayData, Operand, Result};

use crate::manager::{get_backend, manager};

pub use numlite_core::fft::{fftfreq, rfftfreq};

macro_rules! binary_fns {
    ($($(#[$doc:meta])* $name:ident),* $(,)?) => {
        $(
            $(#[$doc])*
            pub fn $name<'a>(a: &ArrayData, b: impl Into<Operand<'a>>) -> Result<ArrayData> {
                MathOps::$name(&*get_backend(), a, b.into())
            }
        )*
    };
}

macro_rules! array_fns {
    ($trait:ident: $($(#[$doc:meta])* $name:ident -> $ret:ty),* $(,)?) => {
        $(
            $(#[$doc])*
            pub fn $name(arr: &ArrayData) -> Result<$ret> {
                $trait::$name(&*get_backend(), arr)
            }
        )*
    };
}

macro_rules! pair_fns {
    ($($(#[$doc:meta])* $name:ident -> $ret:ty),* $(,)?) => {
        $(
            $(#[$doc])*
            pub fn $name(a: &ArrayData, b: &ArrayData) -> Result<$ret> {
                LinalgOps::$name(&*get_backend(), a, b)
            }
        )*
    };
}

binary_fns! {
    /// Elementwise `a + b` with broadcasting.
    add,
    sub,
    mul,
    /// Elementwise `a / b`; integer inputs produce `float64`.
    div,
    pow,
    maximum,
    minimum,
}

array_fns! {
    MathOps:
    sin -> ArrayData,
    cos -> ArrayData,
    tan -> ArrayData,
    arcsin -> ArrayData,
    arccos -> ArrayData,
    arctan -> ArrayData,
    sinh -> ArrayData,
    cosh -> ArrayData,
    tanh -> ArrayData,
    arcsinh -> ArrayData,
    arccosh -> ArrayData,
    arctanh -> ArrayData,
    exp -> ArrayData,
    exp2 -> ArrayData,
    expm1 -> ArrayData,
    log -> ArrayData,
    log2 -> ArrayData,
    log10 -> ArrayData,
    log1p -> ArrayData,
    sqrt -> ArrayData,
    cbrt -> ArrayData,
    square -> ArrayData,
    abs -> ArrayData,
    sign -> ArrayData,
    neg -> ArrayData,
    reciprocal -> ArrayData,
    floor -> ArrayData,
    ceil -> ArrayData,
    round -> ArrayData,
    trunc -> ArrayData,
}

pub fn clip(arr: &ArrayData, min: f64, max: f64) -> Result<ArrayData> {
    MathOps::clip(&*get_backend(), arr, min, max)
}

array_fns! {
    StatsOps:
    sum -> f64,
    prod -> f64,
    mean -> f64,
    /// Population variance.
    var -> f64,
    std -> f64,
    min -> f64,
    max -> f64,
    argmin -> usize,
    argmax -> usize,
}

pair_fns! {
    /// Product of two matrices.
    matmul -> ArrayData,
    /// NumPy `dot`: inner product for vectors, matrix product otherwise.
    dot -> ArrayData,
    inner -> f64,
    outer -> ArrayData,
}

array_fns! {
    LinalgOps:
    /// Reversed-axes view; no data is copied.
    transpose -> ArrayData,
    trace -> f64,
    det -> f64,
    inv -> ArrayData,
    /// `(sign, ln|det|)`.
    slogdet -> (f64, f64),
    qr -> (ArrayData, ArrayData),
    /// Lower-triangular factor `L` with `L·Lᵀ = A`.
    cholesky -> ArrayData,
    /// Dominant eigenvalue and its unit eigenvector.
    eig -> (f64, ArrayData),
    svd -> (ArrayData, ArrayData, ArrayData),
}

/// Product of a matrix chain, multiplied in the cheapest order.
pub fn multi_dot(arrays: &[ArrayData]) -> Result<ArrayData> {
    LinalgOps::multi_dot(&*get_backend(), arrays)
}

array_fns! {
    FftOps:
    /// Complex transform of real input along the last axis.
    fft -> ArrayData,
    ifft -> ArrayData,
    rfft -> ArrayData,
    fft2 -> ArrayData,
    ifft2 -> ArrayData,
    rfft2 -> ArrayData,
}

pub fn irfft(arr: &ArrayData, n: Option<usize>) -> Result<ArrayData> {
    FftOps::irfft(&*get_backend(), arr, n)
}

pub fn irfft2(arr: &ArrayData, n: Option<usize>) -> Result<ArrayData> {
    FftOps::irfft2(&*get_backend(), arr, n)
}

pub fn fftn(arr: &ArrayData, axes: Option<&[usize]>) -> Result<ArrayData> {
    FftOps::fftn(&*get_backend(), arr, axes)
}

pub fn ifftn(arr: &ArrayData, axes: Option<&[usize]>) -> Result<ArrayData> {
    FftOps::ifftn(&*get_backend(), arr, axes)
}

pub fn rfftn(arr: &ArrayData, axes: Option<&[usize]>) -> Result<ArrayData> {
    FftOps::rfftn(&*get_backend(), arr, axes)
}

pub fn irfftn(arr: &ArrayData, axes: Option<&[usize]>, n: Option<usize>) -> Result<ArrayData> {
    FftOps::irfftn(&*get_backend(), arr, axes, n)
}

/// Compare two arrays with the process-wide tolerance.
pub fn allclose(a: &ArrayData, b: &ArrayData) -> bool {
    manager().config().tolerance().allclose(a, b)
}
