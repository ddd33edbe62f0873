//! Numeric agreement between backends
//!
//! Two backends agree on a value when `|a - b| <= atol + rtol * |b|`, the
//! same asymmetric rule NumPy's `isclose` uses with `b` as the reference.

use serde::{Deserialize, Serialize};

use crate::array::ArrayData;

pub const DEFAULT_RTOL: f64 = 1e-5;
pub const DEFAULT_ATOL: f64 = 1e-8;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    pub rtol: f64,
    pub atol: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            rtol: DEFAULT_RTOL,
            atol: DEFAULT_ATOL,
        }
    }
}

impl Tolerance {
    pub fn new(rtol: f64, atol: f64) -> Self {
        Self { rtol, atol }
    }

    /// NaNs compare equal to each other; infinities only to the same sign.
    pub fn isclose(&self, a: f64, b: f64) -> bool {
        if a.is_nan() || b.is_nan() {
            return a.is_nan() && b.is_nan();
        }
        if a.is_infinite() || b.is_infinite() {
            return a == b;
        }
        (a - b).abs() <= self.atol + self.rtol * b.abs()
    }

    /// Same shape and every element close.
    pub fn allclose(&self, a: &ArrayData, b: &ArrayData) -> bool {
        a.shape() == b.shape()
            && a.to_f64_vec()
                .iter()
                .zip(b.to_f64_vec().iter())
                .all(|(&x, &y)| self.isclose(x, y))
    }
}

/// [`Tolerance::allclose`] with the default tolerances.
pub fn allclose(a: &ArrayData, b: &ArrayData) -> bool {
    Tolerance::default().allclose(a, b)
}
