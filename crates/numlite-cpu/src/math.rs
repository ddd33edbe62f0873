//! Element-wise math operations for the reference backend

use crate::array::{from_ndarray, to_ndarray};
use crate::broadcast::broadcast_binary_op;
use crate::ReferenceBackend;
use numlite_core::ops::{BinaryOp, MathOps, Operand, UnaryOp};
use numlite_core::{ArrayData, Result};

impl MathOps for ReferenceBackend {
    fn binary(&self, op: BinaryOp, a: &ArrayData, b: Operand<'_>) -> Result<ArrayData> {
        let data = to_ndarray(a)?;
        let result = match b {
            Operand::Scalar(scalar) => data.mapv(|x| op.apply(x, scalar)),
            Operand::Array(b) => broadcast_binary_op(&data, &to_ndarray(b)?, |x, y| op.apply(x, y))?,
        };
        log::trace!("reference {} -> {:?}", op.name(), result.shape());
        from_ndarray(&result, op.result_dtype(a.dtype()))
    }

    fn unary(&self, op: UnaryOp, arr: &ArrayData) -> Result<ArrayData> {
        let result = to_ndarray(arr)?.mapv(|x| op.apply(x));
        from_ndarray(&result, op.result_dtype(arr.dtype()))
    }

    fn clip(&self, arr: &ArrayData, min: f64, max: f64) -> Result<ArrayData> {
        // min > max yields max everywhere, like NumPy
        let result = to_ndarray(arr)?.mapv(|x| x.max(min).min(max));
        from_ndarray(&result, arr.dtype())
    }
}
