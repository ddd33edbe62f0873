//! Broadcast loops over ndarray values
//!
//! The joint shape comes from the core broadcasting engine; the loop itself
//! runs over ndarray's zero-cost broadcast views, so an operand with a
//! stretched axis is never expanded in memory.

use ndarray::{ArrayD, IxDyn, Zip};
use numlite_core::{broadcast_shapes, NumliteError, Result};

/// Apply a binary operation with broadcasting.
///
/// The computation writes straight into the result array in a single pass.
pub fn broadcast_binary_op<F>(a: &ArrayD<f64>, b: &ArrayD<f64>, op: F) -> Result<ArrayD<f64>>
where
    F: Fn(f64, f64) -> f64,
{
    let shape_a = a.shape();
    let shape_b = b.shape();

    // Fast path: same shape, no broadcasting needed
    if shape_a == shape_b {
        return Ok(Zip::from(a).and(b).map_collect(|&x, &y| op(x, y)));
    }

    let output_shape = broadcast_shapes(shape_a, shape_b)?;
    let output_dim = IxDyn(&output_shape);

    let mismatch = || NumliteError::shape_mismatch(shape_a, shape_b);
    let a_view = a.broadcast(output_dim.clone()).ok_or_else(mismatch)?;
    let b_view = b.broadcast(output_dim).ok_or_else(mismatch)?;

    Ok(Zip::from(a_view).and(b_view).map_collect(|&x, &y| op(x, y)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nd(data: Vec<f64>, shape: &[usize]) -> ArrayD<f64> {
        ArrayD::from_shape_vec(IxDyn(shape), data).unwrap()
    }

    #[test]
    fn test_broadcast_binary_op_same_shape() {
        let a = nd(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]);
        let b = nd(vec![10.0, 20.0, 30.0, 40.0, 50.0, 60.0], &[2, 3]);

        let result = broadcast_binary_op(&a, &b, |x, y| x + y).unwrap();
        assert_eq!(result.shape(), &[2, 3]);
        assert_eq!(
            result.iter().cloned().collect::<Vec<_>>(),
            vec![11.0, 22.0, 33.0, 44.0, 55.0, 66.0]
        );
    }

    #[test]
    fn test_broadcast_binary_op_row_plus_matrix() {
        // (3,) + (2, 3) => (2, 3)
        let row = nd(vec![1.0, 2.0, 3.0], &[3]);
        let matrix = nd(vec![10.0, 20.0, 30.0, 40.0, 50.0, 60.0], &[2, 3]);

        let result = broadcast_binary_op(&row, &matrix, |x, y| x + y).unwrap();
        assert_eq!(
            result.iter().cloned().collect::<Vec<_>>(),
            vec![11.0, 22.0, 33.0, 41.0, 52.0, 63.0]
        );
    }

    #[test]
    fn test_broadcast_binary_op_col_minus_row() {
        // (2, 1) - (1, 3) => (2, 3)
        let col = nd(vec![1.0, 2.0], &[2, 1]);
        let row = nd(vec![10.0, 20.0, 30.0], &[1, 3]);

        let result = broadcast_binary_op(&col, &row, |x, y| x - y).unwrap();
        assert_eq!(result.shape(), &[2, 3]);
        assert_eq!(
            result.iter().cloned().collect::<Vec<_>>(),
            vec![-9.0, -19.0, -29.0, -8.0, -18.0, -28.0]
        );
    }

    #[test]
    fn test_broadcast_binary_op_errors() {
        let a = nd(vec![1.0, 2.0, 3.0], &[3]);
        let b = nd(vec![1.0, 2.0], &[2]);
        assert!(matches!(
            broadcast_binary_op(&a, &b, |x, y| x + y),
            Err(NumliteError::ShapeMismatch { .. })
        ));

    }

    #[test]
    fn test_broadcast_binary_op_zero_length() {
        let empty = nd(vec![], &[0]);
        let one = nd(vec![1.0], &[1]);
        let result = broadcast_binary_op(&empty, &one, |x, y| x + y).unwrap();
        assert_eq!(result.shape(), &[0]);
        let result = broadcast_binary_op(&one, &empty, |x, y| x + y).unwrap();
        assert_eq!(result.shape(), &[0]);
    }
}
