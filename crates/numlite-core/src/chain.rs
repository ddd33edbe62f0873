//! Matrix-chain ordering for `multi_dot`

use crate::array::ArrayData;
use crate::error::{NumliteError, Result};

/// Optimal parenthesization of a matrix chain.
///
/// `cost[i][j]` is the minimum number of scalar multiplications needed for
/// the product of matrices `i..=j`, and `split[i][j]` the index `k` such that
/// the product is best formed as `(i..=k)(k+1..=j)`.
#[derive(Debug, Clone)]
pub struct ChainOrder {
    cost: Vec<Vec<usize>>,
    split: Vec<Vec<usize>>,
}

impl ChainOrder {
    /// Scalar multiplications for the whole chain.
    pub fn total_cost(&self) -> usize {
        let n = self.cost.len();
        if n == 0 {
            0
        } else {
            self.cost[0][n - 1]
        }
    }

    pub fn split(&self, i: usize, j: usize) -> usize {
        self.split[i][j]
    }

    /// Human-readable grouping such as `((A0A1)A2)`.
    pub fn parenthesization(&self, i: usize, j: usize) -> String {
        if i == j {
            format!("A{}", i)
        } else {
            let k = self.split[i][j];
            format!(
                "({}{})",
                self.parenthesization(i, k),
                self.parenthesization(k + 1, j)
            )
        }
    }
}

/// Dimensions `p0, p1, ..., pn` where matrix `i` is `p[i] × p[i+1]`.
pub fn chain_dims(arrays: &[ArrayData]) -> Result<Vec<usize>> {
    let mut dims = Vec::with_capacity(arrays.len() + 1);
    for (i, arr) in arrays.iter().enumerate() {
        let (rows, cols) = arr.matrix_dims()?;
        if i == 0 {
            dims.push(rows);
        } else if dims[i] != rows {
            return Err(NumliteError::shape_mismatch(arrays[i - 1].shape(), arr.shape()));
        }
        dims.push(cols);
    }
    Ok(dims)
}

/// Classic interval dynamic program over chain lengths.
pub fn matrix_chain_order(dims: &[usize]) -> ChainOrder {
    let n = dims.len().saturating_sub(1);
    let mut cost = vec![vec![0usize; n]; n];
    let mut split = vec![vec![0usize; n]; n];

    for len in 2..=n {
        for i in 0..=n - len {
            let j = i + len - 1;
            cost[i][j] = usize::MAX;
            for k in i..j {
                let c = cost[i][k] + cost[k + 1][j] + dims[i] * dims[k + 1] * dims[j + 1];
                if c < cost[i][j] {
                    cost[i][j] = c;
                    split[i][j] = k;
                }
            }
        }
    }

    ChainOrder { cost, split }
}

/// Multiply `arrays[i..=j]` following `order`.
pub fn evaluate(
    order: &ChainOrder,
    arrays: &[ArrayData],
    i: usize,
    j: usize,
    matmul: &mut dyn FnMut(&ArrayData, &ArrayData) -> Result<ArrayData>,
) -> Result<ArrayData> {
    if i == j {
        return Ok(arrays[i].clone());
    }
    let k = order.split(i, j);
    let left = evaluate(order, arrays, i, k, matmul)?;
    let right = evaluate(order, arrays, k + 1, j, matmul)?;
    matmul(&left, &right)
}
