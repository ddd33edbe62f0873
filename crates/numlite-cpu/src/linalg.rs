//! Dense linear algebra for the reference backend
//!
//! Small-matrix kernels written directly against ndarray. The closed-form
//! routines (`det`, `inv`, `svd`) deliberately cover only the sizes listed
//! on each function and fail with `UnsupportedSize` elsewhere.

use crate::array::{from_matrix, to_matrix};
use crate::ReferenceBackend;
use ndarray::{Array1, Array2, ArrayView1};
use numlite_core::{ops::LinalgOps, ArrayData, DType, NumliteError, Result};

/// `|det|` below this is treated as singular by `inv`.
pub const SINGULAR_TOLERANCE: f64 = 1e-10;

/// Pivot magnitude below which `slogdet` reports a singular matrix.
pub const PIVOT_TOLERANCE: f64 = 1e-14;

/// Power-iteration steps taken by `eig`.
pub const EIG_ITERATIONS: usize = 100;

/// Rank-2 square input as an owned matrix.
pub fn square_matrix(arr: &ArrayData) -> Result<Array2<f64>> {
    let m = to_matrix(arr)?;
    let n = m.nrows();
    if m.ncols() != n {
        return Err(NumliteError::shape_mismatch(arr.shape(), &[n, n]));
    }
    Ok(m)
}

/// Cofactor expansion for 2×2 and 3×3.
pub fn det_closed_form(a: &Array2<f64>) -> Result<f64> {
    match a.nrows() {
        2 => Ok(a[[0, 0]] * a[[1, 1]] - a[[0, 1]] * a[[1, 0]]),
        3 => Ok(a[[0, 0]] * (a[[1, 1]] * a[[2, 2]] - a[[1, 2]] * a[[2, 1]])
            - a[[0, 1]] * (a[[1, 0]] * a[[2, 2]] - a[[1, 2]] * a[[2, 0]])
            + a[[0, 2]] * (a[[1, 0]] * a[[2, 1]] - a[[1, 1]] * a[[2, 0]])),
        n => Err(NumliteError::unsupported("det", &[n, a.ncols()])),
    }
}

/// Adjugate over determinant for 2×2 and 3×3.
pub fn inv_closed_form(a: &Array2<f64>) -> Result<Array2<f64>> {
    let n = a.nrows();
    if n != 2 && n != 3 {
        return Err(NumliteError::unsupported("inv", &[n, a.ncols()]));
    }
    let det = det_closed_form(a)?;
    // NaN determinants count as singular
    if !(det.abs() >= SINGULAR_TOLERANCE) {
        return Err(NumliteError::SingularMatrix);
    }

    let adj = if n == 2 {
        Array2::from_shape_vec(
            (2, 2),
            vec![a[[1, 1]], -a[[0, 1]], -a[[1, 0]], a[[0, 0]]],
        )
    } else {
        // adj[i][j] is the cofactor of a[j][i]
        let cofactor = |r: usize, c: usize| {
            let (r0, r1) = ((r + 1) % 3, (r + 2) % 3);
            let (c0, c1) = ((c + 1) % 3, (c + 2) % 3);
            a[[r0, c0]] * a[[r1, c1]] - a[[r0, c1]] * a[[r1, c0]]
        };
        Ok(Array2::from_shape_fn((3, 3), |(i, j)| cofactor(j, i)))
    }
    .map_err(|e| NumliteError::InvalidShape(e.to_string()))?;

    Ok(adj / det)
}

/// Gaussian elimination with partial pivoting; returns `(sign, ln|det|)`.
///
/// A pivot smaller than [`PIVOT_TOLERANCE`] yields `(0, -inf)`.
pub fn slogdet_kernel(a: &Array2<f64>) -> (f64, f64) {
    let n = a.nrows();
    let mut lu = a.clone();
    let mut sign = 1.0;
    let mut logdet = 0.0;

    for k in 0..n {
        let (pivot_row, pivot) = (k..n)
            .map(|i| (i, lu[[i, k]].abs()))
            .fold((k, f64::NEG_INFINITY), |best, cur| if cur.1 > best.1 { cur } else { best });
        if !(pivot >= PIVOT_TOLERANCE) {
            return (0.0, f64::NEG_INFINITY);
        }
        if pivot_row != k {
            for j in 0..n {
                lu.swap([k, j], [pivot_row, j]);
            }
            sign = -sign;
        }

        let diag = lu[[k, k]];
        for i in k + 1..n {
            let factor = lu[[i, k]] / diag;
            for j in k..n {
                lu[[i, j]] -= factor * lu[[k, j]];
            }
        }
        if diag < 0.0 {
            sign = -sign;
        }
        logdet += diag.abs().ln();
    }

    (sign, logdet)
}

/// Classical Gram-Schmidt: `Q` is m×n with orthonormal columns, `R` is n×n
/// upper triangular. Dependent columns fail with `SingularMatrix`.
pub fn gram_schmidt(a: &Array2<f64>) -> Result<(Array2<f64>, Array2<f64>)> {
    let (m, n) = a.dim();
    let mut q = Array2::<f64>::zeros((m, n));
    let mut r = Array2::<f64>::zeros((n, n));

    for j in 0..n {
        let column = a.column(j);
        let mut v = column.to_owned();
        for i in 0..j {
            let qi = q.column(i);
            let proj = qi.dot(&column);
            r[[i, j]] = proj;
            v.scaled_add(-proj, &qi);
        }
        let norm = v.dot(&v).sqrt();
        if norm < SINGULAR_TOLERANCE {
            return Err(NumliteError::SingularMatrix);
        }
        r[[j, j]] = norm;
        q.column_mut(j).assign(&(v / norm));
    }

    Ok((q, r))
}

/// Cholesky-Banachiewicz, row by row. Only the lower triangle is read.
pub fn cholesky_banachiewicz(a: &Array2<f64>) -> Result<Array2<f64>> {
    let n = a.nrows();
    let mut l = Array2::<f64>::zeros((n, n));

    for i in 0..n {
        for j in 0..=i {
            let sum: f64 = (0..j).map(|k| l[[i, k]] * l[[j, k]]).sum();
            if i == j {
                let d = a[[i, i]] - sum;
                if !(d > 0.0) {
                    return Err(NumliteError::NotPositiveDefinite);
                }
                l[[i, i]] = d.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    Ok(l)
}

/// Dominant eigenpair by power iteration from the all-ones vector.
///
/// Runs exactly [`EIG_ITERATIONS`] steps and reports the Rayleigh quotient
/// of the last iterate. This is an approximation, not a full solver: it
/// finds only the eigenvalue of largest magnitude and converges slowly when
/// the top two are close.
pub fn power_iteration(a: &Array2<f64>) -> Result<(f64, Array1<f64>)> {
    let n = a.nrows();
    if n == 0 {
        return Err(NumliteError::EmptyArray("eig"));
    }
    let mut v = Array1::from_elem(n, 1.0 / (n as f64).sqrt());
    let mut eigenvalue = rayleigh(a, v.view());

    for _ in 0..EIG_ITERATIONS {
        let w = a.dot(&v);
        let norm = w.dot(&w).sqrt();
        if norm == 0.0 {
            // v lies in the null space
            return Ok((0.0, v));
        }
        v = w / norm;
        eigenvalue = rayleigh(a, v.view());
    }

    Ok((eigenvalue, v))
}

fn rayleigh(a: &Array2<f64>, v: ArrayView1<'_, f64>) -> f64 {
    v.dot(&a.dot(&v)) / v.dot(&v)
}

/// SVD of a 2×2 matrix from the eigen-decomposition of `AᵀA`.
///
/// Singular values come back in descending order.
pub fn svd_2x2(a: &Array2<f64>) -> Result<(Array2<f64>, Array1<f64>, Array2<f64>)> {
    if a.dim() != (2, 2) {
        return Err(NumliteError::unsupported("svd", &[a.nrows(), a.ncols()]));
    }
    let ata = a.t().dot(a);
    let (p, q, r) = (ata[[0, 0]], ata[[0, 1]], ata[[1, 1]]);

    let mid = (p + r) / 2.0;
    let spread = (((p - r) / 2.0).powi(2) + q * q).sqrt();
    let lambda1 = mid + spread;
    let lambda2 = (mid - spread).max(0.0);

    let v1 = if q.abs() > f64::EPSILON * mid.abs().max(1.0) {
        let (x, y) = (lambda1 - r, q);
        let len = x.hypot(y);
        [x / len, y / len]
    } else if p >= r {
        [1.0, 0.0]
    } else {
        [0.0, 1.0]
    };
    let v2 = [-v1[1], v1[0]];

    let s = Array1::from(vec![lambda1.sqrt(), lambda2.sqrt()]);
    let left = |v: [f64; 2], sigma: f64| {
        [
            (a[[0, 0]] * v[0] + a[[0, 1]] * v[1]) / sigma,
            (a[[1, 0]] * v[0] + a[[1, 1]] * v[1]) / sigma,
        ]
    };
    let u1 = if s[0] > SINGULAR_TOLERANCE { left(v1, s[0]) } else { [1.0, 0.0] };
    let u2 = if s[1] > SINGULAR_TOLERANCE { left(v2, s[1]) } else { [-u1[1], u1[0]] };

    let u = Array2::from_shape_fn((2, 2), |(i, j)| if j == 0 { u1[i] } else { u2[i] });
    let vt = Array2::from_shape_fn((2, 2), |(i, j)| if i == 0 { v1[j] } else { v2[j] });
    Ok((u, s, vt))
}

impl LinalgOps for ReferenceBackend {
    fn matmul(&self, a: &ArrayData, b: &ArrayData) -> Result<ArrayData> {
        let mat_a = to_matrix(a)?;
        let mat_b = to_matrix(b)?;
        if mat_a.ncols() != mat_b.nrows() {
            return Err(NumliteError::shape_mismatch(a.shape(), b.shape()));
        }
        from_matrix(&mat_a.dot(&mat_b), a.dtype())
    }

    fn inner(&self, a: &ArrayData, b: &ArrayData) -> Result<f64> {
        if a.size() != b.size() {
            return Err(NumliteError::shape_mismatch(a.shape(), b.shape()));
        }
        Ok(Array1::from(a.to_f64_vec()).dot(&Array1::from(b.to_f64_vec())))
    }

    fn outer(&self, a: &ArrayData, b: &ArrayData) -> Result<ArrayData> {
        let a_data = a.to_f64_vec();
        let b_data = b.to_f64_vec();
        let result = Array2::from_shape_fn((a_data.len(), b_data.len()), |(i, j)| a_data[i] * b_data[j]);
        from_matrix(&result, a.dtype())
    }

    /// Reversed-axes view sharing `arr`'s buffer.
    fn transpose(&self, arr: &ArrayData) -> Result<ArrayData> {
        Ok(arr.transposed())
    }

    fn trace(&self, arr: &ArrayData) -> Result<f64> {
        Ok(to_matrix(arr)?.diag().sum())
    }

    fn det(&self, arr: &ArrayData) -> Result<f64> {
        det_closed_form(&square_matrix(arr)?)
    }

    fn inv(&self, arr: &ArrayData) -> Result<ArrayData> {
        from_matrix(&inv_closed_form(&square_matrix(arr)?)?, DType::Float64)
    }

    fn slogdet(&self, arr: &ArrayData) -> Result<(f64, f64)> {
        Ok(slogdet_kernel(&square_matrix(arr)?))
    }

    fn qr(&self, arr: &ArrayData) -> Result<(ArrayData, ArrayData)> {
        let (q, r) = gram_schmidt(&to_matrix(arr)?)?;
        Ok((from_matrix(&q, DType::Float64)?, from_matrix(&r, DType::Float64)?))
    }

    fn cholesky(&self, arr: &ArrayData) -> Result<ArrayData> {
        from_matrix(&cholesky_banachiewicz(&square_matrix(arr)?)?, DType::Float64)
    }

    fn eig(&self, arr: &ArrayData) -> Result<(f64, ArrayData)> {
        let (value, vector) = power_iteration(&square_matrix(arr)?)?;
        let n = vector.len();
        Ok((value, ArrayData::from_f64(&vector.to_vec(), vec![n], DType::Float64)?))
    }

    fn svd(&self, arr: &ArrayData) -> Result<(ArrayData, ArrayData, ArrayData)> {
        let (u, s, vt) = svd_2x2(&to_matrix(arr)?)?;
        Ok((
            from_matrix(&u, DType::Float64)?,
            ArrayData::from_f64(&s.to_vec(), vec![2], DType::Float64)?,
            from_matrix(&vt, DType::Float64)?,
        ))
    }
}
