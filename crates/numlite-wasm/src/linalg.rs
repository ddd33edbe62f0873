//! Dense matrix kernels over row-major buffers

use wasm_bindgen::prelude::*;

const SINGULAR_TOLERANCE: f64 = 1e-10;

/// `(m×k)(k×n)` product, i-k-j loop order.
#[wasm_bindgen]
pub fn matmul(a: &[f64], b: &[f64], m: usize, k: usize, n: usize) -> Vec<f64> {
    assert_eq!(a.len(), m * k, "left operand is not m×k");
    assert_eq!(b.len(), k * n, "right operand is not k×n");

    let mut c = vec![0.0; m * n];
    for i in 0..m {
        let row = &mut c[i * n..(i + 1) * n];
        for p in 0..k {
            let aip = a[i * k + p];
            for (out, &bpj) in row.iter_mut().zip(&b[p * n..(p + 1) * n]) {
                *out += aip * bpj;
            }
        }
    }
    c
}

#[wasm_bindgen]
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[wasm_bindgen]
pub fn outer(a: &[f64], b: &[f64]) -> Vec<f64> {
    a.iter().flat_map(|&x| b.iter().map(move |&y| x * y)).collect()
}

#[wasm_bindgen]
pub fn trace(a: &[f64], m: usize, n: usize) -> f64 {
    assert_eq!(a.len(), m * n);
    (0..m.min(n)).map(|i| a[i * n + i]).sum()
}

/// Determinant of a 2×2 or 3×3 matrix; NaN for any other size.
#[wasm_bindgen]
pub fn det(a: &[f64], n: usize) -> f64 {
    assert_eq!(a.len(), n * n);
    match n {
        2 => a[0] * a[3] - a[1] * a[2],
        3 => {
            a[0] * (a[4] * a[8] - a[5] * a[7]) - a[1] * (a[3] * a[8] - a[5] * a[6])
                + a[2] * (a[3] * a[7] - a[4] * a[6])
        }
        _ => f64::NAN,
    }
}

/// Inverse of a 2×2 or 3×3 matrix; empty when singular or another size.
#[wasm_bindgen]
pub fn inv(a: &[f64], n: usize) -> Vec<f64> {
    let d = det(a, n);
    if !(d.abs() >= SINGULAR_TOLERANCE) {
        return Vec::new();
    }
    match n {
        2 => vec![a[3] / d, -a[1] / d, -a[2] / d, a[0] / d],
        _ => {
            let at = |r: usize, c: usize| a[(r % 3) * 3 + c % 3];
            let mut out = vec![0.0; 9];
            for i in 0..3 {
                for j in 0..3 {
                    // cofactor of a[j][i]
                    out[i * 3 + j] = (at(j + 1, i + 1) * at(j + 2, i + 2)
                        - at(j + 1, i + 2) * at(j + 2, i + 1))
                        / d;
                }
            }
            out
        }
    }
}

/// Lower-triangular Cholesky factor; empty when not positive definite.
#[wasm_bindgen]
pub fn cholesky(a: &[f64], n: usize) -> Vec<f64> {
    assert_eq!(a.len(), n * n);
    let mut l = vec![0.0; n * n];
    for i in 0..n {
        for j in 0..=i {
            let s: f64 = (0..j).map(|p| l[i * n + p] * l[j * n + p]).sum();
            if i == j {
                let d = a[i * n + i] - s;
                if !(d > 0.0) {
                    return Vec::new();
                }
                l[i * n + i] = d.sqrt();
            } else {
                l[i * n + j] = (a[i * n + j] - s) / l[j * n + j];
            }
        }
    }
    l
}
