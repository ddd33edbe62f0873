//! Linear algebra tests - NumPy compatible

#[cfg(test)]
mod tests {
    use crate::backend_tests;
    use crate::utils::*;
    use numlite_core::ops::{LinalgOps, StatsOps};
    use numlite_core::{ArrayData, DType, NumliteError};

    fn product(backend: &dyn numlite_core::Backend, a: &ArrayData, b: &ArrayData) -> ArrayData {
        backend.matmul(a, b).unwrap()
    }

    backend_tests! {
        // ============ products ============

        test_matmul_2x2(backend) {
            let a = mat(vec![1.0, 2.0, 3.0, 4.0], 2, 2);
            let b = mat(vec![5.0, 6.0, 7.0, 8.0], 2, 2);
            assert_eq!(product(backend, &a, &b).to_f64_vec(), vec![19.0, 22.0, 43.0, 50.0]);
        }

        test_matmul_2x3_3x2(backend) {
            let a = mat(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3);
            let b = mat(vec![7.0, 8.0, 9.0, 10.0, 11.0, 12.0], 3, 2);
            let c = product(backend, &a, &b);
            assert_eq!(c.shape(), &[2, 2]);
            assert_eq!(c.to_f64_vec(), vec![58.0, 64.0, 139.0, 154.0]);
        }

        test_matmul_dimension_mismatch(backend) {
            let a = mat(vec![1.0, 2.0, 3.0, 4.0], 2, 2);
            let b = mat(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 3, 2);
            assert_eq!(
                backend.matmul(&a, &b).unwrap_err(),
                NumliteError::shape_mismatch(&[2, 2], &[3, 2])
            );
        }

        test_matmul_rejects_vectors(backend) {
            let v = arr(vec![1.0, 2.0]);
            assert!(matches!(backend.matmul(&v, &v), Err(NumliteError::ShapeMismatch { .. })));
        }

        test_matmul_of_transposed_view(backend) {
            let a = mat(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3);
            let gram = product(backend, &a, &a.transposed());
            assert_eq!(gram.to_f64_vec(), vec![14.0, 32.0, 32.0, 77.0]);
        }

        test_dot_variants(backend) {
            let v = arr(vec![1.0, 2.0, 3.0]);
            let w = arr(vec![4.0, 5.0, 6.0]);
            let scalar = backend.dot(&v, &w).unwrap();
            assert_eq!(scalar.ndim(), 0);
            assert_eq!(scalar.get(&[]).unwrap(), 32.0);
            assert_eq!(backend.inner(&v, &w).unwrap(), 32.0);

            let m = mat(vec![1.0, 0.0, 0.0, 0.0, 2.0, 0.0], 2, 3);
            assert_eq!(backend.dot(&m, &v).unwrap().to_f64_vec(), vec![1.0, 4.0]);
        }

        test_outer(backend) {
            let out = backend.outer(&arr(vec![1.0, 2.0]), &arr(vec![3.0, 4.0, 5.0])).unwrap();
            assert_eq!(out.shape(), &[2, 3]);
            assert_eq!(out.to_f64_vec(), vec![3.0, 4.0, 5.0, 6.0, 8.0, 10.0]);
        }

        test_multi_dot(backend) {
            let a = mat(vec![1.0; 20], 2, 10);
            let b = mat(vec![1.0; 30], 10, 3);
            let c = mat(vec![1.0; 3], 3, 1);
            let out = backend.multi_dot(&[a, b, c]).unwrap();
            assert_eq!(out.shape(), &[2, 1]);
            assert_eq!(out.to_f64_vec(), vec![30.0, 30.0]);
        }

        // ============ transpose / trace ============

        test_transpose_view(backend) {
            let a = mat(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3);
            let t = backend.transpose(&a).unwrap();
            assert!(t.shares_buffer_with(&a));
            assert_eq!(t.shape(), &[3, 2]);
        }

        test_trace(backend) {
            let a = mat(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0], 3, 3);
            assert_eq!(backend.trace(&a).unwrap(), 15.0);
            assert_eq!(backend.trace(&mat(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3)).unwrap(), 6.0);
        }

        // ============ det / inv ============

        test_det(backend) {
            assert!(approx_eq(backend.det(&mat(vec![1.0, 2.0, 3.0, 4.0], 2, 2)).unwrap(), -2.0, DEFAULT_TOL));
            let m = mat(vec![6.0, 1.0, 1.0, 4.0, -2.0, 5.0, 2.0, 8.0, 7.0], 3, 3);
            assert!(approx_eq(backend.det(&m).unwrap(), -306.0, DEFAULT_TOL));
            assert_eq!(backend.det(&ArrayData::eye(3, DType::Float64)).unwrap(), 1.0);
        }

        test_det_unsupported_size(backend) {
            let m = ArrayData::eye(4, DType::Float64);
            assert!(matches!(backend.det(&m), Err(NumliteError::UnsupportedSize { op: "det", .. })));
        }

        test_inv_reproduces_identity(backend) {
            let m = mat(vec![2.0, -1.0, 0.0, -1.0, 2.0, -1.0, 0.0, -1.0, 2.0], 3, 3);
            let inv = backend.inv(&m).unwrap();
            assert_eq!(inv.dtype(), DType::Float64);
            let eye = product(backend, &m, &inv);
            assert!(arrays_approx_eq(&eye, &ArrayData::eye(3, DType::Float64), RELAXED_TOL));
        }

        test_inv_singular(backend) {
            let m = mat(vec![1.0, 2.0, 2.0, 4.0], 2, 2);
            assert_eq!(backend.inv(&m).unwrap_err(), NumliteError::SingularMatrix);
        }

        test_inv_nan_is_singular(backend) {
            let m = mat(vec![f64::NAN, 0.0, 0.0, 1.0], 2, 2);
            assert_eq!(backend.inv(&m).unwrap_err(), NumliteError::SingularMatrix);
            let m3 = mat(vec![1.0, 0.0, 0.0, 0.0, f64::NAN, 0.0, 0.0, 0.0, 1.0], 3, 3);
            assert_eq!(backend.inv(&m3).unwrap_err(), NumliteError::SingularMatrix);
        }

        test_non_square(backend) {
            let m = mat(vec![1.0; 6], 2, 3);
            assert!(matches!(backend.inv(&m), Err(NumliteError::ShapeMismatch { .. })));
            assert!(matches!(backend.det(&m), Err(NumliteError::ShapeMismatch { .. })));
            assert!(matches!(backend.cholesky(&m), Err(NumliteError::ShapeMismatch { .. })));
        }

        test_slogdet(backend) {
            let (sign, logdet) = backend.slogdet(&mat(vec![1.0, 2.0, 3.0, 4.0], 2, 2)).unwrap();
            assert_eq!(sign, -1.0);
            assert!(approx_eq(logdet, 2.0_f64.ln(), DEFAULT_TOL));

            let (sign, logdet) = backend.slogdet(&mat(vec![1.0, 2.0, 2.0, 4.0], 2, 2)).unwrap();
            assert_eq!(sign, 0.0);
            assert_eq!(logdet, f64::NEG_INFINITY);
        }

        // ============ factorizations ============

        test_qr_reconstructs(backend) {
            let m = mat(vec![12.0, -51.0, 4.0, 6.0, 167.0, -68.0, -4.0, 24.0, -41.0], 3, 3);
            let (q, r) = backend.qr(&m).unwrap();
            assert!(arrays_approx_eq(&product(backend, &q, &r), &m, RELAXED_TOL));
            let qtq = product(backend, &q.transposed(), &q);
            assert!(arrays_approx_eq(&qtq, &ArrayData::eye(3, DType::Float64), RELAXED_TOL));
            assert!(approx_eq(r.get(&[1, 0]).unwrap(), 0.0, DEFAULT_TOL));
        }

        test_cholesky_reconstructs(backend) {
            let m = mat(vec![4.0, 12.0, -16.0, 12.0, 37.0, -43.0, -16.0, -43.0, 98.0], 3, 3);
            let l = backend.cholesky(&m).unwrap();
            assert_eq!(l.to_f64_vec(), vec![2.0, 0.0, 0.0, 6.0, 1.0, 0.0, -8.0, 5.0, 3.0]);
            assert!(arrays_approx_eq(&product(backend, &l, &l.transposed()), &m, DEFAULT_TOL));
        }

        test_cholesky_not_positive_definite(backend) {
            let m = mat(vec![1.0, 2.0, 2.0, 1.0], 2, 2);
            assert_eq!(backend.cholesky(&m).unwrap_err(), NumliteError::NotPositiveDefinite);
        }

        test_eig_dominant(backend) {
            let m = mat(vec![2.0, 1.0, 1.0, 2.0], 2, 2);
            let (value, vector) = backend.eig(&m).unwrap();
            assert!(approx_eq(value, 3.0, RELAXED_TOL));
            let expected = 1.0 / 2.0_f64.sqrt();
            for x in vector.to_f64_vec() {
                assert!(approx_eq(x.abs(), expected, RELAXED_TOL));
            }
        }

        test_svd_2x2(backend) {
            let m = mat(vec![3.0, 0.0, 4.0, 5.0], 2, 2);
            let (u, s, vt) = backend.svd(&m).unwrap();
            let singular = s.to_f64_vec();
            assert!(singular[0] >= singular[1]);
            assert!(approx_eq(singular[0] * singular[1], 15.0, RELAXED_TOL));

            let sigma = mat(vec![singular[0], 0.0, 0.0, singular[1]], 2, 2);
            let rebuilt = product(backend, &product(backend, &u, &sigma), &vt);
            assert!(arrays_approx_eq(&rebuilt, &m, RELAXED_TOL));
            assert!(StatsOps::min(backend, &s).unwrap() >= 0.0);
        }
    }
}
