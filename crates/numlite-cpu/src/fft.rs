//! Recursive radix-2 Cooley-Tukey transform

use crate::ReferenceBackend;
use numlite_core::fft::check_length;
use numlite_core::ops::FftOps;
use numlite_core::{NumliteError, Result};
use std::f64::consts::PI;

/// Forward DFT of `(re, im)` in place.
///
/// The length must be a non-zero power of two.
pub fn fft_in_place(re: &mut [f64], im: &mut [f64]) -> Result<()> {
    if re.len() != im.len() {
        return Err(NumliteError::InvalidArgument(format!(
            "real and imaginary parts differ in length: {} vs {}",
            re.len(),
            im.len()
        )));
    }
    check_length(re.len())?;
    cooley_tukey(re, im);
    Ok(())
}

fn cooley_tukey(re: &mut [f64], im: &mut [f64]) {
    let n = re.len();
    if n <= 1 {
        return;
    }
    let half = n / 2;

    let mut even_re: Vec<f64> = re.iter().step_by(2).copied().collect();
    let mut even_im: Vec<f64> = im.iter().step_by(2).copied().collect();
    let mut odd_re: Vec<f64> = re.iter().skip(1).step_by(2).copied().collect();
    let mut odd_im: Vec<f64> = im.iter().skip(1).step_by(2).copied().collect();

    cooley_tukey(&mut even_re, &mut even_im);
    cooley_tukey(&mut odd_re, &mut odd_im);

    for k in 0..half {
        let (sin, cos) = (-2.0 * PI * k as f64 / n as f64).sin_cos();
        let t_re = cos * odd_re[k] - sin * odd_im[k];
        let t_im = cos * odd_im[k] + sin * odd_re[k];

        re[k] = even_re[k] + t_re;
        im[k] = even_im[k] + t_im;
        re[k + half] = even_re[k] - t_re;
        im[k + half] = even_im[k] - t_im;
    }
}

impl FftOps for ReferenceBackend {
    fn fft_kernel(&self, re: &mut [f64], im: &mut [f64]) -> Result<()> {
        fft_in_place(re, im)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use numlite_core::ArrayData;

    const B: ReferenceBackend = ReferenceBackend;

    fn naive_dft(re: &[f64], im: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let n = re.len();
        let mut out_re = vec![0.0; n];
        let mut out_im = vec![0.0; n];
        for k in 0..n {
            for t in 0..n {
                let (sin, cos) = (-2.0 * PI * (k * t) as f64 / n as f64).sin_cos();
                out_re[k] += re[t] * cos - im[t] * sin;
                out_im[k] += re[t] * sin + im[t] * cos;
            }
        }
        (out_re, out_im)
    }

    #[test]
    fn test_four_point_transform() {
        let mut re = vec![1.0, 2.0, 3.0, 4.0];
        let mut im = vec![0.0; 4];
        fft_in_place(&mut re, &mut im).unwrap();
        let expected_re = [10.0, -2.0, -2.0, -2.0];
        let expected_im = [0.0, 2.0, 0.0, -2.0];
        for k in 0..4 {
            assert!((re[k] - expected_re[k]).abs() < 1e-12);
            assert!((im[k] - expected_im[k]).abs() < 1e-12);
        }
    }

    #[test]
    fn test_matches_naive_dft() {
        let re: Vec<f64> = (0..16).map(|i| ((i * 7) % 5) as f64 - 1.5).collect();
        let im: Vec<f64> = (0..16).map(|i| (i as f64 * 0.3).sin()).collect();
        let (expected_re, expected_im) = naive_dft(&re, &im);

        let (mut out_re, mut out_im) = (re.clone(), im.clone());
        fft_in_place(&mut out_re, &mut out_im).unwrap();
        for k in 0..16 {
            assert!((out_re[k] - expected_re[k]).abs() < 1e-9);
            assert!((out_im[k] - expected_im[k]).abs() < 1e-9);
        }
    }

    #[test]
    fn test_single_element_unchanged() {
        let mut re = vec![3.5];
        let mut im = vec![-1.0];
        fft_in_place(&mut re, &mut im).unwrap();
        assert_eq!((re[0], im[0]), (3.5, -1.0));
    }

    #[test]
    fn test_rejects_bad_lengths() {
        let mut re = vec![0.0; 6];
        let mut im = vec![0.0; 6];
        assert_eq!(fft_in_place(&mut re, &mut im), Err(NumliteError::InvalidLength(6)));
        assert_eq!(fft_in_place(&mut [], &mut []), Err(NumliteError::InvalidLength(0)));
    }

    #[test]
    fn test_backend_round_trip() {
        let x = ArrayData::from_slice(&[0.5, -1.0, 2.0, 3.0, 0.0, 1.0, -2.0, 4.0]);
        let spectrum = B.fft(&x).unwrap();
        assert_eq!(spectrum.shape(), &[8, 2]);
        let back = B.ifft(&spectrum).unwrap().to_f64_vec();
        for (i, v) in x.to_f64_vec().iter().enumerate() {
            assert!((back[2 * i] - v).abs() < 1e-10);
            assert!(back[2 * i + 1].abs() < 1e-10);
        }
    }
}
