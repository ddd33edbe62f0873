//! Iterative radix-2 FFT over interleaved `(re, im)` buffers

use std::f64::consts::PI;
use wasm_bindgen::prelude::*;

/// Forward DFT of `buf = [re0, im0, re1, im1, ...]`.
///
/// The number of complex points must be a power of two.
#[wasm_bindgen]
pub fn fft(buf: &[f64]) -> Vec<f64> {
    let n = buf.len() / 2;
    assert!(buf.len() % 2 == 0 && n.is_power_of_two(), "fft length must be a power of two");

    let mut re: Vec<f64> = buf.iter().step_by(2).copied().collect();
    let mut im: Vec<f64> = buf.iter().skip(1).step_by(2).copied().collect();

    let bits = n.trailing_zeros();
    for i in 0..n {
        let j = if bits == 0 { 0 } else { i.reverse_bits() >> (usize::BITS - bits) };
        if i < j {
            re.swap(i, j);
            im.swap(i, j);
        }
    }

    let mut len = 2;
    while len <= n {
        let half = len / 2;
        let angle = -2.0 * PI / len as f64;
        for start in (0..n).step_by(len) {
            for k in 0..half {
                let (sin, cos) = (angle * k as f64).sin_cos();
                let (a, b) = (start + k, start + k + half);
                let t_re = cos * re[b] - sin * im[b];
                let t_im = cos * im[b] + sin * re[b];
                re[b] = re[a] - t_re;
                im[b] = im[a] - t_im;
                re[a] += t_re;
                im[a] += t_im;
            }
        }
        len *= 2;
    }

    re.into_iter().zip(im).flat_map(|(r, i)| [r, i]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_four_points() {
        let out = fft(&[1.0, 0.0, 2.0, 0.0, 3.0, 0.0, 4.0, 0.0]);
        let expected = [10.0, 0.0, -2.0, 2.0, -2.0, 0.0, -2.0, -2.0];
        for (a, e) in out.iter().zip(expected.iter()) {
            assert!((a - e).abs() < 1e-12);
        }
    }

    #[test]
    fn test_impulse_is_flat() {
        let mut buf = vec![0.0; 16];
        buf[0] = 1.0;
        let out = fft(&buf);
        for k in 0..8 {
            assert!((out[2 * k] - 1.0).abs() < 1e-12);
            assert!(out[2 * k + 1].abs() < 1e-12);
        }
    }

    #[test]
    #[should_panic(expected = "power of two")]
    fn test_rejects_non_power_of_two() {
        fft(&[0.0; 12]);
    }
}
