//! Full-buffer reductions
//!
//! Empty input is the caller's responsibility for the extrema; the
//! accelerated backend rejects it before calling in.

use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub fn sum(a: &[f64]) -> f64 {
    a.iter().sum()
}

#[wasm_bindgen]
pub fn prod(a: &[f64]) -> f64 {
    a.iter().product()
}

#[wasm_bindgen]
pub fn mean(a: &[f64]) -> f64 {
    if a.is_empty() {
        return f64::NAN;
    }
    sum(a) / a.len() as f64
}

/// Population variance.
#[wasm_bindgen]
pub fn variance(a: &[f64]) -> f64 {
    if a.is_empty() {
        return f64::NAN;
    }
    let m = mean(a);
    a.iter().map(|x| (x - m).powi(2)).sum::<f64>() / a.len() as f64
}

#[wasm_bindgen]
pub fn std(a: &[f64]) -> f64 {
    variance(a).sqrt()
}

/// Index of the first value beating all earlier ones; a NaN wins at once.
fn arg_extremum(a: &[f64], better: fn(f64, f64) -> bool) -> usize {
    let mut best = 0;
    for (i, &x) in a.iter().enumerate() {
        if x.is_nan() {
            return i;
        }
        if better(x, a[best]) {
            best = i;
        }
    }
    best
}

#[wasm_bindgen]
pub fn argmax(a: &[f64]) -> usize {
    arg_extremum(a, |x, best| x > best)
}

#[wasm_bindgen]
pub fn argmin(a: &[f64]) -> usize {
    arg_extremum(a, |x, best| x < best)
}

#[wasm_bindgen]
pub fn max(a: &[f64]) -> f64 {
    a.get(argmax(a)).copied().unwrap_or(f64::NAN)
}

#[wasm_bindgen]
pub fn min(a: &[f64]) -> f64 {
    a.get(argmin(a)).copied().unwrap_or(f64::NAN)
}
