//! Statistical operations for the reference backend

use crate::array::to_ndarray;
use crate::ReferenceBackend;
use ndarray::ArrayD;
use numlite_core::{ops::StatsOps, ArrayData, NumliteError, Result};

/// First index whose value beats every earlier one under `better`.
///
/// A NaN wins immediately, so NaN propagates through min/max like NumPy.
fn extremum(
    data: &ArrayD<f64>,
    name: &'static str,
    better: fn(f64, f64) -> bool,
) -> Result<(usize, f64)> {
    let mut values = data.iter().copied().enumerate();
    let mut best = values.next().ok_or(NumliteError::EmptyArray(name))?;
    if best.1.is_nan() {
        return Ok(best);
    }
    for (i, x) in values {
        if x.is_nan() {
            return Ok((i, x));
        }
        if better(x, best.1) {
            best = (i, x);
        }
    }
    Ok(best)
}

fn variance(data: &ArrayD<f64>) -> f64 {
    if data.is_empty() {
        return f64::NAN;
    }
    let n = data.len() as f64;
    let mean = data.sum() / n;
    data.mapv(|x| (x - mean).powi(2)).sum() / n
}

impl StatsOps for ReferenceBackend {
    fn sum(&self, arr: &ArrayData) -> Result<f64> {
        Ok(to_ndarray(arr)?.sum())
    }

    fn prod(&self, arr: &ArrayData) -> Result<f64> {
        Ok(to_ndarray(arr)?.product())
    }

    fn mean(&self, arr: &ArrayData) -> Result<f64> {
        let data = to_ndarray(arr)?;
        if data.is_empty() {
            return Ok(f64::NAN);
        }
        Ok(data.sum() / data.len() as f64)
    }

    fn var(&self, arr: &ArrayData) -> Result<f64> {
        Ok(variance(&to_ndarray(arr)?))
    }

    fn std(&self, arr: &ArrayData) -> Result<f64> {
        Ok(variance(&to_ndarray(arr)?).sqrt())
    }

    fn min(&self, arr: &ArrayData) -> Result<f64> {
        extremum(&to_ndarray(arr)?, "min", |x, best| x < best).map(|(_, v)| v)
    }

    fn max(&self, arr: &ArrayData) -> Result<f64> {
        extremum(&to_ndarray(arr)?, "max", |x, best| x > best).map(|(_, v)| v)
    }

    fn argmin(&self, arr: &ArrayData) -> Result<usize> {
        extremum(&to_ndarray(arr)?, "argmin", |x, best| x < best).map(|(i, _)| i)
    }

    fn argmax(&self, arr: &ArrayData) -> Result<usize> {
        extremum(&to_ndarray(arr)?, "argmax", |x, best| x > best).map(|(i, _)| i)
    }
}
