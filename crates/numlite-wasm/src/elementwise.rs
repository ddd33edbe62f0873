//! Elementwise kernels

use wasm_bindgen::prelude::*;

macro_rules! binary_kernels {
    ($($arrays:ident / $arrays_js:ident, $scalar:ident / $scalar_js:ident => |$x:ident, $y:ident| $body:expr;)*) => {
        $(
            #[wasm_bindgen(js_name = $arrays_js)]
            pub fn $arrays(a: &[f64], b: &[f64]) -> Vec<f64> {
                assert_eq!(a.len(), b.len(), "operands must be broadcast to the same length");
                a.iter().zip(b.iter()).map(|(&$x, &$y)| $body).collect()
            }

            #[wasm_bindgen(js_name = $scalar_js)]
            pub fn $scalar(a: &[f64], scalar: f64) -> Vec<f64> {
                let $y = scalar;
                a.iter().map(|&$x| $body).collect()
            }
        )*
    };
}

binary_kernels! {
    add_arrays / addArrays, add_scalar / addScalar => |x, y| x + y;
    sub_arrays / subArrays, sub_scalar / subScalar => |x, y| x - y;
    mul_arrays / mulArrays, mul_scalar / mulScalar => |x, y| x * y;
    div_arrays / divArrays, div_scalar / divScalar => |x, y| x / y;
    pow_arrays / powArrays, pow_scalar / powScalar => |x, y| x.powf(y);
    maximum_arrays / maximumArrays, maximum_scalar / maximumScalar => |x, y| x.max(y);
    minimum_arrays / minimumArrays, minimum_scalar / minimumScalar => |x, y| x.min(y);
}

// Exported as `<name>_array` so the symbols never collide with libm's.
macro_rules! unary_kernels {
    ($($name:ident / $js:ident => |$x:ident| $body:expr;)*) => {
        $(
            #[wasm_bindgen(js_name = $js)]
            pub fn $name(a: &[f64]) -> Vec<f64> {
                a.iter().map(|&$x| $body).collect()
            }
        )*
    };
}

unary_kernels! {
    sin_array / sinArray => |x| x.sin();
    cos_array / cosArray => |x| x.cos();
    tan_array / tanArray => |x| x.tan();
    arcsin_array / arcsinArray => |x| x.asin();
    arccos_array / arccosArray => |x| x.acos();
    arctan_array / arctanArray => |x| x.atan();
    sinh_array / sinhArray => |x| x.sinh();
    cosh_array / coshArray => |x| x.cosh();
    tanh_array / tanhArray => |x| x.tanh();
    arcsinh_array / arcsinhArray => |x| x.asinh();
    arccosh_array / arccoshArray => |x| x.acosh();
    arctanh_array / arctanhArray => |x| x.atanh();
    exp_array / expArray => |x| x.exp();
    exp2_array / exp2Array => |x| x.exp2();
    expm1_array / expm1Array => |x| x.exp_m1();
    log_array / logArray => |x| x.ln();
    log2_array / log2Array => |x| x.log2();
    log10_array / log10Array => |x| x.log10();
    log1p_array / log1pArray => |x| x.ln_1p();
    sqrt_array / sqrtArray => |x| x.sqrt();
    cbrt_array / cbrtArray => |x| x.cbrt();
    square_array / squareArray => |x| x * x;
    abs_array / absArray => |x| x.abs();
    sign_array / signArray => |x| if x > 0.0 { 1.0 } else if x < 0.0 { -1.0 } else { 0.0 };
    neg_array / negArray => |x| -x;
    reciprocal_array / reciprocalArray => |x| 1.0 / x;
    floor_array / floorArray => |x| x.floor();
    ceil_array / ceilArray => |x| x.ceil();
    round_array / roundArray => |x| x.round();
    trunc_array / truncArray => |x| x.trunc();
}

/// Clamp into `[min, max]`; `min > max` yields `max`.
#[wasm_bindgen]
pub fn clip(a: &[f64], min: f64, max: f64) -> Vec<f64> {
    a.iter().map(|&x| x.max(min).min(max)).collect()
}
