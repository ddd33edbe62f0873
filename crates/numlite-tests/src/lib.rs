//! Shared test suite for numlite backends
//!
//! The tests here run unchanged against every backend variant, so any
//! divergence between the reference and accelerated backends shows up as a
//! failure in exactly one of the two generated modules.

pub mod agreement;
pub mod broadcast;
pub mod creation;
pub mod fft;
pub mod linalg;
pub mod manager;
pub mod math;
pub mod stats;


/// Generate each test once per backend variant.
///
/// Inside the body `$backend` is a `&dyn Backend`. The invocation site must
/// import the operation traits it calls.
#[macro_export]
macro_rules! backend_tests {
    ($($test_name:ident($backend:ident) $body:block)*) => {
        mod reference {
            use super::*;
            $(
                #[test]
                fn $test_name() {
                    let owned = $crate::utils::reference();
                    let $backend: &dyn numlite_core::Backend = &owned;
                    $body
                }
            )*
        }

        mod accelerated {
            use super::*;
            $(
                #[test]
                fn $test_name() {
                    $crate::utils::init_logger();
                    let owned = $crate::utils::accelerated().unwrap();
                    let $backend: &dyn numlite_core::Backend = &owned;
                    $body
                }
            )*
        }
    };
}
