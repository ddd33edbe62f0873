//! Data types supported by numlite

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::NumliteError;

/// Supported element kinds.
///
/// The set and the string names are a stable external contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DType {
    Float64,
    Float32,
    Int32,
    Int16,
    Int8,
    UInt32,
    UInt16,
    UInt8,
}

impl DType {
    pub const ALL: [DType; 8] = [
        DType::Float64,
        DType::Float32,
        DType::Int32,
        DType::Int16,
        DType::Int8,
        DType::UInt32,
        DType::UInt16,
        DType::UInt8,
    ];

    /// Size in bytes
    pub fn size(&self) -> usize {
        match self {
            DType::Int8 | DType::UInt8 => 1,
            DType::Int16 | DType::UInt16 => 2,
            DType::Float32 | DType::Int32 | DType::UInt32 => 4,
            DType::Float64 => 8,
        }
    }

    /// String representation (NumPy compatible)
    pub fn as_str(&self) -> &'static str {
        match self {
            DType::Float64 => "float64",
            DType::Float32 => "float32",
            DType::Int32 => "int32",
            DType::Int16 => "int16",
            DType::Int8 => "int8",
            DType::UInt32 => "uint32",
            DType::UInt16 => "uint16",
            DType::UInt8 => "uint8",
        }
    }

    pub fn is_float(&self) -> bool {
        matches!(self, DType::Float64 | DType::Float32)
    }

    pub fn is_integer(&self) -> bool {
        !self.is_float()
    }

    pub fn is_signed(&self) -> bool {
        !matches!(self, DType::UInt32 | DType::UInt16 | DType::UInt8)
    }
}

impl std::fmt::Display for DType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Default for DType {
    fn default() -> Self {
        DType::Float64
    }
}

impl FromStr for DType {
    type Err = NumliteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DType::ALL
            .iter()
            .copied()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| NumliteError::InvalidArgument(format!("unknown dtype '{}'", s)))
    }
}

mod sealed {
    pub trait Sealed {}
}

/// A Rust scalar type that maps onto one [`DType`].
pub trait Element: Copy + Send + Sync + 'static + sealed::Sealed {
    const DTYPE: DType;

    fn to_f64(self) -> f64;

    /// Convert from `f64`. Integer kinds saturate and map NaN to zero.
    fn from_f64(value: f64) -> Self;

    fn into_buffer(data: Vec<Self>) -> Buffer;
}

macro_rules! impl_element {
    ($ty:ty, $dtype:ident) => {
        impl sealed::Sealed for $ty {}

        impl Element for $ty {
            const DTYPE: DType = DType::$dtype;

            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline]
            fn from_f64(value: f64) -> Self {
                value as $ty
            }

            fn into_buffer(data: Vec<Self>) -> Buffer {
                Buffer::$dtype(data)
            }
        }
    };
}

impl_element!(f64, Float64);
impl_element!(f32, Float32);
impl_element!(i32, Int32);
impl_element!(i16, Int16);
impl_element!(i8, Int8);
impl_element!(u32, UInt32);
impl_element!(u16, UInt16);
impl_element!(u8, UInt8);

/// Flat, homogeneously typed element storage.
#[derive(Debug, Clone, PartialEq)]
pub enum Buffer {
    Float64(Vec<f64>),
    Float32(Vec<f32>),
    Int32(Vec<i32>),
    Int16(Vec<i16>),
    Int8(Vec<i8>),
    UInt32(Vec<u32>),
    UInt16(Vec<u16>),
    UInt8(Vec<u8>),
}

macro_rules! with_buffer {
    ($buf:expr, $v:ident => $body:expr) => {
        match $buf {
            Buffer::Float64($v) => $body,
            Buffer::Float32($v) => $body,
            Buffer::Int32($v) => $body,
            Buffer::Int16($v) => $body,
            Buffer::Int8($v) => $body,
            Buffer::UInt32($v) => $body,
            Buffer::UInt16($v) => $body,
            Buffer::UInt8($v) => $body,
        }
    };
}

impl Buffer {
    pub fn dtype(&self) -> DType {
        match self {
            Buffer::Float64(_) => DType::Float64,
            Buffer::Float32(_) => DType::Float32,
            Buffer::Int32(_) => DType::Int32,
            Buffer::Int16(_) => DType::Int16,
            Buffer::Int8(_) => DType::Int8,
            Buffer::UInt32(_) => DType::UInt32,
            Buffer::UInt16(_) => DType::UInt16,
            Buffer::UInt8(_) => DType::UInt8,
        }
    }

    pub fn len(&self) -> usize {
        with_buffer!(self, v => v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read one element widened to `f64`, or `None` past the end.
    #[inline]
    pub fn get_f64(&self, index: usize) -> Option<f64> {
        with_buffer!(self, v => v.get(index).map(|x| x.to_f64()))
    }

    /// Build a buffer of `dtype` by casting each value.
    pub fn from_f64(data: &[f64], dtype: DType) -> Self {
        match dtype {
            DType::Float64 => Buffer::Float64(data.to_vec()),
            DType::Float32 => Buffer::Float32(cast_vec(data)),
            DType::Int32 => Buffer::Int32(cast_vec(data)),
            DType::Int16 => Buffer::Int16(cast_vec(data)),
            DType::Int8 => Buffer::Int8(cast_vec(data)),
            DType::UInt32 => Buffer::UInt32(cast_vec(data)),
            DType::UInt16 => Buffer::UInt16(cast_vec(data)),
            DType::UInt8 => Buffer::UInt8(cast_vec(data)),
        }
    }

    pub fn zeros(len: usize, dtype: DType) -> Self {
        Self::from_f64(&vec![0.0; len], dtype)
    }

    pub fn to_f64_vec(&self) -> Vec<f64> {
        with_buffer!(self, v => v.iter().map(|x| x.to_f64()).collect())
    }

    /// Borrow the storage as `f64` when that is its native kind.
    pub fn as_f64_slice(&self) -> Option<&[f64]> {
        match self {
            Buffer::Float64(v) => Some(v),
            _ => None,
        }
    }
}

fn cast_vec<T: Element>(data: &[f64]) -> Vec<T> {
    data.iter().map(|&x| T::from_f64(x)).collect()
}
