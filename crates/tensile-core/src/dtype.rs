//! Element types supported by tensile
//!
//! The set of dtypes is closed: every buffer the engine hands back is tagged
//! with one of these kinds and a fixed byte size.

use half::{bf16, f16};
use num_complex::Complex32;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Supported element types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dtype {
    Bool,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Int8,
    Int16,
    Int32,
    Int64,
    Float16,
    BFloat16,
    Float32,
    Float64,
    Complex64,
}

impl Dtype {
    /// Size in bytes of a single element
    pub fn size_of(self) -> usize {
        match self {
            Dtype::Bool | Dtype::UInt8 | Dtype::Int8 => 1,
            Dtype::UInt16 | Dtype::Int16 | Dtype::Float16 | Dtype::BFloat16 => 2,
            Dtype::UInt32 | Dtype::Int32 | Dtype::Float32 => 4,
            Dtype::UInt64 | Dtype::Int64 | Dtype::Float64 | Dtype::Complex64 => 8,
        }
    }

    /// True for the real floating-point kinds. `Complex64` is not one of
    /// them; complex is its own classification.
    pub fn is_floating_point(self) -> bool {
        matches!(
            self,
            Dtype::Float16 | Dtype::BFloat16 | Dtype::Float32 | Dtype::Float64
        )
    }

    /// True for the signed and unsigned integer kinds. `Bool` is not an
    /// integer.
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            Dtype::UInt8
                | Dtype::UInt16
                | Dtype::UInt32
                | Dtype::UInt64
                | Dtype::Int8
                | Dtype::Int16
                | Dtype::Int32
                | Dtype::Int64
        )
    }

    pub fn is_signed_integer(self) -> bool {
        matches!(
            self,
            Dtype::Int8 | Dtype::Int16 | Dtype::Int32 | Dtype::Int64
        )
    }

    pub fn is_complex(self) -> bool {
        matches!(self, Dtype::Complex64)
    }

    /// String representation (NumPy compatible)
    pub fn as_str(self) -> &'static str {
        match self {
            Dtype::Bool => "bool",
            Dtype::UInt8 => "uint8",
            Dtype::UInt16 => "uint16",
            Dtype::UInt32 => "uint32",
            Dtype::UInt64 => "uint64",
            Dtype::Int8 => "int8",
            Dtype::Int16 => "int16",
            Dtype::Int32 => "int32",
            Dtype::Int64 => "int64",
            Dtype::Float16 => "float16",
            Dtype::BFloat16 => "bfloat16",
            Dtype::Float32 => "float32",
            Dtype::Float64 => "float64",
            Dtype::Complex64 => "complex64",
        }
    }

    /// Numeric limits of a floating kind.
    ///
    /// Fails with [`Error::UnsupportedDtype`] for every other kind; asking
    /// for integer limits through this query is a programmer error.
    pub fn limits(self) -> Result<FloatLimits> {
        match self {
            Dtype::Float16 => Ok(FloatLimits {
                eps: f16::EPSILON.to_f64(),
                min: f16::MIN.to_f64(),
                max: f16::MAX.to_f64(),
                smallest_normal: f16::MIN_POSITIVE.to_f64(),
                smallest_subnormal: f16::from_bits(1).to_f64(),
            }),
            Dtype::BFloat16 => Ok(FloatLimits {
                eps: bf16::EPSILON.to_f64(),
                min: bf16::MIN.to_f64(),
                max: bf16::MAX.to_f64(),
                smallest_normal: bf16::MIN_POSITIVE.to_f64(),
                smallest_subnormal: bf16::from_bits(1).to_f64(),
            }),
            Dtype::Float32 => Ok(FloatLimits {
                eps: f32::EPSILON as f64,
                min: f32::MIN as f64,
                max: f32::MAX as f64,
                smallest_normal: f32::MIN_POSITIVE as f64,
                smallest_subnormal: f32::from_bits(1) as f64,
            }),
            Dtype::Float64 => Ok(FloatLimits {
                eps: f64::EPSILON,
                min: f64::MIN,
                max: f64::MAX,
                smallest_normal: f64::MIN_POSITIVE,
                smallest_subnormal: f64::from_bits(1),
            }),
            other => Err(Error::UnsupportedDtype(other)),
        }
    }
}

impl std::fmt::Display for Dtype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Default for Dtype {
    fn default() -> Self {
        Dtype::Float32
    }
}

/// Numeric limits of a floating-point dtype, widened to `f64`.
///
/// The half-width constants are derived from the `half` crate's bit formats
/// (`from_bits(1)` for the smallest subnormal), not transcribed literals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatLimits {
    pub eps: f64,
    pub min: f64,
    pub max: f64,
    pub smallest_normal: f64,
    pub smallest_subnormal: f64,
}

/// Maps a Rust element type to its [`Dtype`] and buffer representation.
///
/// `Repr` is the byte-compatible form stored in buffers. It is the type
/// itself for everything but `bool`, which is stored as a `u8` because its
/// bit patterns are not freely reinterpretable.
pub trait Element: Copy + 'static {
    const DTYPE: Dtype;
    type Repr: bytemuck::Pod;

    fn to_repr(self) -> Self::Repr;
    fn from_repr(repr: Self::Repr) -> Self;
}

macro_rules! element_identity {
    ($($ty:ty => $dtype:expr),* $(,)?) => {
        $(
            impl Element for $ty {
                const DTYPE: Dtype = $dtype;
                type Repr = $ty;

                fn to_repr(self) -> $ty {
                    self
                }

                fn from_repr(repr: $ty) -> $ty {
                    repr
                }
            }
        )*
    };
}

element_identity! {
    u8 => Dtype::UInt8,
    u16 => Dtype::UInt16,
    u32 => Dtype::UInt32,
    u64 => Dtype::UInt64,
    i8 => Dtype::Int8,
    i16 => Dtype::Int16,
    i32 => Dtype::Int32,
    i64 => Dtype::Int64,
    f16 => Dtype::Float16,
    bf16 => Dtype::BFloat16,
    f32 => Dtype::Float32,
    f64 => Dtype::Float64,
    Complex32 => Dtype::Complex64,
}

impl Element for bool {
    const DTYPE: Dtype = Dtype::Bool;
    type Repr = u8;

    fn to_repr(self) -> u8 {
        self as u8
    }

    fn from_repr(repr: u8) -> bool {
        repr != 0
    }
}
