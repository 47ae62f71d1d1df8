//! Bare scalars and the promotion rules that pair them with dtypes
//!
//! A bare literal has no dtype until it meets one: a suggestion, an explicit
//! construction request, or an array operand. The rules here decide which
//! dtype wins and what value comes out, and they never change precision or
//! reinterpret bits implicitly.

use half::{bf16, f16};
use num_complex::Complex32;

use crate::dtype::Dtype;
use crate::error::{Error, Result};

/// A bare numeric literal, before any dtype has been chosen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Complex(Complex32),
}

impl Scalar {
    /// The dtype this literal is natively expressed in.
    pub fn native_dtype(self) -> Dtype {
        match self {
            Scalar::Bool(_) => Dtype::Bool,
            Scalar::Int(_) => Dtype::Int64,
            Scalar::Float(_) => Dtype::Float64,
            Scalar::Complex(_) => Dtype::Complex64,
        }
    }

    /// Default dtype when nothing else constrains the literal.
    pub fn default_dtype(self) -> Dtype {
        match self {
            Scalar::Bool(_) => Dtype::Bool,
            Scalar::Int(_) => Dtype::Int32,
            Scalar::Float(_) => Dtype::Float32,
            Scalar::Complex(_) => Dtype::Complex64,
        }
    }

    /// Weak scalar typing: coerce this literal to the dtype of the array it
    /// is combined with. The array operand always wins, on either side.
    pub fn for_array(self, array_dtype: Dtype) -> Result<ScalarValue> {
        resolve_with_dtype(self, array_dtype)
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Bool(v)
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Scalar::Int(v as i64)
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Int(v)
    }
}

impl From<f32> for Scalar {
    fn from(v: f32) -> Self {
        Scalar::Float(v as f64)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Float(v)
    }
}

impl From<Complex32> for Scalar {
    fn from(v: Complex32) -> Self {
        Scalar::Complex(v)
    }
}

/// A scalar committed to a concrete dtype, one variant per kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScalarValue {
    Bool(bool),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float16(f16),
    BFloat16(bf16),
    Float32(f32),
    Float64(f64),
    Complex64(Complex32),
}

impl ScalarValue {
    pub fn dtype(self) -> Dtype {
        match self {
            ScalarValue::Bool(_) => Dtype::Bool,
            ScalarValue::UInt8(_) => Dtype::UInt8,
            ScalarValue::UInt16(_) => Dtype::UInt16,
            ScalarValue::UInt32(_) => Dtype::UInt32,
            ScalarValue::UInt64(_) => Dtype::UInt64,
            ScalarValue::Int8(_) => Dtype::Int8,
            ScalarValue::Int16(_) => Dtype::Int16,
            ScalarValue::Int32(_) => Dtype::Int32,
            ScalarValue::Int64(_) => Dtype::Int64,
            ScalarValue::Float16(_) => Dtype::Float16,
            ScalarValue::BFloat16(_) => Dtype::BFloat16,
            ScalarValue::Float32(_) => Dtype::Float32,
            ScalarValue::Float64(_) => Dtype::Float64,
            ScalarValue::Complex64(_) => Dtype::Complex64,
        }
    }

    /// Little-endian buffer image of the value, exactly
    /// `self.dtype().size_of()` bytes.
    pub fn to_bytes(self) -> Vec<u8> {
        match self {
            ScalarValue::Bool(v) => vec![v as u8],
            ScalarValue::UInt8(v) => v.to_le_bytes().to_vec(),
            ScalarValue::UInt16(v) => v.to_le_bytes().to_vec(),
            ScalarValue::UInt32(v) => v.to_le_bytes().to_vec(),
            ScalarValue::UInt64(v) => v.to_le_bytes().to_vec(),
            ScalarValue::Int8(v) => v.to_le_bytes().to_vec(),
            ScalarValue::Int16(v) => v.to_le_bytes().to_vec(),
            ScalarValue::Int32(v) => v.to_le_bytes().to_vec(),
            ScalarValue::Int64(v) => v.to_le_bytes().to_vec(),
            ScalarValue::Float16(v) => v.to_le_bytes().to_vec(),
            ScalarValue::BFloat16(v) => v.to_le_bytes().to_vec(),
            ScalarValue::Float32(v) => v.to_le_bytes().to_vec(),
            ScalarValue::Float64(v) => v.to_le_bytes().to_vec(),
            ScalarValue::Complex64(v) => {
                let mut bytes = v.re.to_le_bytes().to_vec();
                bytes.extend_from_slice(&v.im.to_le_bytes());
                bytes
            }
        }
    }

    /// One explicit value-cast step to another dtype.
    ///
    /// Integer and floating conversions change the value representation,
    /// never reinterpret bits. Pairings with no defined conversion
    /// (complex to real, numeric to bool) fail with
    /// [`Error::TypeMismatch`].
    pub fn cast(self, dtype: Dtype) -> Result<ScalarValue> {
        if self.dtype() == dtype {
            return Ok(self);
        }
        match self {
            ScalarValue::Bool(v) => from_i64(v as i64, dtype),
            ScalarValue::UInt8(v) => from_i64(v as i64, dtype),
            ScalarValue::UInt16(v) => from_i64(v as i64, dtype),
            ScalarValue::UInt32(v) => from_i64(v as i64, dtype),
            ScalarValue::UInt64(v) => from_i64(v as i64, dtype),
            ScalarValue::Int8(v) => from_i64(v as i64, dtype),
            ScalarValue::Int16(v) => from_i64(v as i64, dtype),
            ScalarValue::Int32(v) => from_i64(v as i64, dtype),
            ScalarValue::Int64(v) => from_i64(v, dtype),
            ScalarValue::Float16(v) => from_f64(v.to_f64(), dtype),
            ScalarValue::BFloat16(v) => from_f64(v.to_f64(), dtype),
            ScalarValue::Float32(v) => from_f64(v as f64, dtype),
            ScalarValue::Float64(v) => from_f64(v, dtype),
            ScalarValue::Complex64(_) => Err(Error::TypeMismatch {
                expected: dtype,
                got: Dtype::Complex64,
            }),
        }
    }
}

/// Resolve a bare literal against an optional dtype suggestion.
///
/// In order: a suggestion matching the literal's native kind is used
/// unchanged; bools stay `bool` no matter the suggestion; signed integers
/// default to `int32`, failing with [`Error::OutOfRangeLiteral`] instead of
/// silently widening; floats default to `float32` (16-bit, 64-bit and
/// brain-float outputs require the explicit path); complex defaults to
/// `complex64`.
pub fn resolve(scalar: Scalar, suggested: Option<Dtype>) -> Result<ScalarValue> {
    if suggested == Some(scalar.native_dtype()) {
        return resolve_with_dtype(scalar, scalar.native_dtype());
    }
    match scalar {
        Scalar::Bool(v) => Ok(ScalarValue::Bool(v)),
        Scalar::Int(v) => {
            let narrowed = i32::try_from(v).map_err(|_| Error::OutOfRangeLiteral(v))?;
            Ok(ScalarValue::Int32(narrowed))
        }
        Scalar::Float(v) => Ok(ScalarValue::Float32(v as f32)),
        Scalar::Complex(v) => Ok(ScalarValue::Complex64(v)),
    }
}

/// Commit a literal to an explicitly requested dtype.
///
/// This is the construction path: truthiness is reinterpreted as 1/0 under
/// the requested dtype, and int/float conversions go through exactly one
/// value-cast step. Pairings with no defined conversion fail with
/// [`Error::TypeMismatch`] rather than truncating silently.
pub fn resolve_with_dtype(scalar: Scalar, dtype: Dtype) -> Result<ScalarValue> {
    match scalar {
        Scalar::Bool(v) if dtype == Dtype::Bool => Ok(ScalarValue::Bool(v)),
        Scalar::Bool(v) => from_i64(v as i64, dtype),
        Scalar::Int(v) => from_i64(v, dtype),
        Scalar::Float(v) => from_f64(v, dtype),
        Scalar::Complex(v) if dtype == Dtype::Complex64 => Ok(ScalarValue::Complex64(v)),
        Scalar::Complex(_) => Err(Error::TypeMismatch {
            expected: dtype,
            got: Dtype::Complex64,
        }),
    }
}

fn from_i64(v: i64, dtype: Dtype) -> Result<ScalarValue> {
    match dtype {
        Dtype::UInt8 => Ok(ScalarValue::UInt8(v as u8)),
        Dtype::UInt16 => Ok(ScalarValue::UInt16(v as u16)),
        Dtype::UInt32 => Ok(ScalarValue::UInt32(v as u32)),
        Dtype::UInt64 => Ok(ScalarValue::UInt64(v as u64)),
        Dtype::Int8 => Ok(ScalarValue::Int8(v as i8)),
        Dtype::Int16 => Ok(ScalarValue::Int16(v as i16)),
        Dtype::Int32 => Ok(ScalarValue::Int32(v as i32)),
        Dtype::Int64 => Ok(ScalarValue::Int64(v)),
        Dtype::Float16 => Ok(ScalarValue::Float16(f16::from_f64(v as f64))),
        Dtype::BFloat16 => Ok(ScalarValue::BFloat16(bf16::from_f64(v as f64))),
        Dtype::Float32 => Ok(ScalarValue::Float32(v as f32)),
        Dtype::Float64 => Ok(ScalarValue::Float64(v as f64)),
        Dtype::Complex64 => Ok(ScalarValue::Complex64(Complex32::new(v as f32, 0.0))),
        Dtype::Bool => Err(Error::TypeMismatch {
            expected: Dtype::Bool,
            got: Dtype::Int64,
        }),
    }
}

fn from_f64(v: f64, dtype: Dtype) -> Result<ScalarValue> {
    match dtype {
        Dtype::UInt8 => Ok(ScalarValue::UInt8(v as u8)),
        Dtype::UInt16 => Ok(ScalarValue::UInt16(v as u16)),
        Dtype::UInt32 => Ok(ScalarValue::UInt32(v as u32)),
        Dtype::UInt64 => Ok(ScalarValue::UInt64(v as u64)),
        Dtype::Int8 => Ok(ScalarValue::Int8(v as i8)),
        Dtype::Int16 => Ok(ScalarValue::Int16(v as i16)),
        Dtype::Int32 => Ok(ScalarValue::Int32(v as i32)),
        Dtype::Int64 => Ok(ScalarValue::Int64(v as i64)),
        Dtype::Float16 => Ok(ScalarValue::Float16(f16::from_f64(v))),
        Dtype::BFloat16 => Ok(ScalarValue::BFloat16(bf16::from_f64(v))),
        Dtype::Float32 => Ok(ScalarValue::Float32(v as f32)),
        Dtype::Float64 => Ok(ScalarValue::Float64(v)),
        Dtype::Complex64 => Ok(ScalarValue::Complex64(Complex32::new(v as f32, 0.0))),
        Dtype::Bool => Err(Error::TypeMismatch {
            expected: Dtype::Bool,
            got: Dtype::Float64,
        }),
    }
}
