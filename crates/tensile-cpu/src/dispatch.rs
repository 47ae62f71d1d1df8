//! Enum dispatch from a runtime dtype to a concrete element type
//!
//! Each macro covers the dtypes for which the generated body can compile:
//! arithmetic needs `Add`/`Mul`, ordering needs `PartialOrd`, negation needs
//! `Neg`. Anything outside the covered set falls through to the caller's
//! rejection arm.

/// Integers, floats and complex64.
macro_rules! dispatch_numeric {
    ($dtype:expr, $ty:ident => $body:expr, $otherwise:expr) => {
        match $dtype {
            tensile_core::Dtype::UInt8 => {
                type $ty = u8;
                $body
            }
            tensile_core::Dtype::UInt16 => {
                type $ty = u16;
                $body
            }
            tensile_core::Dtype::UInt32 => {
                type $ty = u32;
                $body
            }
            tensile_core::Dtype::UInt64 => {
                type $ty = u64;
                $body
            }
            tensile_core::Dtype::Int8 => {
                type $ty = i8;
                $body
            }
            tensile_core::Dtype::Int16 => {
                type $ty = i16;
                $body
            }
            tensile_core::Dtype::Int32 => {
                type $ty = i32;
                $body
            }
            tensile_core::Dtype::Int64 => {
                type $ty = i64;
                $body
            }
            tensile_core::Dtype::Float16 => {
                type $ty = half::f16;
                $body
            }
            tensile_core::Dtype::BFloat16 => {
                type $ty = half::bf16;
                $body
            }
            tensile_core::Dtype::Float32 => {
                type $ty = f32;
                $body
            }
            tensile_core::Dtype::Float64 => {
                type $ty = f64;
                $body
            }
            tensile_core::Dtype::Complex64 => {
                type $ty = num_complex::Complex32;
                $body
            }
            _ => $otherwise,
        }
    };
}

/// Integers and floats: the kinds with a total element order.
macro_rules! dispatch_real {
    ($dtype:expr, $ty:ident => $body:expr, $otherwise:expr) => {
        match $dtype {
            tensile_core::Dtype::UInt8 => {
                type $ty = u8;
                $body
            }
            tensile_core::Dtype::UInt16 => {
                type $ty = u16;
                $body
            }
            tensile_core::Dtype::UInt32 => {
                type $ty = u32;
                $body
            }
            tensile_core::Dtype::UInt64 => {
                type $ty = u64;
                $body
            }
            tensile_core::Dtype::Int8 => {
                type $ty = i8;
                $body
            }
            tensile_core::Dtype::Int16 => {
                type $ty = i16;
                $body
            }
            tensile_core::Dtype::Int32 => {
                type $ty = i32;
                $body
            }
            tensile_core::Dtype::Int64 => {
                type $ty = i64;
                $body
            }
            tensile_core::Dtype::Float16 => {
                type $ty = half::f16;
                $body
            }
            tensile_core::Dtype::BFloat16 => {
                type $ty = half::bf16;
                $body
            }
            tensile_core::Dtype::Float32 => {
                type $ty = f32;
                $body
            }
            tensile_core::Dtype::Float64 => {
                type $ty = f64;
                $body
            }
            _ => $otherwise,
        }
    };
}

/// Signed integers, floats and complex64: the kinds that can negate.
macro_rules! dispatch_signed {
    ($dtype:expr, $ty:ident => $body:expr, $otherwise:expr) => {
        match $dtype {
            tensile_core::Dtype::Int8 => {
                type $ty = i8;
                $body
            }
            tensile_core::Dtype::Int16 => {
                type $ty = i16;
                $body
            }
            tensile_core::Dtype::Int32 => {
                type $ty = i32;
                $body
            }
            tensile_core::Dtype::Int64 => {
                type $ty = i64;
                $body
            }
            tensile_core::Dtype::Float16 => {
                type $ty = half::f16;
                $body
            }
            tensile_core::Dtype::BFloat16 => {
                type $ty = half::bf16;
                $body
            }
            tensile_core::Dtype::Float32 => {
                type $ty = f32;
                $body
            }
            tensile_core::Dtype::Float64 => {
                type $ty = f64;
                $body
            }
            tensile_core::Dtype::Complex64 => {
                type $ty = num_complex::Complex32;
                $body
            }
            _ => $otherwise,
        }
    };
}

/// The real floating kinds only.
macro_rules! dispatch_float {
    ($dtype:expr, $ty:ident => $body:expr, $otherwise:expr) => {
        match $dtype {
            tensile_core::Dtype::Float16 => {
                type $ty = half::f16;
                $body
            }
            tensile_core::Dtype::BFloat16 => {
                type $ty = half::bf16;
                $body
            }
            tensile_core::Dtype::Float32 => {
                type $ty = f32;
                $body
            }
            tensile_core::Dtype::Float64 => {
                type $ty = f64;
                $body
            }
            _ => $otherwise,
        }
    };
}

/// Every dtype, including bool (as its `u8` storage form).
macro_rules! dispatch_all {
    ($dtype:expr, $ty:ident => $body:expr) => {
        match $dtype {
            tensile_core::Dtype::Bool => {
                type $ty = u8;
                $body
            }
            other => dispatch_numeric!(other, $ty => $body, unreachable!("all dtypes covered")),
        }
    };
}

pub(crate) use {dispatch_all, dispatch_float, dispatch_numeric, dispatch_real, dispatch_signed};
