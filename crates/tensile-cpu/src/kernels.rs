//! Broadcasting elementwise kernels
//!
//! Binary kernels broadcast their operands with NumPy rules using ndarray's
//! zero-cost views; nothing is allocated beyond the output. Undefined
//! dtype/op pairs (arithmetic on bool, ordering on complex, negating an
//! unsigned integer) are rejected with an opaque engine error the core
//! propagates unchanged.

use ndarray::{ArrayViewD, IxDyn, Zip};
use num_complex::Complex32;
use num_traits::One;
use tensile_core::{Dtype, Error, Result, ScalarValue};

use crate::dispatch::{dispatch_float, dispatch_numeric, dispatch_real, dispatch_signed};
use crate::tensor::CpuTensor;

pub(crate) fn engine_err(msg: impl Into<String>) -> Error {
    Error::Engine(msg.into())
}

/// Compute the broadcast shape of two input shapes.
///
/// Dimensions are compared from the right; each pair must be equal or one
/// of them 1. Incompatible shapes are a kernel-level rejection.
pub fn broadcast_shapes(shape_a: &[usize], shape_b: &[usize]) -> Result<Vec<usize>> {
    let ndim_out = shape_a.len().max(shape_b.len());
    let mut result = vec![0; ndim_out];

    for i in 0..ndim_out {
        let dim_a = if i < shape_a.len() {
            shape_a[shape_a.len() - 1 - i]
        } else {
            1
        };
        let dim_b = if i < shape_b.len() {
            shape_b[shape_b.len() - 1 - i]
        } else {
            1
        };

        if dim_a == dim_b || dim_a == 1 || dim_b == 1 {
            result[ndim_out - 1 - i] = dim_a.max(dim_b);
        } else {
            return Err(engine_err(format!(
                "cannot broadcast {shape_a:?} with {shape_b:?}"
            )));
        }
    }

    Ok(result)
}

fn binary_typed<T: bytemuck::Pod>(
    a: &CpuTensor,
    b: &CpuTensor,
    f: impl Fn(T, T) -> T,
) -> Result<CpuTensor> {
    let a_vals: Vec<T> = a.values();
    let b_vals: Vec<T> = b.values();
    let av = ArrayViewD::from_shape(IxDyn(a.shape()), &a_vals)
        .map_err(|e| engine_err(e.to_string()))?;
    let bv = ArrayViewD::from_shape(IxDyn(b.shape()), &b_vals)
        .map_err(|e| engine_err(e.to_string()))?;

    // Fast path: same shape, no broadcasting needed.
    if a.shape() == b.shape() {
        let out = Zip::from(&av).and(&bv).map_collect(|&x, &y| f(x, y));
        return CpuTensor::from_values(
            &out.into_raw_vec_and_offset().0,
            a.shape().to_vec(),
            a.dtype(),
        );
    }

    let out_shape = broadcast_shapes(a.shape(), b.shape())?;
    let dim = IxDyn(&out_shape);
    // The shapes were validated above; the views always broadcast.
    let av = av
        .broadcast(dim.clone())
        .ok_or_else(|| engine_err("broadcast failed"))?;
    let bv = bv
        .broadcast(dim)
        .ok_or_else(|| engine_err("broadcast failed"))?;
    let out = Zip::from(&av).and(&bv).map_collect(|&x, &y| f(x, y));
    CpuTensor::from_values(&out.into_raw_vec_and_offset().0, out_shape, a.dtype())
}

fn unary_typed<T: bytemuck::Pod>(a: &CpuTensor, f: impl Fn(T) -> T) -> Result<CpuTensor> {
    let out: Vec<T> = a.values().into_iter().map(f).collect();
    CpuTensor::from_values(&out, a.shape().to_vec(), a.dtype())
}

fn check_same_dtype(a: &CpuTensor, b: &CpuTensor) -> Result<()> {
    // Operand promotion is the caller's business; the kernel only works on
    // matching dtypes.
    if a.dtype() != b.dtype() {
        return Err(engine_err(format!(
            "kernel dtype mismatch: {} vs {}",
            a.dtype(),
            b.dtype()
        )));
    }
    Ok(())
}

pub fn add(a: &CpuTensor, b: &CpuTensor) -> Result<CpuTensor> {
    check_same_dtype(a, b)?;
    dispatch_numeric!(a.dtype(), T => binary_typed::<T>(a, b, |x, y| x + y),
        Err(engine_err(format!("add is undefined for {}", a.dtype()))))
}

pub fn multiply(a: &CpuTensor, b: &CpuTensor) -> Result<CpuTensor> {
    check_same_dtype(a, b)?;
    dispatch_numeric!(a.dtype(), T => binary_typed::<T>(a, b, |x, y| x * y),
        Err(engine_err(format!("multiply is undefined for {}", a.dtype()))))
}

pub fn minimum(a: &CpuTensor, b: &CpuTensor) -> Result<CpuTensor> {
    check_same_dtype(a, b)?;
    dispatch_real!(a.dtype(), T => binary_typed::<T>(a, b, |x, y| if y < x { y } else { x }),
        Err(engine_err(format!("minimum is undefined for {}", a.dtype()))))
}

pub fn maximum(a: &CpuTensor, b: &CpuTensor) -> Result<CpuTensor> {
    check_same_dtype(a, b)?;
    dispatch_real!(a.dtype(), T => binary_typed::<T>(a, b, |x, y| if y > x { y } else { x }),
        Err(engine_err(format!("maximum is undefined for {}", a.dtype()))))
}

pub fn negative(a: &CpuTensor) -> Result<CpuTensor> {
    dispatch_signed!(a.dtype(), T => unary_typed::<T>(a, |x| -x),
        Err(engine_err(format!("negative is undefined for {}", a.dtype()))))
}

pub fn reciprocal(a: &CpuTensor) -> Result<CpuTensor> {
    if a.dtype() == Dtype::Complex64 {
        return unary_typed::<Complex32>(a, |x| x.inv());
    }
    dispatch_float!(a.dtype(), T => unary_typed::<T>(a, |x| T::one() / x),
        Err(engine_err(format!("reciprocal is undefined for {}", a.dtype()))))
}

/// Value conversion to another dtype: one explicit cast step per element,
/// never a bit reinterpretation.
pub fn astype(a: &CpuTensor, dtype: Dtype) -> Result<CpuTensor> {
    if a.dtype() == dtype {
        return Ok(a.clone());
    }
    let mut bytes = Vec::with_capacity(a.size() * dtype.size_of());
    for value in scalar_values(a) {
        bytes.extend_from_slice(&value.cast(dtype)?.to_bytes());
    }
    CpuTensor::new(bytes, a.shape().to_vec(), dtype)
}

fn scalar_values(a: &CpuTensor) -> Vec<ScalarValue> {
    match a.dtype() {
        Dtype::Bool => a
            .values::<u8>()
            .into_iter()
            .map(|v| ScalarValue::Bool(v != 0))
            .collect(),
        Dtype::UInt8 => a.values::<u8>().into_iter().map(ScalarValue::UInt8).collect(),
        Dtype::UInt16 => a
            .values::<u16>()
            .into_iter()
            .map(ScalarValue::UInt16)
            .collect(),
        Dtype::UInt32 => a
            .values::<u32>()
            .into_iter()
            .map(ScalarValue::UInt32)
            .collect(),
        Dtype::UInt64 => a
            .values::<u64>()
            .into_iter()
            .map(ScalarValue::UInt64)
            .collect(),
        Dtype::Int8 => a.values::<i8>().into_iter().map(ScalarValue::Int8).collect(),
        Dtype::Int16 => a
            .values::<i16>()
            .into_iter()
            .map(ScalarValue::Int16)
            .collect(),
        Dtype::Int32 => a
            .values::<i32>()
            .into_iter()
            .map(ScalarValue::Int32)
            .collect(),
        Dtype::Int64 => a
            .values::<i64>()
            .into_iter()
            .map(ScalarValue::Int64)
            .collect(),
        Dtype::Float16 => a
            .values::<half::f16>()
            .into_iter()
            .map(ScalarValue::Float16)
            .collect(),
        Dtype::BFloat16 => a
            .values::<half::bf16>()
            .into_iter()
            .map(ScalarValue::BFloat16)
            .collect(),
        Dtype::Float32 => a
            .values::<f32>()
            .into_iter()
            .map(ScalarValue::Float32)
            .collect(),
        Dtype::Float64 => a
            .values::<f64>()
            .into_iter()
            .map(ScalarValue::Float64)
            .collect(),
        Dtype::Complex64 => a
            .values::<Complex32>()
            .into_iter()
            .map(ScalarValue::Complex64)
            .collect(),
    }
}
