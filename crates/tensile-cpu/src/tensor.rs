//! Dtype-tagged byte buffers behind shared handles
//!
//! Storage is always materialized and contiguous; laziness is the real
//! engine's business, and forcing one of these handles is a no-op.

use std::sync::Arc;

use tensile_core::layout::element_count;
use tensile_core::{Dtype, Error, Result};

/// A materialized engine buffer. Cloning shares the storage.
#[derive(Debug, Clone)]
pub struct CpuTensor {
    storage: Arc<Storage>,
}

#[derive(Debug)]
struct Storage {
    bytes: Vec<u8>,
    dtype: Dtype,
    shape: Vec<usize>,
}

impl CpuTensor {
    pub fn new(bytes: Vec<u8>, shape: Vec<usize>, dtype: Dtype) -> Result<Self> {
        let expected = element_count(&shape);
        let got = bytes.len() / dtype.size_of();
        if bytes.len() != expected * dtype.size_of() {
            return Err(Error::ShapeMismatch {
                shape,
                expected,
                got,
            });
        }
        Ok(Self {
            storage: Arc::new(Storage {
                bytes,
                dtype,
                shape,
            }),
        })
    }

    pub fn dtype(&self) -> Dtype {
        self.storage.dtype
    }

    pub fn shape(&self) -> &[usize] {
        &self.storage.shape
    }

    pub fn size(&self) -> usize {
        element_count(&self.storage.shape)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.storage.bytes
    }

    /// Copy the buffer out as typed values. The copy also fixes up the
    /// alignment a raw byte buffer cannot guarantee.
    pub(crate) fn values<T: bytemuck::Pod>(&self) -> Vec<T> {
        bytemuck::pod_collect_to_vec(&self.storage.bytes)
    }

    pub(crate) fn from_values<T: bytemuck::Pod>(
        values: &[T],
        shape: Vec<usize>,
        dtype: Dtype,
    ) -> Result<Self> {
        Self::new(bytemuck::cast_slice(values).to_vec(), shape, dtype)
    }

    /// Read an index tensor as `i64`, whatever integer width it carries.
    pub(crate) fn index_values(&self) -> Result<Vec<i64>> {
        match self.dtype() {
            Dtype::Int32 => Ok(self.values::<i32>().into_iter().map(i64::from).collect()),
            Dtype::Int64 => Ok(self.values::<i64>()),
            Dtype::UInt32 => Ok(self.values::<u32>().into_iter().map(i64::from).collect()),
            other => Err(Error::Engine(format!(
                "index arrays must be integer, got {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_checks_length() {
        let result = CpuTensor::new(vec![0u8; 12], vec![2, 2], Dtype::Float32);
        assert!(matches!(result, Err(Error::ShapeMismatch { .. })));

        let ok = CpuTensor::new(vec![0u8; 16], vec![2, 2], Dtype::Float32).unwrap();
        assert_eq!(ok.size(), 4);
    }

    #[test]
    fn test_values_round_trip() {
        let t = CpuTensor::from_values(&[1.0f32, 2.0, 3.0], vec![3], Dtype::Float32).unwrap();
        assert_eq!(t.values::<f32>(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_index_values_widths() {
        let t = CpuTensor::from_values(&[0i32, 1, 0], vec![3], Dtype::Int32).unwrap();
        assert_eq!(t.index_values().unwrap(), vec![0, 1, 0]);

        let t = CpuTensor::from_values(&[1.0f32], vec![1], Dtype::Float32).unwrap();
        assert!(t.index_values().is_err());
    }
}
