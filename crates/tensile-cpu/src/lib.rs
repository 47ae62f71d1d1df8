//! CPU reference engine for tensile
//!
//! Implements the [`Engine`] seam over dtype-tagged byte buffers. Handles
//! are always materialized, so forcing is an idempotent no-op; everything
//! else is a small set of broadcasting elementwise kernels, scatter/gather
//! kernels, and the mutex-guarded device-limit store.

mod device;
mod dispatch;
mod index;
mod kernels;
mod scatter;
mod tensor;

pub use scatter::Reduce;
pub use tensor::CpuTensor;

use log::trace;
use tensile_core::layout::row_major_strides;
use tensile_core::{BufferView, Dtype, Engine, GatherPlan, IndexOp, Result, ScalarValue};

/// The reference engine. Stateless; all buffers live in their handles.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuEngine;

impl Engine for CpuEngine {
    type Handle = CpuTensor;

    fn from_bytes(&self, bytes: &[u8], shape: &[usize], dtype: Dtype) -> Result<CpuTensor> {
        CpuTensor::new(bytes.to_vec(), shape.to_vec(), dtype)
    }

    fn scalar(&self, value: ScalarValue) -> Result<CpuTensor> {
        CpuTensor::new(value.to_bytes(), Vec::new(), value.dtype())
    }

    fn dtype(&self, h: &CpuTensor) -> Dtype {
        h.dtype()
    }

    fn shape(&self, h: &CpuTensor) -> Vec<usize> {
        h.shape().to_vec()
    }

    fn force(&self, _h: &CpuTensor) -> Result<()> {
        // Storage is always materialized; forcing again changes nothing.
        trace!("force: no-op on the cpu engine");
        Ok(())
    }

    fn buffer<'a>(&self, h: &'a CpuTensor) -> Result<BufferView<'a>> {
        Ok(BufferView {
            bytes: h.bytes(),
            dtype: h.dtype(),
            shape: h.shape().to_vec(),
            strides: row_major_strides(h.shape()),
            offset: 0,
        })
    }

    fn add(&self, a: &CpuTensor, b: &CpuTensor) -> Result<CpuTensor> {
        kernels::add(a, b)
    }

    fn multiply(&self, a: &CpuTensor, b: &CpuTensor) -> Result<CpuTensor> {
        kernels::multiply(a, b)
    }

    fn minimum(&self, a: &CpuTensor, b: &CpuTensor) -> Result<CpuTensor> {
        kernels::minimum(a, b)
    }

    fn maximum(&self, a: &CpuTensor, b: &CpuTensor) -> Result<CpuTensor> {
        kernels::maximum(a, b)
    }

    fn negative(&self, a: &CpuTensor) -> Result<CpuTensor> {
        kernels::negative(a)
    }

    fn reciprocal(&self, a: &CpuTensor) -> Result<CpuTensor> {
        kernels::reciprocal(a)
    }

    fn astype(&self, a: &CpuTensor, dtype: Dtype) -> Result<CpuTensor> {
        kernels::astype(a, dtype)
    }

    fn take(&self, a: &CpuTensor, indices: &CpuTensor, axis: i32) -> Result<CpuTensor> {
        scatter::take(a, indices, axis)
    }

    fn scatter(
        &self,
        dst: &CpuTensor,
        indices: &[CpuTensor],
        updates: &CpuTensor,
        axes: &[i32],
    ) -> Result<CpuTensor> {
        scatter::scatter(dst, indices, updates, axes, Reduce::Replace)
    }

    fn scatter_add(
        &self,
        dst: &CpuTensor,
        indices: &[CpuTensor],
        updates: &CpuTensor,
        axes: &[i32],
    ) -> Result<CpuTensor> {
        scatter::scatter(dst, indices, updates, axes, Reduce::Add)
    }

    fn scatter_prod(
        &self,
        dst: &CpuTensor,
        indices: &[CpuTensor],
        updates: &CpuTensor,
        axes: &[i32],
    ) -> Result<CpuTensor> {
        scatter::scatter(dst, indices, updates, axes, Reduce::Prod)
    }

    fn scatter_min(
        &self,
        dst: &CpuTensor,
        indices: &[CpuTensor],
        updates: &CpuTensor,
        axes: &[i32],
    ) -> Result<CpuTensor> {
        scatter::scatter(dst, indices, updates, axes, Reduce::Min)
    }

    fn scatter_max(
        &self,
        dst: &CpuTensor,
        indices: &[CpuTensor],
        updates: &CpuTensor,
        axes: &[i32],
    ) -> Result<CpuTensor> {
        scatter::scatter(dst, indices, updates, axes, Reduce::Max)
    }

    fn slice(
        &self,
        a: &CpuTensor,
        starts: &[i64],
        stops: &[i64],
        strides: &[i64],
    ) -> Result<CpuTensor> {
        scatter::slice(a, starts, stops, strides)
    }

    fn slice_update(
        &self,
        dst: &CpuTensor,
        update: &CpuTensor,
        starts: &[i64],
        stops: &[i64],
        strides: &[i64],
    ) -> Result<CpuTensor> {
        scatter::slice_update(dst, update, starts, stops, strides)
    }

    fn resolve_index(
        &self,
        shape: &[usize],
        ops: &[IndexOp<CpuTensor>],
    ) -> Result<GatherPlan<CpuTensor>> {
        index::resolve(shape, ops)
    }

    fn memory_limit(&self) -> usize {
        device::memory_limit()
    }

    fn set_memory_limit(&self, limit: usize) -> usize {
        device::set_memory_limit(limit)
    }

    fn cache_limit(&self) -> usize {
        device::cache_limit()
    }

    fn set_cache_limit(&self, limit: usize) -> usize {
        device::set_cache_limit(limit)
    }
}
