//! Scatter, gather and slice kernels
//!
//! Scatter walks its index vectors occurrence by occurrence, so the
//! accumulating variants apply every duplicate and plain scatter resolves
//! duplicates last-write-wins. Updates may be a single value, one value per
//! occurrence, one slab shared by all occurrences, or a full slab per
//! occurrence.

use tensile_core::layout::row_major_strides;
use tensile_core::{Result, StridedView};

use crate::dispatch::{dispatch_all, dispatch_numeric, dispatch_real};
use crate::kernels::engine_err;
use crate::tensor::CpuTensor;

/// How a scatter combines an incoming value with the stored one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduce {
    Replace,
    Add,
    Prod,
    Min,
    Max,
}

fn normalize_axis(axis: i32, rank: usize) -> Result<usize> {
    let axis = if axis < 0 { axis + rank as i32 } else { axis };
    if axis < 0 || axis as usize >= rank {
        return Err(engine_err(format!("axis {axis} out of range for rank {rank}")));
    }
    Ok(axis as usize)
}

fn normalize_index(index: i64, dim: usize) -> Result<usize> {
    let index = if index < 0 { index + dim as i64 } else { index };
    if index < 0 || index as usize >= dim {
        return Err(engine_err(format!("index {index} out of range for dim {dim}")));
    }
    Ok(index as usize)
}

pub fn scatter(
    dst: &CpuTensor,
    indices: &[CpuTensor],
    updates: &CpuTensor,
    axes: &[i32],
    reduce: Reduce,
) -> Result<CpuTensor> {
    if indices.is_empty() || indices.len() != axes.len() {
        return Err(engine_err("scatter needs one index array per axis"));
    }
    if updates.dtype() != dst.dtype() {
        return Err(engine_err(format!(
            "scatter update dtype {} does not match destination {}",
            updates.dtype(),
            dst.dtype()
        )));
    }

    let rank = dst.shape().len();
    let axes: Vec<usize> = axes
        .iter()
        .map(|&a| normalize_axis(a, rank))
        .collect::<Result<_>>()?;

    // Zipped index vectors, one destination coordinate per occurrence.
    let index_vecs: Vec<Vec<i64>> = indices
        .iter()
        .map(|t| t.index_values())
        .collect::<Result<_>>()?;
    let occurrences = index_vecs[0].len();
    if index_vecs.iter().any(|v| v.len() != occurrences) {
        return Err(engine_err("scatter index arrays must have equal length"));
    }

    // The axes not being scattered over form the slab each occurrence
    // addresses.
    let strides = element_strides(dst.shape());
    let slab_dims: Vec<usize> = (0..rank).filter(|d| !axes.contains(d)).collect();
    let slab_size: usize = slab_dims.iter().map(|&d| dst.shape()[d]).product();

    let update_len = updates.size();
    let per_occurrence = match update_len {
        1 => UpdateLayout::Single,
        n if n == occurrences => UpdateLayout::PerOccurrence,
        n if n == slab_size => UpdateLayout::SharedSlab,
        n if n == occurrences * slab_size => UpdateLayout::FullSlab,
        _ => {
            return Err(engine_err(format!(
                "scatter update of {update_len} elements does not fit \
                 {occurrences} occurrences of {slab_size}-element slabs"
            )))
        }
    };

    match reduce {
        Reduce::Replace => dispatch_all!(dst.dtype(), T => scatter_typed::<T>(
            dst, &index_vecs, &axes, &slab_dims, &strides, updates, per_occurrence,
            |_, new| new,
        )),
        Reduce::Add => dispatch_numeric!(dst.dtype(), T => scatter_typed::<T>(
            dst, &index_vecs, &axes, &slab_dims, &strides, updates, per_occurrence,
            |old, new| old + new,
        ), Err(engine_err(format!("scatter-add is undefined for {}", dst.dtype())))),
        Reduce::Prod => dispatch_numeric!(dst.dtype(), T => scatter_typed::<T>(
            dst, &index_vecs, &axes, &slab_dims, &strides, updates, per_occurrence,
            |old, new| old * new,
        ), Err(engine_err(format!("scatter-prod is undefined for {}", dst.dtype())))),
        Reduce::Min => dispatch_real!(dst.dtype(), T => scatter_typed::<T>(
            dst, &index_vecs, &axes, &slab_dims, &strides, updates, per_occurrence,
            |old, new| if new < old { new } else { old },
        ), Err(engine_err(format!("scatter-min is undefined for {}", dst.dtype())))),
        Reduce::Max => dispatch_real!(dst.dtype(), T => scatter_typed::<T>(
            dst, &index_vecs, &axes, &slab_dims, &strides, updates, per_occurrence,
            |old, new| if new > old { new } else { old },
        ), Err(engine_err(format!("scatter-max is undefined for {}", dst.dtype())))),
    }
}

#[derive(Debug, Clone, Copy)]
enum UpdateLayout {
    Single,
    PerOccurrence,
    SharedSlab,
    FullSlab,
}

#[allow(clippy::too_many_arguments)]
fn scatter_typed<T: bytemuck::Pod>(
    dst: &CpuTensor,
    index_vecs: &[Vec<i64>],
    axes: &[usize],
    slab_dims: &[usize],
    strides: &[usize],
    updates: &CpuTensor,
    layout: UpdateLayout,
    combine: impl Fn(T, T) -> T,
) -> Result<CpuTensor> {
    let mut out: Vec<T> = dst.values();
    let update_vals: Vec<T> = updates.values();
    let occurrences = index_vecs[0].len();
    let slab_size: usize = slab_dims.iter().map(|&d| dst.shape()[d]).product();

    for k in 0..occurrences {
        let mut base = 0usize;
        for (vec, &axis) in index_vecs.iter().zip(axes.iter()) {
            let coord = normalize_index(vec[k], dst.shape()[axis])?;
            base += coord * strides[axis];
        }

        for slab_pos in 0..slab_size {
            // Row-major walk of the non-scattered dims.
            let mut flat = base;
            let mut rem = slab_pos;
            for &d in slab_dims.iter().rev() {
                let extent = dst.shape()[d];
                flat += (rem % extent) * strides[d];
                rem /= extent;
            }

            let update = match layout {
                UpdateLayout::Single => update_vals[0],
                UpdateLayout::PerOccurrence => update_vals[k],
                UpdateLayout::SharedSlab => update_vals[slab_pos],
                UpdateLayout::FullSlab => update_vals[k * slab_size + slab_pos],
            };
            out[flat] = combine(out[flat], update);
        }
    }

    CpuTensor::from_values(&out, dst.shape().to_vec(), dst.dtype())
}

/// Gather elements along one axis.
pub fn take(a: &CpuTensor, indices: &CpuTensor, axis: i32) -> Result<CpuTensor> {
    let rank = a.shape().len();
    let axis = normalize_axis(axis, rank)?;
    let idx = indices.index_values()?;

    let item = a.dtype().size_of();
    let dim = a.shape()[axis];
    let outer: usize = a.shape()[..axis].iter().product();
    let inner: usize = a.shape()[axis + 1..].iter().product();

    let mut shape = a.shape().to_vec();
    shape[axis] = idx.len();

    let src = a.bytes();
    let mut bytes = Vec::with_capacity(outer * idx.len() * inner * item);
    for o in 0..outer {
        for &i in &idx {
            let i = normalize_index(i, dim)?;
            let start = (o * dim + i) * inner * item;
            bytes.extend_from_slice(&src[start..start + inner * item]);
        }
    }

    CpuTensor::new(bytes, shape, a.dtype())
}

/// Extract a strided slice as a fresh contiguous buffer.
///
/// The region is expressed as a view over the source bytes and handed to
/// the strided copy; no per-case layout logic.
pub fn slice(
    a: &CpuTensor,
    starts: &[i64],
    stops: &[i64],
    strides: &[i64],
) -> Result<CpuTensor> {
    let region = SliceRegion::resolve(a, starts, stops, strides)?;
    let view = StridedView::new(
        a.bytes(),
        &region.shape,
        &region.view_strides,
        region.offset,
        a.dtype(),
    )?;
    CpuTensor::new(view.materialize_contiguous(), region.shape, a.dtype())
}

/// Write `update` over a strided region, returning a new buffer.
pub fn slice_update(
    dst: &CpuTensor,
    update: &CpuTensor,
    starts: &[i64],
    stops: &[i64],
    strides: &[i64],
) -> Result<CpuTensor> {
    if update.dtype() != dst.dtype() {
        return Err(engine_err(format!(
            "slice update dtype {} does not match destination {}",
            update.dtype(),
            dst.dtype()
        )));
    }
    let region = SliceRegion::resolve(dst, starts, stops, strides)?;
    let region_size: usize = region.shape.iter().product();
    let update_size = update.size();
    if update_size != region_size && update_size != 1 {
        return Err(engine_err(format!(
            "slice update of {update_size} elements does not fit a \
             {region_size}-element region"
        )));
    }

    let item = dst.dtype().size_of();
    let mut bytes = dst.bytes().to_vec();
    let update_bytes = update.bytes();

    let rank = region.shape.len();
    let mut index = vec![0usize; rank];
    for pos in 0..region_size {
        let mut flat = region.offset as isize;
        for d in 0..rank {
            flat += index[d] as isize * region.view_strides[d];
        }
        let dst_start = flat as usize * item;
        let src_start = if update_size == 1 { 0 } else { pos * item };
        bytes[dst_start..dst_start + item]
            .copy_from_slice(&update_bytes[src_start..src_start + item]);

        for d in (0..rank).rev() {
            index[d] += 1;
            if index[d] < region.shape[d] {
                break;
            }
            index[d] = 0;
        }
    }

    CpuTensor::new(bytes, dst.shape().to_vec(), dst.dtype())
}

struct SliceRegion {
    shape: Vec<usize>,
    view_strides: Vec<isize>,
    offset: usize,
}

impl SliceRegion {
    fn resolve(a: &CpuTensor, starts: &[i64], stops: &[i64], strides: &[i64]) -> Result<Self> {
        let rank = a.shape().len();
        if starts.len() != rank || stops.len() != rank || strides.len() != rank {
            return Err(engine_err("slice bounds must cover every axis"));
        }

        let canonical = row_major_strides(a.shape());
        let mut shape = Vec::with_capacity(rank);
        let mut view_strides = Vec::with_capacity(rank);
        let mut offset = 0usize;

        for d in 0..rank {
            let dim = a.shape()[d] as i64;
            let step = strides[d];
            if step < 1 {
                return Err(engine_err(format!("unsupported slice step {step}")));
            }
            let start = starts[d].clamp(-dim, dim);
            let start = if start < 0 { start + dim } else { start };
            let stop = stops[d].clamp(-dim, dim);
            let stop = if stop < 0 { stop + dim } else { stop };

            let len = if stop > start {
                ((stop - start) as usize).div_ceil(step as usize)
            } else {
                0
            };
            shape.push(len);
            view_strides.push(canonical[d] * step as isize);
            offset += start as usize * canonical[d] as usize;
        }

        Ok(Self {
            shape,
            view_strides,
            offset,
        })
    }
}

fn element_strides(shape: &[usize]) -> Vec<usize> {
    row_major_strides(shape)
        .into_iter()
        .map(|s| s as usize)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tensile_core::Dtype;

    fn tensor_f32(values: &[f32], shape: &[usize]) -> CpuTensor {
        CpuTensor::from_values(values, shape.to_vec(), Dtype::Float32).unwrap()
    }

    fn index_i32(values: &[i32]) -> CpuTensor {
        CpuTensor::from_values(values, vec![values.len()], Dtype::Int32).unwrap()
    }

    #[test]
    fn test_scatter_add_applies_every_occurrence() {
        let dst = tensor_f32(&[0.0, 0.0], &[2]);
        let idx = index_i32(&[0, 1, 0, 1]);
        let update = tensor_f32(&[1.0], &[]);
        let out = scatter(&dst, &[idx], &update, &[0], Reduce::Add).unwrap();
        assert_eq!(out.values::<f32>(), vec![2.0, 2.0]);
    }

    #[test]
    fn test_scatter_replace_is_last_write_wins() {
        let dst = tensor_f32(&[0.0, 0.0], &[2]);
        let idx = index_i32(&[0, 0, 0]);
        let update = tensor_f32(&[1.0, 2.0, 3.0], &[3]);
        let out = scatter(&dst, &[idx], &update, &[0], Reduce::Replace).unwrap();
        assert_eq!(out.values::<f32>(), vec![3.0, 0.0]);
    }

    #[test]
    fn test_scatter_min_max() {
        let dst = tensor_f32(&[5.0, 5.0], &[2]);
        let idx = index_i32(&[0, 0]);
        let update = tensor_f32(&[7.0, 3.0], &[2]);
        let out = scatter(&dst, &[idx.clone()], &update, &[0], Reduce::Min).unwrap();
        assert_eq!(out.values::<f32>(), vec![3.0, 5.0]);
        let out = scatter(&dst, &[idx], &update, &[0], Reduce::Max).unwrap();
        assert_eq!(out.values::<f32>(), vec![7.0, 5.0]);
    }

    #[test]
    fn test_scatter_rows_with_slabs() {
        // scatter whole rows of a [2, 3] destination
        let dst = tensor_f32(&[0.0; 6], &[2, 3]);
        let idx = index_i32(&[1, 1]);
        let update = tensor_f32(&[1.0, 2.0, 3.0, 10.0, 20.0, 30.0], &[2, 3]);
        let out = scatter(&dst, &[idx], &update, &[0], Reduce::Add).unwrap();
        assert_eq!(
            out.values::<f32>(),
            vec![0.0, 0.0, 0.0, 11.0, 22.0, 33.0]
        );
    }

    #[test]
    fn test_scatter_negative_index_wraps() {
        let dst = tensor_f32(&[0.0, 0.0, 0.0], &[3]);
        let idx = index_i32(&[-1]);
        let update = tensor_f32(&[9.0], &[]);
        let out = scatter(&dst, &[idx], &update, &[0], Reduce::Add).unwrap();
        assert_eq!(out.values::<f32>(), vec![0.0, 0.0, 9.0]);
    }

    #[test]
    fn test_take_along_axis0() {
        let a = tensor_f32(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[3, 2]);
        let idx = index_i32(&[2, 0, 2]);
        let out = take(&a, &idx, 0).unwrap();
        assert_eq!(out.shape(), &[3, 2]);
        assert_eq!(out.values::<f32>(), vec![5.0, 6.0, 1.0, 2.0, 5.0, 6.0]);
    }

    #[test]
    fn test_take_along_axis1() {
        let a = tensor_f32(&[1.0, 2.0, 3.0, 4.0], &[2, 2]);
        let idx = index_i32(&[1]);
        let out = take(&a, &idx, 1).unwrap();
        assert_eq!(out.shape(), &[2, 1]);
        assert_eq!(out.values::<f32>(), vec![2.0, 4.0]);
    }

    #[test]
    fn test_slice_basic() {
        let a = tensor_f32(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0], &[2, 3]);
        let out = slice(&a, &[0, 1], &[2, 3], &[1, 1]).unwrap();
        assert_eq!(out.shape(), &[2, 2]);
        assert_eq!(out.values::<f32>(), vec![1.0, 2.0, 4.0, 5.0]);
    }

    #[test]
    fn test_slice_with_step() {
        let a = tensor_f32(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0], &[6]);
        let out = slice(&a, &[1], &[6], &[2]).unwrap();
        assert_eq!(out.values::<f32>(), vec![1.0, 3.0, 5.0]);
    }

    #[test]
    fn test_slice_update_region() {
        let a = tensor_f32(&[0.0; 6], &[2, 3]);
        let update = tensor_f32(&[7.0, 8.0], &[2, 1]);
        let out = slice_update(&a, &update, &[0, 1], &[2, 2], &[1, 1]).unwrap();
        assert_eq!(out.values::<f32>(), vec![0.0, 7.0, 0.0, 0.0, 8.0, 0.0]);
    }

    #[test]
    fn test_slice_update_scalar_fill() {
        let a = tensor_f32(&[0.0; 4], &[4]);
        let update = tensor_f32(&[1.0], &[]);
        let out = slice_update(&a, &update, &[1], &[3], &[1]).unwrap();
        assert_eq!(out.values::<f32>(), vec![0.0, 1.0, 1.0, 0.0]);
    }
}
