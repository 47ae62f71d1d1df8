//! Shape and stride arithmetic
//!
//! Strides are per-dimension element deltas. They may be negative (reversed
//! views), zero (broadcast views), or simply not match the canonical
//! row-major layout, and all of the functions here accept that.

/// Upper bound on rank. Keeping it fixed lets the copy odometer live in a
/// stack array instead of a per-call heap allocation.
pub const MAX_RANK: usize = 16;

/// Canonical row-major strides for a shape, in element units.
pub fn row_major_strides(shape: &[usize]) -> Vec<isize> {
    let mut strides = vec![1isize; shape.len()];
    for d in (0..shape.len().saturating_sub(1)).rev() {
        strides[d] = strides[d + 1] * shape[d + 1] as isize;
    }
    strides
}

/// Logical number of elements; a rank-0 shape holds one.
pub fn element_count(shape: &[usize]) -> usize {
    shape.iter().product()
}

/// First dimension, scanning from the innermost outward, at which the
/// strides stop matching the canonical row-major layout.
///
/// Dimensions `[0, boundary)` must be iterated explicitly when copying;
/// dimensions `[boundary, rank)` form a single flat run. 0 means the whole
/// view is contiguous. Unit-extent dimensions are checked like any other:
/// one carrying a non-canonical stride lands before the boundary and is
/// visited by the odometer rather than skipped.
pub fn contiguous_boundary_dim(shape: &[usize], strides: &[isize]) -> usize {
    debug_assert_eq!(shape.len(), strides.len());
    let mut expected = 1isize;
    for d in (0..shape.len()).rev() {
        if strides[d] != expected {
            return d + 1;
        }
        expected *= shape[d] as isize;
    }
    0
}

/// Buffer span in elements: the furthest extent any single dimension
/// reaches, or the logical size for rank 0.
///
/// This differs from the logical element count for broadcast (zero-stride)
/// views and for offset or reversed views.
pub fn physical_extent(shape: &[usize], strides: &[isize]) -> usize {
    if shape.is_empty() {
        return 1;
    }
    shape
        .iter()
        .zip(strides.iter())
        .map(|(&n, &s)| (n as isize * s).unsigned_abs())
        .max()
        .unwrap_or(1)
}
