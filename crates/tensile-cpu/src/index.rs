//! Reference index resolution
//!
//! Turns a heterogeneous index expression into a gather plan. This is the
//! engine-side collaborator the core delegates to; the semantics here cover
//! the common forms (integers, slices, ellipsis, zipped index arrays) and
//! reject the exotic ones rather than guessing.

use tensile_core::{GatherPlan, IndexOp};

use crate::kernels::engine_err;
use crate::tensor::CpuTensor;

pub fn resolve(
    shape: &[usize],
    ops: &[IndexOp<CpuTensor>],
) -> tensile_core::Result<GatherPlan<CpuTensor>> {
    let rank = shape.len();
    let consuming = ops
        .iter()
        .filter(|op| !matches!(op, IndexOp::NewAxis | IndexOp::Ellipsis))
        .count();
    if consuming > rank {
        return Err(engine_err(format!(
            "{consuming} indices for an array of rank {rank}"
        )));
    }
    if ops.iter().filter(|op| matches!(op, IndexOp::Ellipsis)).count() > 1 {
        return Err(engine_err("an index expression may hold one ellipsis"));
    }

    let mut starts: Vec<i64> = vec![0; rank];
    let mut stops: Vec<i64> = shape.iter().map(|&n| n as i64).collect();
    let mut steps: Vec<i64> = vec![1; rank];
    let mut narrowed = vec![false; rank];
    let mut gather: Vec<(i32, CpuTensor)> = Vec::new();

    let mut axis = 0usize;
    for op in ops {
        match op {
            IndexOp::Ellipsis => {
                // Leave the skipped axes at their full range.
                axis += rank - consuming;
            }
            IndexOp::NewAxis => {
                // Inserted axes do not select destination elements; the
                // update value's shape is the kernel's concern.
            }
            IndexOp::Index(i) => {
                let dim = shape[axis] as i64;
                let i = if *i < 0 { i + dim } else { *i };
                if i < 0 || i >= dim {
                    return Err(engine_err(format!(
                        "index {i} out of range for axis {axis} of size {dim}"
                    )));
                }
                starts[axis] = i;
                stops[axis] = i + 1;
                narrowed[axis] = true;
                axis += 1;
            }
            IndexOp::Slice { start, stop, step } => {
                if *step < 1 {
                    return Err(engine_err(format!("unsupported slice step {step}")));
                }
                let dim = shape[axis] as i64;
                let s = start.unwrap_or(0).clamp(-dim, dim);
                let s = if s < 0 { s + dim } else { s };
                let e = stop.unwrap_or(dim).clamp(-dim, dim);
                let e = if e < 0 { e + dim } else { e };
                starts[axis] = s;
                stops[axis] = e.max(s);
                steps[axis] = *step;
                narrowed[axis] = s != 0 || e != dim || *step != 1;
                axis += 1;
            }
            IndexOp::Array(h) => {
                gather.push((axis as i32, h.clone()));
                axis += 1;
            }
        }
    }

    if !gather.is_empty() {
        // Mixing gathers with narrowed axes needs the full resolution
        // machinery; this reference covers index arrays on otherwise
        // untouched arrays.
        if narrowed.iter().any(|&n| n) {
            return Err(engine_err(
                "mixed slice and index-array expressions are not supported",
            ));
        }
        let (axes, indices): (Vec<i32>, Vec<CpuTensor>) = gather.into_iter().unzip();
        return Ok(GatherPlan::Gather { indices, axes });
    }

    if narrowed.iter().all(|&n| !n) {
        return Ok(GatherPlan::Full);
    }

    Ok(GatherPlan::Slice {
        starts,
        stops,
        strides: steps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tensile_core::Dtype;

    fn index_i32(values: &[i32]) -> CpuTensor {
        CpuTensor::from_values(values, vec![values.len()], Dtype::Int32).unwrap()
    }

    #[test]
    fn test_empty_expression_is_full() {
        assert!(matches!(resolve(&[2, 3], &[]).unwrap(), GatherPlan::Full));
    }

    #[test]
    fn test_full_slices_are_full() {
        let ops = vec![IndexOp::full(), IndexOp::full()];
        assert!(matches!(resolve(&[2, 3], &ops).unwrap(), GatherPlan::Full));
    }

    #[test]
    fn test_ellipsis_pads_to_full() {
        let ops = vec![IndexOp::Ellipsis];
        assert!(matches!(resolve(&[2, 3], &ops).unwrap(), GatherPlan::Full));
    }

    #[test]
    fn test_integer_narrows() {
        let ops = vec![IndexOp::Index(1)];
        match resolve(&[3, 2], &ops).unwrap() {
            GatherPlan::Slice {
                starts,
                stops,
                strides,
            } => {
                assert_eq!(starts, vec![1, 0]);
                assert_eq!(stops, vec![2, 2]);
                assert_eq!(strides, vec![1, 1]);
            }
            other => panic!("expected slice plan, got {other:?}"),
        }
    }

    #[test]
    fn test_negative_integer_wraps() {
        let ops = vec![IndexOp::Index(-1)];
        match resolve(&[3], &ops).unwrap() {
            GatherPlan::Slice { starts, stops, .. } => {
                assert_eq!(starts, vec![2]);
                assert_eq!(stops, vec![3]);
            }
            other => panic!("expected slice plan, got {other:?}"),
        }
    }

    #[test]
    fn test_index_array_gathers() {
        let ops = vec![IndexOp::Array(index_i32(&[0, 1, 0]))];
        match resolve(&[2], &ops).unwrap() {
            GatherPlan::Gather { indices, axes } => {
                assert_eq!(axes, vec![0]);
                assert_eq!(indices.len(), 1);
            }
            other => panic!("expected gather plan, got {other:?}"),
        }
    }

    #[test]
    fn test_too_many_indices() {
        let ops = vec![IndexOp::Index(0), IndexOp::Index(0)];
        assert!(resolve(&[3], &ops).is_err());
    }

    #[test]
    fn test_mixed_gather_and_narrowing_rejected() {
        let ops = vec![IndexOp::Index(0), IndexOp::Array(index_i32(&[0]))];
        assert!(resolve(&[2, 2], &ops).is_err());
    }
}
