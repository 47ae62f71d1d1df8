//! Indexed update tests: accumulating scatter vs last-write-wins assignment

#[cfg(test)]
mod tests {
    use tensile_core::{Array, Dtype, Engine, GatherPlan, IndexOp};
    use tensile_cpu::CpuEngine;

    fn float_array(values: &[f32], shape: &[usize]) -> Array<CpuEngine> {
        Array::from_slice(CpuEngine, values, shape).unwrap()
    }

    fn index_array(values: &[i32]) -> Array<CpuEngine> {
        Array::from_slice(CpuEngine, values, &[values.len()]).unwrap()
    }

    // ============ duplicate-index semantics ============

    #[test]
    fn test_at_add_applies_every_occurrence() {
        let arr = float_array(&[0.0, 0.0], &[2]);
        let idx = index_array(&[0, 1, 0, 1]);
        let out = arr.at(vec![IndexOp::from(&idx)]).add(1.0).unwrap();
        assert_eq!(out.as_vec::<f32>().unwrap(), vec![2.0, 2.0]);
    }

    #[test]
    fn test_direct_assignment_is_last_write_wins() {
        // the read-modify-write spelling of `arr[idx] += 1`: gather, add,
        // assign back; duplicates collapse to the last write
        let arr = float_array(&[0.0, 0.0], &[2]);
        let idx = index_array(&[0, 1, 0, 1]);
        let updated = arr.take(&idx, 0).unwrap().add(1.0).unwrap();
        let out = arr
            .index_assign(&[IndexOp::from(&idx)], updated)
            .unwrap();
        assert_eq!(out.as_vec::<f32>().unwrap(), vec![1.0, 1.0]);
    }

    #[test]
    fn test_at_never_mutates_the_input() {
        let arr = float_array(&[1.0, 1.0], &[2]);
        let idx = index_array(&[0, 0]);
        let _ = arr.at(vec![IndexOp::from(&idx)]).add(5.0).unwrap();
        assert_eq!(arr.as_vec::<f32>().unwrap(), vec![1.0, 1.0]);
    }

    // ============ dense fallback ============

    #[test]
    fn test_whole_array_update_takes_dense_path() {
        let arr = float_array(&[1.0, 1.0], &[2]);

        // resolution of an empty expression yields no gather at all
        let plan = CpuEngine.resolve_index(&[2], &[]).unwrap();
        assert!(matches!(plan, GatherPlan::Full));

        let out = arr.at(vec![]).multiply(2.0).unwrap();
        assert_eq!(out.as_vec::<f32>().unwrap(), vec![2.0, 2.0]);
    }

    #[test]
    fn test_slice_update_takes_dense_path() {
        let arr = float_array(&[1.0, 2.0, 3.0, 4.0], &[4]);

        let ops = vec![IndexOp::range(1, 3)];
        let plan = CpuEngine.resolve_index(&[4], &ops).unwrap();
        assert!(matches!(plan, GatherPlan::Slice { .. }));

        let out = arr.at(ops).add(10.0).unwrap();
        assert_eq!(out.as_vec::<f32>().unwrap(), vec![1.0, 12.0, 13.0, 4.0]);
    }

    // ============ the six ops ============

    #[test]
    fn test_at_subtract() {
        let arr = float_array(&[10.0, 10.0], &[2]);
        let idx = index_array(&[0, 0]);
        let out = arr.at(vec![IndexOp::from(&idx)]).subtract(2.0).unwrap();
        assert_eq!(out.as_vec::<f32>().unwrap(), vec![6.0, 10.0]);
    }

    #[test]
    fn test_at_multiply_duplicates() {
        let arr = float_array(&[2.0, 2.0], &[2]);
        let idx = index_array(&[0, 0, 1]);
        let out = arr.at(vec![IndexOp::from(&idx)]).multiply(3.0).unwrap();
        assert_eq!(out.as_vec::<f32>().unwrap(), vec![18.0, 6.0]);
    }

    #[test]
    fn test_at_divide() {
        let arr = float_array(&[8.0, 8.0], &[2]);
        let idx = index_array(&[1, 1]);
        let out = arr.at(vec![IndexOp::from(&idx)]).divide(2.0).unwrap();
        assert_eq!(out.as_vec::<f32>().unwrap(), vec![8.0, 2.0]);
    }

    #[test]
    fn test_at_minimum_maximum() {
        let arr = float_array(&[5.0, 5.0], &[2]);
        let idx = index_array(&[0]);
        let out = arr.at(vec![IndexOp::from(&idx)]).minimum(3.0).unwrap();
        assert_eq!(out.as_vec::<f32>().unwrap(), vec![3.0, 5.0]);
        let out = arr.at(vec![IndexOp::from(&idx)]).maximum(9.0).unwrap();
        assert_eq!(out.as_vec::<f32>().unwrap(), vec![9.0, 5.0]);
    }

    // ============ value promotion on the update path ============

    #[test]
    fn test_update_value_adopts_array_dtype() {
        let arr = Array::from_slice(CpuEngine, &[1i32, 2], &[2]).unwrap();
        let idx = index_array(&[0]);
        let out = arr.at(vec![IndexOp::from(&idx)]).add(1i64).unwrap();
        assert_eq!(out.dtype(), Dtype::Int32);
        assert_eq!(out.as_vec::<i32>().unwrap(), vec![2, 2]);
    }

    #[test]
    fn test_row_update_on_matrix() {
        let arr = float_array(&[0.0; 6], &[2, 3]);
        let idx = index_array(&[1, 1]);
        let out = arr.at(vec![IndexOp::from(&idx)]).add(1.0).unwrap();
        assert_eq!(
            out.as_vec::<f32>().unwrap(),
            vec![0.0, 0.0, 0.0, 2.0, 2.0, 2.0]
        );
    }
}
