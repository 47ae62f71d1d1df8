//! Construction, read-out and export tests

#[cfg(test)]
mod tests {
    use tensile_core::{Array, Dtype, Error, MaterializePolicy};
    use tensile_cpu::CpuEngine;

    // ============ construction ============

    #[test]
    fn test_from_slice_round_trip() {
        let arr = Array::from_slice(CpuEngine, &[1.0f32, 2.0, 3.0, 4.0], &[2, 2]).unwrap();
        assert_eq!(arr.dtype(), Dtype::Float32);
        assert_eq!(arr.shape(), vec![2, 2]);
        assert_eq!(arr.size(), 4);
        assert_eq!(arr.as_vec::<f32>().unwrap(), vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_from_slice_shape_mismatch() {
        let result = Array::from_slice(CpuEngine, &[1.0f32, 2.0, 3.0], &[2, 2]);
        assert!(matches!(result, Err(Error::ShapeMismatch { .. })));
    }

    #[test]
    fn test_bool_round_trip() {
        let arr = Array::from_slice(CpuEngine, &[true, false, true], &[3]).unwrap();
        assert_eq!(arr.dtype(), Dtype::Bool);
        assert_eq!(arr.as_vec::<bool>().unwrap(), vec![true, false, true]);
    }

    #[test]
    fn test_from_scalar_default_dtype() {
        let arr = Array::from_scalar(CpuEngine, 5i64, None).unwrap();
        assert_eq!(arr.dtype(), Dtype::Int32);
        assert_eq!(arr.shape(), Vec::<usize>::new());
        assert_eq!(arr.item::<i32>().unwrap(), 5);
    }

    #[test]
    fn test_from_scalar_explicit_dtype() {
        // the explicit construction path reinterprets truthiness as 1/0
        let arr = Array::from_scalar(CpuEngine, true, Some(Dtype::Int32)).unwrap();
        assert_eq!(arr.dtype(), Dtype::Int32);
        assert_eq!(arr.item::<i32>().unwrap(), 1);
    }

    #[test]
    fn test_from_scalar_out_of_range() {
        let result = Array::from_scalar(CpuEngine, 5_000_000_000i64, None);
        assert!(matches!(result, Err(Error::OutOfRangeLiteral(_))));
    }

    // ============ read-out ============

    #[test]
    fn test_as_vec_requires_exact_dtype() {
        let arr = Array::from_slice(CpuEngine, &[1.0f32, 2.0], &[2]).unwrap();
        let result = arr.as_vec::<f64>();
        assert!(matches!(result, Err(Error::TypeMismatch { .. })));
    }

    #[test]
    fn test_astype_is_the_explicit_cast_step() {
        let arr = Array::from_slice(CpuEngine, &[1.0f32, 2.0], &[2]).unwrap();
        let cast = arr.astype(Dtype::Float64).unwrap();
        assert_eq!(cast.as_vec::<f64>().unwrap(), vec![1.0, 2.0]);
        // the source is untouched
        assert_eq!(arr.dtype(), Dtype::Float32);
    }

    #[test]
    fn test_item_rejects_multi_element() {
        let arr = Array::from_slice(CpuEngine, &[1.0f32, 2.0], &[2]).unwrap();
        assert!(arr.item::<f32>().is_err());
    }

    // ============ export policies ============

    #[test]
    fn test_as_data_copy_owns() {
        let arr = Array::from_slice(CpuEngine, &[1.0f32, 2.0], &[2]).unwrap();
        let data = arr.as_data(MaterializePolicy::Copy).unwrap();
        assert!(!data.buffer.is_borrowed());
        assert_eq!(data.shape, vec![2]);
        assert_eq!(data.strides, vec![1]);
    }

    #[test]
    fn test_as_data_borrows_contiguous() {
        let arr = Array::from_slice(CpuEngine, &[1.0f32, 2.0], &[2]).unwrap();
        let data = arr.as_data(MaterializePolicy::NoCopyIfContiguous).unwrap();
        assert!(data.buffer.is_borrowed());
        assert_eq!(data.offset, 0);
    }

    #[test]
    fn test_as_data_no_copy_always() {
        let arr = Array::from_slice(CpuEngine, &[1.0f32, 2.0, 3.0, 4.0], &[2, 2]).unwrap();
        let data = arr.as_data(MaterializePolicy::NoCopyAlways).unwrap();
        assert!(data.buffer.is_borrowed());
        assert_eq!(data.strides, vec![2, 1]);
    }

    // ============ device limits ============

    #[test]
    fn test_limit_forwarding() {
        use tensile_core::Engine;

        let engine = CpuEngine;
        let original = engine.set_memory_limit(1 << 30);
        assert_eq!(engine.memory_limit(), 1 << 30);
        assert_eq!(engine.set_memory_limit(original), 1 << 30);
    }
}
