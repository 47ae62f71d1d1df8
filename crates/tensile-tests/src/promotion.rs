//! Scalar/array promotion tests through a concrete engine

#[cfg(test)]
mod tests {
    use half::f16;
    use tensile_core::{Array, Dtype};
    use tensile_cpu::CpuEngine;

    // ============ weak scalar typing ============

    #[test]
    fn test_array_dtype_wins_over_float_literal() {
        let values = [f16::from_f64(1.0), f16::from_f64(2.0)];
        let a = Array::from_slice(CpuEngine, &values, &[2]).unwrap();
        let out = a.add(2.5).unwrap();
        // the float16 array wins over the literal's float32 default
        assert_eq!(out.dtype(), Dtype::Float16);
        assert_eq!(
            out.as_vec::<f16>().unwrap(),
            vec![f16::from_f64(3.5), f16::from_f64(4.5)]
        );
    }

    #[test]
    fn test_array_dtype_wins_over_int_literal() {
        let a = Array::from_slice(CpuEngine, &[1.0f64, 2.0], &[2]).unwrap();
        let out = a.multiply(3i64).unwrap();
        assert_eq!(out.dtype(), Dtype::Float64);
        assert_eq!(out.as_vec::<f64>().unwrap(), vec![3.0, 6.0]);
    }

    #[test]
    fn test_int_array_keeps_its_width() {
        let a = Array::from_slice(CpuEngine, &[1i16, 2], &[2]).unwrap();
        let out = a.add(1i64).unwrap();
        assert_eq!(out.dtype(), Dtype::Int16);
        assert_eq!(out.as_vec::<i16>().unwrap(), vec![2, 3]);
    }

    // ============ two-array operands ============

    #[test]
    fn test_two_arrays_left_as_is() {
        let a = Array::from_slice(CpuEngine, &[1.0f32, 2.0], &[2]).unwrap();
        let b = Array::from_slice(CpuEngine, &[10.0f32, 20.0], &[2]).unwrap();
        let out = a.add(&b).unwrap();
        assert_eq!(out.dtype(), Dtype::Float32);
        assert_eq!(out.as_vec::<f32>().unwrap(), vec![11.0, 22.0]);
    }

    #[test]
    fn test_two_arrays_broadcast() {
        let a = Array::from_slice(CpuEngine, &[1.0f32, 2.0], &[2, 1]).unwrap();
        let b = Array::from_slice(CpuEngine, &[10.0f32, 20.0, 30.0], &[1, 3]).unwrap();
        let out = a.add(&b).unwrap();
        assert_eq!(out.shape(), vec![2, 3]);
        assert_eq!(
            out.as_vec::<f32>().unwrap(),
            vec![11.0, 21.0, 31.0, 12.0, 22.0, 32.0]
        );
    }

    // ============ derived operations ============

    #[test]
    fn test_subtract_is_add_of_negated() {
        let a = Array::from_slice(CpuEngine, &[5.0f32, 7.0], &[2]).unwrap();
        let out = a.subtract(2.0).unwrap();
        assert_eq!(out.as_vec::<f32>().unwrap(), vec![3.0, 5.0]);
    }

    #[test]
    fn test_divide_is_multiply_by_reciprocal() {
        let a = Array::from_slice(CpuEngine, &[6.0f32, 9.0], &[2]).unwrap();
        let out = a.divide(3.0).unwrap();
        assert_eq!(out.as_vec::<f32>().unwrap(), vec![2.0, 3.0]);
    }

    #[test]
    fn test_minimum_maximum_with_scalar() {
        let a = Array::from_slice(CpuEngine, &[1.0f32, 5.0], &[2]).unwrap();
        assert_eq!(
            a.minimum(3.0).unwrap().as_vec::<f32>().unwrap(),
            vec![1.0, 3.0]
        );
        assert_eq!(
            a.maximum(3.0).unwrap().as_vec::<f32>().unwrap(),
            vec![3.0, 5.0]
        );
    }
}
