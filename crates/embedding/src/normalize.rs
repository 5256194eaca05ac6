/// In-place L2 normalization helper to keep allocations down during hot paths.
/// Uses f32 throughout for better SIMD auto-vectorization.
pub(crate) fn l2_normalize_in_place(v: &mut [f32]) {
    let norm_sq: f32 = v.iter().map(|x| x * x).sum();
    if norm_sq > 0.0 {
        let inv_norm = norm_sq.sqrt().recip();
        for x in v.iter_mut() {
            *x *= inv_norm;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn l2_normalize_simple_vector() {
        let mut v = vec![3.0f32, 4.0];
        l2_normalize_in_place(&mut v);
        // L2 norm of [3, 4] is 5, so normalized should be [0.6, 0.8]
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn l2_normalize_maintains_unit_length() {
        let mut v = vec![1.0f32, 2.0, 3.0, 4.0, 5.0];
        l2_normalize_in_place(&mut v);
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn l2_normalize_zero_vector() {
        let mut v = vec![0.0f32, 0.0, 0.0];
        l2_normalize_in_place(&mut v);
        // Zero vector should remain zero (no division by zero)
        assert_eq!(v, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn l2_normalize_empty_slice() {
        let mut v: Vec<f32> = vec![];
        l2_normalize_in_place(&mut v);
        assert!(v.is_empty());
    }

    #[test]
    fn l2_normalize_negative_values() {
        let mut v = vec![-3.0f32, -4.0];
        l2_normalize_in_place(&mut v);
        assert!((v[0] + 0.6).abs() < 1e-6);
        assert!((v[1] + 0.8).abs() < 1e-6);
    }
}
