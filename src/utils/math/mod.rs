use num::Float;

/// ドット積
/// d(a, b) = Σ(a_i * b_i)
///
/// # Arguments
/// * `a`, `b` - dense vectors of the same length
#[inline]
pub fn dot<N: Float>(a: &[N], b: &[N]) -> N {
    debug_assert_eq!(a.len(), b.len(), "vectors must be of the same length");
    a.iter().zip(b).fold(N::zero(), |acc, (&x, &y)| x.mul_add(y, acc))
}

/// L2 norm, ||a|| = sqrt(Σ(a_i^2))
#[inline]
pub fn norm<N: Float>(a: &[N]) -> N {
    dot(a, a).sqrt()
}

/// コサイン類似度
/// cos(θ) = Σ(a_i * b_i) / (||a|| * ||b||)
///
/// A zero-norm side yields 0.0 instead of NaN.
///
/// # Returns
/// * `f64` - raw similarity in [-1, 1], not clipped
#[inline]
pub fn cosine_similarity<N: Float>(a: &[N], b: &[N]) -> f64 {
    let na = norm(a).to_f64().unwrap_or(0.0);
    let nb = norm(b).to_f64().unwrap_or(0.0);
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    let d = dot(a, b).to_f64().unwrap_or(0.0);
    d / (na * nb)
}

/// Scale in place to unit length. Zero vectors are left untouched.
#[inline]
pub fn l2_normalize<N: Float>(a: &mut [N]) {
    let n = norm(a);
    if n > N::epsilon() {
        for v in a.iter_mut() {
            *v = *v / n;
        }
    }
}

/// Round half away from zero to `decimals` places
#[inline]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

/// Linear-interpolated quantile of an ascending slice.
/// `q` is clamped into [0, 1]; an empty slice gives None.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let q = q.clamp(0.0, 1.0);
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_of_parallel_and_orthogonal() {
        assert!((cosine_similarity(&[1.0f32, 2.0], &[2.0, 4.0]) - 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[1.0f64, 0.0], &[0.0, 3.0]), 0.0);
        assert!((cosine_similarity(&[1.0f64, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn zero_vector_has_zero_similarity() {
        assert_eq!(cosine_similarity(&[0.0f32, 0.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0f32, 0.0], &[0.0, 0.0]), 0.0);
    }

    #[test]
    fn normalize_keeps_zero() {
        let mut v = [3.0f32, 4.0];
        l2_normalize(&mut v);
        assert!((v[0] - 0.6).abs() < 1e-6 && (v[1] - 0.8).abs() < 1e-6);
        let mut z = [0.0f64; 3];
        l2_normalize(&mut z);
        assert_eq!(z, [0.0; 3]);
    }

    #[test]
    fn rounding_is_half_away_from_zero() {
        assert_eq!(round_to(66.66666, 1), 66.7);
        assert_eq!(round_to(12.25, 1), 12.3);
        assert_eq!(round_to(0.125, 2), 0.13);
        assert_eq!(round_to(100.0, 1), 100.0);
    }

    #[test]
    fn quantile_interpolates() {
        let data = [0.0, 0.25, 0.5, 1.0];
        assert_eq!(quantile_sorted(&data, 0.0), Some(0.0));
        assert_eq!(quantile_sorted(&data, 1.0), Some(1.0));
        assert_eq!(quantile_sorted(&data, 0.5), Some(0.375));
        assert_eq!(quantile_sorted(&[], 0.5), None);
    }
}
