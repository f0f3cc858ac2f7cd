/// Cosine distance between two embedding vectors, `1 - cos(a, b)`, in [0, 2].
///
/// Vectors are compared by direction only. A zero vector (the vectorizer's
/// failure fallback) or a length mismatch has no usable direction, so both
/// degrade to 1.0 rather than erroring out of a batch.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 1.0;
    }
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    1.0 - dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Coordinate-wise arithmetic mean. Empty input yields an empty vector;
/// ragged inputs contribute up to the first vector's length.
pub fn mean_centroid(vectors: &[&[f32]]) -> Vec<f32> {
    let Some(first) = vectors.first() else {
        return Vec::new();
    };
    let mut centroid = vec![0.0f32; first.len()];
    for v in vectors {
        for (c, x) in centroid.iter_mut().zip(*v) {
            *c += x;
        }
    }
    let n = vectors.len() as f32;
    for c in centroid.iter_mut() {
        *c /= n;
    }
    centroid
}

/// Squared euclidean distance; mismatched lengths rank last.
pub fn squared_euclidean(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return f32::MAX;
    }
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_vectors_have_zero_distance() {
        let v = vec![0.3, 0.5, 0.1];
        assert!(cosine_distance(&v, &v).abs() < 1e-6);
    }

    #[test]
    fn orthogonal_vectors_have_distance_one() {
        let d = cosine_distance(&[1.0, 0.0], &[0.0, 1.0]);
        assert!((d - 1.0).abs() < 1e-6);
    }

    #[test]
    fn opposite_vectors_have_distance_two() {
        let d = cosine_distance(&[1.0, 2.0], &[-1.0, -2.0]);
        assert!((d - 2.0).abs() < 1e-6);
    }

    #[test]
    fn zero_vector_degrades_to_unit_distance() {
        assert_eq!(cosine_distance(&[0.0, 0.0], &[1.0, 2.0]), 1.0);
        assert_eq!(cosine_distance(&[1.0, 2.0], &[0.0, 0.0]), 1.0);
        assert_eq!(cosine_distance(&[0.0, 0.0], &[0.0, 0.0]), 1.0);
    }

    #[test]
    fn length_mismatch_degrades_to_unit_distance() {
        assert_eq!(cosine_distance(&[1.0, 0.0], &[1.0, 0.0, 0.0]), 1.0);
    }

    #[test]
    fn distance_stays_in_bounds() {
        let vectors = [
            vec![1.0, 0.0, 0.0],
            vec![-1.0, 0.5, 2.0],
            vec![0.0, 0.0, 0.0],
            vec![3.0, -2.0, 0.7],
        ];
        for a in &vectors {
            for b in &vectors {
                let d = cosine_distance(a, b);
                assert!((0.0..=2.0).contains(&d), "d({:?}, {:?}) = {}", a, b, d);
            }
        }
    }

    #[test]
    fn mean_centroid_averages_coordinates() {
        let a = [1.0, 0.0];
        let b = [0.0, 1.0];
        assert_eq!(mean_centroid(&[&a, &b]), vec![0.5, 0.5]);
        assert!(mean_centroid(&[]).is_empty());
    }

    #[test]
    fn squared_euclidean_matches_hand_computation() {
        let d = squared_euclidean(&[0.0, 0.0], &[3.0, 4.0]);
        assert!((d - 25.0).abs() < 1e-6);
        assert_eq!(squared_euclidean(&[1.0], &[1.0, 2.0]), f32::MAX);
    }
}
