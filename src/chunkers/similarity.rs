//! Vector similarity helpers.

/// Cosine similarity of two vectors.
///
/// Returns 0.0 for empty or mismatched-length inputs. A zero denominator is
/// replaced by 1, so zero vectors also score 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    let denominator = norm_a * norm_b;
    let denominator = if denominator == 0.0 { 1.0 } else { denominator };

    (dot / denominator).clamp(-1.0, 1.0)
}

/// Whether a vector can take part in a similarity comparison.
pub fn is_comparable(embedding: &[f32]) -> bool {
    embedding.iter().any(|x| *x != 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_vectors() {
        let v = [0.3, 0.4, 0.5];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_opposite_and_orthogonal() {
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 2.0]), 0.0);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[0.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn test_bounds() {
        let samples: [[f32; 3]; 5] = [
            [1.0, 2.0, 3.0],
            [-4.0, 0.5, 9.0],
            [1e-3, -2e-3, 5e-4],
            [100.0, -100.0, 0.1],
            [-1.0, -1.0, -1.0],
        ];
        for a in &samples {
            for b in &samples {
                let sim = cosine_similarity(a, b);
                assert!((-1.0..=1.0).contains(&sim), "{sim} out of range");
            }
        }
    }

    #[test]
    fn test_is_comparable() {
        assert!(!is_comparable(&[]));
        assert!(!is_comparable(&[0.0, 0.0]));
        assert!(is_comparable(&[0.0, 0.1]));
    }
}
