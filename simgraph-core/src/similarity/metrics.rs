//! Numeric kernels behind the built-in similarity metrics.
//!
//! Kernels assume validated input: equal, non-zero lengths and finite values.
//! Every kernel returns a score in `[0, 1]` where `1` means identical.

/// Cosine similarity clamped at zero.
///
/// Vectors with zero magnitude score `0` against everything.
///
/// # Examples
/// ```
/// use simgraph_core::cosine_similarity;
///
/// assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-12);
/// assert_eq!(cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]), 0.0);
/// assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
/// ```
#[must_use]
pub fn cosine_similarity(left: &[f32], right: &[f32]) -> f64 {
    let mut dot = 0.0_f64;
    let mut left_squares = 0.0_f64;
    let mut right_squares = 0.0_f64;
    for (&l, &r) in left.iter().zip(right) {
        let (l, r) = (f64::from(l), f64::from(r));
        dot += l * r;
        left_squares += l * l;
        right_squares += r * r;
    }
    if left_squares == 0.0 || right_squares == 0.0 {
        return 0.0;
    }
    (dot / (left_squares.sqrt() * right_squares.sqrt())).clamp(0.0, 1.0)
}

/// Inverse Euclidean distance, `1 / (1 + d)`.
///
/// # Examples
/// ```
/// use simgraph_core::euclidean_similarity;
///
/// assert_eq!(euclidean_similarity(&[1.0, 2.0], &[1.0, 2.0]), 1.0);
/// assert!((euclidean_similarity(&[0.0, 0.0], &[3.0, 4.0]) - 1.0 / 6.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn euclidean_similarity(left: &[f32], right: &[f32]) -> f64 {
    let sum: f64 = left
        .iter()
        .zip(right)
        .map(|(&l, &r)| {
            let diff = f64::from(l) - f64::from(r);
            diff * diff
        })
        .sum();
    1.0 / (1.0 + sum.sqrt())
}

/// Pearson correlation clamped at zero.
///
/// Constant vectors have no variance and score `0`.
///
/// # Examples
/// ```
/// use simgraph_core::pearson_similarity;
///
/// assert!((pearson_similarity(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]) - 1.0).abs() < 1e-12);
/// assert_eq!(pearson_similarity(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]), 0.0);
/// ```
#[must_use]
pub fn pearson_similarity(left: &[f32], right: &[f32]) -> f64 {
    let len = left.len().min(right.len());
    if len == 0 {
        return 0.0;
    }
    let count = len as f64;
    let left_mean = left.iter().map(|&v| f64::from(v)).sum::<f64>() / count;
    let right_mean = right.iter().map(|&v| f64::from(v)).sum::<f64>() / count;

    let mut covariance = 0.0_f64;
    let mut left_variance = 0.0_f64;
    let mut right_variance = 0.0_f64;
    for (&l, &r) in left.iter().zip(right) {
        let l = f64::from(l) - left_mean;
        let r = f64::from(r) - right_mean;
        covariance += l * r;
        left_variance += l * l;
        right_variance += r * r;
    }
    if left_variance == 0.0 || right_variance == 0.0 {
        return 0.0;
    }
    (covariance / (left_variance.sqrt() * right_variance.sqrt())).clamp(0.0, 1.0)
}

/// Inverse absolute difference of two scalars, `1 / (1 + |a - b|)`.
#[must_use]
pub fn scalar_similarity(left: f64, right: f64) -> f64 {
    1.0 / (1.0 + (left - right).abs())
}

/// Jaccard index of two sorted, deduplicated id sets.
///
/// Two empty sets score `0`.
///
/// # Examples
/// ```
/// use simgraph_core::jaccard_similarity;
///
/// assert_eq!(jaccard_similarity(&[1, 2, 3], &[2, 3, 4]), 0.5);
/// assert_eq!(jaccard_similarity(&[], &[]), 0.0);
/// ```
#[must_use]
pub fn jaccard_similarity(left: &[u64], right: &[u64]) -> f64 {
    let shared = intersection_size(left, right);
    let union = left.len() + right.len() - shared;
    if union == 0 {
        0.0
    } else {
        shared as f64 / union as f64
    }
}

/// Overlap coefficient of two sorted, deduplicated id sets.
///
/// The intersection is divided by the smaller set's size; an empty set scores `0`.
///
/// # Examples
/// ```
/// use simgraph_core::overlap_similarity;
///
/// assert_eq!(overlap_similarity(&[1, 2], &[1, 2, 3, 4]), 1.0);
/// assert_eq!(overlap_similarity(&[], &[1]), 0.0);
/// ```
#[must_use]
pub fn overlap_similarity(left: &[u64], right: &[u64]) -> f64 {
    let smaller = left.len().min(right.len());
    if smaller == 0 {
        0.0
    } else {
        intersection_size(left, right) as f64 / smaller as f64
    }
}

fn intersection_size(left: &[u64], right: &[u64]) -> usize {
    let (mut i, mut j, mut shared) = (0, 0, 0);
    while i < left.len() && j < right.len() {
        match left[i].cmp(&right[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                shared += 1;
                i += 1;
                j += 1;
            }
        }
    }
    shared
}
