//! Similarity primitives
//!
//! Pure functions computing one score between two representations.
//! Every score is rounded to [`PRECISION`](expanse_core::PRECISION)
//! significant digits before it is returned.

use ahash::AHashSet;
use expanse_core::{check_dims, round_score, Error, Result, WeightedEntry, WeightedSet};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// What cosine returns when either vector has zero norm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroNormPolicy {
    /// Score the pair as `0.0`
    #[default]
    Zero,
    /// Fail with [`Error::UndefinedSimilarity`]
    Error,
}

/// Cosine similarity with the default [`ZeroNormPolicy::Zero`]
///
/// # Errors
/// `DimensionMismatch` when the slices differ in length.
pub fn cosine(a: &[f32], b: &[f32]) -> Result<f64> {
    cosine_with(a, b, ZeroNormPolicy::Zero)
}

/// Cosine similarity: dot product over the product of Euclidean norms
pub fn cosine_with(a: &[f32], b: &[f32], zero_norm: ZeroNormPolicy) -> Result<f64> {
    check_dims(a, b)?;

    let numerator = expanse_core::simd::dot_product_simd(a, b);
    let norm_a = expanse_core::simd::norm_simd(a);
    let norm_b = expanse_core::simd::norm_simd(b);

    if norm_a == 0.0 || norm_b == 0.0 {
        trace!(dim = a.len(), "zero-norm vector in cosine");
        return match zero_norm {
            ZeroNormPolicy::Zero => Ok(0.0),
            ZeroNormPolicy::Error => Err(Error::UndefinedSimilarity),
        };
    }

    let sim = numerator / (norm_a * norm_b);
    if !sim.is_finite() {
        trace!(dim = a.len(), "non-finite cosine");
        return Err(Error::UndefinedSimilarity);
    }

    Ok(round_score(sim))
}

/// Cosine over the scores of the targets two weighted sets have in common
///
/// # Example
/// ```rust
/// use expanse_core::WeightedSet;
/// use expanse_similarity::distance::cosine_sets;
///
/// let a: WeightedSet = ["t1#3", "t2#5"].into_iter().collect();
/// let b: WeightedSet = ["t1#3", "t3#9"].into_iter().collect();
/// assert_eq!(cosine_sets(&a, &b).unwrap(), 1.0);
/// ```
pub fn cosine_sets(a: &WeightedSet, b: &WeightedSet) -> Result<f64> {
    cosine_sets_with(a, b, ZeroNormPolicy::Zero)
}

pub fn cosine_sets_with(a: &WeightedSet, b: &WeightedSet, zero_norm: ZeroNormPolicy) -> Result<f64> {
    let (aa, ba) = extract_common_target_scores(a, b)?;
    cosine_with(&aa, &ba, zero_norm)
}

/// Reduce two weighted sets to score vectors over their common targets
///
/// Scores are ordered by target identifier (stable for repeated targets), so
/// position `i` of both vectors refers to the same target whenever each set
/// holds at most one entry per target.
pub fn extract_common_target_scores(
    a: &WeightedSet,
    b: &WeightedSet,
) -> Result<(Vec<f32>, Vec<f32>)> {
    let entries_a = a.parse_entries()?;
    let entries_b = b.parse_entries()?;

    let targets_a: AHashSet<&str> = entries_a.iter().map(|e| e.target).collect();
    let targets_b: AHashSet<&str> = entries_b.iter().map(|e| e.target).collect();

    Ok((
        common_scores(&entries_a, &targets_b),
        common_scores(&entries_b, &targets_a),
    ))
}

fn common_scores(entries: &[WeightedEntry<'_>], other_targets: &AHashSet<&str>) -> Vec<f32> {
    let mut common: Vec<&WeightedEntry<'_>> = entries
        .iter()
        .filter(|e| other_targets.contains(e.target))
        .collect();
    common.sort_by(|x, y| x.target.cmp(y.target));
    common.into_iter().map(|e| e.score as f32).collect()
}

/// Jaccard index over the raw entries: `|a ∩ b| / |a ∪ b|`
///
/// Two empty sets score `0.0`.
pub fn jaccard(a: &WeightedSet, b: &WeightedSet) -> f64 {
    let intersection = a.intersection_len(b);
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        return 0.0;
    }
    round_score(intersection as f64 / union as f64)
}

/// Overlap coefficient over the raw entries: `|a ∩ b| / min(|a|, |b|)`
///
/// Scores `0.0` when either set is empty.
pub fn overlap(a: &WeightedSet, b: &WeightedSet) -> f64 {
    let smaller = a.len().min(b.len());
    if smaller == 0 {
        return 0.0;
    }
    round_score(a.intersection_len(b) as f64 / smaller as f64)
}
