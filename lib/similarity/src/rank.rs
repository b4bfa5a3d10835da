//! Ranking driver
//!
//! Scores a source item against every other item of a candidate map and
//! returns the neighbours sorted by decreasing similarity, optionally
//! filtered by a minimum similarity and truncated to the top-K.

use crate::measure::Similarity;
use expanse_core::{round_score, CandidateMap, Error, Result};
use ordered_float::OrderedFloat;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use tracing::debug;

/// Candidate maps at least this large are scored on the rayon pool
pub const PARALLEL_THRESHOLD: usize = 1024;

/// One scored (source, candidate) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityEntry {
    pub from: String,
    pub to: String,
    pub sim: f64,
}

impl SimilarityEntry {
    pub fn new(from: impl Into<String>, to: impl Into<String>, sim: f64) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            sim,
        }
    }
}

/// Optional filtering applied to a ranking
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankConfig {
    /// Inclusive minimum similarity, applied before truncation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cutoff: Option<f64>,

    /// Maximum number of results, applied after cutoff and sort
    #[serde(skip_serializing_if = "Option::is_none")]
    pub knn: Option<usize>,
}

impl RankConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cutoff(mut self, cutoff: f64) -> Self {
        self.cutoff = Some(cutoff);
        self
    }

    pub fn with_knn(mut self, knn: usize) -> Self {
        self.knn = Some(knn);
        self
    }

    pub fn validate(&self) -> Result<()> {
        match self.cutoff {
            Some(cutoff) if !cutoff.is_finite() => {
                Err(Error::InvalidConfig("cutoff must be a finite number".to_string()))
            }
            _ => Ok(()),
        }
    }
}

/// Stable sort by similarity, highest first. Equal scores keep their order.
pub fn sort_by_similarity(entries: &mut [SimilarityEntry]) {
    entries.sort_by_key(|e| Reverse(OrderedFloat(e.sim)));
}

/// Rank every other candidate by similarity to `source`
///
/// # Errors
/// - `UnknownKey` when `source` is not in `candidates`
/// - the first error the measure returns, in candidate order
/// - `UndefinedSimilarity` when the measure returns NaN
///
/// # Example
/// ```rust
/// use expanse_core::{CandidateMap, FeatureVector};
/// use expanse_similarity::{rank, Cosine, RankConfig};
///
/// let items: CandidateMap<FeatureVector> = [
///     ("x", FeatureVector::new(vec![1.0, 0.0])),
///     ("y", FeatureVector::new(vec![1.0, 1.0])),
///     ("z", FeatureVector::new(vec![0.0, 1.0])),
/// ]
/// .into_iter()
/// .collect();
///
/// let top = rank(&Cosine::default(), "x", &items, &RankConfig::new().with_knn(1)).unwrap();
/// assert_eq!(top.len(), 1);
/// assert_eq!(top[0].to, "y");
/// ```
pub fn rank<R, S>(
    measure: &S,
    source: &str,
    candidates: &CandidateMap<R>,
    config: &RankConfig,
) -> Result<Vec<SimilarityEntry>>
where
    R: Sync,
    S: Similarity<R> + ?Sized,
{
    config.validate()?;

    let source_pos = candidates
        .position(source)
        .ok_or_else(|| Error::UnknownKey(source.to_string()))?;
    let entries = candidates.as_slice();
    let source_repr = &entries[source_pos].1;

    // Built-in measures already round; custom ones may not. Rounding never
    // produces NaN, so the check comes after it.
    let score = |(i, (_, repr)): (usize, &(String, R))| -> Result<(usize, f64)> {
        let sim = round_score(measure.similarity(source_repr, repr)?);
        if sim.is_nan() {
            return Err(Error::UndefinedSimilarity);
        }
        Ok((i, sim))
    };

    // The parallel path collects in candidate order, so the reported error
    // and the tie order match the sequential path, which stops at the first
    // failing candidate.
    let scores: Vec<(usize, f64)> = if entries.len() >= PARALLEL_THRESHOLD {
        entries
            .par_iter()
            .enumerate()
            .filter(|(i, _)| *i != source_pos)
            .map(&score)
            .collect::<Vec<_>>()
            .into_iter()
            .collect::<Result<_>>()?
    } else {
        entries
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != source_pos)
            .map(&score)
            .collect::<Result<_>>()?
    };

    let mut result: Vec<SimilarityEntry> = scores
        .into_iter()
        .filter(|(_, sim)| config.cutoff.map_or(true, |cutoff| *sim >= cutoff))
        .map(|(i, sim)| SimilarityEntry::new(source, entries[i].0.as_str(), sim))
        .collect();

    sort_by_similarity(&mut result);
    if let Some(knn) = config.knn {
        result.truncate(knn);
    }
    sort_by_similarity(&mut result);

    debug!(
        source,
        candidates = entries.len() - 1,
        returned = result.len(),
        "ranked candidates"
    );

    Ok(result)
}

/// A measure bundled with a ranking configuration
#[derive(Debug, Clone, Default)]
pub struct Ranker<S> {
    measure: S,
    config: RankConfig,
}

impl<S> Ranker<S> {
    pub fn new(measure: S) -> Self {
        Self {
            measure,
            config: RankConfig::default(),
        }
    }

    pub fn with_config(mut self, config: RankConfig) -> Self {
        self.config = config;
        self
    }

    pub fn measure(&self) -> &S {
        &self.measure
    }

    pub fn config(&self) -> &RankConfig {
        &self.config
    }

    /// Rank the neighbours of `source`
    pub fn rank<R>(&self, source: &str, candidates: &CandidateMap<R>) -> Result<Vec<SimilarityEntry>>
    where
        R: Sync,
        S: Similarity<R>,
    {
        rank(&self.measure, source, candidates, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::{Cosine, CosineSets, Jaccard};
    use expanse_core::{FeatureVector, WeightedSet};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn vectors(items: &[(&str, Vec<f32>)]) -> CandidateMap<FeatureVector> {
        items
            .iter()
            .map(|(k, v)| (*k, FeatureVector::new(v.clone())))
            .collect()
    }

    fn sample() -> CandidateMap<FeatureVector> {
        vectors(&[
            ("x", vec![1.0, 0.0]),
            ("y", vec![0.0, 1.0]),
            ("z", vec![1.0, 1.0]),
            ("w", vec![2.0, 0.1]),
        ])
    }

    fn assert_sorted(entries: &[SimilarityEntry]) {
        for pair in entries.windows(2) {
            assert!(pair[0].sim >= pair[1].sim, "{:?} before {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_rank_sorted_and_excludes_source() {
        let result = rank(&Cosine::default(), "x", &sample(), &RankConfig::default()).unwrap();
        assert_eq!(result.len(), 3);
        assert!(result.iter().all(|e| e.from == "x" && e.to != "x"));
        assert_eq!(
            result.iter().map(|e| e.to.as_str()).collect::<Vec<_>>(),
            vec!["w", "z", "y"]
        );
        assert_sorted(&result);
    }

    #[test]
    fn test_rank_knn_picks_best() {
        let items = vectors(&[
            ("x", vec![1.0, 0.0, 0.0]),
            ("y", vec![0.0, 1.0, 0.0]),
            ("z", vec![0.9, 0.1, 0.0]),
        ]);
        let result = rank(&Cosine::default(), "x", &items, &RankConfig::new().with_knn(1)).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].to, "z");
    }

    #[test]
    fn test_rank_knn_bounds() {
        let items = sample();
        for knn in 0..6 {
            let result = rank(&Cosine::default(), "y", &items, &RankConfig::new().with_knn(knn)).unwrap();
            assert_eq!(result.len(), knn.min(items.len() - 1));
        }
    }

    #[test]
    fn test_rank_cutoff_inclusive() {
        // cosine(x, z) == 0.70711
        let config = RankConfig::new().with_cutoff(0.70711);
        let result = rank(&Cosine::default(), "x", &sample(), &config).unwrap();
        assert_eq!(
            result.iter().map(|e| e.to.as_str()).collect::<Vec<_>>(),
            vec!["w", "z"]
        );
    }

    #[test]
    fn test_rank_cutoff_monotonic() {
        let items = sample();
        let loose = rank(&Cosine::default(), "z", &items, &RankConfig::new().with_cutoff(0.1)).unwrap();
        let strict = rank(&Cosine::default(), "z", &items, &RankConfig::new().with_cutoff(0.8)).unwrap();
        assert!(strict.len() <= loose.len());
        assert!(strict.iter().all(|e| loose.contains(e)));
    }

    #[test]
    fn test_rank_cutoff_then_knn() {
        let config = RankConfig::new().with_cutoff(0.5).with_knn(5);
        let result = rank(&Cosine::default(), "x", &sample(), &config).unwrap();
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_rank_ties_keep_insertion_order() {
        let items = vectors(&[
            ("src", vec![1.0, 0.0]),
            ("b", vec![0.0, 1.0]),
            ("a", vec![2.0, 0.0]),
            ("c", vec![0.0, 3.0]),
            ("d", vec![5.0, 0.0]),
        ]);
        let result = rank(&Cosine::default(), "src", &items, &RankConfig::default()).unwrap();
        assert_eq!(
            result.iter().map(|e| e.to.as_str()).collect::<Vec<_>>(),
            vec!["a", "d", "b", "c"]
        );
    }

    #[test]
    fn test_rank_unknown_source() {
        let result = rank(&Cosine::default(), "missing", &sample(), &RankConfig::default());
        assert_eq!(result, Err(Error::UnknownKey("missing".to_string())));
    }

    #[test]
    fn test_rank_single_item_is_empty() {
        let items = vectors(&[("only", vec![1.0, 2.0])]);
        let result = rank(&Cosine::default(), "only", &items, &RankConfig::default()).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_rank_dimension_mismatch_fails_fast() {
        let items = vectors(&[
            ("x", vec![1.0, 0.0]),
            ("y", vec![0.0, 1.0]),
            ("bad", vec![1.0, 0.0, 0.0]),
        ]);
        let result = rank(&Cosine::default(), "x", &items, &RankConfig::default());
        assert_eq!(result, Err(Error::DimensionMismatch { left: 2, right: 3 }));
    }

    #[test]
    fn test_rank_rejects_nan_scores() {
        let nan = |_: &FeatureVector, _: &FeatureVector| -> Result<f64> { Ok(f64::NAN) };
        let result = rank(&nan, "x", &sample(), &RankConfig::default());
        assert_eq!(result, Err(Error::UndefinedSimilarity));
    }

    #[test]
    fn test_rank_rejects_non_finite_cutoff() {
        for cutoff in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let config = RankConfig::new().with_cutoff(cutoff);
            let result = rank(&Cosine::default(), "x", &sample(), &config);
            assert!(matches!(result, Err(Error::InvalidConfig(_))));
        }
    }

    #[test]
    fn test_rank_subnormal_custom_scores() {
        let tiny = |_: &FeatureVector, _: &FeatureVector| -> Result<f64> { Ok(1e-320) };
        let result = rank(&tiny, "x", &sample(), &RankConfig::default()).unwrap();
        assert_eq!(result.len(), 3);
        assert!(result.iter().all(|e| e.sim == 1e-320));
    }

    #[test]
    fn test_rank_stops_at_first_error() {
        let calls = AtomicUsize::new(0);
        let failing = |_: &FeatureVector, _: &FeatureVector| -> Result<f64> {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(Error::UndefinedSimilarity)
        };
        let result = rank(&failing, "x", &sample(), &RankConfig::default());
        assert_eq!(result, Err(Error::UndefinedSimilarity));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_rank_weighted_sets() {
        let sets: CandidateMap<WeightedSet> = [
            ("a", ["t1#3", "t2#5"].into_iter().collect::<WeightedSet>()),
            ("b", ["t1#3", "t3#9"].into_iter().collect()),
            ("c", ["t4#1"].into_iter().collect()),
        ]
        .into_iter()
        .collect();

        let result = rank(&CosineSets::default(), "a", &sets, &RankConfig::default()).unwrap();
        assert_eq!(result[0], SimilarityEntry::new("a", "b", 1.0));
        assert_eq!(result[1], SimilarityEntry::new("a", "c", 0.0));

        let result = rank(&Jaccard, "a", &sets, &RankConfig::new().with_cutoff(0.1)).unwrap();
        assert_eq!(result, vec![SimilarityEntry::new("a", "b", 0.33333)]);
    }

    #[test]
    fn test_rank_parallel_matches_sequential_order() {
        let n = PARALLEL_THRESHOLD + 10;
        let items: CandidateMap<FeatureVector> = (0..n)
            .map(|i| {
                // Many exact ties: only 7 distinct directions
                let angle = (i % 7) as f32 * 0.2;
                (format!("item-{i}"), FeatureVector::new(vec![angle.cos(), angle.sin()]))
            })
            .collect();

        let result = rank(&Cosine::default(), "item-0", &items, &RankConfig::default()).unwrap();
        assert_eq!(result.len(), n - 1);
        assert_sorted(&result);

        // Ties keep candidate order
        let positions: Vec<usize> = result
            .iter()
            .map(|e| items.position(&e.to).unwrap())
            .collect();
        for (pair, idx) in result.windows(2).zip(positions.windows(2)) {
            if pair[0].sim == pair[1].sim {
                assert!(idx[0] < idx[1]);
            }
        }
    }

    #[test]
    fn test_rank_rounds_custom_scores() {
        let third = |_: &FeatureVector, _: &FeatureVector| -> Result<f64> { Ok(1.0 / 3.0) };
        let result = rank(&third, "x", &sample(), &RankConfig::default()).unwrap();
        assert!(result.iter().all(|e| e.sim == 0.33333));
    }

    #[test]
    fn test_ranker() {
        let ranker = Ranker::new(Cosine::default()).with_config(RankConfig::new().with_knn(2));
        let result = ranker.rank("x", &sample()).unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(ranker.config().knn, Some(2));
    }

    #[test]
    fn test_config_serde() {
        let config: RankConfig = serde_json::from_str(r#"{"knn": 3}"#).unwrap();
        assert_eq!(config, RankConfig::new().with_knn(3));
        assert_eq!(serde_json::to_string(&RankConfig::new()).unwrap(), "{}");
    }
}
