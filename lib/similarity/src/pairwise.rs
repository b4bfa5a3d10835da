//! Pairwise and shared-preference ranking
//!
//! Both are compositions of [`rank`]: pairwise ranking applies it once per
//! item and filters the combined list, the shared-preference filter keeps
//! only the pairs on one side of a similarity threshold.

use crate::measure::Similarity;
use crate::rank::{rank, sort_by_similarity, RankConfig, SimilarityEntry};
use ahash::AHashSet;
use expanse_core::{CandidateMap, Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

/// Configuration for [`rank_pairwise`]
///
/// Unlike [`RankConfig`], the cutoff has a direction and `knn` caps the
/// combined list rather than each source's neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PairwiseConfig {
    /// Inclusive threshold, kept on the side given by `cut`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cutoff: Option<f64>,

    /// Side of `cutoff` to keep; pairwise ranking keeps `Above` by default
    pub cut: Cut,

    /// Maximum number of pairs in the combined result
    #[serde(skip_serializing_if = "Option::is_none")]
    pub knn: Option<usize>,

    /// Keep only the first of `(a, b)` and `(b, a)`
    pub dedup_symmetric: bool,
}

impl Default for PairwiseConfig {
    fn default() -> Self {
        Self {
            cutoff: None,
            cut: Cut::Above,
            knn: None,
            dedup_symmetric: false,
        }
    }
}

impl PairwiseConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cutoff(mut self, cutoff: f64) -> Self {
        self.cutoff = Some(cutoff);
        self
    }

    pub fn with_cut(mut self, cut: Cut) -> Self {
        self.cut = cut;
        self
    }

    pub fn with_knn(mut self, knn: usize) -> Self {
        self.knn = Some(knn);
        self
    }

    pub fn with_dedup_symmetric(mut self, dedup: bool) -> Self {
        self.dedup_symmetric = dedup;
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

/// Which side of the threshold a shared-preference filter keeps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cut {
    /// `sim <= threshold`
    #[default]
    Below,
    /// `sim >= threshold`
    Above,
}

impl Cut {
    #[inline]
    pub fn keeps(&self, sim: f64, threshold: f64) -> bool {
        match self {
            Cut::Below => sim <= threshold,
            Cut::Above => sim >= threshold,
        }
    }
}

impl FromStr for Cut {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "below" => Ok(Cut::Below),
            "above" => Ok(Cut::Above),
            other => Err(format!("unknown cut '{other}' (expected below or above)")),
        }
    }
}

/// Configuration for [`shared_preferences`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SharedPrefConfig {
    #[serde(default)]
    pub cut: Cut,
    pub threshold: f64,
}

impl SharedPrefConfig {
    pub fn below(threshold: f64) -> Self {
        Self { cut: Cut::Below, threshold }
    }

    pub fn above(threshold: f64) -> Self {
        Self { cut: Cut::Above, threshold }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.threshold.is_finite() {
            return Err(Error::InvalidConfig("threshold must be a finite number".to_string()));
        }
        Ok(())
    }
}

/// Rank every item against all others
///
/// Sources are visited in insertion order; the combined list is stably
/// sorted by similarity, so equal scores keep source-then-candidate order.
/// The cutoff and `knn` apply to the combined list: `knn = 10` returns the
/// ten most similar pairs overall.
pub fn rank_pairwise<R, S>(
    measure: &S,
    candidates: &CandidateMap<R>,
    config: &PairwiseConfig,
) -> Result<Vec<SimilarityEntry>>
where
    R: Sync,
    S: Similarity<R> + ?Sized,
{
    config.validate()?;

    let unfiltered = RankConfig::default();
    let mut result = Vec::new();
    for source in candidates.keys() {
        result.extend(rank(measure, source, candidates, &unfiltered)?);
    }

    if config.dedup_symmetric {
        let mut seen: AHashSet<(String, String)> = AHashSet::with_capacity(result.len());
        result.retain(|e| {
            let pair = if e.from <= e.to {
                (e.from.clone(), e.to.clone())
            } else {
                (e.to.clone(), e.from.clone())
            };
            seen.insert(pair)
        });
    }

    if let Some(cutoff) = config.cutoff {
        result.retain(|e| config.cut.keeps(e.sim, cutoff));
    }

    sort_by_similarity(&mut result);
    if let Some(knn) = config.knn {
        result.truncate(knn);
    }

    debug!(items = candidates.len(), pairs = result.len(), "ranked pairwise");
    Ok(result)
}

/// All ordered pairs whose similarity falls on the kept side of the threshold
///
/// With `n` items and a threshold that admits every score the result holds
/// `n * (n - 1)` entries.
pub fn shared_preferences<R, S>(
    measure: &S,
    candidates: &CandidateMap<R>,
    config: &SharedPrefConfig,
) -> Result<Vec<SimilarityEntry>>
where
    R: Sync,
    S: Similarity<R> + ?Sized,
{
    config.validate()?;

    let pairwise = PairwiseConfig::new()
        .with_cutoff(config.threshold)
        .with_cut(config.cut);
    let result = rank_pairwise(measure, candidates, &pairwise)?;

    debug!(
        cut = ?config.cut,
        threshold = config.threshold,
        kept = result.len(),
        "filtered shared preferences"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::{Cosine, Jaccard};
    use expanse_core::{FeatureVector, WeightedSet};

    fn sample() -> CandidateMap<FeatureVector> {
        [
            ("x", vec![1.0, 0.0]),
            ("y", vec![0.0, 1.0]),
            ("z", vec![1.0, 1.0]),
        ]
        .into_iter()
        .map(|(k, v)| (k, FeatureVector::new(v)))
        .collect()
    }

    /// Person `i` likes the `width` people after them on a ring of `n`
    fn ring(n: usize, width: usize) -> CandidateMap<WeightedSet> {
        (0..n)
            .map(|i| {
                let liked: WeightedSet = (0..width).map(|j| format!("p{}", (i + j) % n)).collect();
                (format!("p{i}"), liked)
            })
            .collect()
    }

    #[test]
    fn test_pairwise_all_ordered_pairs() {
        let result = rank_pairwise(&Cosine::default(), &sample(), &PairwiseConfig::default()).unwrap();
        assert_eq!(result.len(), 6);
        assert!(result.iter().all(|e| e.from != e.to));
        assert!(result.windows(2).all(|p| p[0].sim >= p[1].sim));
    }

    #[test]
    fn test_pairwise_dedup_symmetric() {
        let config = PairwiseConfig {
            dedup_symmetric: true,
            ..Default::default()
        };
        let result = rank_pairwise(&Cosine::default(), &sample(), &config).unwrap();
        assert_eq!(result.len(), 3);
        // First occurrence wins: x is visited before z and y
        assert_eq!(result[0], SimilarityEntry::new("x", "z", 0.70711));
        assert_eq!(result[1], SimilarityEntry::new("y", "z", 0.70711));
        assert_eq!(result[2], SimilarityEntry::new("x", "y", 0.0));
    }

    #[test]
    fn test_pairwise_knn_is_global() {
        let config = PairwiseConfig::new().with_knn(1);
        let result = rank_pairwise(&Cosine::default(), &sample(), &config).unwrap();
        assert_eq!(result, vec![SimilarityEntry::new("x", "z", 0.70711)]);

        let people = ring(20, 5);
        let result = rank_pairwise(&Jaccard, &people, &PairwiseConfig::new().with_knn(10)).unwrap();
        assert_eq!(result.len(), 10);

        let all = rank_pairwise(&Jaccard, &people, &PairwiseConfig::default()).unwrap();
        assert_eq!(result[..], all[..10]);
    }

    #[test]
    fn test_pairwise_cutoff_below_with_knn() {
        let people = ring(20, 5);
        let config = PairwiseConfig::new()
            .with_knn(10)
            .with_cut(Cut::Below)
            .with_cutoff(0.9);
        let result = rank_pairwise(&Jaccard, &people, &config).unwrap();
        assert_eq!(result.len(), 10);
        assert!(result.iter().all(|e| e.sim <= 0.9));
        assert!(result.windows(2).all(|p| p[0].sim >= p[1].sim));
    }

    #[test]
    fn test_pairwise_cutoff_above_is_default() {
        let config = PairwiseConfig::new().with_cutoff(0.5);
        let result = rank_pairwise(&Cosine::default(), &sample(), &config).unwrap();
        assert_eq!(result.len(), 4);
        assert!(result.iter().all(|e| e.sim >= 0.5));
    }

    #[test]
    fn test_pairwise_rejects_non_finite_cutoff() {
        for cutoff in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let config = PairwiseConfig::new().with_cutoff(cutoff);
            let result = rank_pairwise(&Cosine::default(), &sample(), &config);
            assert!(matches!(result, Err(Error::InvalidConfig(_))));
        }
    }

    #[test]
    fn test_shared_preferences_below_keeps_everything() {
        let people = ring(20, 5);
        let result = shared_preferences(&Jaccard, &people, &SharedPrefConfig::below(0.99)).unwrap();
        assert_eq!(result.len(), 20 * 19);
    }

    #[test]
    fn test_shared_preferences_above() {
        let result = shared_preferences(&Cosine::default(), &sample(), &SharedPrefConfig::above(0.5)).unwrap();
        assert_eq!(result.len(), 4);
        assert!(result.iter().all(|e| e.sim >= 0.5));
        assert!(result.iter().all(|e| e.from == "z" || e.to == "z"));
    }

    #[test]
    fn test_shared_preferences_invalid_threshold() {
        for threshold in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let result = shared_preferences(&Cosine::default(), &sample(), &SharedPrefConfig::below(threshold));
            assert!(matches!(result, Err(Error::InvalidConfig(_))));
        }
    }

    #[test]
    fn test_cut_parsing_and_serde() {
        assert_eq!("Above".parse::<Cut>().unwrap(), Cut::Above);
        assert!("sideways".parse::<Cut>().is_err());
        let config: SharedPrefConfig = serde_json::from_str(r#"{"threshold": 0.3}"#).unwrap();
        assert_eq!(config, SharedPrefConfig::below(0.3));
    }

    #[test]
    fn test_pairwise_config_serde() {
        let config: PairwiseConfig =
            serde_json::from_str(r#"{"cutoff": 0.2, "knn": 10, "dedup_symmetric": true}"#).unwrap();
        assert_eq!(
            config,
            PairwiseConfig::new().with_cutoff(0.2).with_knn(10).with_dedup_symmetric(true)
        );
        assert_eq!(config.cut, Cut::Above);

        let config: PairwiseConfig = serde_json::from_str(r#"{"cut": "below", "cutoff": 0.9}"#).unwrap();
        assert_eq!(config.cut, Cut::Below);
    }
}
