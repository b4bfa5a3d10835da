//! # Expanse
//!
//! A similarity ranking engine: for a source item, rank every other item of a
//! labeled collection by decreasing similarity, with an optional minimum
//! similarity and a top-K cap.
//!
//! Items are represented either as feature vectors (compared with cosine) or
//! as weighted sets of `target#score` entries (compared with cosine over
//! common targets, Jaccard or overlap). Measures are pluggable through the
//! [`Similarity`] trait.
//!
//! ## Quick Start
//!
//! ### From the Command Line
//!
//! ```bash
//! expanse rank --input people.json --source ann --knn 5
//! expanse shared --input skills.json --measure jaccard --cut above --threshold 0.5
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use expanse::prelude::*;
//!
//! let mut items = CandidateMap::new();
//! items.insert("x", FeatureVector::new(vec![1.0, 0.0]));
//! items.insert("y", FeatureVector::new(vec![0.0, 1.0]));
//! items.insert("z", FeatureVector::new(vec![0.9, 0.1]));
//!
//! let ranked = rank(&Cosine::default(), "x", &items, &RankConfig::new().with_knn(1)).unwrap();
//! assert_eq!(ranked[0].to, "z");
//! ```
//!
//! ## Crate Structure
//!
//! - `expanse-core` - Representations (FeatureVector, WeightedSet, CandidateMap), errors, SIMD
//! - `expanse-similarity` - Measures, ranking driver, pairwise and shared-preference ranking

pub mod io;

// Re-export core types
pub use expanse_core::{
    CandidateMap, FeatureVector, WeightedEntry, WeightedSet,
    Error, Result,
};

// Re-export similarity
pub use expanse_similarity::{
    rank, rank_pairwise, shared_preferences,
    Cosine, CosineSets, Jaccard, Overlap, MeasureKind, Representation, Similarity,
    Cut, PairwiseConfig, RankConfig, Ranker, SharedPrefConfig, SimilarityEntry,
    ZeroNormPolicy,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        CandidateMap, FeatureVector, WeightedEntry, WeightedSet,
        Error, Result,
        rank, rank_pairwise, shared_preferences,
        Cosine, CosineSets, Jaccard, Overlap, MeasureKind, Similarity,
        Cut, PairwiseConfig, RankConfig, Ranker, SharedPrefConfig, SimilarityEntry,
        ZeroNormPolicy,
    };
}

/// Similarity primitives
pub mod distance {
    pub use expanse_similarity::distance::{
        cosine, cosine_with, cosine_sets, cosine_sets_with, extract_common_target_scores,
        jaccard, overlap,
    };
}
