//! # Expanse Similarity
//!
//! Similarity measures and the ranking driver.
//!
//! Given a [`CandidateMap`](expanse_core::CandidateMap) of representations and
//! a measure, [`rank`] returns the other items ordered by decreasing
//! similarity to a source item, optionally cut at a minimum similarity and
//! truncated to the top-K.
//!
//! ## Features
//!
//! - **Pluggable measures**: anything implementing [`Similarity`], closures included
//! - **Built-in measures**: [`Cosine`], [`CosineSets`], [`Jaccard`], [`Overlap`]
//! - **Deterministic output**: scores rounded to 5 significant digits, stable tie order
//! - **Pairwise ranking**: [`rank_pairwise`] and the [`shared_preferences`] filter
//!
//! ## Example
//!
//! ```rust
//! use expanse_core::{CandidateMap, WeightedSet};
//! use expanse_similarity::{rank, Jaccard, RankConfig};
//!
//! let mut skills = CandidateMap::new();
//! skills.insert("ann", ["rust", "sql", "go"].into_iter().collect::<WeightedSet>());
//! skills.insert("bob", ["rust", "sql"].into_iter().collect());
//! skills.insert("eve", ["cobol"].into_iter().collect());
//!
//! let similar = rank(&Jaccard, "ann", &skills, &RankConfig::new().with_cutoff(0.1)).unwrap();
//! assert_eq!(similar.len(), 1);
//! assert_eq!(similar[0].to, "bob");
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Candidate  │────>│   Ranking   │────>│   Result    │
//! │     Map     │     │   Driver    │     │    List     │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                            │                   │
//!                     ┌─────────────┐     ┌─────────────┐
//!                     │ Similarity  │     │  Pairwise / │
//!                     │  (measure)  │     │ Shared pref │
//!                     └─────────────┘     └─────────────┘
//! ```

pub mod distance;
pub mod measure;
pub mod pairwise;
pub mod rank;

// Re-export main types for convenience
pub use distance::{cosine, cosine_sets, extract_common_target_scores, jaccard, overlap, ZeroNormPolicy};
pub use measure::{Cosine, CosineSets, Jaccard, MeasureKind, Overlap, Representation, Similarity};
pub use pairwise::{rank_pairwise, shared_preferences, Cut, PairwiseConfig, SharedPrefConfig};
pub use rank::{rank, sort_by_similarity, RankConfig, Ranker, SimilarityEntry, PARALLEL_THRESHOLD};
