//! # Expanse Core
//!
//! Core types for the Expanse similarity ranking engine.
//!
//! This crate provides the representations that similarity measures compare:
//!
//! - [`FeatureVector`] - Dense f32 vector with SIMD dot product and norm
//! - [`WeightedSet`] - Set of `target#score` entries
//! - [`CandidateMap`] - Insertion-ordered map of item keys to representations
//! - [`round_score`] - Fixed-precision rounding applied to every score
//!
//! ## Example
//!
//! ```rust
//! use expanse_core::{CandidateMap, FeatureVector, WeightedEntry};
//!
//! let mut items = CandidateMap::new();
//! items.insert("x", FeatureVector::new(vec![1.0, 0.0]));
//! items.insert("y", FeatureVector::new(vec![0.0, 1.0]));
//! assert_eq!(items.keys().collect::<Vec<_>>(), vec!["x", "y"]);
//!
//! let entry = WeightedEntry::parse("skill-7#0.5").unwrap();
//! assert_eq!(entry.target, "skill-7");
//! ```

pub mod candidates;
pub mod error;
pub mod precision;
pub mod vector;
pub mod weighted;

/// SIMD-optimized vector operations
///
/// Dot product and norm with f64 accumulation:
/// - AVX2/FMA on x86_64
/// - NEON on ARM64/Apple Silicon
pub mod simd;

pub use candidates::CandidateMap;
pub use error::{Error, Result};
pub use precision::{round_score, round_significant, PRECISION};
pub use vector::{check_dims, FeatureVector};
pub use weighted::{WeightedEntry, WeightedSet, ENTRY_DELIMITER};
