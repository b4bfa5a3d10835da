//! Pluggable similarity measures
//!
//! The ranking driver only depends on [`Similarity`]. Concrete strategies
//! wrap the primitives in [`distance`](crate::distance); any closure of the
//! shape `Fn(&R, &R) -> Result<f64>` works as a custom measure.

use crate::distance::{self, ZeroNormPolicy};
use expanse_core::{FeatureVector, Result, WeightedSet};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A similarity measure over representations of type `R`
pub trait Similarity<R: ?Sized>: Send + Sync {
    /// Score two representations of the same kind. Higher means more similar.
    fn similarity(&self, a: &R, b: &R) -> Result<f64>;
}

impl<R: ?Sized, F> Similarity<R> for F
where
    F: Fn(&R, &R) -> Result<f64> + Send + Sync,
{
    #[inline]
    fn similarity(&self, a: &R, b: &R) -> Result<f64> {
        self(a, b)
    }
}

/// Cosine similarity between feature vectors
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cosine {
    pub zero_norm: ZeroNormPolicy,
}

impl Cosine {
    pub fn new(zero_norm: ZeroNormPolicy) -> Self {
        Self { zero_norm }
    }
}

impl Similarity<FeatureVector> for Cosine {
    fn similarity(&self, a: &FeatureVector, b: &FeatureVector) -> Result<f64> {
        distance::cosine_with(a.as_slice(), b.as_slice(), self.zero_norm)
    }
}

impl Similarity<[f32]> for Cosine {
    fn similarity(&self, a: &[f32], b: &[f32]) -> Result<f64> {
        distance::cosine_with(a, b, self.zero_norm)
    }
}

/// Cosine over the scores of common targets of two weighted sets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CosineSets {
    pub zero_norm: ZeroNormPolicy,
}

impl CosineSets {
    pub fn new(zero_norm: ZeroNormPolicy) -> Self {
        Self { zero_norm }
    }
}

impl Similarity<WeightedSet> for CosineSets {
    fn similarity(&self, a: &WeightedSet, b: &WeightedSet) -> Result<f64> {
        distance::cosine_sets_with(a, b, self.zero_norm)
    }
}

/// Jaccard index over raw weighted-set entries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Jaccard;

impl Similarity<WeightedSet> for Jaccard {
    fn similarity(&self, a: &WeightedSet, b: &WeightedSet) -> Result<f64> {
        Ok(distance::jaccard(a, b))
    }
}

/// Overlap coefficient over raw weighted-set entries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Overlap;

impl Similarity<WeightedSet> for Overlap {
    fn similarity(&self, a: &WeightedSet, b: &WeightedSet) -> Result<f64> {
        Ok(distance::overlap(a, b))
    }
}

/// Which kind of representation a measure compares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Representation {
    Vector,
    Set,
}

/// Built-in measures selectable by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MeasureKind {
    #[default]
    Cosine,
    CosineSets,
    Jaccard,
    Overlap,
}

impl MeasureKind {
    pub fn name(&self) -> &'static str {
        match self {
            MeasureKind::Cosine => "cosine",
            MeasureKind::CosineSets => "cosine-sets",
            MeasureKind::Jaccard => "jaccard",
            MeasureKind::Overlap => "overlap",
        }
    }

    pub fn representation(&self) -> Representation {
        match self {
            MeasureKind::Cosine => Representation::Vector,
            MeasureKind::CosineSets | MeasureKind::Jaccard | MeasureKind::Overlap => {
                Representation::Set
            }
        }
    }

    /// The set measure for this kind, `None` for vector measures
    pub fn set_measure(&self, zero_norm: ZeroNormPolicy) -> Option<Box<dyn Similarity<WeightedSet>>> {
        match self {
            MeasureKind::Cosine => None,
            MeasureKind::CosineSets => Some(Box::new(CosineSets::new(zero_norm))),
            MeasureKind::Jaccard => Some(Box::new(Jaccard)),
            MeasureKind::Overlap => Some(Box::new(Overlap)),
        }
    }
}

impl fmt::Display for MeasureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MeasureKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "cosine" => Ok(MeasureKind::Cosine),
            "cosine-sets" => Ok(MeasureKind::CosineSets),
            "jaccard" => Ok(MeasureKind::Jaccard),
            "overlap" => Ok(MeasureKind::Overlap),
            other => Err(format!(
                "unknown measure '{other}' (expected cosine, cosine-sets, jaccard or overlap)"
            )),
        }
    }
}
