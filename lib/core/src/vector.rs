use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// A fixed-length feature vector
///
/// Serialized as a plain JSON array of numbers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(transparent)]
pub struct FeatureVector {
    data: Vec<f32>,
}

impl FeatureVector {
    #[inline]
    #[must_use]
    pub fn new(data: Vec<f32>) -> Self {
        Self { data }
    }

    #[inline]
    #[must_use]
    pub fn from_slice(data: &[f32]) -> Self {
        Self {
            data: data.to_vec(),
        }
    }

    #[inline]
    #[must_use]
    pub fn dim(&self) -> usize {
        self.data.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Fail with `DimensionMismatch` unless both vectors have the same length
    #[inline]
    pub fn check_dim(&self, other: &FeatureVector) -> Result<()> {
        check_dims(&self.data, &other.data)
    }

    /// Dot product with another vector of the same length
    #[inline]
    pub fn dot(&self, other: &FeatureVector) -> Result<f64> {
        self.check_dim(other)?;
        Ok(crate::simd::dot_product_simd(&self.data, &other.data))
    }

    /// Euclidean norm
    #[inline]
    pub fn norm(&self) -> f64 {
        crate::simd::norm_simd(&self.data)
    }
}

impl From<Vec<f32>> for FeatureVector {
    fn from(data: Vec<f32>) -> Self {
        Self::new(data)
    }
}

impl From<&[f32]> for FeatureVector {
    fn from(data: &[f32]) -> Self {
        Self::from_slice(data)
    }
}

impl AsRef<[f32]> for FeatureVector {
    fn as_ref(&self) -> &[f32] {
        &self.data
    }
}

/// Fail with `DimensionMismatch` unless both slices have the same length
#[inline]
pub fn check_dims(a: &[f32], b: &[f32]) -> Result<()> {
    if a.len() != b.len() {
        return Err(Error::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    Ok(())
}
