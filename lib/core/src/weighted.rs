//! Weighted sets of `target#score` entries
//!
//! A weighted set is a sparse weighted relation: each entry names a target
//! identifier and carries a score, encoded as a single string such as
//! `"skill-42#0.73"`. Set measures like Jaccard compare the raw entries,
//! score-aware measures parse them with [`WeightedEntry::parse`].

use crate::{Error, Result};
use ahash::AHashSet;
use serde::{Deserialize, Serialize};

/// Separator between target identifier and score
pub const ENTRY_DELIMITER: char = '#';

/// A parsed `target#score` entry borrowing from its raw string
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedEntry<'a> {
    pub target: &'a str,
    pub score: f64,
}

impl<'a> WeightedEntry<'a> {
    /// Split on the final delimiter: everything before it is the target,
    /// the final component is the score.
    pub fn parse(raw: &'a str) -> Result<Self> {
        let (target, score) = raw
            .rsplit_once(ENTRY_DELIMITER)
            .ok_or_else(|| Error::InvalidEntry(raw.to_string()))?;

        let score: f64 = score
            .trim()
            .parse()
            .map_err(|_| Error::InvalidEntry(raw.to_string()))?;
        // Scores are compared as f32 components
        if !score.is_finite() || !(score as f32).is_finite() {
            return Err(Error::InvalidEntry(raw.to_string()));
        }

        Ok(Self { target, score })
    }

    /// Encode a target and score back into the raw entry form
    pub fn encode(target: &str, score: f64) -> String {
        format!("{target}{ENTRY_DELIMITER}{score}")
    }
}

/// A set of raw weighted entries, iterated in insertion order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct WeightedSet {
    entries: Vec<String>,
    index: AHashSet<String>,
}

impl WeightedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a raw entry. Returns `false` if it was already present.
    pub fn insert(&mut self, entry: impl Into<String>) -> bool {
        let entry = entry.into();
        if self.index.contains(&entry) {
            return false;
        }
        self.index.insert(entry.clone());
        self.entries.push(entry);
        true
    }

    /// Insert a `target#score` entry built from its parts
    pub fn insert_scored(&mut self, target: &str, score: f64) -> bool {
        self.insert(WeightedEntry::encode(target, score))
    }

    #[inline]
    pub fn contains(&self, entry: &str) -> bool {
        self.index.contains(entry)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Raw entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(String::as_str)
    }

    /// Parse every entry, failing on the first malformed one
    pub fn parse_entries(&self) -> Result<Vec<WeightedEntry<'_>>> {
        self.iter().map(WeightedEntry::parse).collect()
    }

    /// Number of raw entries present in both sets
    pub fn intersection_len(&self, other: &WeightedSet) -> usize {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        small.iter().filter(|e| large.contains(e)).count()
    }
}

impl PartialEq for WeightedSet {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl From<Vec<String>> for WeightedSet {
    fn from(entries: Vec<String>) -> Self {
        entries.into_iter().collect()
    }
}

impl From<WeightedSet> for Vec<String> {
    fn from(set: WeightedSet) -> Self {
        set.entries
    }
}

impl<S: Into<String>> FromIterator<S> for WeightedSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = WeightedSet::new();
        for entry in iter {
            set.insert(entry);
        }
        set
    }
}
