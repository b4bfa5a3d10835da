//! Insertion-ordered candidate maps
//!
//! The candidate map is the universe a ranking searches. Iteration order is
//! insertion order, which is also the tie-break order of ranked results, so
//! it has to survive construction from JSON as well.

use ahash::AHashMap;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;

/// Item key to representation, iterated in insertion order
#[derive(Debug, Clone)]
pub struct CandidateMap<R> {
    entries: Vec<(String, R)>,
    positions: AHashMap<String, usize>,
}

impl<R> CandidateMap<R> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            positions: AHashMap::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            positions: AHashMap::with_capacity(capacity),
        }
    }

    /// Insert or replace a representation
    ///
    /// A replaced key keeps its original position and the old value is returned.
    pub fn insert(&mut self, key: impl Into<String>, repr: R) -> Option<R> {
        let key = key.into();
        if let Some(&pos) = self.positions.get(&key) {
            return Some(std::mem::replace(&mut self.entries[pos].1, repr));
        }
        self.positions.insert(key.clone(), self.entries.len());
        self.entries.push((key, repr));
        None
    }

    #[inline]
    pub fn get(&self, key: &str) -> Option<&R> {
        self.positions.get(key).map(|&pos| &self.entries[pos].1)
    }

    #[inline]
    pub fn contains_key(&self, key: &str) -> bool {
        self.positions.contains_key(key)
    }

    /// Position of `key` in iteration order
    #[inline]
    pub fn position(&self, key: &str) -> Option<usize> {
        self.positions.get(key).copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &R)> + '_ {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Entries as a slice, in iteration order
    #[inline]
    pub fn as_slice(&self) -> &[(String, R)] {
        &self.entries
    }
}

impl<R> Default for CandidateMap<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: PartialEq> PartialEq for CandidateMap<R> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<K: Into<String>, R> FromIterator<(K, R)> for CandidateMap<R> {
    fn from_iter<I: IntoIterator<Item = (K, R)>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut map = CandidateMap::with_capacity(iter.size_hint().0);
        for (key, repr) in iter {
            map.insert(key, repr);
        }
        map
    }
}

impl<K: Into<String>, R> Extend<(K, R)> for CandidateMap<R> {
    fn extend<I: IntoIterator<Item = (K, R)>>(&mut self, iter: I) {
        for (key, repr) in iter {
            self.insert(key, repr);
        }
    }
}

impl<R: Serialize> Serialize for CandidateMap<R> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, repr) in &self.entries {
            map.serialize_entry(key, repr)?;
        }
        map.end()
    }
}

struct CandidateMapVisitor<R>(PhantomData<R>);

impl<'de, R: Deserialize<'de>> Visitor<'de> for CandidateMapVisitor<R> {
    type Value = CandidateMap<R>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of item keys to representations")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut map = CandidateMap::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((key, repr)) = access.next_entry::<String, R>()? {
            map.insert(key, repr);
        }
        Ok(map)
    }
}

impl<'de, R: Deserialize<'de>> Deserialize<'de> for CandidateMap<R> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(CandidateMapVisitor(PhantomData))
    }
}
