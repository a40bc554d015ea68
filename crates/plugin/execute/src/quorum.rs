//! Byzantine fault tolerant merge of untrusted observations.

use alloy_primitives::{B256, keccak256};
use core::fmt;
use serde::Serialize;
use std::collections::BTreeMap;

/// Fingerprints `item` as the keccak256 hash of its canonical JSON encoding.
///
/// Equal values always serialize identically, so they share a fingerprint.
pub fn content_fingerprint<T: Serialize>(item: &T) -> B256 {
    // Plain data types with string keyed maps only; serialization cannot fail.
    serde_json::to_vec(item).map(keccak256).unwrap_or_default()
}

/// Counts observations of items by fingerprint and yields the ones seen at least `min` times.
///
/// The first item seen for a fingerprint is the one kept. [`QuorumFilter::add`] never fails and
/// the valid set of an empty filter is empty. Output is ordered by fingerprint, so every node
/// derives the same order from the same observations.
pub struct QuorumFilter<T, F> {
    min: usize,
    fingerprint: F,
    entries: BTreeMap<B256, (T, usize)>,
}

impl<T, F> QuorumFilter<T, F>
where
    F: Fn(&T) -> B256,
{
    /// Creates a filter accepting items observed at least `min` times.
    pub const fn new(min: usize, fingerprint: F) -> Self {
        Self { min, fingerprint, entries: BTreeMap::new() }
    }

    /// Creates a filter tolerating `f` faulty observers, i.e. requiring `f + 1` observations.
    pub const fn with_fault_tolerance(f: u8, fingerprint: F) -> Self {
        Self::new(f as usize + 1, fingerprint)
    }

    /// The number of observations an item needs.
    pub const fn min(&self) -> usize {
        self.min
    }

    /// Records one observation of `item`.
    pub fn add(&mut self, item: T) {
        let key = (self.fingerprint)(&item);
        self.entries.entry(key).and_modify(|(_, count)| *count += 1).or_insert((item, 1));
    }

    /// Items that reached the threshold.
    pub fn valid(&self) -> impl Iterator<Item = &T> {
        self.entries.values().filter(|(_, count)| *count >= self.min).map(|(item, _)| item)
    }

    /// Consumes the filter, returning the items that reached the threshold.
    pub fn into_valid(self) -> Vec<T> {
        let min = self.min;
        self.entries
            .into_values()
            .filter(|(_, count)| *count >= min)
            .map(|(item, _)| item)
            .collect()
    }
}

impl<T: fmt::Debug, F> fmt::Debug for QuorumFilter<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuorumFilter")
            .field("min", &self.min)
            .field("entries", &self.entries)
            .finish_non_exhaustive()
    }
}
