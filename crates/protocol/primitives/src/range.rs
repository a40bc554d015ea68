//! Inclusive sequence-number ranges.

use crate::SeqNum;
use core::{fmt, ops::RangeInclusive};
use serde::{Deserialize, Serialize};

/// An inclusive `[start, end]` range of sequence numbers.
///
/// Serialized as a two element array so the observation wire format stays compact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "(SeqNum, SeqNum)", into = "(SeqNum, SeqNum)")]
pub struct SeqNumRange {
    start: SeqNum,
    end: SeqNum,
}

impl SeqNumRange {
    /// Creates a new range. `start` must not exceed `end`; see [`Self::is_valid`].
    pub const fn new(start: SeqNum, end: SeqNum) -> Self {
        Self { start, end }
    }

    /// First sequence number of the range.
    pub const fn start(&self) -> SeqNum {
        self.start
    }

    /// Last sequence number of the range.
    pub const fn end(&self) -> SeqNum {
        self.end
    }

    /// Returns a copy of this range with a new end.
    pub const fn with_end(self, end: SeqNum) -> Self {
        Self { start: self.start, end }
    }

    /// Whether the range is well formed.
    pub const fn is_valid(&self) -> bool {
        self.start <= self.end
    }

    /// Number of sequence numbers covered by the range.
    pub const fn len(&self) -> u64 {
        if self.start > self.end { 0 } else { self.end - self.start + 1 }
    }

    /// A well formed range is never empty; an inverted one is.
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the two ranges share at least one sequence number.
    pub const fn overlaps(&self, other: &Self) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Whether `seq_num` falls within the range.
    pub const fn contains(&self, seq_num: SeqNum) -> bool {
        self.start <= seq_num && seq_num <= self.end
    }

    /// Whether `other` lies entirely within this range.
    pub const fn contains_range(&self, other: &Self) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// The overlapping part of two ranges, if any.
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        self.overlaps(other)
            .then(|| Self::new(self.start.max(other.start), self.end.min(other.end)))
    }

    /// Iterates every sequence number in the range.
    pub fn iter(&self) -> RangeInclusive<SeqNum> {
        self.start..=self.end
    }
}

impl From<(SeqNum, SeqNum)> for SeqNumRange {
    fn from((start, end): (SeqNum, SeqNum)) -> Self {
        Self::new(start, end)
    }
}

impl From<SeqNumRange> for (SeqNum, SeqNum) {
    fn from(range: SeqNumRange) -> Self {
        (range.start, range.end)
    }
}

impl IntoIterator for SeqNumRange {
    type Item = SeqNum;
    type IntoIter = RangeInclusive<SeqNum>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for SeqNumRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} -> {}]", self.start, self.end)
    }
}
