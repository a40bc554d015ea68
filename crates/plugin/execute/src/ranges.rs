//! Sequence number range algebra over commit records.

use crate::{RangeError, RangeResult};
use offramp_primitives::{CommitData, SeqNumRange};

/// Collapses the ranges of `records` into the minimal list of contiguous spans.
///
/// `records` must be sorted by range start. Adjacent ranges (`end + 1 == next.start`) are merged,
/// gaps start a new span, and a range starting at or before the current span's end is an
/// [`RangeError::OverlappingRanges`].
pub fn compute_ranges(records: &[CommitData]) -> RangeResult<Vec<SeqNumRange>> {
    let mut ranges = Vec::new();
    let mut current: Option<SeqNumRange> = None;

    for record in records {
        let next = record.seq_num_range;
        current = Some(match current {
            None => next,
            Some(span) if span.end().checked_add(1) == Some(next.start()) => {
                span.with_end(next.end())
            }
            Some(span) if next.start() <= span.end() => {
                return Err(RangeError::OverlappingRanges { previous: span, next });
            }
            Some(span) => {
                ranges.push(span);
                next
            }
        });
    }

    ranges.extend(current);
    Ok(ranges)
}

/// Subtracts `executed` ranges from `records`.
///
/// The records are returned sorted by range start. A record whose range is fully covered by
/// the executed ranges (together with what it already had marked) is dropped, a partially
/// covered record gains the covered sequence numbers in its executed set, and an uncovered
/// record is kept unchanged. Re-applying the same executed ranges is a no-op.
pub fn filter_out_executed_messages(
    mut records: Vec<CommitData>,
    executed: &[SeqNumRange],
) -> RangeResult<Vec<CommitData>> {
    records.sort_by_key(|record| record.seq_num_range.start());
    if executed.is_empty() {
        return Ok(records);
    }

    let mut executed = executed.to_vec();
    executed.sort_unstable();
    if let Some(pair) = executed.windows(2).find(|pair| pair[1].start() <= pair[0].end()) {
        return Err(RangeError::OverlappingExecutedRanges { previous: pair[0], next: pair[1] });
    }

    Ok(records
        .into_iter()
        .filter_map(|mut record| {
            let range = record.seq_num_range;
            // Executed ranges ending before this record cannot intersect it.
            let first = executed.partition_point(|e| e.end() < range.start());
            let covered = executed[first..]
                .iter()
                .take_while(|e| e.start() <= range.end())
                .filter_map(|e| e.intersection(&range))
                .flat_map(|covered| covered.iter())
                .collect::<Vec<_>>();
            record.mark_executed(covered);
            (!record.is_fully_executed()).then_some(record)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use offramp_primitives::ChainSelector;
    use proptest::prelude::*;
    use rstest::rstest;

    fn record(start: u64, end: u64) -> CommitData {
        CommitData {
            source_chain: ChainSelector(1),
            seq_num_range: SeqNumRange::new(start, end),
            ..Default::default()
        }
    }

    fn records(ranges: &[(u64, u64)]) -> Vec<CommitData> {
        ranges.iter().map(|&(start, end)| record(start, end)).collect()
    }

    fn ranges(pairs: &[(u64, u64)]) -> Vec<SeqNumRange> {
        pairs.iter().copied().map(SeqNumRange::from).collect()
    }

    #[rstest]
    #[case::empty(&[], &[])]
    #[case::single(&[(1, 5)], &[(1, 5)])]
    #[case::contiguous_and_gap(&[(10, 20), (21, 40), (50, 60)], &[(10, 40), (50, 60)])]
    #[case::all_gaps(&[(1, 1), (3, 3), (5, 5)], &[(1, 1), (3, 3), (5, 5)])]
    #[case::all_contiguous(&[(1, 1), (2, 2), (3, 9)], &[(1, 9)])]
    fn test_compute_ranges(#[case] input: &[(u64, u64)], #[case] expected: &[(u64, u64)]) {
        assert_eq!(compute_ranges(&records(input)).unwrap(), ranges(expected));
    }

    #[rstest]
    #[case::overlap(&[(10, 20), (15, 30)])]
    #[case::shared_endpoint(&[(10, 20), (20, 30)])]
    #[case::after_merge(&[(10, 20), (21, 30), (25, 40)])]
    fn test_compute_ranges_overlap(#[case] input: &[(u64, u64)]) {
        assert!(matches!(
            compute_ranges(&records(input)),
            Err(RangeError::OverlappingRanges { .. })
        ));
    }

    #[test]
    fn test_filter_partial_cover() {
        let filtered =
            filter_out_executed_messages(records(&[(10, 20)]), &ranges(&[(15, 35)])).unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].executed_messages, vec![15, 16, 17, 18, 19, 20]);
    }

    #[test]
    fn test_filter_drops_fully_executed() {
        // (6, 10) is only covered by two executed ranges together.
        let filtered = filter_out_executed_messages(
            records(&[(1, 5), (6, 10), (11, 15)]),
            &ranges(&[(1, 7), (8, 10), (12, 12)]),
        )
        .unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].seq_num_range, SeqNumRange::new(11, 15));
        assert_eq!(filtered[0].executed_messages, vec![12]);
    }

    #[test]
    fn test_filter_keeps_uncovered() {
        let filtered =
            filter_out_executed_messages(records(&[(1, 5)]), &ranges(&[(6, 9)])).unwrap();
        assert_eq!(filtered, records(&[(1, 5)]));
    }

    #[test]
    fn test_filter_sorts_records() {
        let filtered = filter_out_executed_messages(records(&[(20, 30), (1, 10)]), &[]).unwrap();
        assert_eq!(filtered[0].seq_num_range.start(), 1);
        assert_eq!(filtered[1].seq_num_range.start(), 20);
    }

    #[test]
    fn test_filter_merges_existing_marks() {
        let mut partial = record(1, 4);
        partial.mark_executed([1, 2]);
        let filtered = filter_out_executed_messages(vec![partial], &ranges(&[(3, 4)])).unwrap();
        assert!(filtered.is_empty());
    }

    #[test]
    fn test_filter_overlapping_executed() {
        assert!(matches!(
            filter_out_executed_messages(records(&[(1, 10)]), &ranges(&[(1, 5), (5, 9)])),
            Err(RangeError::OverlappingExecutedRanges { .. })
        ));
    }

    /// Sorted, non-overlapping ranges built from (gap, length) pairs.
    fn disjoint_ranges() -> impl Strategy<Value = Vec<SeqNumRange>> {
        prop::collection::vec((0u64..3, 1u64..6), 0..12).prop_map(|steps| {
            let mut next_start = 1;
            steps
                .into_iter()
                .map(|(gap, len)| {
                    let start = next_start + gap;
                    next_start = start + len;
                    SeqNumRange::new(start, start + len - 1)
                })
                .collect()
        })
    }

    fn covered(ranges: &[SeqNumRange]) -> Vec<u64> {
        ranges.iter().flat_map(|r| r.iter()).collect()
    }

    proptest! {
        #[test]
        fn prop_compute_ranges_preserves_union(input in disjoint_ranges()) {
            let input_records =
                input.iter().map(|r| record(r.start(), r.end())).collect::<Vec<_>>();
            let output = compute_ranges(&input_records).unwrap();

            prop_assert_eq!(covered(&output), covered(&input));
            for pair in output.windows(2) {
                prop_assert!(pair[0].end() + 1 < pair[1].start());
            }
        }

        #[test]
        fn prop_filter_is_idempotent(commits in disjoint_ranges(), executed in disjoint_ranges()) {
            let input = commits.iter().map(|r| record(r.start(), r.end())).collect::<Vec<_>>();
            let once = filter_out_executed_messages(input, &executed).unwrap();
            let twice = filter_out_executed_messages(once.clone(), &executed).unwrap();
            prop_assert_eq!(once, twice);
        }
    }
}
