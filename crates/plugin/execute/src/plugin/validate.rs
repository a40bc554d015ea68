//! Protocol checks applied to peer observations before they are merged.

use crate::{ChainConfigSnapshot, ValidationError};
use offramp_primitives::{ChainSelector, Observation, OracleId};
use std::collections::BTreeSet;

/// Checks `observation` from `observer` against the protocol rules.
///
/// Commit records may only be reported by readers of `dest`, and message bodies only by
/// readers of their source chain. Within the observation merkle roots must be unique, ranges
/// well formed and non overlapping per chain, executed sequence numbers inside their record's
/// range, and every entry keyed consistently with its own contents.
pub fn validate_observation(
    observation: &Observation,
    observer: OracleId,
    dest: ChainSelector,
    snapshot: &ChainConfigSnapshot,
) -> Result<(), ValidationError> {
    let has_commits = observation.commit_reports.values().any(|records| !records.is_empty());
    if has_commits && !snapshot.can_read(observer, dest) {
        return Err(ValidationError::UnauthorizedChain { oracle: observer, chain: dest });
    }

    let mut roots = BTreeSet::new();
    for (&chain, records) in &observation.commit_reports {
        let mut ranges = Vec::with_capacity(records.len());
        for record in records {
            if record.source_chain != chain {
                return Err(ValidationError::ChainMismatch {
                    key: chain,
                    record_chain: record.source_chain,
                });
            }
            let range = record.seq_num_range;
            if !range.is_valid() {
                return Err(ValidationError::InvertedRange(range));
            }
            if !roots.insert(record.merkle_root) {
                return Err(ValidationError::DuplicateMerkleRoot(record.merkle_root));
            }
            if let Some(&seq_num) = record.executed_messages.iter().find(|&&s| !range.contains(s)) {
                return Err(ValidationError::ExecutedOutOfRange { seq_num, range });
            }
            ranges.push(range);
        }

        ranges.sort_unstable();
        if let Some(pair) = ranges.windows(2).find(|pair| pair[0].overlaps(&pair[1])) {
            return Err(ValidationError::OverlappingRanges {
                chain,
                previous: pair[0],
                next: pair[1],
            });
        }
    }

    for (&chain, messages) in &observation.messages {
        if messages.is_empty() {
            continue;
        }
        if !snapshot.can_read(observer, chain) {
            return Err(ValidationError::UnauthorizedChain { oracle: observer, chain });
        }
        for (&seq_num, message) in messages {
            if message.seq_num() != seq_num || message.source_chain() != chain {
                return Err(ValidationError::MessageKeyMismatch {
                    chain,
                    seq_num,
                    header_chain: message.source_chain(),
                    header_seq_num: message.seq_num(),
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ChainConfig,
        test_util::{DEST_CHAIN, TestMessageHasher, commit_record, messages_in_range},
    };
    use alloy_primitives::B256;
    use offramp_primitives::{CommitData, SeqNumRange};
    use std::collections::BTreeMap;

    const CHAIN_A: ChainSelector = ChainSelector(1);
    const CHAIN_B: ChainSelector = ChainSelector(2);

    /// Oracle 0 reads everything, oracle 1 only chain A.
    fn snapshot() -> ChainConfigSnapshot {
        ChainConfigSnapshot::new(
            1,
            BTreeMap::from([
                (DEST_CHAIN, ChainConfig::new(1, [0])),
                (CHAIN_A, ChainConfig::new(1, [0, 1])),
                (CHAIN_B, ChainConfig::new(1, [0])),
            ]),
        )
    }

    fn record(chain: ChainSelector, start: u64, end: u64) -> CommitData {
        commit_record(&TestMessageHasher, chain, SeqNumRange::new(start, end), 0)
    }

    fn with_commits(records: Vec<CommitData>) -> Observation {
        let mut observation = Observation::default();
        for record in records {
            observation.commit_reports.entry(record.source_chain).or_default().push(record);
        }
        observation
    }

    fn with_messages(chain: ChainSelector, start: u64, end: u64) -> Observation {
        let mut observation = Observation::default();
        observation.messages.insert(
            chain,
            messages_in_range(chain, SeqNumRange::new(start, end))
                .into_iter()
                .map(|m| (m.seq_num(), m))
                .collect(),
        );
        observation
    }

    #[test]
    fn test_valid_observation() {
        let mut observation = with_commits(vec![
            record(CHAIN_A, 1, 10),
            record(CHAIN_A, 11, 20),
            record(CHAIN_B, 1, 5),
        ]);
        observation.messages = with_messages(CHAIN_A, 1, 10).messages;
        assert_eq!(validate_observation(&observation, 0, DEST_CHAIN, &snapshot()), Ok(()));
        assert_eq!(
            validate_observation(&Observation::default(), 1, DEST_CHAIN, &snapshot()),
            Ok(())
        );
    }

    #[test]
    fn test_commits_require_dest_reader() {
        let observation = with_commits(vec![record(CHAIN_A, 1, 10)]);
        assert_eq!(
            validate_observation(&observation, 1, DEST_CHAIN, &snapshot()),
            Err(ValidationError::UnauthorizedChain { oracle: 1, chain: DEST_CHAIN })
        );
    }

    #[test]
    fn test_messages_require_source_reader() {
        assert_eq!(
            validate_observation(&with_messages(CHAIN_A, 1, 3), 1, DEST_CHAIN, &snapshot()),
            Ok(())
        );
        assert_eq!(
            validate_observation(&with_messages(CHAIN_B, 1, 3), 1, DEST_CHAIN, &snapshot()),
            Err(ValidationError::UnauthorizedChain { oracle: 1, chain: CHAIN_B })
        );
    }

    #[test]
    fn test_duplicate_root() {
        let first = record(CHAIN_A, 1, 10);
        let mut second = record(CHAIN_A, 11, 20);
        second.merkle_root = first.merkle_root;
        let root = first.merkle_root;
        assert_eq!(
            validate_observation(&with_commits(vec![first, second]), 0, DEST_CHAIN, &snapshot()),
            Err(ValidationError::DuplicateMerkleRoot(root))
        );
    }

    #[test]
    fn test_overlapping_ranges() {
        let observation = with_commits(vec![record(CHAIN_A, 11, 20), record(CHAIN_A, 1, 11)]);
        assert_eq!(
            validate_observation(&observation, 0, DEST_CHAIN, &snapshot()),
            Err(ValidationError::OverlappingRanges {
                chain: CHAIN_A,
                previous: SeqNumRange::new(1, 11),
                next: SeqNumRange::new(11, 20),
            })
        );
    }

    #[test]
    fn test_executed_out_of_range() {
        let mut record = record(CHAIN_A, 1, 10);
        record.mark_executed([3, 11]);
        assert_eq!(
            validate_observation(&with_commits(vec![record]), 0, DEST_CHAIN, &snapshot()),
            Err(ValidationError::ExecutedOutOfRange { seq_num: 11, range: SeqNumRange::new(1, 10) })
        );
    }

    #[test]
    fn test_chain_mismatch() {
        let mut observation = Observation::default();
        observation.commit_reports.insert(CHAIN_B, vec![record(CHAIN_A, 1, 10)]);
        assert_eq!(
            validate_observation(&observation, 0, DEST_CHAIN, &snapshot()),
            Err(ValidationError::ChainMismatch { key: CHAIN_B, record_chain: CHAIN_A })
        );
    }

    #[test]
    fn test_inverted_range() {
        let mut record = record(CHAIN_A, 1, 10);
        record.seq_num_range = SeqNumRange::new(10, 1);
        record.merkle_root = B256::repeat_byte(7);
        assert_eq!(
            validate_observation(&with_commits(vec![record]), 0, DEST_CHAIN, &snapshot()),
            Err(ValidationError::InvertedRange(SeqNumRange::new(10, 1)))
        );
    }

    #[test]
    fn test_message_key_mismatch() {
        let mut observation = with_messages(CHAIN_A, 1, 2);
        let messages = observation.messages.get_mut(&CHAIN_A).unwrap();
        let message = messages.remove(&2).unwrap();
        messages.insert(5, message);
        assert_eq!(
            validate_observation(&observation, 0, DEST_CHAIN, &snapshot()),
            Err(ValidationError::MessageKeyMismatch {
                chain: CHAIN_A,
                seq_num: 5,
                header_chain: CHAIN_A,
                header_seq_num: 2,
            })
        );
    }
}
