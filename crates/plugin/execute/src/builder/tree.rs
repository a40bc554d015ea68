//! Merkle tree reconstruction from a commit record.

use crate::BuildReportError;
use offramp_merkle::MerkleTree;
use offramp_primitives::{CommitData, MessageHasher};

/// Hashes every message of `record` into a leaf and builds the tree over them, in sequence
/// number order.
///
/// Fails when the messages do not exactly fill the record's range or belong to another chain.
/// The caller still has to compare the root against the committed one.
pub fn construct_merkle_tree<H: MessageHasher>(
    hasher: &H,
    record: &CommitData,
) -> Result<MerkleTree, BuildReportError> {
    let range = record.seq_num_range;
    if range.len() != record.messages.len() as u64 {
        return Err(BuildReportError::MessageCountMismatch {
            root: record.merkle_root,
            expected: range.len(),
            actual: record.messages.len(),
        });
    }

    let leaves = record
        .messages
        .iter()
        .map(|message| {
            if !range.contains(message.seq_num()) {
                return Err(BuildReportError::MessageOutOfRange {
                    root: record.merkle_root,
                    seq_num: message.seq_num(),
                    range,
                });
            }
            if message.source_chain() != record.source_chain {
                return Err(BuildReportError::SourceChainMismatch {
                    root: record.merkle_root,
                    expected: record.source_chain,
                    actual: message.source_chain(),
                });
            }
            hasher.hash(message).map_err(|err| BuildReportError::Hash {
                seq_num: message.seq_num(),
                source: Box::new(err),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(MerkleTree::new(leaves)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{TestMessageHasher, commit_record, messages_in_range};
    use offramp_primitives::{ChainSelector, SeqNumRange};

    #[test]
    fn test_root_matches_commit() {
        let hasher = TestMessageHasher;
        let range = SeqNumRange::new(5, 9);
        let mut record = commit_record(&hasher, ChainSelector(1), range, 0);
        record.messages = messages_in_range(ChainSelector(1), range);

        let tree = construct_merkle_tree(&hasher, &record).unwrap();
        assert_eq!(tree.root(), record.merkle_root);
        assert_eq!(tree.leaf_count(), 5);
    }

    #[test]
    fn test_message_count_mismatch() {
        let hasher = TestMessageHasher;
        let range = SeqNumRange::new(1, 3);
        let mut record = commit_record(&hasher, ChainSelector(1), range, 0);
        record.messages = messages_in_range(ChainSelector(1), SeqNumRange::new(1, 2));

        assert!(matches!(
            construct_merkle_tree(&hasher, &record),
            Err(BuildReportError::MessageCountMismatch { expected: 3, actual: 2, .. })
        ));
    }

    #[test]
    fn test_message_out_of_range() {
        let hasher = TestMessageHasher;
        let range = SeqNumRange::new(1, 3);
        let mut record = commit_record(&hasher, ChainSelector(1), range, 0);
        record.messages = messages_in_range(ChainSelector(1), SeqNumRange::new(2, 4));

        assert!(matches!(
            construct_merkle_tree(&hasher, &record),
            Err(BuildReportError::MessageOutOfRange { seq_num: 4, .. })
        ));
    }

    #[test]
    fn test_source_chain_mismatch() {
        let hasher = TestMessageHasher;
        let range = SeqNumRange::new(1, 3);
        let mut record = commit_record(&hasher, ChainSelector(1), range, 0);
        record.messages = messages_in_range(ChainSelector(2), range);

        assert!(matches!(
            construct_merkle_tree(&hasher, &record),
            Err(BuildReportError::SourceChainMismatch { .. })
        ));
    }
}
