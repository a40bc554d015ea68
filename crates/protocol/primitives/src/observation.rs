//! The per-node observation exchanged every round.

use crate::{ChainSelector, CommitData, EncodingResult, Message, SeqNum};
use alloy_primitives::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Pending commit records, grouped by source chain.
pub type CommitObservations = BTreeMap<ChainSelector, Vec<CommitData>>;

/// Fetched message bodies, grouped by source chain and keyed by sequence number.
pub type MessageObservations = BTreeMap<ChainSelector, BTreeMap<SeqNum, Message>>;

/// One node's untrusted contribution to a round.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    /// Commit records that still have unexecuted messages.
    pub commit_reports: CommitObservations,
    /// Message bodies for the previous outcome's pending records.
    pub messages: MessageObservations,
}

impl Observation {
    /// Creates a new observation.
    pub const fn new(commit_reports: CommitObservations, messages: MessageObservations) -> Self {
        Self { commit_reports, messages }
    }

    /// Whether the observation carries nothing.
    pub fn is_empty(&self) -> bool {
        self.commit_reports.values().all(Vec::is_empty) &&
            self.messages.values().all(BTreeMap::is_empty)
    }

    /// Encodes the observation for the wire.
    pub fn encode(&self) -> EncodingResult<Bytes> {
        Ok(serde_json::to_vec(self)?.into())
    }

    /// Decodes an observation received from a peer.
    pub fn decode(data: &[u8]) -> EncodingResult<Self> {
        Ok(serde_json::from_slice(data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MessageHeader, SeqNumRange};
    use alloy_primitives::B256;

    #[test]
    fn test_observation_wire_format() {
        let mut observation = Observation::default();
        observation.commit_reports.insert(
            ChainSelector(1),
            vec![CommitData {
                source_chain: ChainSelector(1),
                merkle_root: B256::repeat_byte(0xaa),
                seq_num_range: SeqNumRange::new(1, 2),
                ..Default::default()
            }],
        );
        let message = Message {
            header: MessageHeader {
                source_chain_selector: ChainSelector(1),
                seq_num: 2,
                ..Default::default()
            },
            ..Default::default()
        };
        observation.messages.entry(ChainSelector(1)).or_default().insert(2, message);

        let encoded = observation.encode().unwrap();
        let decoded = Observation::decode(&encoded).unwrap();
        assert_eq!(decoded, observation);
        assert!(!decoded.is_empty());
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(Observation::decode(b"not json").is_err());
    }

    #[test]
    fn test_empty_chains_count_as_empty() {
        let mut observation = Observation::default();
        observation.commit_reports.insert(ChainSelector(9), vec![]);
        assert!(observation.is_empty());
    }
}
