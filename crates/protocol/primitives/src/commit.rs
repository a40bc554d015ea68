//! Commit records observed on the destination chain.

use crate::{ChainSelector, Message, SeqNum, SeqNumRange};
use alloy_primitives::{B256, Bytes};
use serde::{Deserialize, Serialize};

/// A merkle root committed for one source chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerkleRootChain {
    /// Source chain the root covers.
    pub chain_sel: ChainSelector,
    /// Sequence numbers covered by the root.
    pub seq_nums_range: SeqNumRange,
    /// The committed root.
    pub merkle_root: B256,
}

/// A commit report as stored on the destination chain. One report may carry
/// roots for several source chains.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitReport {
    /// Per source chain roots.
    pub merkle_roots: Vec<MerkleRootChain>,
}

/// A [`CommitReport`] together with where and when it landed on the destination chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitReportWithMeta {
    /// The report.
    pub report: CommitReport,
    /// Unix timestamp (seconds) of the block that included the report.
    pub timestamp: u64,
    /// Number of the block that included the report.
    pub block_num: u64,
}

/// A unit of execution work: one committed root and the messages it covers.
///
/// `messages` and `token_data` are only populated once the message bodies have been fetched
/// from the source chain. `executed_messages` is kept sorted ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitData {
    /// Source chain of the committed messages.
    pub source_chain: ChainSelector,
    /// Unix timestamp (seconds) of the commit.
    pub timestamp: u64,
    /// Destination block number of the commit.
    pub block_num: u64,
    /// The committed root.
    pub merkle_root: B256,
    /// Sequence numbers covered by the root.
    pub seq_num_range: SeqNumRange,
    /// Sequence numbers already executed on the destination chain.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub executed_messages: Vec<SeqNum>,
    /// Member messages, in sequence-number order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<Message>,
    /// Off-chain token data, indexed like `messages`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub token_data: Vec<Vec<Bytes>>,
}

impl CommitData {
    /// Builds the per-chain commit records contained in a destination-chain commit report.
    pub fn from_report(report: &CommitReportWithMeta) -> impl Iterator<Item = Self> + '_ {
        report.report.merkle_roots.iter().map(|root| Self {
            source_chain: root.chain_sel,
            timestamp: report.timestamp,
            block_num: report.block_num,
            merkle_root: root.merkle_root,
            seq_num_range: root.seq_nums_range,
            ..Default::default()
        })
    }

    /// Whether `seq_num` has already been executed.
    pub fn is_executed(&self, seq_num: SeqNum) -> bool {
        self.executed_messages.binary_search(&seq_num).is_ok()
    }

    /// Whether every message in the range has been executed.
    pub fn is_fully_executed(&self) -> bool {
        self.executed_messages.len() as u64 >= self.seq_num_range.len()
    }

    /// Whether the message bodies have been attached.
    pub fn has_messages(&self) -> bool {
        !self.messages.is_empty()
    }

    /// Merges `seq_nums` into the executed set, keeping it sorted and free of duplicates.
    pub fn mark_executed(&mut self, seq_nums: impl IntoIterator<Item = SeqNum>) {
        self.executed_messages.extend(seq_nums);
        self.executed_messages.sort_unstable();
        self.executed_messages.dedup();
    }
}
