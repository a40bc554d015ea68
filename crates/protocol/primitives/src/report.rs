//! The execution report handed to the destination codec.

use crate::{ChainSelector, Message};
use alloy_primitives::{B256, Bytes, U256};
use serde::{Deserialize, Serialize};

/// The part of an [`ExecuteReport`] covering a single source chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainReport {
    /// Source chain of every message in this report.
    pub source_chain_selector: ChainSelector,
    /// Messages selected for execution, ascending by sequence number.
    pub messages: Vec<Message>,
    /// Off-chain token data, one entry per message.
    pub offchain_token_data: Vec<Vec<Bytes>>,
    /// Merkle multi-proof hashes.
    pub proofs: Vec<B256>,
    /// Packed multi-proof source flags.
    pub proof_flag_bits: U256,
}

/// The final, transmittable payload of a round.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteReport {
    /// One entry per source chain.
    pub chain_reports: Vec<ChainReport>,
}

impl ExecuteReport {
    /// Whether the report carries no chain reports.
    pub fn is_empty(&self) -> bool {
        self.chain_reports.is_empty()
    }

    /// Total number of messages across all chain reports.
    pub fn message_count(&self) -> usize {
        self.chain_reports.iter().map(|r| r.messages.len()).sum()
    }
}
