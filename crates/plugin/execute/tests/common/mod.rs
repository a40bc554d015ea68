//! Shared fixtures for the execute plugin integration tests.

#![allow(dead_code, unreachable_pub)]

use alloy_primitives::{B256, Bytes, U256, keccak256};
use async_trait::async_trait;
use offramp_evm::{EvmMessageHasher, encode_extra_args_v1};
use offramp_execute::{ChainReader, TokenDataError, TokenDataReader};
use offramp_merkle::MerkleTree;
use offramp_primitives::{
    ChainSelector, CommitReport, CommitReportWithMeta, MerkleRootChain, Message, MessageHasher,
    MessageHeader, SeqNum, SeqNumRange,
};
use std::collections::BTreeMap;

pub const DEST_CHAIN: ChainSelector = ChainSelector(5_009_297_550_715_157_269);
pub const CHAIN_A: ChainSelector = ChainSelector(4_949_039_107_694_359_620);
pub const CHAIN_B: ChainSelector = ChainSelector(15_971_525_489_660_198_786);

#[derive(thiserror::Error, Debug)]
#[error("fake chain error")]
pub struct FakeChainError;

/// EVM-bound messages for every sequence number of `range`.
pub fn evm_messages(chain: ChainSelector, range: SeqNumRange) -> Vec<Message> {
    range
        .iter()
        .map(|seq_num| {
            let mut id = chain.0.to_be_bytes().to_vec();
            id.extend_from_slice(&seq_num.to_be_bytes());
            Message {
                header: MessageHeader {
                    message_id: keccak256(id),
                    source_chain_selector: chain,
                    dest_chain_selector: DEST_CHAIN,
                    seq_num,
                    nonce: 0,
                    msg_hash: B256::ZERO,
                    on_ramp: Bytes::from(vec![0x11; 20]),
                },
                sender: Bytes::from(vec![0x22; 20]),
                data: Bytes::from(format!("payload {seq_num}").into_bytes()),
                receiver: Bytes::from(vec![0x33; 20]),
                extra_args: encode_extra_args_v1(U256::from(300_000u64)),
                fee_token: Bytes::from(vec![0x44; 20]),
                fee_token_amount: U256::from(1u64),
                fee_value_juels: U256::from(1u64),
                token_amounts: Vec::new(),
            }
        })
        .collect()
}

/// The EVM merkle root over `messages`.
pub fn evm_root(messages: &[Message]) -> B256 {
    let leaves = messages.iter().map(|m| EvmMessageHasher.hash(m).unwrap()).collect();
    MerkleTree::new(leaves).unwrap().root()
}

/// Destination and source chain state shared by the simulated nodes.
#[derive(Debug, Clone, Default)]
pub struct FakeChains {
    pub commits: Vec<CommitReportWithMeta>,
    pub executed: BTreeMap<ChainSelector, Vec<SeqNumRange>>,
    pub messages: BTreeMap<ChainSelector, BTreeMap<SeqNum, Message>>,
}

impl FakeChains {
    /// Sends the messages of `range` on `chain` and commits their root at `timestamp`.
    pub fn commit(&mut self, chain: ChainSelector, range: SeqNumRange, timestamp: u64) -> B256 {
        let messages = evm_messages(chain, range);
        let root = evm_root(&messages);
        self.messages
            .entry(chain)
            .or_default()
            .extend(messages.into_iter().map(|m| (m.seq_num(), m)));
        self.commits.push(CommitReportWithMeta {
            report: CommitReport {
                merkle_roots: vec![MerkleRootChain {
                    chain_sel: chain,
                    seq_nums_range: range,
                    merkle_root: root,
                }],
            },
            timestamp,
            block_num: timestamp,
        });
        root
    }
}

#[async_trait]
impl ChainReader for FakeChains {
    type Error = FakeChainError;

    async fn commit_reports_gte_timestamp(
        &self,
        _dest: ChainSelector,
        since: u64,
        limit: usize,
    ) -> Result<Vec<CommitReportWithMeta>, Self::Error> {
        Ok(self.commits.iter().filter(|c| c.timestamp >= since).take(limit).cloned().collect())
    }

    async fn executed_message_ranges(
        &self,
        source: ChainSelector,
        _dest: ChainSelector,
        range: SeqNumRange,
    ) -> Result<Vec<SeqNumRange>, Self::Error> {
        Ok(self
            .executed
            .get(&source)
            .into_iter()
            .flatten()
            .filter(|executed| executed.overlaps(&range))
            .copied()
            .collect())
    }

    async fn msgs_between_seq_nums(
        &self,
        chain: ChainSelector,
        range: SeqNumRange,
    ) -> Result<Vec<Message>, Self::Error> {
        Ok(self
            .messages
            .get(&chain)
            .map(|m| m.range(range.start()..=range.end()).map(|(_, m)| m.clone()).collect())
            .unwrap_or_default())
    }
}

/// Messages carry no token transfers, so token data is always empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTokenData;

impl TokenDataReader for NoTokenData {
    fn read_token_data(
        &self,
        _source: ChainSelector,
        _seq_num: SeqNum,
    ) -> Result<Vec<Bytes>, TokenDataError> {
        Ok(Vec::new())
    }
}
