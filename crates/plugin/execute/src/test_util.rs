//! Test utilities for `offramp-execute`.

#![allow(missing_docs, unreachable_pub, unused)]

use crate::{
    ChainConfig, ChainConfigSnapshot, ChainConfigSource, ChainReader, TokenDataError,
    TokenDataReader,
};
use alloy_primitives::{B256, Bytes, U256, keccak256};
use async_trait::async_trait;
use offramp_merkle::MerkleTree;
use offramp_primitives::{
    ChainSelector, CommitData, CommitReport, CommitReportWithMeta, ExecuteReport, MerkleRootChain,
    Message, MessageHasher, MessageHeader, OracleId, ReportCodec, SeqNum, SeqNumRange,
};
use std::{
    collections::{BTreeMap, BTreeSet},
    time::Duration,
};

pub const DEST_CHAIN: ChainSelector = ChainSelector(100);

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("test error: {0}")]
pub struct TestError(pub String);

/// Hashes the identifying fields, sender, receiver and payload of a message. Token amounts are
/// left out so tests may attach transfers without recomputing roots.
#[derive(Debug, Clone, Copy, Default)]
pub struct TestMessageHasher;

impl MessageHasher for TestMessageHasher {
    type Error = TestError;

    fn hash(&self, message: &Message) -> Result<B256, Self::Error> {
        let header = &message.header;
        let mut preimage = Vec::with_capacity(128);
        preimage.extend_from_slice(header.message_id.as_slice());
        preimage.extend_from_slice(&header.source_chain_selector.0.to_be_bytes());
        preimage.extend_from_slice(&header.dest_chain_selector.0.to_be_bytes());
        preimage.extend_from_slice(&header.seq_num.to_be_bytes());
        preimage.extend_from_slice(&header.nonce.to_be_bytes());
        preimage.extend_from_slice(&message.sender);
        preimage.extend_from_slice(&message.receiver);
        preimage.extend_from_slice(&message.data);
        Ok(keccak256(preimage))
    }
}

/// Encodes reports as JSON, so sizes grow with every message and proof hash.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonReportCodec;

impl ReportCodec for JsonReportCodec {
    type Error = serde_json::Error;

    fn encode(&self, report: &ExecuteReport) -> Result<Bytes, Self::Error> {
        Ok(serde_json::to_vec(report)?.into())
    }

    fn decode(&self, data: &[u8]) -> Result<ExecuteReport, Self::Error> {
        serde_json::from_slice(data)
    }
}

/// Token data keyed by (source chain, sequence number). Unknown messages have no token data.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTokenDataReader {
    pub not_ready: BTreeSet<(ChainSelector, SeqNum)>,
    pub failing: BTreeSet<(ChainSelector, SeqNum)>,
    pub data: BTreeMap<(ChainSelector, SeqNum), Vec<Bytes>>,
}

impl TokenDataReader for InMemoryTokenDataReader {
    fn read_token_data(
        &self,
        source: ChainSelector,
        seq_num: SeqNum,
    ) -> Result<Vec<Bytes>, TokenDataError> {
        let key = (source, seq_num);
        if self.not_ready.contains(&key) {
            return Err(TokenDataError::NotReady);
        }
        if self.failing.contains(&key) {
            return Err(TokenDataError::Fetch("attestation service unavailable".into()));
        }
        Ok(self.data.get(&key).cloned().unwrap_or_default())
    }
}

/// Deterministic messages for every sequence number in `range`.
pub fn messages_in_range(chain: ChainSelector, range: SeqNumRange) -> Vec<Message> {
    range
        .iter()
        .map(|seq_num| {
            let mut id = [0u8; 16];
            id[..8].copy_from_slice(&chain.0.to_be_bytes());
            id[8..].copy_from_slice(&seq_num.to_be_bytes());
            Message {
                header: MessageHeader {
                    message_id: keccak256(id),
                    source_chain_selector: chain,
                    dest_chain_selector: DEST_CHAIN,
                    seq_num,
                    nonce: seq_num,
                    msg_hash: B256::ZERO,
                    on_ramp: Bytes::from(vec![0x0a; 20]),
                },
                sender: Bytes::from(vec![0x05; 20]),
                data: Bytes::from(vec![seq_num as u8; 96]),
                receiver: Bytes::from(vec![0x0b; 20]),
                extra_args: Bytes::new(),
                fee_token: Bytes::from(vec![0x0f; 20]),
                fee_token_amount: U256::from(1_000u64),
                fee_value_juels: U256::from(2_000u64),
                token_amounts: Vec::new(),
            }
        })
        .collect()
}

/// Root over [`messages_in_range`] as committed on the destination chain.
pub fn merkle_root<H: MessageHasher>(hasher: &H, chain: ChainSelector, range: SeqNumRange) -> B256 {
    let leaves = messages_in_range(chain, range)
        .iter()
        .map(|message| hasher.hash(message).unwrap())
        .collect();
    MerkleTree::new(leaves).unwrap().root()
}

/// A commit record for [`messages_in_range`], without messages attached.
pub fn commit_record<H: MessageHasher>(
    hasher: &H,
    chain: ChainSelector,
    range: SeqNumRange,
    timestamp: u64,
) -> CommitData {
    CommitData {
        source_chain: chain,
        timestamp,
        block_num: timestamp,
        merkle_root: merkle_root(hasher, chain, range),
        seq_num_range: range,
        ..Default::default()
    }
}

/// A destination-chain commit report carrying a single root for [`messages_in_range`].
pub fn commit_report<H: MessageHasher>(
    hasher: &H,
    chain: ChainSelector,
    range: SeqNumRange,
    timestamp: u64,
) -> CommitReportWithMeta {
    CommitReportWithMeta {
        report: CommitReport {
            merkle_roots: vec![MerkleRootChain {
                chain_sel: chain,
                seq_nums_range: range,
                merkle_root: merkle_root(hasher, chain, range),
            }],
        },
        timestamp,
        block_num: timestamp,
    }
}

/// A snapshot where every listed chain has fault tolerance `f_chain` and is readable by
/// `readers`.
pub fn snapshot(
    chains: impl IntoIterator<Item = ChainSelector>,
    f_chain: u8,
    readers: impl IntoIterator<Item = OracleId> + Clone,
) -> ChainConfigSnapshot {
    ChainConfigSnapshot::new(
        1,
        chains
            .into_iter()
            .map(|chain| (chain, ChainConfig::new(f_chain, readers.clone())))
            .collect(),
    )
}

/// A chain reader over in-memory destination and source chain state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryChainReader {
    pub commit_reports: Vec<CommitReportWithMeta>,
    pub executed: BTreeMap<ChainSelector, Vec<SeqNumRange>>,
    pub messages: BTreeMap<ChainSelector, BTreeMap<SeqNum, Message>>,
    pub delay: Option<Duration>,
}

impl InMemoryChainReader {
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn add_commit(&mut self, report: CommitReportWithMeta) {
        self.commit_reports.push(report);
        self.commit_reports.sort_by_key(|report| report.timestamp);
    }

    pub fn add_executed(&mut self, chain: ChainSelector, range: SeqNumRange) {
        let ranges = self.executed.entry(chain).or_default();
        ranges.push(range);
        ranges.sort();
    }

    pub fn add_messages(&mut self, chain: ChainSelector, range: SeqNumRange) {
        let messages = self.messages.entry(chain).or_default();
        messages.extend(messages_in_range(chain, range).into_iter().map(|m| (m.seq_num(), m)));
    }

    async fn wait(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl ChainReader for InMemoryChainReader {
    type Error = TestError;

    async fn commit_reports_gte_timestamp(
        &self,
        _dest: ChainSelector,
        since: u64,
        limit: usize,
    ) -> Result<Vec<CommitReportWithMeta>, Self::Error> {
        self.wait().await;
        Ok(self
            .commit_reports
            .iter()
            .filter(|report| report.timestamp >= since)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn executed_message_ranges(
        &self,
        source: ChainSelector,
        _dest: ChainSelector,
        range: SeqNumRange,
    ) -> Result<Vec<SeqNumRange>, Self::Error> {
        self.wait().await;
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
        self.wait().await;
        Ok(self
            .messages
            .get(&chain)
            .map(|messages| {
                messages.range(range.start()..=range.end()).map(|(_, m)| m.clone()).collect()
            })
            .unwrap_or_default())
    }
}

/// A chain config source returning fixed configs.
#[derive(Debug, Clone, Default)]
pub struct StaticConfigSource {
    pub chains: BTreeMap<ChainSelector, ChainConfig>,
    pub delay: Option<Duration>,
}

impl StaticConfigSource {
    pub const fn new(chains: BTreeMap<ChainSelector, ChainConfig>) -> Self {
        Self { chains, delay: None }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl ChainConfigSource for StaticConfigSource {
    type Error = TestError;

    async fn chain_configs(&self) -> Result<BTreeMap<ChainSelector, ChainConfig>, Self::Error> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.chains.clone())
    }
}

/// Config for `oracle_id` executing on [`DEST_CHAIN`] with committee fault tolerance 1.
pub fn plugin_config(oracle_id: OracleId) -> crate::ExecutePluginConfig {
    crate::ExecutePluginConfig {
        dest_chain: DEST_CHAIN,
        oracle_id,
        f: 1,
        offchain: Default::default(),
    }
}
