//! Collaborators the execute plugin reads from.

use crate::ChainConfig;
use alloy_primitives::Bytes;
use async_trait::async_trait;
use auto_impl::auto_impl;
use core::error::Error;
use offramp_primitives::{ChainSelector, CommitReportWithMeta, Message, SeqNum, SeqNumRange};
use std::collections::BTreeMap;
use thiserror::Error;

/// Read access to the destination and source chains.
///
/// Results must be ordered ascending by sequence number where order matters, and repeated calls
/// with the same arguments must return the same data at a given chain height.
#[async_trait]
#[auto_impl(&, Box, Arc)]
pub trait ChainReader: Send + Sync {
    /// The error type for the reader.
    type Error: Error + Send + Sync + 'static;

    /// Commit reports stored on `dest` with a timestamp of at least `since` (unix seconds),
    /// oldest first, at most `limit` of them.
    async fn commit_reports_gte_timestamp(
        &self,
        dest: ChainSelector,
        since: u64,
        limit: usize,
    ) -> Result<Vec<CommitReportWithMeta>, Self::Error>;

    /// Ranges of messages from `source` within `range` already executed on `dest`.
    async fn executed_message_ranges(
        &self,
        source: ChainSelector,
        dest: ChainSelector,
        range: SeqNumRange,
    ) -> Result<Vec<SeqNumRange>, Self::Error>;

    /// Messages sent from `chain` with sequence numbers in `range`.
    async fn msgs_between_seq_nums(
        &self,
        chain: ChainSelector,
        range: SeqNumRange,
    ) -> Result<Vec<Message>, Self::Error>;
}

/// A failed off-chain token data read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenDataError {
    /// The data, such as an attestation, is not available yet. The message is deferred.
    #[error("token data not ready")]
    NotReady,
    /// The read failed for any other reason.
    #[error("token data fetch failed: {0}")]
    Fetch(String),
}

/// Supplies the off-chain data attached to each token transfer of a message.
#[auto_impl(&, Box, Arc)]
pub trait TokenDataReader {
    /// Reads the token data of message `seq_num` from `source`, one entry per token transfer.
    fn read_token_data(
        &self,
        source: ChainSelector,
        seq_num: SeqNum,
    ) -> Result<Vec<Bytes>, TokenDataError>;
}

/// Source of the per-chain fault tolerance and read authorisation, typically the home chain.
#[async_trait]
#[auto_impl(&, Box, Arc)]
pub trait ChainConfigSource: Send + Sync {
    /// The error type for the source.
    type Error: Error + Send + Sync + 'static;

    /// Fetches the current configuration of every chain.
    async fn chain_configs(&self) -> Result<BTreeMap<ChainSelector, ChainConfig>, Self::Error>;
}
