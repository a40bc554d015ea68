//! Error types for the execute plugin.

use alloy_primitives::B256;
use core::{error::Error, time::Duration};
use offramp_merkle::MerkleError;
use offramp_primitives::{ChainSelector, EncodingError, OracleId, SeqNum, SeqNumRange};
use thiserror::Error;

/// A boxed error raised by an injected collaborator.
type BoxedError = Box<dyn Error + Send + Sync + 'static>;

/// An error raised by the range algebra. Both variants are caller invariant violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    /// A commit range starts before the previous one ends.
    #[error("sequence number ranges overlap: {next} starts before {previous} ends")]
    OverlappingRanges {
        /// The merged range built so far.
        previous: SeqNumRange,
        /// The offending range.
        next: SeqNumRange,
    },
    /// Two executed ranges share sequence numbers.
    #[error("executed ranges overlap: {previous} and {next}")]
    OverlappingExecutedRanges {
        /// The lower range.
        previous: SeqNumRange,
        /// The offending range.
        next: SeqNumRange,
    },
}

/// A [Result] alias for the [RangeError] type.
pub type RangeResult<T> = Result<T, RangeError>;

/// A protocol violation found in a peer's observation. The observation is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The observation could not be decoded.
    #[error("undecodable observation: {0}")]
    Decode(String),
    /// The observer reported data from a chain it is not authorised to read.
    #[error("oracle {oracle} is not allowed to read chain {chain}")]
    UnauthorizedChain {
        /// The observer.
        oracle: OracleId,
        /// The chain it reported on.
        chain: ChainSelector,
    },
    /// The same merkle root was observed twice.
    #[error("duplicate merkle root {0}")]
    DuplicateMerkleRoot(B256),
    /// Two commit ranges of the same chain overlap.
    #[error("sequence number range {next} overlaps {previous} on chain {chain}")]
    OverlappingRanges {
        /// Source chain of both records.
        chain: ChainSelector,
        /// The lower range.
        previous: SeqNumRange,
        /// The offending range.
        next: SeqNumRange,
    },
    /// An executed sequence number falls outside its record's range.
    #[error("executed message {seq_num} outside of range {range}")]
    ExecutedOutOfRange {
        /// The executed sequence number.
        seq_num: SeqNum,
        /// The record's range.
        range: SeqNumRange,
    },
    /// A commit record was filed under another chain's key.
    #[error("commit record for chain {record_chain} filed under chain {key}")]
    ChainMismatch {
        /// The map key.
        key: ChainSelector,
        /// The record's own source chain.
        record_chain: ChainSelector,
    },
    /// A range with `start > end`.
    #[error("inverted sequence number range {0}")]
    InvertedRange(SeqNumRange),
    /// A message keyed under a (chain, sequence number) that disagrees with its header.
    #[error("message keyed as ({chain}, {seq_num}) has header ({header_chain}, {header_seq_num})")]
    MessageKeyMismatch {
        /// Chain key.
        chain: ChainSelector,
        /// Sequence number key.
        seq_num: SeqNum,
        /// Source chain in the header.
        header_chain: ChainSelector,
        /// Sequence number in the header.
        header_seq_num: SeqNum,
    },
}

/// An error raised while building the report for a single commit record.
///
/// [`BuildReportError::EmptyReport`] is not a failure: nothing from the record fits this round.
/// Every other variant is a data integrity failure and the record is skipped.
#[derive(Debug, Error)]
pub enum BuildReportError {
    /// No message of the record is ready or fits in the remaining size budget.
    #[error("no message fits in the report")]
    EmptyReport,
    /// The number of attached messages differs from the range length.
    #[error("malformed record {root}: expected {expected} messages, got {actual}")]
    MessageCountMismatch {
        /// The committed root.
        root: B256,
        /// Length of the record's range.
        expected: u64,
        /// Number of attached messages.
        actual: usize,
    },
    /// A message's sequence number lies outside the record's range.
    #[error("malformed record {root}: message {seq_num} outside of range {range}")]
    MessageOutOfRange {
        /// The committed root.
        root: B256,
        /// The message's sequence number.
        seq_num: SeqNum,
        /// The record's range.
        range: SeqNumRange,
    },
    /// A message's source chain differs from the record's.
    #[error("malformed record {root}: message from chain {actual}, expected {expected}")]
    SourceChainMismatch {
        /// The committed root.
        root: B256,
        /// The record's source chain.
        expected: ChainSelector,
        /// The message's source chain.
        actual: ChainSelector,
    },
    /// The recomputed root differs from the committed one.
    #[error("merkle root mismatch: expected {expected}, got {actual}")]
    RootMismatch {
        /// The committed root.
        expected: B256,
        /// The recomputed root.
        actual: B256,
    },
    /// The message hasher failed.
    #[error("failed to hash message {seq_num}: {source}")]
    Hash {
        /// The message's sequence number.
        seq_num: SeqNum,
        /// The hasher error.
        source: BoxedError,
    },
    /// The report codec failed.
    #[error("failed to encode report: {0}")]
    Encode(BoxedError),
    /// Tree construction or proof generation failed.
    #[error(transparent)]
    Merkle(#[from] MerkleError),
}

impl BuildReportError {
    /// Whether this is the benign "nothing fits" signal.
    pub const fn is_empty_report(&self) -> bool {
        matches!(self, Self::EmptyReport)
    }
}

/// A round level failure of a plugin hook.
#[derive(Debug, Error)]
pub enum PluginError {
    /// A chain read exceeded its deadline. The round is retried.
    #[error("`{operation}` timed out after {timeout:?}")]
    ReadTimeout {
        /// The read that timed out.
        operation: &'static str,
        /// The configured deadline.
        timeout: Duration,
    },
    /// A chain read failed. The round is retried.
    #[error("`{operation}` failed: {source}")]
    ChainRead {
        /// The failed read.
        operation: &'static str,
        /// The reader error.
        source: BoxedError,
    },
    /// The range algebra rejected its input.
    #[error(transparent)]
    Range(#[from] RangeError),
    /// An observation failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// An observation or outcome could not be (de)serialized.
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    /// The report codec failed.
    #[error("report codec: {0}")]
    Codec(BoxedError),
}

impl PluginError {
    /// Whether the error is transient and the next round may succeed.
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::ReadTimeout { .. } | Self::ChainRead { .. })
    }
}

/// A [Result] alias for the [PluginError] type.
pub type PluginResult<T> = Result<T, PluginError>;

/// An invalid [`OffchainConfig`](crate::OffchainConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config is not valid JSON.
    #[error("invalid offchain config: {0}")]
    Json(#[from] serde_json::Error),
    /// A field that must be positive is zero.
    #[error("`{0}` must be non-zero")]
    Zero(&'static str),
}
