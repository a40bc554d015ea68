//! Error types for the `offramp-evm` crate.

use alloy_primitives::FixedBytes;
use thiserror::Error;

/// An error raised while hashing or (de)serializing EVM messages and reports.
#[derive(Debug, Error)]
pub enum EvmCodecError {
    /// The extra args blob cannot even hold its tag.
    #[error("extra args too short: {0} bytes, expected at least 4")]
    ExtraArgsTooShort(usize),
    /// The extra args tag is not a known EVM version.
    #[error("unknown extra args tag: {0}")]
    UnknownExtraArgsTag(FixedBytes<4>),
    /// Destination execution data of a token transfer is not an encoded `uint32`.
    #[error("invalid token destination exec data: {0}")]
    InvalidDestExecData(alloy_sol_types::Error),
    /// Failed to pack the proof flags of a chain report.
    #[error("invalid proof flag bits")]
    InvalidProofFlagBits,
    /// ABI decoding failed.
    #[error("abi: {0}")]
    Abi(#[from] alloy_sol_types::Error),
}

/// A [Result] alias for the [EvmCodecError] type.
pub type EvmCodecResult<T> = core::result::Result<T, EvmCodecError>;
