//! Chain-family capabilities consumed by the execute plugin.

use crate::{ExecuteReport, Message};
use alloy_primitives::{B256, Bytes};
use auto_impl::auto_impl;
use core::error::Error;

/// Hashes a [`Message`] into a Merkle leaf.
///
/// Implementations must reproduce the destination contract's hashing scheme exactly; any
/// divergence makes every proof fail verification on-chain.
#[auto_impl(&, Box, Arc)]
pub trait MessageHasher {
    /// The error type for the hasher.
    type Error: Error + Send + Sync + 'static;

    /// Computes the leaf hash of `message`.
    fn hash(&self, message: &Message) -> Result<B256, Self::Error>;
}

/// Encodes and decodes [`ExecuteReport`]s in the destination chain's wire format.
///
/// Encoding must be a pure function of its input: it is called repeatedly to measure report
/// sizes while packing.
#[auto_impl(&, Box, Arc)]
pub trait ReportCodec {
    /// The error type for the codec.
    type Error: Error + Send + Sync + 'static;

    /// Encodes a report.
    fn encode(&self, report: &ExecuteReport) -> Result<Bytes, Self::Error>;

    /// Decodes a report.
    fn decode(&self, data: &[u8]) -> Result<ExecuteReport, Self::Error>;
}
