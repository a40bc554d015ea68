//! Constants shared with the on-chain multi-proof verifier.

use alloy_primitives::{B256, b256};

/// Maximum number of leaves a tree may hold.
pub const MAX_NUM_LEAVES: usize = 256;

/// Maximum number of hashes the verifier computes for a single proof.
pub const MAX_NUM_HASHES: usize = 256;

/// Domain separator prepended to leaf preimages by message hashers.
pub const LEAF_DOMAIN_SEPARATOR: B256 = B256::ZERO;

/// Domain separator prepended to internal node preimages.
pub const INTERNAL_DOMAIN_SEPARATOR: B256 =
    b256!("0x0000000000000000000000000000000000000000000000000000000000000001");

/// Padding used for the missing sibling of an odd layer.
pub const ZERO_HASH: B256 = B256::ZERO;
