//! Error types for the `offramp-merkle` crate.

use thiserror::Error;

/// An error raised while building a tree, proving, or verifying a proof.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MerkleError {
    /// A tree needs at least one leaf.
    #[error("cannot build a merkle tree without leaves")]
    NoLeaves,
    /// Too many leaves for the on-chain verifier.
    #[error("too many leaves: {0}, at most {max} allowed", max = crate::MAX_NUM_LEAVES)]
    TooManyLeaves(usize),
    /// A proof was requested for a leaf the tree does not have.
    #[error("leaf index {index} out of bounds, tree has {leaves} leaves")]
    IndexOutOfBounds {
        /// The offending index.
        index: usize,
        /// Number of leaves in the tree.
        leaves: usize,
    },
    /// A proof was requested for the same leaf twice.
    #[error("duplicate leaf index {0}")]
    DuplicateIndex(usize),
    /// The proof has more source flags than fit in a 256 bit word.
    #[error("too many proof flags: {0}")]
    TooManyFlags(usize),
    /// The proof is inconsistent with the provided leaves.
    #[error("invalid proof")]
    InvalidProof,
}

/// A [Result] alias for the [MerkleError] type.
pub type MerkleResult<T> = core::result::Result<T, MerkleError>;
