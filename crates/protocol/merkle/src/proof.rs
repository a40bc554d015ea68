//! Multi-proofs and the on-chain equivalent verifier.

use crate::{MAX_NUM_HASHES, MerkleError, MerkleResult, hash_internal_node};
use alloy_primitives::{B256, U256};

/// Source flag: both operands of the step come from leaves or previously computed hashes.
pub const SOURCE_FROM_HASHES: bool = true;

/// Source flag: the first operand of the step is taken from the proof hashes.
pub const SOURCE_FROM_PROOF: bool = false;

/// A single proof covering several leaves of a [`MerkleTree`](crate::MerkleTree).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultiProof {
    /// Sibling hashes, in the order the verifier consumes them.
    pub hashes: Vec<B256>,
    /// One flag per hashing step, see [`SOURCE_FROM_HASHES`] and [`SOURCE_FROM_PROOF`].
    pub source_flags: Vec<bool>,
}

impl MultiProof {
    /// Packs the source flags into a bit-field, flag `i` at bit `i`.
    pub fn proof_flag_bits(&self) -> MerkleResult<U256> {
        if self.source_flags.len() > MAX_NUM_HASHES {
            return Err(MerkleError::TooManyFlags(self.source_flags.len()));
        }
        Ok(self
            .source_flags
            .iter()
            .enumerate()
            .filter(|(_, flag)| **flag)
            .fold(U256::ZERO, |bits, (i, _)| bits | (U256::from(1) << i)))
    }

    /// Recomputes the root from the proven `leaves`, given in ascending index order.
    pub fn compute_root(&self, leaves: &[B256]) -> MerkleResult<B256> {
        let bits = self.proof_flag_bits()?;
        Self::compute_root_from_bits(leaves, &self.hashes, bits)
    }

    /// Recomputes the root exactly as the destination contract does.
    pub fn compute_root_from_bits(
        leaves: &[B256],
        proofs: &[B256],
        proof_flag_bits: U256,
    ) -> MerkleResult<B256> {
        if leaves.is_empty() {
            return Err(MerkleError::InvalidProof);
        }
        if leaves.len() > MAX_NUM_HASHES + 1 || proofs.len() > MAX_NUM_HASHES + 1 {
            return Err(MerkleError::InvalidProof);
        }
        let total_hashes = leaves.len() + proofs.len() - 1;
        if total_hashes > MAX_NUM_HASHES {
            return Err(MerkleError::InvalidProof);
        }
        if total_hashes == 0 {
            return Ok(leaves[0]);
        }

        let mut hashes = Vec::with_capacity(total_hashes);
        let (mut leaf_pos, mut hash_pos, mut proof_pos) = (0, 0, 0);
        let next = |hashes: &Vec<B256>, leaf_pos: &mut usize, hash_pos: &mut usize| {
            if *leaf_pos < leaves.len() {
                *leaf_pos += 1;
                Ok(leaves[*leaf_pos - 1])
            } else {
                *hash_pos += 1;
                hashes.get(*hash_pos - 1).copied().ok_or(MerkleError::InvalidProof)
            }
        };

        for i in 0..total_hashes {
            let a = if proof_flag_bits.bit(i) {
                next(&hashes, &mut leaf_pos, &mut hash_pos)?
            } else {
                proof_pos += 1;
                *proofs.get(proof_pos - 1).ok_or(MerkleError::InvalidProof)?
            };
            let b = next(&hashes, &mut leaf_pos, &mut hash_pos)?;
            if hash_pos > i {
                return Err(MerkleError::InvalidProof);
            }
            hashes.push(hash_internal_node(a, b));
        }

        if hash_pos != total_hashes - 1 || leaf_pos != leaves.len() || proof_pos != proofs.len() {
            return Err(MerkleError::InvalidProof);
        }
        Ok(hashes[total_hashes - 1])
    }
}
