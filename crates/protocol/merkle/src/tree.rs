//! Binary Merkle tree with multi-proof generation.

use crate::{
    MAX_NUM_LEAVES, MerkleError, MerkleResult, MultiProof, SOURCE_FROM_HASHES, SOURCE_FROM_PROOF,
    ZERO_HASH, hash_internal_node,
};
use alloy_primitives::B256;
use tracing::trace;

/// A binary Merkle tree over an ordered list of leaves.
///
/// Every layer except the root is padded to an even length with [`ZERO_HASH`], so each node
/// always has a sibling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleTree {
    /// Layers from the (padded) leaves up to the root.
    layers: Vec<Vec<B256>>,
    /// Number of leaves before padding.
    leaf_count: usize,
}

impl MerkleTree {
    /// Builds a tree over `leaves`, preserving their order.
    pub fn new(leaves: Vec<B256>) -> MerkleResult<Self> {
        if leaves.is_empty() {
            return Err(MerkleError::NoLeaves);
        }
        if leaves.len() > MAX_NUM_LEAVES {
            return Err(MerkleError::TooManyLeaves(leaves.len()));
        }

        let leaf_count = leaves.len();
        let mut layers = Vec::new();
        let mut layer = leaves;
        while layer.len() > 1 {
            if layer.len() % 2 != 0 {
                layer.push(ZERO_HASH);
            }
            let next =
                layer.chunks_exact(2).map(|pair| hash_internal_node(pair[0], pair[1])).collect();
            layers.push(layer);
            layer = next;
        }
        layers.push(layer);

        Ok(Self { layers, leaf_count })
    }

    /// The root of the tree.
    pub fn root(&self) -> B256 {
        // `new` always pushes a final single-element layer.
        self.layers.last().and_then(|layer| layer.first()).copied().unwrap_or(ZERO_HASH)
    }

    /// Number of leaves, excluding padding.
    pub const fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    /// The leaves, excluding padding.
    pub fn leaves(&self) -> &[B256] {
        &self.layers[0][..self.leaf_count]
    }

    /// Generates a multi-proof for the leaves at `indices`.
    ///
    /// The indices may be given in any order; the proof always covers them in ascending order,
    /// which is also the order the verifier expects the leaves in. An empty index set yields an
    /// empty proof.
    pub fn prove(&self, indices: &[usize]) -> MerkleResult<MultiProof> {
        let mut indices = indices.to_vec();
        indices.sort_unstable();
        for pair in indices.windows(2) {
            if pair[0] == pair[1] {
                return Err(MerkleError::DuplicateIndex(pair[0]));
            }
        }
        if let Some(&index) = indices.iter().find(|&&index| index >= self.leaf_count) {
            return Err(MerkleError::IndexOutOfBounds { index, leaves: self.leaf_count });
        }

        let mut proof = MultiProof::default();
        for layer in &self.layers[..self.layers.len() - 1] {
            let mut next_indices = Vec::with_capacity(indices.len().div_ceil(2));
            let mut i = 0;
            while i < indices.len() {
                let index = indices[i];
                let sibling = index ^ 1;
                if indices.get(i + 1) == Some(&sibling) {
                    proof.source_flags.push(SOURCE_FROM_HASHES);
                    i += 1;
                } else {
                    proof.hashes.push(layer[sibling]);
                    proof.source_flags.push(SOURCE_FROM_PROOF);
                }
                next_indices.push(index / 2);
                i += 1;
            }
            indices = next_indices;
        }

        trace!(
            target: "merkle",
            leaves = self.leaf_count,
            proof_hashes = proof.hashes.len(),
            flags = proof.source_flags.len(),
            "Generated multi-proof"
        );
        Ok(proof)
    }
}
