//! Internal node hashing.

use crate::INTERNAL_DOMAIN_SEPARATOR;
use alloy_primitives::{B256, Keccak256};

/// Hashes two children into their parent.
///
/// The children are ordered before hashing, so the result does not depend on which side of
/// the tree each one came from.
pub fn hash_internal_node(a: B256, b: B256) -> B256 {
    let (lo, hi) = if a < b { (a, b) } else { (b, a) };
    let mut hasher = Keccak256::new();
    hasher.update(INTERNAL_DOMAIN_SEPARATOR);
    hasher.update(lo);
    hasher.update(hi);
    hasher.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::keccak256;

    #[test]
    fn test_hash_is_order_independent() {
        let a = B256::repeat_byte(0x01);
        let b = B256::repeat_byte(0x02);
        assert_eq!(hash_internal_node(a, b), hash_internal_node(b, a));
    }

    #[test]
    fn test_hash_matches_concatenated_preimage() {
        let a = B256::repeat_byte(0x22);
        let b = B256::repeat_byte(0x11);

        let mut preimage = Vec::with_capacity(96);
        preimage.extend_from_slice(INTERNAL_DOMAIN_SEPARATOR.as_slice());
        preimage.extend_from_slice(b.as_slice());
        preimage.extend_from_slice(a.as_slice());

        assert_eq!(hash_internal_node(a, b), keccak256(preimage));
    }
}
