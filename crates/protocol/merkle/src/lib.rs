#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod constants;
pub use constants::{
    INTERNAL_DOMAIN_SEPARATOR, LEAF_DOMAIN_SEPARATOR, MAX_NUM_HASHES, MAX_NUM_LEAVES, ZERO_HASH,
};

mod hash;
pub use hash::hash_internal_node;

mod tree;
pub use tree::MerkleTree;

mod proof;
pub use proof::{MultiProof, SOURCE_FROM_HASHES, SOURCE_FROM_PROOF};

mod errors;
pub use errors::{MerkleError, MerkleResult};
