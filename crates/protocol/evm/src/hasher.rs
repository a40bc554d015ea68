//! Merkle leaf hashing for EVM destination chains.

use crate::{Any2EVMTokenTransfer, EvmCodecError, EvmCodecResult, abi, decode_gas_limit};
use alloy_primitives::{B256, keccak256};
use alloy_sol_types::SolValue;
use offramp_merkle::LEAF_DOMAIN_SEPARATOR;
use offramp_primitives::{Message, MessageHasher};

/// `keccak256("Any2EVMMessageHashV1")`, the metadata hash prefix of EVM-bound messages.
pub fn any_2_evm_message_hash() -> B256 {
    keccak256("Any2EVMMessageHashV1")
}

/// Hashes messages the same way the EVM off-ramp does before verifying a multi-proof.
///
/// The leaf is `keccak256(abi.encode(LEAF_DOMAIN_SEPARATOR, metadataHash, fixedFieldsHash,
/// keccak256(sender), keccak256(data), keccak256(abi.encode(tokenAmounts))))`, where the
/// metadata hash binds the lane (source, destination and on-ramp).
#[derive(Debug, Clone, Copy, Default)]
pub struct EvmMessageHasher;

impl EvmMessageHasher {
    /// Creates a new hasher.
    pub const fn new() -> Self {
        Self
    }
}

impl MessageHasher for EvmMessageHasher {
    type Error = EvmCodecError;

    fn hash(&self, message: &Message) -> EvmCodecResult<B256> {
        let header = &message.header;

        let metadata_hash = keccak256(
            (
                any_2_evm_message_hash(),
                header.source_chain_selector.0,
                header.dest_chain_selector.0,
                keccak256(&header.on_ramp),
            )
                .abi_encode(),
        );

        let gas_limit = decode_gas_limit(&message.extra_args)?;
        let fixed_fields_hash = keccak256(
            (
                header.message_id,
                abi::bytes_to_address(&message.receiver),
                header.seq_num,
                gas_limit,
                header.nonce,
            )
                .abi_encode(),
        );

        let token_amounts = message
            .token_amounts
            .iter()
            .map(Any2EVMTokenTransfer::try_from)
            .collect::<EvmCodecResult<Vec<_>>>()?;

        let leaf = (
            LEAF_DOMAIN_SEPARATOR,
            metadata_hash,
            fixed_fields_hash,
            keccak256(abi::left_pad_32(&message.sender)),
            keccak256(&message.data),
            keccak256(token_amounts.abi_encode()),
        )
            .abi_encode();

        let hash = keccak256(leaf);
        tracing::trace!(
            target: "evm_hasher",
            seq_num = header.seq_num,
            source = %header.source_chain_selector,
            %hash,
            "Hashed message"
        );
        Ok(hash)
    }
}
