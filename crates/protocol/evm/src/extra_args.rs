//! Tagged extra-args blobs carried by EVM-bound messages.

use crate::{EvmCodecError, EvmCodecResult};
use alloy_primitives::{Bytes, FixedBytes, U256, fixed_bytes};
use alloy_sol_types::SolValue;

/// Tag of `EVMExtraArgsV1 { uint256 gasLimit }`.
pub const EVM_EXTRA_ARGS_V1_TAG: FixedBytes<4> = fixed_bytes!("0x97a657c9");

/// Tag of `EVMExtraArgsV2 { uint256 gasLimit; bool allowOutOfOrderExecution }`.
pub const EVM_EXTRA_ARGS_V2_TAG: FixedBytes<4> = fixed_bytes!("0x181dcf10");

/// Gas limit applied to messages sent without extra args.
pub const DEFAULT_GAS_LIMIT: u64 = 200_000;

/// Extracts the gas limit from an extra-args blob of either known version. An empty blob
/// yields [`DEFAULT_GAS_LIMIT`].
pub fn decode_gas_limit(extra_args: &[u8]) -> EvmCodecResult<U256> {
    if extra_args.is_empty() {
        return Ok(U256::from(DEFAULT_GAS_LIMIT));
    }
    if extra_args.len() < 4 {
        return Err(EvmCodecError::ExtraArgsTooShort(extra_args.len()));
    }
    let (tag, body) = extra_args.split_at(4);
    let tag = FixedBytes::<4>::from_slice(tag);

    if tag == EVM_EXTRA_ARGS_V1_TAG {
        Ok(U256::abi_decode(body)?)
    } else if tag == EVM_EXTRA_ARGS_V2_TAG {
        let (gas_limit, _allow_out_of_order) = <(U256, bool)>::abi_decode(body)?;
        Ok(gas_limit)
    } else {
        Err(EvmCodecError::UnknownExtraArgsTag(tag))
    }
}

/// Encodes `gas_limit` as a V1 extra-args blob.
pub fn encode_extra_args_v1(gas_limit: U256) -> Bytes {
    let mut out = EVM_EXTRA_ARGS_V1_TAG.to_vec();
    out.extend(gas_limit.abi_encode());
    out.into()
}
