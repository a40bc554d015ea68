//! ABI types of the EVM off-ramp's `execute` entrypoint.
#![allow(missing_docs)]

use crate::{EvmCodecError, EvmCodecResult};
use alloy_sol_types::{SolValue, sol};
use offramp_primitives::TokenAmount;

sol! {
    #[derive(Debug, Default, PartialEq, Eq)]
    struct RampMessageHeader {
        bytes32 messageId;
        uint64 sourceChainSelector;
        uint64 destChainSelector;
        uint64 sequenceNumber;
        uint64 nonce;
    }

    #[derive(Debug, Default, PartialEq, Eq)]
    struct Any2EVMTokenTransfer {
        bytes sourcePoolAddress;
        address destTokenAddress;
        uint32 destGasAmount;
        bytes extraData;
        uint256 amount;
    }

    #[derive(Debug, Default, PartialEq, Eq)]
    struct Any2EVMRampMessage {
        RampMessageHeader header;
        bytes sender;
        bytes data;
        address receiver;
        uint256 gasLimit;
        Any2EVMTokenTransfer[] tokenAmounts;
    }

    #[derive(Debug, Default, PartialEq, Eq)]
    struct ExecutionReport {
        uint64 sourceChainSelector;
        Any2EVMRampMessage[] messages;
        bytes[][] offchainTokenData;
        bytes32[] proofs;
        uint256 proofFlagBits;
    }
}

impl TryFrom<&TokenAmount> for Any2EVMTokenTransfer {
    type Error = EvmCodecError;

    fn try_from(token: &TokenAmount) -> EvmCodecResult<Self> {
        let dest_gas_amount = u32::abi_decode(&token.dest_exec_data)
            .map_err(EvmCodecError::InvalidDestExecData)?;
        Ok(Self {
            sourcePoolAddress: token.source_pool_address.clone(),
            destTokenAddress: bytes_to_address(&token.dest_token_address),
            destGasAmount: dest_gas_amount,
            extraData: token.extra_data.clone(),
            amount: token.amount,
        })
    }
}

impl From<Any2EVMTokenTransfer> for TokenAmount {
    fn from(token: Any2EVMTokenTransfer) -> Self {
        Self {
            source_pool_address: token.sourcePoolAddress,
            dest_token_address: token.destTokenAddress.to_vec().into(),
            extra_data: token.extraData,
            amount: token.amount,
            dest_exec_data: token.destGasAmount.abi_encode().into(),
        }
    }
}

/// Interprets `bytes` as an EVM address: the last 20 bytes are kept, shorter input is left
/// padded with zeroes.
pub(crate) fn bytes_to_address(bytes: &[u8]) -> alloy_primitives::Address {
    let mut out = [0u8; 20];
    let take = bytes.len().min(20);
    out[20 - take..].copy_from_slice(&bytes[bytes.len() - take..]);
    out.into()
}

/// Left pads `bytes` with zeroes to a 32 byte word. Longer input is returned unchanged.
pub(crate) fn left_pad_32(bytes: &[u8]) -> Vec<u8> {
    if bytes.len() >= 32 {
        return bytes.to_vec();
    }
    let mut out = vec![0u8; 32 - bytes.len()];
    out.extend_from_slice(bytes);
    out
}
