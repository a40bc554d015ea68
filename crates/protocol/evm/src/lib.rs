#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod abi;
pub use abi::{Any2EVMRampMessage, Any2EVMTokenTransfer, ExecutionReport, RampMessageHeader};

mod extra_args;
pub use extra_args::{
    DEFAULT_GAS_LIMIT, EVM_EXTRA_ARGS_V1_TAG, EVM_EXTRA_ARGS_V2_TAG, decode_gas_limit,
    encode_extra_args_v1,
};

mod hasher;
pub use hasher::{EvmMessageHasher, any_2_evm_message_hash};

mod codec;
pub use codec::EvmReportCodec;

mod errors;
pub use errors::{EvmCodecError, EvmCodecResult};
