//! Cross-chain message primitives.

use crate::{ChainSelector, SeqNum};
use alloy_primitives::{B256, Bytes, U256};
use serde::{Deserialize, Serialize};

/// Identifying fields of a [`Message`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageHeader {
    /// Unique message identifier assigned on the source chain.
    pub message_id: B256,
    /// Chain the message was sent from.
    pub source_chain_selector: ChainSelector,
    /// Chain the message is executed on.
    pub dest_chain_selector: ChainSelector,
    /// Position of the message in the (source, destination) lane.
    pub seq_num: SeqNum,
    /// Per-sender nonce. Zero for messages that may execute out of order.
    pub nonce: u64,
    /// Hash computed on the source chain, informational only.
    pub msg_hash: B256,
    /// Address of the on-ramp contract that emitted the message.
    pub on_ramp: Bytes,
}

/// A token transfer carried by a [`Message`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenAmount {
    /// Token pool on the source chain.
    pub source_pool_address: Bytes,
    /// Token address on the destination chain.
    pub dest_token_address: Bytes,
    /// Opaque pool data forwarded to the destination pool.
    pub extra_data: Bytes,
    /// Transferred amount.
    pub amount: U256,
    /// Destination execution data, such as the gas allotted to the release call.
    pub dest_exec_data: Bytes,
}

/// An immutable cross-chain message as emitted on the source chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Identifying fields.
    pub header: MessageHeader,
    /// Sender on the source chain.
    pub sender: Bytes,
    /// Arbitrary payload delivered to the receiver.
    pub data: Bytes,
    /// Receiver on the destination chain.
    pub receiver: Bytes,
    /// Chain-family specific extension blob, for example an encoded gas limit.
    pub extra_args: Bytes,
    /// Token the fee was paid in.
    pub fee_token: Bytes,
    /// Fee amount in `fee_token`.
    pub fee_token_amount: U256,
    /// Fee value denominated in juels.
    pub fee_value_juels: U256,
    /// Token transfers attached to the message.
    pub token_amounts: Vec<TokenAmount>,
}

impl Message {
    /// Shorthand for the message's sequence number.
    pub const fn seq_num(&self) -> SeqNum {
        self.header.seq_num
    }

    /// Shorthand for the message's source chain.
    pub const fn source_chain(&self) -> ChainSelector {
        self.header.source_chain_selector
    }
}
