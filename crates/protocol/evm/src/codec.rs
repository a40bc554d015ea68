//! ABI codec for execution reports submitted to EVM off-ramps.

use crate::{
    Any2EVMRampMessage, Any2EVMTokenTransfer, EvmCodecError, EvmCodecResult, ExecutionReport,
    RampMessageHeader, abi, decode_gas_limit, encode_extra_args_v1,
};
use alloy_primitives::Bytes;
use alloy_sol_types::SolValue;
use offramp_primitives::{
    ChainReport, ChainSelector, ExecuteReport, Message, MessageHeader, ReportCodec,
};

/// Encodes an [`ExecuteReport`] as `abi.encode(ExecutionReport[])`.
///
/// Only the fields the off-ramp consumes are encoded. The sender is written left padded to a
/// 32 byte word, which is the form [`EvmMessageHasher`](crate::EvmMessageHasher) commits to.
/// Decoding therefore returns the padded sender, restores the extra args as a V1 blob carrying
/// the gas limit and leaves fee fields, the on-ramp and the source message hash at their
/// defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvmReportCodec;

impl EvmReportCodec {
    /// Creates a new codec.
    pub const fn new() -> Self {
        Self
    }
}

impl ReportCodec for EvmReportCodec {
    type Error = EvmCodecError;

    fn encode(&self, report: &ExecuteReport) -> EvmCodecResult<Bytes> {
        let reports = report
            .chain_reports
            .iter()
            .map(to_execution_report)
            .collect::<EvmCodecResult<Vec<_>>>()?;
        Ok(reports.abi_encode().into())
    }

    fn decode(&self, data: &[u8]) -> EvmCodecResult<ExecuteReport> {
        let reports = Vec::<ExecutionReport>::abi_decode(data)?;
        Ok(ExecuteReport {
            chain_reports: reports.into_iter().map(from_execution_report).collect(),
        })
    }
}

fn to_execution_report(report: &ChainReport) -> EvmCodecResult<ExecutionReport> {
    let messages = report.messages.iter().map(to_ramp_message).collect::<EvmCodecResult<_>>()?;
    Ok(ExecutionReport {
        sourceChainSelector: report.source_chain_selector.0,
        messages,
        offchainTokenData: report.offchain_token_data.clone(),
        proofs: report.proofs.clone(),
        proofFlagBits: report.proof_flag_bits,
    })
}

fn to_ramp_message(message: &Message) -> EvmCodecResult<Any2EVMRampMessage> {
    let header = &message.header;
    Ok(Any2EVMRampMessage {
        header: RampMessageHeader {
            messageId: header.message_id,
            sourceChainSelector: header.source_chain_selector.0,
            destChainSelector: header.dest_chain_selector.0,
            sequenceNumber: header.seq_num,
            nonce: header.nonce,
        },
        sender: abi::left_pad_32(&message.sender).into(),
        data: message.data.clone(),
        receiver: abi::bytes_to_address(&message.receiver),
        gasLimit: decode_gas_limit(&message.extra_args)?,
        tokenAmounts: message
            .token_amounts
            .iter()
            .map(Any2EVMTokenTransfer::try_from)
            .collect::<EvmCodecResult<_>>()?,
    })
}

fn from_execution_report(report: ExecutionReport) -> ChainReport {
    ChainReport {
        source_chain_selector: ChainSelector(report.sourceChainSelector),
        messages: report.messages.into_iter().map(from_ramp_message).collect(),
        offchain_token_data: report.offchainTokenData,
        proofs: report.proofs,
        proof_flag_bits: report.proofFlagBits,
    }
}

fn from_ramp_message(message: Any2EVMRampMessage) -> Message {
    Message {
        header: MessageHeader {
            message_id: message.header.messageId,
            source_chain_selector: ChainSelector(message.header.sourceChainSelector),
            dest_chain_selector: ChainSelector(message.header.destChainSelector),
            seq_num: message.header.sequenceNumber,
            nonce: message.header.nonce,
            ..Default::default()
        },
        sender: message.sender,
        data: message.data,
        receiver: message.receiver.to_vec().into(),
        extra_args: encode_extra_args_v1(message.gasLimit),
        token_amounts: message.tokenAmounts.into_iter().map(Into::into).collect(),
        ..Default::default()
    }
}
