//! Packing of pending commit records into a size-bounded execution report.

mod status;
pub use status::MessageStatus;

mod tree;
pub use tree::construct_merkle_tree;

use crate::{BuildReportError, Metrics, TokenDataError, TokenDataReader};
use alloy_primitives::Bytes;
use offramp_merkle::MerkleTree;
use offramp_primitives::{
    ChainReport, ChainSelector, CommitData, ExecuteReport, MessageHasher, ReportCodec, SeqNum,
};
use std::collections::BTreeMap;
use tracing::{debug, error, trace};

/// Greedily packs commit records into an [`ExecuteReport`] under a byte size ceiling.
///
/// Records are taken in the order given. For each record the builder first tries every ready
/// message at once; when that does not fit in the remaining budget it keeps the longest prefix
/// of the ready messages, in sequence number order, that still fits. This is first fit by
/// record rather than an optimal packing.
#[derive(Debug)]
pub struct ReportBuilder<'a, H, C, T> {
    hasher: &'a H,
    codec: &'a C,
    token_data: &'a T,
    max_report_size_bytes: usize,
    accumulated_size: usize,
    chain_reports: Vec<ChainReport>,
    statuses: BTreeMap<(ChainSelector, SeqNum), MessageStatus>,
}

impl<'a, H, C, T> ReportBuilder<'a, H, C, T>
where
    H: MessageHasher,
    C: ReportCodec,
    T: TokenDataReader,
{
    /// Creates an empty builder.
    pub const fn new(
        hasher: &'a H,
        codec: &'a C,
        token_data: &'a T,
        max_report_size_bytes: usize,
    ) -> Self {
        Self {
            hasher,
            codec,
            token_data,
            max_report_size_bytes,
            accumulated_size: 0,
            chain_reports: Vec::new(),
            statuses: BTreeMap::new(),
        }
    }

    /// Encoded bytes used so far.
    pub const fn accumulated_size(&self) -> usize {
        self.accumulated_size
    }

    /// The status recorded for every message checked so far.
    pub const fn statuses(&self) -> &BTreeMap<(ChainSelector, SeqNum), MessageStatus> {
        &self.statuses
    }

    /// Packs `records` and returns the report together with the records still pending.
    ///
    /// Records without messages are kept pending untouched. A record failing an integrity check
    /// is logged, contributes nothing and stays pending. Fully executed records are dropped.
    pub fn select(mut self, records: Vec<CommitData>) -> (ExecuteReport, Vec<CommitData>) {
        let mut pending = Vec::with_capacity(records.len());
        for record in records {
            if !record.has_messages() {
                pending.push(record);
                continue;
            }
            match self.add(&record) {
                Ok(updated) if updated.is_fully_executed() => {
                    debug!(
                        target: "execute::builder",
                        chain = %updated.source_chain,
                        range = %updated.seq_num_range,
                        "Commit fully executed"
                    );
                }
                Ok(updated) => pending.push(updated),
                Err(err) => {
                    error!(
                        target: "execute::builder",
                        chain = %record.source_chain,
                        root = %record.merkle_root,
                        %err,
                        "Skipping malformed commit record"
                    );
                    pending.push(record);
                }
            }
        }
        (self.build(), pending)
    }

    /// Adds as many ready messages of `record` as fit and returns the record with the included
    /// messages marked executed.
    ///
    /// A record contributing nothing is returned unchanged. Errors are integrity failures.
    pub fn add(&mut self, record: &CommitData) -> Result<CommitData, BuildReportError> {
        match self.build_single_chain_report(record.clone()) {
            Ok((report, updated)) => {
                self.chain_reports.push(report);
                Ok(updated)
            }
            Err(BuildReportError::EmptyReport) => {
                debug!(
                    target: "execute::builder",
                    chain = %record.source_chain,
                    range = %record.seq_num_range,
                    "No messages fit in the report"
                );
                Ok(record.clone())
            }
            Err(err) => Err(err),
        }
    }

    /// Builds the chain report for one record without adding it to the builder's output.
    ///
    /// The accumulated size is charged and the returned record carries the new executed marks.
    /// [`BuildReportError::EmptyReport`] means no ready message fits.
    pub fn build_single_chain_report(
        &mut self,
        mut record: CommitData,
    ) -> Result<(ChainReport, CommitData), BuildReportError> {
        record.token_data.resize(record.messages.len(), Vec::new());
        let ready = (0..record.messages.len())
            .filter(|&index| self.check_message(&mut record, index).is_ready())
            .collect::<Vec<_>>();
        if ready.is_empty() {
            return Err(BuildReportError::EmptyReport);
        }

        let tree = construct_merkle_tree(self.hasher, &record)?;
        if tree.root() != record.merkle_root {
            return Err(BuildReportError::RootMismatch {
                expected: record.merkle_root,
                actual: tree.root(),
            });
        }

        let full = chain_report(&tree, &record, &ready)?;
        if let Some(size) = self.fits(&full)? {
            return Ok(self.finalize(full, record, size));
        }

        let mut selected = Vec::with_capacity(ready.len());
        let mut best = None;
        for index in ready {
            selected.push(index);
            let candidate = chain_report(&tree, &record, &selected)?;
            let Some(size) = self.fits(&candidate)? else {
                trace!(
                    target: "execute::builder",
                    chain = %record.source_chain,
                    seq_num = record.messages[index].seq_num(),
                    "Report full, deferring remaining messages"
                );
                break;
            };
            best = Some((candidate, size));
        }

        let (report, size) = best.ok_or(BuildReportError::EmptyReport)?;
        Ok(self.finalize(report, record, size))
    }

    /// Checks the eligibility of message `index`, attaching its token data when ready.
    pub fn check_message(&mut self, record: &mut CommitData, index: usize) -> MessageStatus {
        let Some(message) = record.messages.get(index) else {
            return MessageStatus::TokenDataFetchError;
        };
        let seq_num = message.seq_num();
        let token_count = message.token_amounts.len();

        let status = if record.is_executed(seq_num) {
            MessageStatus::AlreadyExecuted
        } else {
            match self.token_data.read_token_data(record.source_chain, seq_num) {
                Ok(mut data) => {
                    // One entry per token transfer.
                    if data.len() < token_count {
                        data.resize(token_count, Bytes::new());
                    }
                    if record.token_data.len() <= index {
                        record.token_data.resize(index + 1, Vec::new());
                    }
                    record.token_data[index] = data;
                    MessageStatus::ReadyToExecute
                }
                Err(TokenDataError::NotReady) => MessageStatus::TokenDataNotReady,
                Err(TokenDataError::Fetch(err)) => {
                    debug!(
                        target: "execute::builder",
                        chain = %record.source_chain,
                        seq_num,
                        %err,
                        "Token data fetch failed"
                    );
                    MessageStatus::TokenDataFetchError
                }
            }
        };

        self.statuses.insert((record.source_chain, seq_num), status);
        status
    }

    /// Consumes the builder, returning the assembled report.
    pub fn build(self) -> ExecuteReport {
        ExecuteReport { chain_reports: self.chain_reports }
    }

    /// Encoded size of `report` if it fits in the remaining budget.
    fn fits(&self, report: &ChainReport) -> Result<Option<usize>, BuildReportError> {
        let encoded = self
            .codec
            .encode(&ExecuteReport { chain_reports: vec![report.clone()] })
            .map_err(|err| BuildReportError::Encode(Box::new(err)))?;
        let size = encoded.len();
        Ok((self.accumulated_size + size <= self.max_report_size_bytes).then_some(size))
    }

    fn finalize(
        &mut self,
        report: ChainReport,
        mut record: CommitData,
        size: usize,
    ) -> (ChainReport, CommitData) {
        self.accumulated_size += size;
        record.mark_executed(report.messages.iter().map(|message| message.seq_num()));
        metrics::counter!(
            Metrics::REPORT_MESSAGES_TOTAL,
            "chain" => record.source_chain.to_string(),
        )
        .increment(report.messages.len() as u64);
        debug!(
            target: "execute::builder",
            chain = %record.source_chain,
            messages = report.messages.len(),
            size,
            accumulated = self.accumulated_size,
            "Added chain report"
        );
        (report, record)
    }
}

/// Assembles the chain report proving the messages at `indices` (ascending) of `record`.
fn chain_report(
    tree: &MerkleTree,
    record: &CommitData,
    indices: &[usize],
) -> Result<ChainReport, BuildReportError> {
    let proof = tree.prove(indices)?;
    Ok(ChainReport {
        source_chain_selector: record.source_chain,
        messages: indices.iter().map(|&i| record.messages[i].clone()).collect(),
        offchain_token_data: indices.iter().map(|&i| record.token_data[i].clone()).collect(),
        proof_flag_bits: proof.proof_flag_bits()?,
        proofs: proof.hashes,
    })
}
