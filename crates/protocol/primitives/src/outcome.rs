//! The agreed result of a round.

use crate::{CommitData, EncodingResult, ExecuteReport};
use alloy_primitives::Bytes;
use serde::{Deserialize, Serialize};

/// The round's agreed state. Fed back into the next round as the previous outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    /// Commit records that still have unexecuted messages, oldest first.
    pub pending_commit_reports: Vec<CommitData>,
    /// The report built this round, possibly empty.
    pub report: ExecuteReport,
}

impl Outcome {
    /// Creates a new outcome.
    pub const fn new(pending_commit_reports: Vec<CommitData>, report: ExecuteReport) -> Self {
        Self { pending_commit_reports, report }
    }

    /// Whether there is nothing pending and nothing to report.
    pub fn is_empty(&self) -> bool {
        self.pending_commit_reports.is_empty() && self.report.is_empty()
    }

    /// Encodes the outcome for the protocol runtime.
    pub fn encode(&self) -> EncodingResult<Bytes> {
        Ok(serde_json::to_vec(self)?.into())
    }

    /// Decodes a previously encoded outcome.
    pub fn decode(data: &[u8]) -> EncodingResult<Self> {
        Ok(serde_json::from_slice(data)?)
    }
}
