//! Per-message eligibility.

use derive_more::Display;

/// Outcome of checking whether a single message can be executed this round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum MessageStatus {
    /// The message is already in the record's executed set.
    #[display("already_executed")]
    AlreadyExecuted,
    /// Token data is not available yet; retried next round.
    #[display("token_data_not_ready")]
    TokenDataNotReady,
    /// Token data could not be read.
    #[display("token_data_fetch_error")]
    TokenDataFetchError,
    /// The message can be included in a report.
    #[display("ready_to_execute")]
    ReadyToExecute,
}

impl MessageStatus {
    /// Whether the message may be included in a report.
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::ReadyToExecute)
    }
}
