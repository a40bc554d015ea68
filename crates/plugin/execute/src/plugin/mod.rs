//! The round state machine driven by the reporting protocol runtime.

mod observation;
pub(crate) use observation::read_with_timeout;
pub use observation::visibility_cutoff;

mod validate;
pub use validate::validate_observation;

mod outcome;
pub use outcome::{attach_messages, merge_commit_observations, merge_message_observations};

mod execute;
pub use execute::ExecutePlugin;

use crate::PluginResult;
use alloy_primitives::Bytes;
use async_trait::async_trait;
use offramp_primitives::OracleId;

/// Round context handed to every hook by the protocol runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutcomeContext {
    /// The round's sequence number.
    pub seq_nr: u64,
    /// The encoded outcome of the previous round, empty in the first round.
    pub previous_outcome: Bytes,
}

/// An encoded observation and the oracle that produced it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributedObservation {
    /// The observing oracle.
    pub observer: OracleId,
    /// The encoded observation.
    pub observation: Bytes,
}

/// An encoded report with opaque transmission metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportWithInfo {
    /// The report in the destination chain's wire format.
    pub report: Bytes,
    /// Opaque metadata passed through to the transmitter.
    pub info: Bytes,
}

/// The hooks a reporting protocol runtime drives each round.
///
/// A round runs `query`, then `observation` on every node, `validate_observation` on every
/// received observation, `observation_quorum` and `outcome` over the validated set, and finally
/// `reports`. Attested reports pass through `should_accept_attested_report` and
/// `should_transmit_accepted_report` before transmission.
#[async_trait]
pub trait ReportingPlugin: Send + Sync {
    /// Produces the round's query.
    async fn query(&self, ctx: &OutcomeContext) -> PluginResult<Bytes>;

    /// Produces this node's encoded observation.
    async fn observation(&self, ctx: &OutcomeContext, query: &[u8]) -> PluginResult<Bytes>;

    /// Checks a peer's observation. An error rejects it.
    fn validate_observation(
        &self,
        ctx: &OutcomeContext,
        query: &[u8],
        observation: &AttributedObservation,
    ) -> PluginResult<()>;

    /// Whether enough observations were collected to compute an outcome.
    fn observation_quorum(
        &self,
        ctx: &OutcomeContext,
        query: &[u8],
        observations: &[AttributedObservation],
    ) -> PluginResult<bool>;

    /// Merges the validated observations into the round's encoded outcome.
    fn outcome(
        &self,
        ctx: &OutcomeContext,
        query: &[u8],
        observations: &[AttributedObservation],
    ) -> PluginResult<Bytes>;

    /// Turns an encoded outcome into transmittable reports.
    fn reports(&self, seq_nr: u64, outcome: &[u8]) -> PluginResult<Vec<ReportWithInfo>>;

    /// Whether an attested report should be accepted.
    async fn should_accept_attested_report(
        &self,
        seq_nr: u64,
        report: &ReportWithInfo,
    ) -> PluginResult<bool>;

    /// Whether an accepted report should be transmitted by this node.
    async fn should_transmit_accepted_report(
        &self,
        seq_nr: u64,
        report: &ReportWithInfo,
    ) -> PluginResult<bool>;

    /// Releases background resources.
    async fn close(&self) -> PluginResult<()>;
}
