//! Metrics for the execute plugin.

use offramp_primitives::ChainSelector;

/// Metric names and registration for the execute plugin.
#[derive(Debug, Clone)]
pub struct Metrics;

impl Metrics {
    /// Observations produced by this node.
    pub const OBSERVATIONS_TOTAL: &'static str = "execute_observations_total";
    /// Observation attempts abandoned because of a read failure.
    pub const OBSERVATION_ERRORS_TOTAL: &'static str = "execute_observation_errors_total";
    /// Peer observations rejected by validation.
    pub const REJECTED_OBSERVATIONS_TOTAL: &'static str = "execute_rejected_observations_total";
    /// Messages included in built reports, labelled by source chain.
    pub const REPORT_MESSAGES_TOTAL: &'static str = "execute_report_messages_total";
    /// Encoded size of transmittable reports.
    pub const REPORT_SIZE_BYTES: &'static str = "execute_report_size_bytes";
    /// Commit records still pending after the last outcome.
    pub const PENDING_COMMIT_REPORTS: &'static str = "execute_pending_commit_reports";
    /// Failed chain configuration syncs.
    pub const CONFIG_SYNC_ERRORS_TOTAL: &'static str = "execute_config_sync_errors_total";

    /// Describes and zeroes every metric for `dest_chain`.
    pub fn init(dest_chain: ChainSelector) {
        Self::describe();
        Self::zero(dest_chain);
    }

    fn describe() {
        metrics::describe_counter!(
            Self::OBSERVATIONS_TOTAL,
            metrics::Unit::Count,
            "Total number of observations produced by the execute plugin",
        );

        metrics::describe_counter!(
            Self::OBSERVATION_ERRORS_TOTAL,
            metrics::Unit::Count,
            "Total number of observations abandoned because a chain read failed",
        );

        metrics::describe_counter!(
            Self::REJECTED_OBSERVATIONS_TOTAL,
            metrics::Unit::Count,
            "Total number of peer observations rejected by validation",
        );

        metrics::describe_counter!(
            Self::REPORT_MESSAGES_TOTAL,
            metrics::Unit::Count,
            "Total number of messages selected for execution",
        );

        metrics::describe_histogram!(
            Self::REPORT_SIZE_BYTES,
            metrics::Unit::Bytes,
            "Encoded size of execution reports",
        );

        metrics::describe_gauge!(
            Self::PENDING_COMMIT_REPORTS,
            metrics::Unit::Count,
            "Number of commit reports with unexecuted messages",
        );

        metrics::describe_counter!(
            Self::CONFIG_SYNC_ERRORS_TOTAL,
            metrics::Unit::Count,
            "Total number of failed chain configuration syncs",
        );
    }

    fn zero(dest_chain: ChainSelector) {
        let dest_chain = dest_chain.to_string();

        metrics::counter!(Self::OBSERVATIONS_TOTAL, "dest_chain" => dest_chain.clone())
            .increment(0);
        metrics::counter!(Self::OBSERVATION_ERRORS_TOTAL, "dest_chain" => dest_chain.clone())
            .increment(0);
        metrics::counter!(Self::REJECTED_OBSERVATIONS_TOTAL, "dest_chain" => dest_chain.clone())
            .increment(0);
        metrics::gauge!(Self::PENDING_COMMIT_REPORTS, "dest_chain" => dest_chain).set(0.0);
        metrics::counter!(Self::CONFIG_SYNC_ERRORS_TOTAL).increment(0);
    }
}
