#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod errors;
pub use errors::{
    BuildReportError, ConfigError, PluginError, PluginResult, RangeError, RangeResult,
    ValidationError,
};

mod ranges;
pub use ranges::{compute_ranges, filter_out_executed_messages};

mod quorum;
pub use quorum::{QuorumFilter, content_fingerprint};

mod builder;
pub use builder::{MessageStatus, ReportBuilder, construct_merkle_tree};

mod config;
pub use config::{ExecutePluginConfig, OffchainConfig};

mod chain_config;
pub use chain_config::{ChainConfig, ChainConfigPoller, ChainConfigSnapshot};

mod traits;
pub use traits::{ChainConfigSource, ChainReader, TokenDataError, TokenDataReader};

mod plugin;
pub use plugin::{
    AttributedObservation, ExecutePlugin, OutcomeContext, ReportWithInfo, ReportingPlugin,
    attach_messages, merge_commit_observations, merge_message_observations,
    validate_observation, visibility_cutoff,
};

mod metrics;
pub use metrics::Metrics;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_util;
