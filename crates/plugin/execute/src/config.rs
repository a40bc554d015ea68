//! Static node configuration and the shared offchain configuration.

use crate::ConfigError;
use core::time::Duration;
use offramp_primitives::{ChainSelector, OracleId};
use serde::{Deserialize, Serialize};

/// Configuration shared by every node of the committee, distributed as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct OffchainConfig {
    /// How far back observation scans for commit reports.
    #[serde(with = "offramp_serde::duration")]
    pub message_visibility_interval: Duration,
    /// Ceiling on the encoded size of a round's report.
    pub max_report_size_bytes: usize,
    /// Maximum number of commit reports read per round.
    pub commit_report_fetch_limit: usize,
    /// Deadline applied to every chain read.
    #[serde(with = "offramp_serde::duration")]
    pub chain_read_timeout: Duration,
    /// Interval between chain configuration syncs.
    #[serde(with = "offramp_serde::duration")]
    pub config_poll_interval: Duration,
    /// Deadline of a single chain configuration sync.
    #[serde(with = "offramp_serde::duration")]
    pub config_poll_timeout: Duration,
}

impl OffchainConfig {
    /// The default `max_report_size_bytes`.
    pub const DEFAULT_MAX_REPORT_SIZE_BYTES: usize = 250_000;

    /// Decodes and validates a JSON config. Missing fields take their defaults.
    pub fn from_json(data: &[u8]) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_slice(data)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every size and interval is positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let durations = [
            ("messageVisibilityInterval", self.message_visibility_interval),
            ("chainReadTimeout", self.chain_read_timeout),
            ("configPollInterval", self.config_poll_interval),
            ("configPollTimeout", self.config_poll_timeout),
        ];
        if let Some((name, _)) = durations.iter().find(|(_, d)| d.is_zero()) {
            return Err(ConfigError::Zero(*name));
        }
        if self.max_report_size_bytes == 0 {
            return Err(ConfigError::Zero("maxReportSizeBytes"));
        }
        if self.commit_report_fetch_limit == 0 {
            return Err(ConfigError::Zero("commitReportFetchLimit"));
        }
        Ok(())
    }
}

impl Default for OffchainConfig {
    fn default() -> Self {
        Self {
            message_visibility_interval: Duration::from_secs(8 * 60 * 60),
            max_report_size_bytes: Self::DEFAULT_MAX_REPORT_SIZE_BYTES,
            commit_report_fetch_limit: 1_000,
            chain_read_timeout: Duration::from_secs(10),
            config_poll_interval: Duration::from_secs(30),
            config_poll_timeout: Duration::from_secs(5),
        }
    }
}

/// Per node plugin configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutePluginConfig {
    /// The chain reports are executed on.
    pub dest_chain: ChainSelector,
    /// This node's index in the committee.
    pub oracle_id: OracleId,
    /// Fault tolerance of the reporting committee.
    pub f: u8,
    /// Shared offchain configuration.
    #[serde(default)]
    pub offchain: OffchainConfig,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_defaults_from_empty_json() {
        let config = OffchainConfig::from_json(b"{}").unwrap();
        assert_eq!(config, OffchainConfig::default());
        assert_eq!(config.message_visibility_interval, Duration::from_secs(28_800));
        assert_eq!(config.max_report_size_bytes, 250_000);
    }

    #[test]
    fn test_json_roundtrip() {
        let config = OffchainConfig {
            max_report_size_bytes: 10_000,
            chain_read_timeout: Duration::from_millis(1_500),
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains(r#""messageVisibilityInterval":"8h""#));
        assert!(json.contains(r#""chainReadTimeout":"1s 500ms""#));
        assert_eq!(OffchainConfig::from_json(json.as_bytes()).unwrap(), config);
    }

    #[rstest]
    #[case(r#"{"maxReportSizeBytes":0}"#, "maxReportSizeBytes")]
    #[case(r#"{"commitReportFetchLimit":0}"#, "commitReportFetchLimit")]
    #[case(r#"{"chainReadTimeout":"0s"}"#, "chainReadTimeout")]
    #[case(r#"{"configPollInterval":0}"#, "configPollInterval")]
    fn test_rejects_zero(#[case] json: &str, #[case] field: &str) {
        match OffchainConfig::from_json(json.as_bytes()) {
            Err(ConfigError::Zero(name)) => assert_eq!(name, field),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_rejects_unknown_fields() {
        assert!(matches!(
            OffchainConfig::from_json(br#"{"batchGasLimit":1}"#),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_plugin_config_default_offchain() {
        let config: ExecutePluginConfig =
            serde_json::from_str(r#"{"destChain":5,"oracleId":2,"f":1}"#).unwrap();
        assert_eq!(config.dest_chain, ChainSelector(5));
        assert_eq!(config.offchain, OffchainConfig::default());
    }
}
