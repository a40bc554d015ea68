//! The execute plugin.

use super::{
    AttributedObservation, OutcomeContext, ReportWithInfo, ReportingPlugin,
    observation::{observe, read_with_timeout},
    outcome::build_outcome,
    validate::validate_observation,
};
use crate::{
    ChainConfig, ChainConfigPoller, ChainConfigSnapshot, ChainConfigSource, ChainReader,
    ExecutePluginConfig, Metrics, PluginError, PluginResult, TokenDataReader,
    chain_config::publish,
};
use alloy_primitives::Bytes;
use async_trait::async_trait;
use offramp_primitives::{
    ChainSelector, ExecuteReport, MessageHasher, Observation, Outcome, ReportCodec, SeqNumRange,
};
use std::{
    collections::BTreeMap,
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};
use tokio::{sync::watch, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// The execute stage of the cross-chain protocol.
///
/// Round logic reads the chain configuration from a versioned snapshot. The snapshot is
/// replaced by [`ExecutePlugin::set_chain_config`] or by a poller started with
/// [`ExecutePlugin::spawn_config_poller`].
#[derive(Debug)]
pub struct ExecutePlugin<R, T, H, C> {
    config: ExecutePluginConfig,
    reader: R,
    token_data: T,
    hasher: H,
    codec: C,
    chain_config: Arc<watch::Sender<Arc<ChainConfigSnapshot>>>,
    cancel_token: CancellationToken,
}

impl<R, T, H, C> ExecutePlugin<R, T, H, C>
where
    R: ChainReader,
    T: TokenDataReader + Send + Sync,
    H: MessageHasher + Send + Sync,
    C: ReportCodec + Send + Sync,
{
    /// Creates a plugin with an empty chain configuration.
    pub fn new(config: ExecutePluginConfig, reader: R, token_data: T, hasher: H, codec: C) -> Self {
        Metrics::init(config.dest_chain);
        let (chain_config, _) = watch::channel(Arc::new(ChainConfigSnapshot::default()));
        Self {
            config,
            reader,
            token_data,
            hasher,
            codec,
            chain_config: Arc::new(chain_config),
            cancel_token: CancellationToken::new(),
        }
    }

    /// The plugin configuration.
    pub const fn config(&self) -> &ExecutePluginConfig {
        &self.config
    }

    /// The current chain configuration snapshot.
    pub fn chain_config(&self) -> Arc<ChainConfigSnapshot> {
        self.chain_config.borrow().clone()
    }

    /// Publishes `chains` as the chain configuration, returning the current version.
    pub fn set_chain_config(&self, chains: BTreeMap<ChainSelector, ChainConfig>) -> u64 {
        publish(&self.chain_config, chains)
    }

    /// Subscribes to chain configuration updates.
    pub fn subscribe_chain_config(&self) -> watch::Receiver<Arc<ChainConfigSnapshot>> {
        self.chain_config.subscribe()
    }

    /// Starts a background task keeping the chain configuration in sync with `source`.
    ///
    /// The task stops when the plugin is closed.
    pub fn spawn_config_poller<S>(&self, source: S) -> JoinHandle<()>
    where
        S: ChainConfigSource + 'static,
    {
        let poller = ChainConfigPoller::new(
            source,
            self.chain_config.clone(),
            self.config.offchain.config_poll_interval,
            self.config.offchain.config_poll_timeout,
            self.cancel_token.child_token(),
        );
        tokio::spawn(poller.run())
    }

    /// Builds the observation for a round at unix time `now`.
    pub async fn observe_at(&self, ctx: &OutcomeContext, now: u64) -> PluginResult<Observation> {
        let previous = decode_previous_outcome(&ctx.previous_outcome)?;
        let snapshot = self.chain_config();
        observe(&self.reader, &self.config, &snapshot, &previous.pending_commit_reports, now).await
    }

    fn decode_report(&self, report: &ReportWithInfo) -> Option<ExecuteReport> {
        match self.codec.decode(&report.report) {
            Ok(decoded) => Some(decoded),
            Err(err) => {
                warn!(target: "execute::plugin", %err, "Failed to decode report");
                None
            }
        }
    }

    /// Whether every checked chain report's first message is already executed.
    async fn is_stale(&self, report: &ExecuteReport) -> PluginResult<bool> {
        let dest = self.config.dest_chain;
        let timeout = self.config.offchain.chain_read_timeout;
        let mut checked = 0;
        for chain_report in &report.chain_reports {
            let Some(first) = chain_report.messages.first() else { continue };
            let seq_num = first.seq_num();
            let executed = read_with_timeout(
                "executed_message_ranges",
                timeout,
                self.reader.executed_message_ranges(
                    chain_report.source_chain_selector,
                    dest,
                    SeqNumRange::new(seq_num, seq_num),
                ),
            )
            .await?;
            if !executed.iter().any(|range| range.contains(seq_num)) {
                return Ok(false);
            }
            checked += 1;
        }
        Ok(checked > 0)
    }
}

fn decode_previous_outcome(data: &[u8]) -> PluginResult<Outcome> {
    if data.is_empty() {
        return Ok(Outcome::default());
    }
    Ok(Outcome::decode(data)?)
}

fn unix_now() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or_default()
}

#[async_trait]
impl<R, T, H, C> ReportingPlugin for ExecutePlugin<R, T, H, C>
where
    R: ChainReader,
    T: TokenDataReader + Send + Sync,
    H: MessageHasher + Send + Sync,
    C: ReportCodec + Send + Sync,
{
    async fn query(&self, _ctx: &OutcomeContext) -> PluginResult<Bytes> {
        Ok(Bytes::new())
    }

    async fn observation(&self, ctx: &OutcomeContext, _query: &[u8]) -> PluginResult<Bytes> {
        let dest_chain = self.config.dest_chain.to_string();
        let observation = match self.observe_at(ctx, unix_now()).await {
            Ok(observation) => observation,
            Err(err) => {
                warn!(
                    target: "execute::observation",
                    seq_nr = ctx.seq_nr,
                    %err,
                    "Failed to observe"
                );
                metrics::counter!(Metrics::OBSERVATION_ERRORS_TOTAL, "dest_chain" => dest_chain)
                    .increment(1);
                return Err(err);
            }
        };
        metrics::counter!(Metrics::OBSERVATIONS_TOTAL, "dest_chain" => dest_chain).increment(1);
        debug!(
            target: "execute::observation",
            seq_nr = ctx.seq_nr,
            commit_chains = observation.commit_reports.len(),
            message_chains = observation.messages.len(),
            "Produced observation"
        );
        Ok(observation.encode()?)
    }

    fn validate_observation(
        &self,
        ctx: &OutcomeContext,
        _query: &[u8],
        observation: &AttributedObservation,
    ) -> PluginResult<()> {
        let result = Observation::decode(&observation.observation)
            .map_err(|err| crate::ValidationError::Decode(err.to_string()))
            .and_then(|decoded| {
                validate_observation(
                    &decoded,
                    observation.observer,
                    self.config.dest_chain,
                    &self.chain_config(),
                )
            });
        if let Err(err) = result {
            warn!(
                target: "execute::validation",
                seq_nr = ctx.seq_nr,
                observer = observation.observer,
                %err,
                "Rejected observation"
            );
            metrics::counter!(
                Metrics::REJECTED_OBSERVATIONS_TOTAL,
                "dest_chain" => self.config.dest_chain.to_string(),
            )
            .increment(1);
            return Err(err.into());
        }
        Ok(())
    }

    fn observation_quorum(
        &self,
        _ctx: &OutcomeContext,
        _query: &[u8],
        observations: &[AttributedObservation],
    ) -> PluginResult<bool> {
        Ok(observations.len() > self.config.f as usize)
    }

    fn outcome(
        &self,
        ctx: &OutcomeContext,
        _query: &[u8],
        observations: &[AttributedObservation],
    ) -> PluginResult<Bytes> {
        let decoded = observations
            .iter()
            .filter_map(|observation| match Observation::decode(&observation.observation) {
                Ok(decoded) => Some(decoded),
                Err(err) => {
                    warn!(
                        target: "execute::outcome",
                        observer = observation.observer,
                        %err,
                        "Skipping undecodable observation"
                    );
                    None
                }
            })
            .collect::<Vec<_>>();

        let outcome = build_outcome(
            &decoded,
            &self.chain_config(),
            &self.hasher,
            &self.codec,
            &self.token_data,
            self.config.offchain.max_report_size_bytes,
        );
        metrics::gauge!(
            Metrics::PENDING_COMMIT_REPORTS,
            "dest_chain" => self.config.dest_chain.to_string(),
        )
        .set(outcome.pending_commit_reports.len() as f64);
        info!(
            target: "execute::outcome",
            seq_nr = ctx.seq_nr,
            observations = decoded.len(),
            pending = outcome.pending_commit_reports.len(),
            messages = outcome.report.message_count(),
            "Computed round outcome"
        );
        Ok(outcome.encode()?)
    }

    fn reports(&self, seq_nr: u64, outcome: &[u8]) -> PluginResult<Vec<ReportWithInfo>> {
        let outcome = decode_previous_outcome(outcome)?;
        if outcome.report.message_count() == 0 {
            debug!(target: "execute::plugin", seq_nr, "No messages to report");
            return Ok(Vec::new());
        }
        let report =
            self.codec.encode(&outcome.report).map_err(|err| PluginError::Codec(Box::new(err)))?;
        metrics::histogram!(Metrics::REPORT_SIZE_BYTES).record(report.len() as f64);
        Ok(vec![ReportWithInfo { report, info: Bytes::new() }])
    }

    async fn should_accept_attested_report(
        &self,
        seq_nr: u64,
        report: &ReportWithInfo,
    ) -> PluginResult<bool> {
        let Some(decoded) = self.decode_report(report) else { return Ok(false) };
        if decoded.is_empty() {
            debug!(target: "execute::plugin", seq_nr, "Empty report, not accepting");
            return Ok(false);
        }
        if self.chain_config().can_read(self.config.oracle_id, self.config.dest_chain) &&
            self.is_stale(&decoded).await?
        {
            info!(target: "execute::plugin", seq_nr, "Report already executed, not accepting");
            return Ok(false);
        }
        Ok(true)
    }

    async fn should_transmit_accepted_report(
        &self,
        seq_nr: u64,
        report: &ReportWithInfo,
    ) -> PluginResult<bool> {
        let Some(decoded) = self.decode_report(report) else { return Ok(false) };
        if decoded.is_empty() {
            return Ok(false);
        }
        if !self.chain_config().can_read(self.config.oracle_id, self.config.dest_chain) {
            debug!(
                target: "execute::plugin",
                seq_nr,
                "Not a destination chain writer, not transmitting"
            );
            return Ok(false);
        }
        Ok(true)
    }

    async fn close(&self) -> PluginResult<()> {
        self.cancel_token.cancel();
        Ok(())
    }
}
