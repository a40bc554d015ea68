//! Background refresh of the chain configuration.

use super::{ChainConfigSnapshot, publish};
use crate::{ChainConfigSource, Metrics, PluginError, plugin::read_with_timeout};
use derive_more::Constructor;
use std::{sync::Arc, time::Duration};
use tokio::{sync::watch, time::MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// A background job that periodically re-reads the chain configuration from a
/// [`ChainConfigSource`] and publishes it as a new [`ChainConfigSnapshot`].
///
/// A failed or timed out sync leaves the last published snapshot in place. Round processing
/// never waits on the poller.
#[derive(Debug, Constructor)]
pub struct ChainConfigPoller<S> {
    source: S,
    publisher: Arc<watch::Sender<Arc<ChainConfigSnapshot>>>,
    interval: Duration,
    timeout: Duration,
    cancel_token: CancellationToken,
}

impl<S> ChainConfigPoller<S>
where
    S: ChainConfigSource,
{
    /// Runs the sync loop until cancelled. The first sync happens immediately.
    pub async fn run(self) {
        info!(
            target: "execute::config_poller",
            interval = ?self.interval,
            "Started chain config poller"
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = self.cancel_token.cancelled() => {
                    info!(target: "execute::config_poller", "Canceled chain config poller");
                    break;
                }

                _ = ticker.tick() => {
                    match self.sync_once().await {
                        Ok(version) => {
                            debug!(
                                target: "execute::config_poller",
                                version,
                                "Synced chain config"
                            );
                        }
                        Err(err) => {
                            warn!(
                                target: "execute::config_poller",
                                %err,
                                "Failed to sync chain config"
                            );
                            metrics::counter!(Metrics::CONFIG_SYNC_ERRORS_TOTAL).increment(1);
                        }
                    }
                }
            }
        }

        info!(target: "execute::config_poller", "Stopped chain config poller");
    }

    /// Fetches the configuration once and publishes it if it changed.
    ///
    /// Returns the snapshot version current after the sync.
    pub async fn sync_once(&self) -> Result<u64, PluginError> {
        let chains =
            read_with_timeout("chain_configs", self.timeout, self.source.chain_configs()).await?;
        Ok(publish(&self.publisher, chains))
    }
}
