//! Observation: pending commits from the destination chain and message bodies from the sources.

use crate::{
    ChainConfigSnapshot, ChainReader, ExecutePluginConfig, PluginError, PluginResult,
    compute_ranges, filter_out_executed_messages,
};
use core::{error::Error, future::Future, time::Duration};
use futures::future::try_join_all;
use offramp_primitives::{
    ChainSelector, CommitData, CommitObservations, MessageObservations, Observation, SeqNumRange,
};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// The oldest commit timestamp still scanned at `now`, both in unix seconds.
pub const fn visibility_cutoff(now: u64, window: Duration) -> u64 {
    now.saturating_sub(window.as_secs())
}

/// Runs a chain read under a deadline.
pub(crate) async fn read_with_timeout<T, E>(
    operation: &'static str,
    timeout: Duration,
    read: impl Future<Output = Result<T, E>>,
) -> PluginResult<T>
where
    E: Error + Send + Sync + 'static,
{
    tokio::time::timeout(timeout, read)
        .await
        .map_err(|_| PluginError::ReadTimeout { operation, timeout })?
        .map_err(|err| PluginError::ChainRead { operation, source: Box::new(err) })
}

/// Builds this node's observation.
///
/// Commit records are only read when this node may read the destination chain. Message bodies
/// are fetched for every pending record of the previous outcome whose source chain this node
/// may read.
pub(crate) async fn observe<R: ChainReader>(
    reader: &R,
    config: &ExecutePluginConfig,
    snapshot: &ChainConfigSnapshot,
    previous_pending: &[CommitData],
    now: u64,
) -> PluginResult<Observation> {
    let commit_reports = if snapshot.can_read(config.oracle_id, config.dest_chain) {
        observe_commit_reports(reader, config, now).await?
    } else {
        debug!(
            target: "execute::observation",
            dest_chain = %config.dest_chain,
            "Destination chain not readable, skipping commit reports"
        );
        BTreeMap::new()
    };
    let messages = observe_messages(reader, config, snapshot, previous_pending).await?;
    Ok(Observation::new(commit_reports, messages))
}

async fn observe_commit_reports<R: ChainReader>(
    reader: &R,
    config: &ExecutePluginConfig,
    now: u64,
) -> PluginResult<CommitObservations> {
    let dest = config.dest_chain;
    let timeout = config.offchain.chain_read_timeout;
    let since = visibility_cutoff(now, config.offchain.message_visibility_interval);

    let reports = read_with_timeout(
        "commit_reports_gte_timestamp",
        timeout,
        reader.commit_reports_gte_timestamp(dest, since, config.offchain.commit_report_fetch_limit),
    )
    .await?;

    let mut grouped: CommitObservations = BTreeMap::new();
    for record in reports.iter().flat_map(CommitData::from_report) {
        if !record.seq_num_range.is_valid() {
            warn!(
                target: "execute::observation",
                chain = %record.source_chain,
                range = %record.seq_num_range,
                "Ignoring commit with inverted range"
            );
            continue;
        }
        grouped.entry(record.source_chain).or_default().push(record);
    }

    let mut observed = BTreeMap::new();
    for (chain, mut records) in grouped {
        records.sort_by_key(|record| record.seq_num_range.start());
        let ranges = compute_ranges(&records)?;

        let executed = try_join_all(ranges.iter().map(|&range| async move {
            let executed = read_with_timeout(
                "executed_message_ranges",
                timeout,
                reader.executed_message_ranges(chain, dest, range),
            )
            .await?;
            Ok::<_, PluginError>(
                executed.iter().filter_map(|r| r.intersection(&range)).collect::<Vec<_>>(),
            )
        }))
        .await?
        .concat();

        let pending = filter_out_executed_messages(records, &executed)?;
        debug!(
            target: "execute::observation",
            %chain,
            pending = pending.len(),
            executed_ranges = executed.len(),
            "Observed commit reports"
        );
        if !pending.is_empty() {
            observed.insert(chain, pending);
        }
    }
    Ok(observed)
}

async fn observe_messages<R: ChainReader>(
    reader: &R,
    config: &ExecutePluginConfig,
    snapshot: &ChainConfigSnapshot,
    previous_pending: &[CommitData],
) -> PluginResult<MessageObservations> {
    let supported = snapshot.supported_chains(config.oracle_id);

    let mut grouped: BTreeMap<ChainSelector, Vec<CommitData>> = BTreeMap::new();
    for record in previous_pending.iter().filter(|r| supported.contains(&r.source_chain)) {
        grouped.entry(record.source_chain).or_default().push(CommitData {
            messages: Vec::new(),
            token_data: Vec::new(),
            ..record.clone()
        });
    }

    let mut requests: Vec<(ChainSelector, SeqNumRange)> = Vec::new();
    for (chain, mut records) in grouped {
        records.sort_by_key(|record| record.seq_num_range.start());
        requests.extend(compute_ranges(&records)?.into_iter().map(|range| (chain, range)));
    }

    let timeout = config.offchain.chain_read_timeout;
    let fetched = try_join_all(requests.into_iter().map(|(chain, range)| async move {
        let messages = read_with_timeout(
            "msgs_between_seq_nums",
            timeout,
            reader.msgs_between_seq_nums(chain, range),
        )
        .await?;
        Ok::<_, PluginError>((chain, range, messages))
    }))
    .await?;

    let mut observed: MessageObservations = BTreeMap::new();
    for (chain, range, messages) in fetched {
        let entry = observed.entry(chain).or_default();
        for message in messages {
            if message.source_chain() != chain || !range.contains(message.seq_num()) {
                warn!(
                    target: "execute::observation",
                    %chain,
                    %range,
                    seq_num = message.seq_num(),
                    "Reader returned a message outside the requested range"
                );
                continue;
            }
            entry.insert(message.seq_num(), message);
        }
        debug!(
            target: "execute::observation",
            %chain,
            %range,
            messages = entry.len(),
            "Observed messages"
        );
    }
    Ok(observed)
}
