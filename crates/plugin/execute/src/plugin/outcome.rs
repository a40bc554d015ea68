//! Outcome: quorum merge of observations and report construction.

use crate::{ChainConfigSnapshot, QuorumFilter, ReportBuilder, TokenDataReader, content_fingerprint};
use alloy_primitives::B256;
use offramp_primitives::{
    ChainSelector, CommitData, Message, MessageHasher, MessageObservations, Observation, Outcome,
    ReportCodec,
};
use std::collections::{BTreeMap, BTreeSet, btree_map::Entry};
use tracing::{debug, warn};

type Filter<T> = QuorumFilter<T, fn(&T) -> B256>;

fn quorum_filter<T: serde::Serialize>(f_chain: u8) -> Filter<T> {
    QuorumFilter::with_fault_tolerance(f_chain, content_fingerprint::<T> as fn(&T) -> B256)
}

/// Merges the commit records of `observations`, keeping the ones reported identically by at
/// least `f_chain + 1` observers of their source chain.
///
/// Chains missing from `snapshot` are ignored. The result is grouped by chain.
pub fn merge_commit_observations(
    observations: &[Observation],
    snapshot: &ChainConfigSnapshot,
) -> Vec<CommitData> {
    let mut filters: BTreeMap<ChainSelector, Filter<CommitData>> = BTreeMap::new();
    let mut unknown = BTreeSet::new();

    for observation in observations {
        for (&chain, records) in &observation.commit_reports {
            let Some(f_chain) = snapshot.f_chain(chain) else {
                unknown.insert(chain);
                continue;
            };
            let filter = filters.entry(chain).or_insert_with(|| quorum_filter(f_chain));
            records.iter().cloned().for_each(|record| filter.add(record));
        }
    }

    if !unknown.is_empty() {
        debug!(target: "execute::outcome", ?unknown, "Ignoring commit reports of unknown chains");
    }
    filters.into_values().flat_map(QuorumFilter::into_valid).collect()
}

/// Merges the message bodies of `observations`, keeping the ones reported identically by at
/// least `f_chain + 1` observers of their source chain.
///
/// A sequence number for which several different bodies reach quorum is dropped.
pub fn merge_message_observations(
    observations: &[Observation],
    snapshot: &ChainConfigSnapshot,
) -> MessageObservations {
    let mut filters: BTreeMap<ChainSelector, Filter<Message>> = BTreeMap::new();

    for observation in observations {
        for (&chain, messages) in &observation.messages {
            let Some(f_chain) = snapshot.f_chain(chain) else { continue };
            let filter = filters.entry(chain).or_insert_with(|| quorum_filter(f_chain));
            messages.values().cloned().for_each(|message| filter.add(message));
        }
    }

    let mut merged: MessageObservations = BTreeMap::new();
    for (chain, filter) in filters {
        let mut messages = BTreeMap::new();
        let mut conflicting = BTreeSet::new();
        for message in filter.into_valid() {
            match messages.entry(message.seq_num()) {
                Entry::Vacant(entry) => {
                    entry.insert(message);
                }
                Entry::Occupied(_) => {
                    conflicting.insert(message.seq_num());
                }
            }
        }
        for seq_num in conflicting {
            warn!(
                target: "execute::outcome",
                %chain,
                seq_num,
                "Conflicting message bodies reached quorum"
            );
            messages.remove(&seq_num);
        }
        if !messages.is_empty() {
            merged.insert(chain, messages);
        }
    }
    merged
}

/// Attaches merged message bodies to `records`.
///
/// A record only receives messages when a body was agreed for every sequence number of its
/// range; otherwise it is left without messages and retried next round.
pub fn attach_messages(records: &mut [CommitData], messages: &MessageObservations) {
    for record in records {
        let Some(chain_messages) = messages.get(&record.source_chain) else { continue };
        let attached = record
            .seq_num_range
            .iter()
            .map(|seq_num| chain_messages.get(&seq_num).cloned())
            .collect::<Option<Vec<_>>>();
        match attached {
            Some(attached) => {
                record.messages = attached;
                record.token_data.clear();
            }
            None => {
                debug!(
                    target: "execute::outcome",
                    chain = %record.source_chain,
                    range = %record.seq_num_range,
                    "Messages incomplete, commit stays pending"
                );
            }
        }
    }
}

/// Computes the round's outcome from decoded, validated observations.
///
/// Merged records are processed oldest first. Pending records of the outcome are ordered by
/// source chain and range start and carry no message bodies; those are fetched again by the
/// next round's observation.
pub(crate) fn build_outcome<H, C, T>(
    observations: &[Observation],
    snapshot: &ChainConfigSnapshot,
    hasher: &H,
    codec: &C,
    token_data: &T,
    max_report_size_bytes: usize,
) -> Outcome
where
    H: MessageHasher,
    C: ReportCodec,
    T: TokenDataReader,
{
    // Diverging quorums over the same root keep the record with the most executed messages.
    let mut by_root: BTreeMap<B256, CommitData> = BTreeMap::new();
    for record in merge_commit_observations(observations, snapshot) {
        match by_root.entry(record.merkle_root) {
            Entry::Vacant(entry) => {
                entry.insert(record);
            }
            Entry::Occupied(mut entry) => {
                if record.executed_messages.len() > entry.get().executed_messages.len() {
                    entry.insert(record);
                }
            }
        }
    }

    let mut records = by_root.into_values().collect::<Vec<_>>();
    records.sort_by_key(|r| (r.timestamp, r.source_chain, r.seq_num_range.start()));
    attach_messages(&mut records, &merge_message_observations(observations, snapshot));

    let builder = ReportBuilder::new(hasher, codec, token_data, max_report_size_bytes);
    let (report, mut pending) = builder.select(records);
    for record in &mut pending {
        record.messages.clear();
        record.token_data.clear();
    }
    pending.sort_by_key(|r| (r.source_chain, r.seq_num_range.start()));

    debug!(
        target: "execute::outcome",
        pending = pending.len(),
        chain_reports = report.chain_reports.len(),
        messages = report.message_count(),
        "Computed outcome"
    );
    Outcome::new(pending, report)
}
