//! Multi-node rounds of the execute plugin against EVM hashing and encoding.

mod common;
use common::{CHAIN_A, CHAIN_B, DEST_CHAIN, FakeChains, NoTokenData, evm_messages};

use alloy_primitives::{B256, Bytes};
use offramp_cli::init_test_tracing;
use offramp_evm::{EvmMessageHasher, EvmReportCodec};
use offramp_execute::{
    AttributedObservation, ChainConfig, ExecutePlugin, ExecutePluginConfig, OffchainConfig,
    OutcomeContext, ReportingPlugin,
};
use offramp_merkle::MultiProof;
use offramp_primitives::{MessageHasher, Outcome, ReportCodec, SeqNumRange};
use std::{collections::BTreeMap, sync::Arc, time::Duration};

type Node = ExecutePlugin<Arc<FakeChains>, NoTokenData, EvmMessageHasher, EvmReportCodec>;

fn node(oracle_id: u8, chains: Arc<FakeChains>, max_report_size_bytes: usize) -> Node {
    let config = ExecutePluginConfig {
        dest_chain: DEST_CHAIN,
        oracle_id,
        f: 1,
        offchain: OffchainConfig {
            message_visibility_interval: Duration::from_secs(u64::MAX),
            max_report_size_bytes,
            ..Default::default()
        },
    };
    let node = ExecutePlugin::new(config, chains, NoTokenData, EvmMessageHasher, EvmReportCodec);
    node.set_chain_config(BTreeMap::from([
        (DEST_CHAIN, ChainConfig::new(1, [0, 1, 2])),
        (CHAIN_A, ChainConfig::new(1, [0, 1, 2])),
        (CHAIN_B, ChainConfig::new(1, [0, 1, 2])),
    ]));
    node
}

async fn round(nodes: &[Node], ctx: &OutcomeContext) -> Bytes {
    let mut observations = Vec::new();
    for (observer, node) in nodes.iter().enumerate() {
        let observation = node.observation(ctx, &[]).await.unwrap();
        observations.push(AttributedObservation { observer: observer as u8, observation });
    }
    for observation in &observations {
        nodes[0].validate_observation(ctx, &[], observation).unwrap();
    }
    assert!(nodes[0].observation_quorum(ctx, &[], &observations).unwrap());
    nodes[0].outcome(ctx, &[], &observations).unwrap()
}

/// Commits for chains A, B, A covering `[1, 10]`, `[1, 10]` and `[11, 20]`.
fn committed_chains() -> (FakeChains, [B256; 3]) {
    let mut chains = FakeChains::default();
    let roots = [
        chains.commit(CHAIN_A, SeqNumRange::new(1, 10), 1),
        chains.commit(CHAIN_B, SeqNumRange::new(1, 10), 2),
        chains.commit(CHAIN_A, SeqNumRange::new(11, 20), 3),
    ];
    (chains, roots)
}

#[tokio::test]
async fn test_diverging_observation_dropped() {
    init_test_tracing();
    let (chains, [a1, b1, a2]) = committed_chains();
    let mut diverging = chains.clone();
    diverging.commits[2].report.merkle_roots[0].merkle_root = B256::repeat_byte(0xee);

    let honest = Arc::new(chains);
    let nodes = [
        node(0, honest.clone(), 250_000),
        node(1, honest, 250_000),
        node(2, Arc::new(diverging), 250_000),
    ];

    let outcome = Outcome::decode(&round(&nodes, &OutcomeContext::default()).await).unwrap();
    let roots = outcome.pending_commit_reports.iter().map(|r| r.merkle_root).collect::<Vec<_>>();
    assert_eq!(roots, vec![a1, a2, b1]);
    assert!(!roots.contains(&B256::repeat_byte(0xee)));
    assert!(outcome.report.is_empty());
}

#[tokio::test]
async fn test_report_verifies_against_committed_roots() {
    init_test_tracing();
    let (chains, [a1, b1, a2]) = committed_chains();
    let chains = Arc::new(chains);
    let nodes = (0..3).map(|id| node(id, chains.clone(), 250_000)).collect::<Vec<_>>();

    let first = round(&nodes, &OutcomeContext::default()).await;
    let ctx = OutcomeContext { seq_nr: 2, previous_outcome: first };
    let second = round(&nodes, &ctx).await;
    assert!(Outcome::decode(&second).unwrap().pending_commit_reports.is_empty());

    let reports = nodes[0].reports(2, &second).unwrap();
    assert_eq!(reports.len(), 1);
    assert!(reports[0].report.len() <= 250_000);
    assert!(nodes[1].should_accept_attested_report(2, &reports[0]).await.unwrap());
    assert!(nodes[2].should_transmit_accepted_report(2, &reports[0]).await.unwrap());

    // Oldest commit first.
    let decoded = EvmReportCodec.decode(&reports[0].report).unwrap();
    let expected = [(CHAIN_A, 1, a1), (CHAIN_B, 1, b1), (CHAIN_A, 11, a2)];
    assert_eq!(decoded.chain_reports.len(), expected.len());

    for (chain_report, (chain, start, root)) in decoded.chain_reports.iter().zip(expected) {
        assert_eq!(chain_report.source_chain_selector, chain);
        assert_eq!(chain_report.messages.len(), 10);
        let sent = evm_messages(chain, SeqNumRange::new(start, start + 9));
        // Leaves are recomputed from the wire messages; only the lane's on-ramp is known
        // to the verifier out of band.
        let leaves = chain_report
            .messages
            .iter()
            .zip(&sent)
            .map(|(wire, sent)| {
                let mut wire = wire.clone();
                wire.header.on_ramp = sent.header.on_ramp.clone();
                EvmMessageHasher.hash(&wire).unwrap()
            })
            .collect::<Vec<_>>();
        let computed = MultiProof::compute_root_from_bits(
            &leaves,
            &chain_report.proofs,
            chain_report.proof_flag_bits,
        )
        .unwrap();
        assert_eq!(computed, root);
    }
}

#[tokio::test]
async fn test_report_respects_size_ceiling() {
    init_test_tracing();
    const MAX_SIZE: usize = 4_000;
    let (chains, _) = committed_chains();
    let chains = Arc::new(chains);
    let nodes = (0..3).map(|id| node(id, chains.clone(), MAX_SIZE)).collect::<Vec<_>>();

    let first = round(&nodes, &OutcomeContext::default()).await;
    let ctx = OutcomeContext { seq_nr: 2, previous_outcome: first };
    let second = round(&nodes, &ctx).await;
    let outcome = Outcome::decode(&second).unwrap();

    let count = outcome.report.message_count();
    assert!(count > 0 && count < 30);
    assert!(!outcome.pending_commit_reports.is_empty());

    let reports = nodes[0].reports(2, &second).unwrap();
    assert!(reports[0].report.len() <= MAX_SIZE);

    // The oldest commit contributes its lowest messages first.
    let first_report = &outcome.report.chain_reports[0];
    assert_eq!(first_report.source_chain_selector, CHAIN_A);
    let seq_nums = first_report.messages.iter().map(|m| m.seq_num()).collect::<Vec<_>>();
    assert_eq!(seq_nums[0], 1);
    assert!(seq_nums.windows(2).all(|pair| pair[0] < pair[1]));
    assert!(seq_nums.len() < 10);
}
