//! Immutable chain configuration snapshots.

use offramp_primitives::{ChainSelector, OracleId};
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};
use tokio::sync::watch;

/// Configuration of a single chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainConfig {
    /// Maximum number of faulty observers tolerated for this chain.
    pub f_chain: u8,
    /// Oracles authorised to read this chain.
    pub readers: BTreeSet<OracleId>,
}

impl ChainConfig {
    /// Creates a chain config.
    pub fn new(f_chain: u8, readers: impl IntoIterator<Item = OracleId>) -> Self {
        Self { f_chain, readers: readers.into_iter().collect() }
    }
}

/// A consistent view of every chain's configuration, passed explicitly into round logic.
///
/// `version` increases by one each time a changed configuration is published.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainConfigSnapshot {
    version: u64,
    chains: BTreeMap<ChainSelector, ChainConfig>,
}

impl ChainConfigSnapshot {
    /// Creates a snapshot.
    pub const fn new(version: u64, chains: BTreeMap<ChainSelector, ChainConfig>) -> Self {
        Self { version, chains }
    }

    /// The snapshot version. `0` means nothing has been synced yet.
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Every configured chain.
    pub const fn chains(&self) -> &BTreeMap<ChainSelector, ChainConfig> {
        &self.chains
    }

    /// Fault tolerance of `chain`, if configured.
    pub fn f_chain(&self, chain: ChainSelector) -> Option<u8> {
        self.chains.get(&chain).map(|config| config.f_chain)
    }

    /// Whether `oracle` may read `chain`.
    pub fn can_read(&self, oracle: OracleId, chain: ChainSelector) -> bool {
        self.chains.get(&chain).is_some_and(|config| config.readers.contains(&oracle))
    }

    /// Chains `oracle` may read.
    pub fn supported_chains(&self, oracle: OracleId) -> BTreeSet<ChainSelector> {
        self.chains
            .iter()
            .filter(|(_, config)| config.readers.contains(&oracle))
            .map(|(chain, _)| *chain)
            .collect()
    }
}

/// Publishes `chains` as the next snapshot if they differ from the current one.
///
/// Returns the version now current.
pub(crate) fn publish(
    sender: &watch::Sender<Arc<ChainConfigSnapshot>>,
    chains: BTreeMap<ChainSelector, ChainConfig>,
) -> u64 {
    let mut version = 0;
    sender.send_if_modified(|current| {
        version = current.version();
        if current.chains == chains {
            return false;
        }
        version += 1;
        *current = Arc::new(ChainConfigSnapshot::new(version, chains));
        true
    });
    version
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chains() -> BTreeMap<ChainSelector, ChainConfig> {
        BTreeMap::from([
            (ChainSelector(1), ChainConfig::new(1, [0, 1, 2])),
            (ChainSelector(2), ChainConfig::new(2, [1])),
        ])
    }

    #[test]
    fn test_lookups() {
        let snapshot = ChainConfigSnapshot::new(3, chains());
        assert_eq!(snapshot.version(), 3);
        assert_eq!(snapshot.f_chain(ChainSelector(2)), Some(2));
        assert_eq!(snapshot.f_chain(ChainSelector(9)), None);
        assert!(snapshot.can_read(0, ChainSelector(1)));
        assert!(!snapshot.can_read(0, ChainSelector(2)));
        assert!(!snapshot.can_read(0, ChainSelector(9)));
        assert_eq!(
            snapshot.supported_chains(1),
            BTreeSet::from([ChainSelector(1), ChainSelector(2)])
        );
        assert_eq!(snapshot.supported_chains(2), BTreeSet::from([ChainSelector(1)]));
    }

    #[test]
    fn test_publish_bumps_version_on_change_only() {
        let (sender, receiver) = watch::channel(Arc::new(ChainConfigSnapshot::default()));
        assert_eq!(publish(&sender, chains()), 1);
        assert_eq!(publish(&sender, chains()), 1);
        assert_eq!(receiver.borrow().version(), 1);

        let mut changed = chains();
        changed.remove(&ChainSelector(2));
        assert_eq!(publish(&sender, changed), 2);
        assert_eq!(receiver.borrow().f_chain(ChainSelector(2)), None);
    }
}
