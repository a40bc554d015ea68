//! Chain and oracle identifiers.

use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

/// Opaque numeric identifier of a blockchain.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    From,
    Into,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct ChainSelector(pub u64);

/// Per (source, destination) message counter.
pub type SeqNum = u64;

/// Index of a node within the reporting committee.
pub type OracleId = u8;
