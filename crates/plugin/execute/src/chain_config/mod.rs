//! Versioned per-chain configuration and its background refresh.

mod snapshot;
pub use snapshot::{ChainConfig, ChainConfigSnapshot};
pub(crate) use snapshot::publish;

mod poller;
pub use poller::ChainConfigPoller;
