#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod chain;
pub use chain::{ChainSelector, OracleId, SeqNum};

mod range;
pub use range::SeqNumRange;

mod message;
pub use message::{Message, MessageHeader, TokenAmount};

mod commit;
pub use commit::{CommitData, CommitReport, CommitReportWithMeta, MerkleRootChain};

mod observation;
pub use observation::{CommitObservations, MessageObservations, Observation};

mod outcome;
pub use outcome::Outcome;

mod report;
pub use report::{ChainReport, ExecuteReport};

mod traits;
pub use traits::{MessageHasher, ReportCodec};

mod errors;
pub use errors::{EncodingError, EncodingResult};
