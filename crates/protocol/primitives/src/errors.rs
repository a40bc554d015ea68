//! Error types for the `offramp-primitives` crate.

use thiserror::Error;

/// Failure to encode or decode one of the per-round wire structures.
#[derive(Debug, Error)]
pub enum EncodingError {
    /// The payload is not valid JSON for the expected structure.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

/// A [Result] alias for the [EncodingError] type.
pub type EncodingResult<T> = core::result::Result<T, EncodingError>;
