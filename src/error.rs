//! Error types for tiervec.

use crate::record::RecordId;
use thiserror::Error;

/// Errors that can occur during indexing, archiving, or search.
///
/// Looking up a window that was never archived is not an error; see
/// [`crate::archive::ArchiveLookup::WindowNotArchived`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RetrieveError {
    /// Empty embedding provided.
    #[error("embedding is empty")]
    EmptyQuery,

    /// Embedding length disagrees with the established dimension.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// `k` must be at least 1.
    #[error("invalid k: {0} (must be at least 1)")]
    InvalidK(usize),

    /// A record id is already live in the index.
    #[error("record {0} is already indexed")]
    DuplicateId(RecordId),

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Invalid configuration field.
    #[error("invalid configuration: {field}: {reason}")]
    InvalidConfig { field: String, reason: String },
}

pub type Result<T> = std::result::Result<T, RetrieveError>;

/// Check an embedding against an expected dimension.
pub(crate) fn check_dimension(expected: usize, embedding: &[f32]) -> Result<()> {
    if embedding.is_empty() {
        return Err(RetrieveError::EmptyQuery);
    }
    if embedding.len() != expected {
        return Err(RetrieveError::DimensionMismatch {
            expected,
            actual: embedding.len(),
        });
    }
    Ok(())
}

/// Reject `k == 0`.
pub(crate) fn check_k(k: usize) -> Result<()> {
    if k == 0 {
        return Err(RetrieveError::InvalidK(k));
    }
    Ok(())
}
