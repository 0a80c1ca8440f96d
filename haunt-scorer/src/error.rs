//! Errors surfaced by [`SearchEngine`](crate::SearchEngine).

use haunt_core::{EmbeddingError, IndexError, ParseError, PreferenceError, StoreError};
use thiserror::Error;

use crate::ConfigError;

/// Failures of a search call.
///
/// Each collaborator keeps its own variant so callers can tell an embedding
/// outage from a store outage and choose a fallback. An empty result set is
/// never an error.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The engine configuration is unusable.
    #[error("invalid engine configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
    /// The venue store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The embedding provider failed.
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),
    /// The vector index failed.
    #[error(transparent)]
    Index(#[from] IndexError),
    /// The query parser failed.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// The preference store failed.
    #[error(transparent)]
    Preferences(#[from] PreferenceError),
}

impl SearchError {
    /// Whether the failure came from the semantic pipeline.
    #[must_use]
    pub const fn is_semantic(&self) -> bool {
        matches!(self, Self::Embedding(_) | Self::Index(_))
    }
}
