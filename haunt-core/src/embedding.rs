//! Text embedding provider seam.

use thiserror::Error;

/// Errors from [`Embedder::embed`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmbeddingError {
    /// No text was supplied.
    #[error("cannot embed empty text")]
    EmptyInput,
    /// The embedding service could not be reached or refused the request.
    #[error("embedding service unavailable: {reason}")]
    Unavailable {
        /// Human-readable cause.
        reason: String,
    },
}

/// Turn free text into a fixed-length vector.
///
/// Implementations must return vectors of the same dimension as the venue
/// embeddings they are compared against, and must return
/// [`EmbeddingError::EmptyInput`] for blank text.
///
/// # Examples
///
/// ```rust
/// use haunt_core::{Embedder, EmbeddingError};
///
/// struct LengthEmbedder;
///
/// impl Embedder for LengthEmbedder {
///     fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
///         if text.trim().is_empty() {
///             return Err(EmbeddingError::EmptyInput);
///         }
///         Ok(vec![1.0, text.len() as f32])
///     }
/// }
///
/// assert_eq!(LengthEmbedder.embed("tea")?, vec![1.0, 3.0]);
/// # Ok::<(), EmbeddingError>(())
/// ```
pub trait Embedder: Send + Sync {
    /// Embed `text`.
    ///
    /// # Errors
    /// Returns [`EmbeddingError`] when the text is blank or the provider
    /// fails.
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}
