//! Deterministic collaborator doubles used by unit and behaviour tests.
//!
//! Enable the `test-support` feature to use these from other crates.

use std::collections::HashMap;

use crate::{
    CandidateQuery, ConversationTurn, Embedder, EmbeddingError, IndexError, ParseError,
    ParsedQuery, PreferenceError, PreferenceProfile, PreferenceStore, QueryParser, RequesterId,
    StoreError, VectorIndex, VectorMatch, Venue, VenueStore,
};

/// `QueryParser` returning the same parse for every non-blank input.
#[derive(Debug, Clone)]
pub struct StaticParser {
    parsed: ParsedQuery,
}

impl StaticParser {
    /// Always answer with `parsed`.
    #[must_use]
    pub const fn new(parsed: ParsedQuery) -> Self {
        Self { parsed }
    }
}

impl QueryParser for StaticParser {
    fn parse(&self, text: &str, _history: &[ConversationTurn]) -> Result<ParsedQuery, ParseError> {
        if text.trim().is_empty() {
            return Err(ParseError::EmptyInput);
        }
        Ok(self.parsed.clone())
    }
}

/// `Embedder` with a lookup table and a fallback vector.
///
/// Lookups ignore case and surrounding whitespace.
#[derive(Debug, Clone, Default)]
pub struct StaticEmbedder {
    vectors: HashMap<String, Vec<f32>>,
    fallback: Vec<f32>,
}

impl StaticEmbedder {
    /// Embed every text as `fallback`.
    #[must_use]
    pub fn constant(fallback: Vec<f32>) -> Self {
        Self {
            vectors: HashMap::new(),
            fallback,
        }
    }

    /// Embed `text` as `vector`.
    #[must_use]
    pub fn with_vector(mut self, text: &str, vector: Vec<f32>) -> Self {
        self.vectors.insert(text.trim().to_lowercase(), vector);
        self
    }
}

impl Embedder for StaticEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let key = text.trim().to_lowercase();
        if key.is_empty() {
            return Err(EmbeddingError::EmptyInput);
        }
        Ok(self
            .vectors
            .get(&key)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone()))
    }
}

/// Collaborator that reports every call as unavailable.
///
/// Implements every collaborator trait so one value can stand in for any of
/// them.
#[derive(Debug, Clone)]
pub struct Unavailable {
    reason: String,
}

impl Unavailable {
    /// Fail with `reason`.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl Embedder for Unavailable {
    fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Err(EmbeddingError::Unavailable {
            reason: self.reason.clone(),
        })
    }
}

impl QueryParser for Unavailable {
    fn parse(&self, _text: &str, _history: &[ConversationTurn]) -> Result<ParsedQuery, ParseError> {
        Err(ParseError::Unavailable {
            reason: self.reason.clone(),
        })
    }
}

impl VenueStore for Unavailable {
    fn candidates(&self, _query: &CandidateQuery) -> Result<Vec<Venue>, StoreError> {
        Err(StoreError::Unavailable {
            reason: self.reason.clone(),
        })
    }
}

impl VectorIndex for Unavailable {
    fn search(
        &self,
        _query: &[f32],
        _prefilter: &CandidateQuery,
        _limit: usize,
    ) -> Result<Vec<VectorMatch>, IndexError> {
        Err(IndexError::Unavailable {
            reason: self.reason.clone(),
        })
    }
}

impl PreferenceStore for Unavailable {
    fn profile(&self, _requester: &RequesterId) -> Result<Option<PreferenceProfile>, PreferenceError> {
        Err(PreferenceError::Unavailable {
            reason: self.reason.clone(),
        })
    }
}
