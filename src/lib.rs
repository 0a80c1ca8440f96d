//! Facade crate for the Haunt venue search engine.
//!
//! This crate re-exports the domain types, collaborator traits and ranking
//! engine, and exposes the SQLite venue store and test doubles behind
//! feature flags.

#![forbid(unsafe_code)]

pub use haunt_core::{
    CandidateQuery, Category, ConversationTurn, Embedder, EmbeddingError, FilterSet, IndexError,
    MemoryPreferences, MemoryVectorIndex, MemoryVenueStore, NoiseLevel, OpenState, ParseError,
    ParsedQuery, PreferenceError, PreferenceProfile, PreferenceStore, PriceLevel, QueryParser,
    RequesterId, SearchContext, StoreError, TransitAccess, VectorIndex, VectorMatch, Venue,
    VenueError, VenueId, VenueStore, WeeklySchedule, distance_km, is_open_at, labels_match,
};
pub use haunt_scorer::{
    EngineConfig, HybridResponse, Interpretation, MatchScore, MatchSource, Reasons, ScoredVenue,
    SearchEngine, SearchError, SearchResponse, SemanticFallback,
};

#[cfg(feature = "store-sqlite")]
pub use haunt_core::{PersistVenuesError, SqliteVenueStore, SqliteVenueStoreError, persist_venues};

#[cfg(feature = "test-support")]
pub use haunt_core::test_support;
