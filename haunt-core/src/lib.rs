//! Core domain types for the Haunt venue search engine.
//!
//! This crate holds the venue snapshot model, the leaf computations the
//! ranking core is built from (opening hours, great-circle distance, cosine
//! similarity) and the collaborator traits through which the engine reaches
//! storage, embeddings, vector search, query parsing and learned preferences.
//!
//! Nothing here reads the wall clock. Every time-dependent computation takes
//! an explicit [`chrono::NaiveDateTime`] in the venue's local time.
//!
//! # Examples
//!
//! ```
//! use chrono::NaiveDate;
//! use haunt_core::{DayOfWeek, OpenState, WeeklySchedule, is_open_at};
//!
//! let schedule = WeeklySchedule::closed().with_day(DayOfWeek::Saturday, "09:00-17:00");
//! let at = NaiveDate::from_ymd_opt(2024, 6, 1)
//!     .and_then(|d| d.and_hms_opt(17, 0, 0))
//!     .expect("valid timestamp");
//! assert_eq!(is_open_at(Some(&schedule), at), OpenState::Open);
//! assert_eq!(is_open_at(None, at), OpenState::Unknown);
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod attributes;
mod distance;
mod embedding;
mod hours;
mod parser;
mod profile;
mod query;
mod store;
mod vector;
mod venue;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use attributes::{Category, NoiseLevel, PriceLevel, UnknownAttribute};
pub use distance::{EARTH_RADIUS_KM, distance_km};
pub use embedding::{Embedder, EmbeddingError};
pub use hours::{DayHours, DayOfWeek, OpenState, TimeRange, WeeklySchedule, is_open_at};
pub use parser::{
    ConversationTurn, MAX_CLARIFYING_QUESTIONS, ParseError, ParsedQuery, QueryParser, Speaker,
};
pub use profile::{MemoryPreferences, PreferenceError, PreferenceProfile, PreferenceStore};
pub use query::{CandidateQuery, FilterSet, RequesterId, SearchContext};
pub use store::{MemoryVenueStore, StoreError, VenueStore};
pub use vector::{IndexError, MemoryVectorIndex, VectorIndex, VectorMatch, cosine_similarity};
pub use venue::{MAX_RATING, TransitAccess, Venue, VenueError, VenueId, labels_match};

#[cfg(feature = "store-sqlite")]
#[cfg_attr(docsrs, doc(cfg(feature = "store-sqlite")))]
pub use store::{PersistVenuesError, SqliteVenueStore, SqliteVenueStoreError, persist_venues};
