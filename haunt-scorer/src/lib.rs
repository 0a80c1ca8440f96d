//! Ranking core for Haunt venue search.
//!
//! The crate turns a candidate set into an explainable shortlist:
//! - **Attribute search** filters venues by exact and set-membership
//!   predicates, then scores them additively from rating, proximity, opening
//!   hours, seasonal bias, transit access and learned preferences.
//! - **Semantic search** scores similarity-search matches by blending the
//!   rescaled cosine similarity with distance and rating.
//! - **Hybrid search** merges both result sets, deduplicates by venue
//!   identity and re-ranks them with a fixed weighted blend.
//!
//! Every pipeline ends with the best-match rule: the top result is
//! highlighted only when it leads the runner-up by more than a configured
//! gap, decided on the full sorted set before truncation.
//!
//! # Examples
//!
//! ```
//! use chrono::NaiveDate;
//! use geo::Coord;
//! use haunt_core::test_support::{StaticEmbedder, StaticParser};
//! use haunt_core::{
//!     Category, FilterSet, MemoryPreferences, MemoryVectorIndex, MemoryVenueStore, ParsedQuery,
//!     SearchContext, Venue,
//! };
//! use haunt_scorer::SearchEngine;
//!
//! let venues = vec![
//!     Venue::new("v-1", "Arabica", Coord { x: 55.27, y: 25.19 }, Category::Cafe).with_rating(4.6),
//!     Venue::new("v-2", "Tap Room", Coord { x: 55.14, y: 25.08 }, Category::Bar).with_rating(4.1),
//! ];
//! let engine = SearchEngine::new(
//!     MemoryVenueStore::with_venues(venues.clone()),
//!     MemoryVectorIndex::new(venues),
//!     StaticEmbedder::default(),
//!     StaticParser::new(ParsedQuery::new("find_venue", FilterSet::default(), 1.0)),
//!     MemoryPreferences::new(),
//! );
//! let at = NaiveDate::from_ymd_opt(2024, 11, 2)
//!     .and_then(|d| d.and_hms_opt(10, 0, 0))
//!     .expect("valid timestamp");
//! let context = SearchContext::new(at).with_filters(FilterSet::default().with_category(Category::Cafe));
//! let response = engine.search(&context)?;
//! assert_eq!(response.total_count, 1);
//! assert!(response.best_match.is_some());
//! # Ok::<(), haunt_scorer::SearchError>(())
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod attribute;
mod best_match;
mod config;
mod engine;
mod error;
mod filter;
mod hybrid;
mod season;
mod semantic;
mod types;

pub use attribute::AttributeScorer;
pub use best_match::{rank_results, select_best_match, sort_by_score};
pub use config::{
    AttributeWeights, ConfigError, EngineConfig, HybridWeights, SemanticFallback, SemanticWeights,
};
pub use engine::{Interpretation, SearchEngine};
pub use error::SearchError;
pub use filter::{filter_venues, matches_filters, passes_post_filters};
pub use hybrid::{merge_all, merge_hybrid};
pub use season::WeatherBias;
pub use semantic::SemanticScorer;
pub use types::{HybridResponse, MatchScore, MatchSource, Reasons, ScoredVenue, SearchResponse};
