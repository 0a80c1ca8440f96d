//! Data access traits for venues.
//!
//! The `VenueStore` trait defines a read-only interface for retrieving the
//! candidate universe a search ranks over. Stores may apply the
//! [`CandidateQuery`] pre-filter, but ranking stays correct when they
//! return everything.

use thiserror::Error;

use crate::{CandidateQuery, Venue};

#[cfg(feature = "store-sqlite")]
mod sqlite;

#[cfg(feature = "store-sqlite")]
pub use sqlite::{PersistVenuesError, SqliteVenueStore, SqliteVenueStoreError, persist_venues};

/// Errors from [`VenueStore::candidates`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached.
    #[error("venue store unavailable: {reason}")]
    Unavailable {
        /// Human-readable cause.
        reason: String,
    },
    /// The backend failed while reading venues.
    #[error("venue store backend failed: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Read-only access to persisted venues.
///
/// # Examples
///
/// ```rust
/// use geo::Coord;
/// use haunt_core::{CandidateQuery, Category, StoreError, Venue, VenueStore};
///
/// struct VecStore(Vec<Venue>);
///
/// impl VenueStore for VecStore {
///     fn candidates(&self, query: &CandidateQuery) -> Result<Vec<Venue>, StoreError> {
///         Ok(self.0.iter().filter(|v| query.matches(v)).cloned().collect())
///     }
/// }
///
/// let store = VecStore(vec![Venue::new("v-1", "Kiosk", Coord { x: 0.0, y: 0.0 }, Category::Cafe)]);
/// assert_eq!(store.candidates(&CandidateQuery::all())?.len(), 1);
/// # Ok::<(), StoreError>(())
/// ```
pub trait VenueStore: Send + Sync {
    /// Return the venues admitted by `query`, or a superset of them.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the backing store fails.
    fn candidates(&self, query: &CandidateQuery) -> Result<Vec<Venue>, StoreError>;
}

/// In-memory `VenueStore` performing a linear scan.
#[derive(Default, Debug, Clone)]
pub struct MemoryVenueStore {
    venues: Vec<Venue>,
}

impl MemoryVenueStore {
    /// Create a store from a collection of venues.
    pub fn with_venues<I>(venues: I) -> Self
    where
        I: IntoIterator<Item = Venue>,
    {
        Self {
            venues: venues.into_iter().collect(),
        }
    }

    /// Borrow every stored venue.
    #[must_use]
    pub fn venues(&self) -> &[Venue] {
        &self.venues
    }
}

impl VenueStore for MemoryVenueStore {
    fn candidates(&self, query: &CandidateQuery) -> Result<Vec<Venue>, StoreError> {
        Ok(self
            .venues
            .iter()
            .filter(|venue| query.matches(venue))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Category, FilterSet};
    use geo::Coord;
    use rstest::rstest;

    fn store() -> MemoryVenueStore {
        MemoryVenueStore::with_venues([
            Venue::new("a", "A", Coord { x: 0.0, y: 0.0 }, Category::Cafe),
            Venue::new("b", "B", Coord { x: 0.0, y: 0.0 }, Category::Bar),
        ])
    }

    #[rstest]
    fn returns_everything_for_open_query() {
        let found = store().candidates(&CandidateQuery::all()).expect("scan");
        assert_eq!(found.len(), 2);
    }

    #[rstest]
    fn applies_prefilter() {
        let query = FilterSet::default()
            .with_category(Category::Bar)
            .candidate_query();
        let found = store().candidates(&query).expect("scan");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id.as_str(), "b");
    }

    #[rstest]
    fn empty_store_returns_nothing() {
        let found = MemoryVenueStore::default()
            .candidates(&CandidateQuery::all())
            .expect("scan");
        assert!(found.is_empty());
    }
}
