//! Vector similarity search over venue embeddings.
//!
//! The [`VectorIndex`] trait is the seam to an external similarity engine.
//! [`MemoryVectorIndex`] is a brute-force cosine implementation suitable for
//! small catalogues and tests.

use thiserror::Error;

use crate::{CandidateQuery, Venue};

/// A venue returned by similarity search.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorMatch {
    /// Matching venue.
    pub venue: Venue,
    /// Cosine similarity to the query in `-1.0..=1.0`.
    pub similarity: f64,
}

/// Errors from [`VectorIndex::search`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    /// The query vector's length differs from the indexed vectors.
    #[error("query embedding has {found} dimensions; index expects {expected}")]
    DimensionMismatch {
        /// Dimension of indexed vectors.
        expected: usize,
        /// Dimension of the query.
        found: usize,
    },
    /// The index could not be reached.
    #[error("vector index unavailable: {reason}")]
    Unavailable {
        /// Human-readable cause.
        reason: String,
    },
}

/// Similarity search over venue embeddings.
///
/// Venues without an embedding are never returned.
pub trait VectorIndex: Send + Sync {
    /// Return up to `limit` venues admitted by `prefilter`, most similar
    /// first.
    ///
    /// # Errors
    /// Returns [`IndexError`] when the query cannot be compared against the
    /// index.
    fn search(
        &self,
        query: &[f32],
        prefilter: &CandidateQuery,
        limit: usize,
    ) -> Result<Vec<VectorMatch>, IndexError>;
}

/// Cosine similarity of two equal-length vectors.
///
/// Returns `0.0` when either vector has zero magnitude or the lengths
/// differ.
///
/// # Examples
/// ```
/// use haunt_core::cosine_similarity;
///
/// assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-12);
/// assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-12);
/// assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "cosine similarity is a normalised dot product"
)]
pub fn cosine_similarity(left: &[f32], right: &[f32]) -> f64 {
    if left.len() != right.len() {
        return 0.0;
    }
    let (dot, left_norm, right_norm) = left.iter().zip(right).fold(
        (0.0_f64, 0.0_f64, 0.0_f64),
        |(dot, ln, rn), (&l, &r)| {
            let (l, r) = (f64::from(l), f64::from(r));
            (dot + l * r, ln + l * l, rn + r * r)
        },
    );
    let magnitude = left_norm.sqrt() * right_norm.sqrt();
    if magnitude == 0.0 || !magnitude.is_finite() {
        return 0.0;
    }
    (dot / magnitude).clamp(-1.0, 1.0)
}

/// Brute-force cosine index held in memory.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use haunt_core::{CandidateQuery, Category, MemoryVectorIndex, Venue, VectorIndex};
///
/// let venue = Venue::new("v-1", "Tea House", Coord { x: 0.0, y: 0.0 }, Category::Cafe)
///     .with_embedding(vec![1.0, 0.0]);
/// let index = MemoryVectorIndex::new([venue]);
/// let matches = index.search(&[1.0, 0.0], &CandidateQuery::all(), 5)?;
/// assert_eq!(matches.len(), 1);
/// # Ok::<(), haunt_core::IndexError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryVectorIndex {
    venues: Vec<Venue>,
    dimension: Option<usize>,
}

impl MemoryVectorIndex {
    /// Index every venue that carries a non-empty embedding.
    ///
    /// The first embedding fixes the dimension; venues whose embeddings
    /// differ from it are left out.
    pub fn new<I>(venues: I) -> Self
    where
        I: IntoIterator<Item = Venue>,
    {
        let mut dimension = None;
        let indexed = venues
            .into_iter()
            .filter(|venue| {
                let Some(len) = venue.embedding.as_ref().map(Vec::len) else {
                    return false;
                };
                if len == 0 {
                    return false;
                }
                let expected = *dimension.get_or_insert(len);
                if len != expected {
                    log::warn!(
                        "leaving venue {} out of the vector index: {len} dimensions, expected {expected}",
                        venue.id
                    );
                }
                len == expected
            })
            .collect();
        Self {
            venues: indexed,
            dimension,
        }
    }

    /// Number of indexed venues.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.venues.len()
    }

    /// Whether nothing is indexed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.venues.is_empty()
    }
}

impl VectorIndex for MemoryVectorIndex {
    fn search(
        &self,
        query: &[f32],
        prefilter: &CandidateQuery,
        limit: usize,
    ) -> Result<Vec<VectorMatch>, IndexError> {
        let Some(expected) = self.dimension else {
            return Ok(Vec::new());
        };
        if query.len() != expected {
            return Err(IndexError::DimensionMismatch {
                expected,
                found: query.len(),
            });
        }
        let mut matches: Vec<VectorMatch> = self
            .venues
            .iter()
            .filter(|venue| prefilter.matches(venue))
            .filter_map(|venue| {
                let embedding = venue.embedding.as_deref()?;
                Some(VectorMatch {
                    venue: venue.clone(),
                    similarity: cosine_similarity(query, embedding),
                })
            })
            .collect();
        // Stable sort keeps insertion order among equal similarities.
        matches.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        matches.truncate(limit);
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Category;
    use geo::Coord;
    use rstest::{fixture, rstest};

    fn venue(id: &str, category: Category, embedding: Vec<f32>) -> Venue {
        Venue::new(id, id, Coord { x: 0.0, y: 0.0 }, category).with_embedding(embedding)
    }

    #[fixture]
    fn index() -> MemoryVectorIndex {
        MemoryVectorIndex::new([
            venue("north", Category::Cafe, vec![0.0, 1.0]),
            venue("east", Category::Bar, vec![1.0, 0.0]),
            venue("north-east", Category::Cafe, vec![1.0, 1.0]),
            Venue::new("plain", "plain", Coord { x: 0.0, y: 0.0 }, Category::Cafe),
        ])
    }

    #[rstest]
    fn venues_without_embeddings_are_not_indexed(index: MemoryVectorIndex) {
        assert_eq!(index.len(), 3);
    }

    #[rstest]
    fn results_are_sorted_by_similarity(index: MemoryVectorIndex) {
        let matches = index
            .search(&[1.0, 0.1], &CandidateQuery::all(), 10)
            .expect("search");
        let ids: Vec<_> = matches.iter().map(|m| m.venue.id.as_str()).collect();
        assert_eq!(ids, vec!["east", "north-east", "north"]);
    }

    #[rstest]
    fn prefilter_and_limit_apply(index: MemoryVectorIndex) {
        let query = CandidateQuery {
            category: Some(Category::Cafe),
            ..CandidateQuery::all()
        };
        let matches = index.search(&[0.0, 1.0], &query, 1).expect("search");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].venue.id.as_str(), "north");
    }

    #[rstest]
    fn wrong_dimension_is_rejected(index: MemoryVectorIndex) {
        let err = index
            .search(&[1.0, 0.0, 0.0], &CandidateQuery::all(), 10)
            .expect_err("dimension mismatch");
        assert_eq!(
            err,
            IndexError::DimensionMismatch {
                expected: 2,
                found: 3
            }
        );
    }

    #[rstest]
    fn mismatched_venue_embeddings_are_left_out() {
        let index = MemoryVectorIndex::new([
            venue("a", Category::Cafe, vec![1.0, 0.0]),
            venue("b", Category::Cafe, vec![1.0, 0.0, 0.0]),
        ]);
        assert_eq!(index.len(), 1);
    }

    #[rstest]
    fn empty_index_returns_nothing() {
        let index = MemoryVectorIndex::default();
        let matches = index
            .search(&[1.0], &CandidateQuery::all(), 10)
            .expect("search");
        assert!(matches.is_empty());
    }
}
