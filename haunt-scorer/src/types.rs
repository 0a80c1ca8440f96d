//! Scored results and search responses.

use haunt_core::{OpenState, Venue, VenueId, labels_match};

/// Ordered, deduplicated explanation of a score.
///
/// Duplicates are detected ignoring ASCII case; the first spelling wins.
///
/// # Examples
/// ```
/// use haunt_scorer::Reasons;
///
/// let mut reasons = Reasons::new();
/// reasons.push("Outdoor");
/// reasons.push("outdoor");
/// reasons.push("Mid price");
/// assert_eq!(reasons.joined(" • "), "Outdoor • Mid price");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct Reasons(Vec<String>);

impl Reasons {
    /// An empty list.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Append `reason` unless an equal reason is already present.
    ///
    /// Returns `true` when the reason was added.
    pub fn push(&mut self, reason: impl Into<String>) -> bool {
        let text = reason.into();
        if self.contains(&text) {
            return false;
        }
        self.0.push(text);
        true
    }

    /// Append every reason from `other` not already present.
    pub fn merge(&mut self, other: &Self) {
        for reason in other.iter() {
            self.push(reason);
        }
    }

    /// Whether an equal reason is present.
    #[must_use]
    pub fn contains(&self, reason: &str) -> bool {
        self.0.iter().any(|r| labels_match(r, reason))
    }

    /// Iterate reasons in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Borrow the reasons as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Number of reasons.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no reasons.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Join the reasons for display.
    #[must_use]
    pub fn joined(&self, separator: &str) -> String {
        self.0.join(separator)
    }
}

/// Which result set a hybrid entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum MatchSource {
    /// Only the attribute pipeline returned the venue.
    Attribute,
    /// Only the semantic pipeline returned the venue.
    Semantic,
    /// Both pipelines returned the venue.
    Both,
}

/// Scores carried by a result, by pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "kind", rename_all = "lowercase")
)]
pub enum MatchScore {
    /// Additive attribute score, roughly `0..=180`.
    Attribute {
        /// Sum of every applicable bonus.
        score: f64,
    },
    /// Semantic score from similarity, distance and rating.
    Semantic {
        /// Cosine similarity to the query in `-1.0..=1.0`.
        similarity: f64,
        /// Blended score in `0.0..=1.0`.
        combined: f64,
    },
    /// Re-ranked hybrid score.
    Hybrid {
        /// Result set the entry came from.
        source: MatchSource,
        /// Cosine similarity; `0.0` for attribute-only entries.
        similarity: f64,
        /// Semantic combined score, or the normalised attribute score for
        /// attribute-only entries.
        combined: f64,
        /// Attribute score that entered the re-rank; `None` when the entry
        /// came from the semantic set.
        attribute: Option<f64>,
        /// Score the merged list is ordered by.
        final_score: f64,
    },
}

impl MatchScore {
    /// The score results are ordered by.
    #[must_use]
    pub const fn primary(&self) -> f64 {
        match *self {
            Self::Attribute { score } => score,
            Self::Semantic { combined, .. } => combined,
            Self::Hybrid { final_score, .. } => final_score,
        }
    }
}

/// A venue with its ranking context.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScoredVenue {
    /// Snapshot of the ranked venue.
    pub venue: Venue,
    /// Distance from the requester; `0.0` without a location.
    pub distance_km: f64,
    /// Opening state at the evaluation instant.
    pub open_state: OpenState,
    /// Human-readable explanation, in insertion order.
    pub reasons: Reasons,
    /// Pipeline-specific scores.
    pub score: MatchScore,
}

impl ScoredVenue {
    /// Identity of the ranked venue.
    #[must_use]
    pub const fn id(&self) -> &VenueId {
        &self.venue.id
    }

    /// The score results are ordered by.
    #[must_use]
    pub const fn primary_score(&self) -> f64 {
        self.score.primary()
    }
}

/// Ranked results of an attribute or semantic search.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchResponse {
    /// Top results, best first.
    pub results: Vec<ScoredVenue>,
    /// Clear winner, if the top result leads by more than the gap.
    pub best_match: Option<ScoredVenue>,
    /// Number of qualifying results before truncation.
    pub total_count: usize,
}

impl SearchResponse {
    /// Whether nothing qualified.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total_count == 0
    }
}

/// Ranked results of a hybrid search.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HybridResponse {
    /// Top results, best first.
    pub results: Vec<ScoredVenue>,
    /// Clear winner, if the top result leads by more than the gap.
    pub best_match: Option<ScoredVenue>,
    /// Number of merged results before truncation.
    pub total_count: usize,
    /// Wall time spent, in milliseconds.
    pub latency_ms: u64,
    /// Whether the semantic pipeline failed and was left out.
    pub degraded: bool,
}

impl HybridResponse {
    pub(crate) fn from_ranked(response: SearchResponse, latency_ms: u64, degraded: bool) -> Self {
        Self {
            results: response.results,
            best_match: response.best_match,
            total_count: response.total_count,
            latency_ms,
            degraded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn reasons_dedup_ignoring_case() {
        let mut reasons = Reasons::new();
        assert!(reasons.push("Nearby"));
        assert!(!reasons.push("NEARBY"));
        assert!(reasons.push("Open now"));
        assert_eq!(reasons.as_slice(), ["Nearby", "Open now"]);
    }

    #[rstest]
    fn reasons_dedup_folds_non_ascii_case() {
        let mut reasons = Reasons::new();
        assert!(reasons.push("Serves Café"));
        assert!(!reasons.push("SERVES CAFÉ"));
        assert_eq!(reasons.len(), 1);
    }

    #[rstest]
    fn merge_keeps_first_order() {
        let mut semantic = Reasons::new();
        semantic.push("Waterfront");
        semantic.push("Mid price");
        let mut attribute = Reasons::new();
        attribute.push("Nearby");
        attribute.push("Mid price");
        semantic.merge(&attribute);
        assert_eq!(semantic.joined(", "), "Waterfront, Mid price, Nearby");
    }

    #[rstest]
    #[case(MatchScore::Attribute { score: 120.0 }, 120.0)]
    #[case(MatchScore::Semantic { similarity: 0.2, combined: 0.7 }, 0.7)]
    #[case(
        MatchScore::Hybrid {
            source: MatchSource::Both,
            similarity: 0.2,
            combined: 0.7,
            attribute: None,
            final_score: 0.42,
        },
        0.42
    )]
    fn primary_score_follows_pipeline(#[case] score: MatchScore, #[case] expected: f64) {
        assert_eq!(score.primary(), expected);
    }
}
