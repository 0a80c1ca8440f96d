//! Semantic scoring: similarity blended with distance and rating.

use haunt_core::{MAX_RATING, OpenState, SearchContext, VectorMatch, Venue, distance_km, is_open_at};

use crate::attribute::{price_reason, push_requested_tags};
use crate::best_match::sort_by_score;
use crate::filter::passes_post_filters;
use crate::{MatchScore, Reasons, ScoredVenue, SemanticWeights};

/// Scores similarity-search matches.
///
/// `combined = 0.6 * (similarity + 1) / 2 + 0.25 * distance_score + 0.15 * rating / 5`
/// with the default weights, where `distance_score = 1 / (1 + km / 10)`, or
/// `0.5` when the requester location is unknown.
#[derive(Debug, Clone, Copy, Default)]
pub struct SemanticScorer {
    weights: SemanticWeights,
}

impl SemanticScorer {
    /// Score with explicit weights.
    #[must_use]
    pub const fn new(weights: SemanticWeights) -> Self {
        Self { weights }
    }

    /// Score one venue given its similarity to the query.
    ///
    /// # Examples
    /// ```
    /// use chrono::NaiveDate;
    /// use geo::Coord;
    /// use haunt_core::{Category, SearchContext, Venue};
    /// use haunt_scorer::SemanticScorer;
    ///
    /// let at = NaiveDate::from_ymd_opt(2024, 7, 1)
    ///     .and_then(|d| d.and_hms_opt(12, 0, 0))
    ///     .expect("valid timestamp");
    /// let venue = Venue::new("v-1", "Tea House", Coord { x: 0.0, y: 0.0 }, Category::Cafe)
    ///     .with_rating(5.0);
    /// let scored = SemanticScorer::default().score(&venue, 1.0, &SearchContext::new(at));
    /// // 0.6 * 1.0 + 0.25 * 0.5 + 0.15 * 1.0
    /// assert!((scored.primary_score() - 0.875).abs() < 1e-12);
    /// ```
    #[expect(
        clippy::float_arithmetic,
        reason = "semantic scores blend normalised components"
    )]
    #[must_use]
    pub fn score(&self, venue: &Venue, similarity: f64, context: &SearchContext) -> ScoredVenue {
        let w = &self.weights;
        let distance = context
            .location
            .map(|location| distance_km(location, venue.location));
        let distance_score =
            distance.map_or(w.neutral_distance_score, |km| 1.0 / (1.0 + km / w.distance_scale_km));
        let rating_score = venue.rating / MAX_RATING;
        let rescaled = (similarity + 1.0) / 2.0;
        let combined = w.similarity * rescaled + w.distance * distance_score + w.rating * rating_score;

        let open_state = is_open_at(venue.opening_hours.as_ref(), context.evaluated_at);
        let mut reasons = Reasons::new();
        push_requested_tags(&mut reasons, venue, &context.filters);
        if distance.is_some_and(|km| km < w.nearby_radius_km) {
            reasons.push("Nearby");
        }
        if context.filters.open_now && open_state == OpenState::Open {
            reasons.push("Open now");
        }
        reasons.push(price_reason(venue.price_level));

        ScoredVenue {
            venue: venue.clone(),
            distance_km: distance.unwrap_or(0.0),
            open_state,
            reasons,
            score: MatchScore::Semantic {
                similarity,
                combined,
            },
        }
    }

    /// Post-filter, score and sort similarity matches, best first.
    ///
    /// Tag, cuisine, rating-floor and open-now constraints are applied here
    /// because a vector index cannot express them.
    #[must_use]
    pub fn rank(&self, matches: &[VectorMatch], context: &SearchContext) -> Vec<ScoredVenue> {
        let mut scored: Vec<ScoredVenue> = matches
            .iter()
            .filter(|m| passes_post_filters(&m.venue, &context.filters, context.evaluated_at))
            .map(|m| self.score(&m.venue, m.similarity, context))
            .collect();
        sort_by_score(&mut scored);
        scored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use geo::Coord;
    use haunt_core::{Category, FilterSet, WeeklySchedule};
    use rstest::{fixture, rstest};

    const ORIGIN: Coord<f64> = Coord { x: 0.0, y: 0.0 };

    #[fixture]
    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 7, 1)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .expect("valid timestamp")
    }

    fn combined(scored: &ScoredVenue) -> f64 {
        match scored.score {
            MatchScore::Semantic { combined, .. } => combined,
            other => panic!("expected a semantic score, got {other:?}"),
        }
    }

    #[rstest]
    #[case(1.0, 0.6 + 0.125)]
    #[case(-1.0, 0.125)]
    #[case(0.0, 0.3 + 0.125)]
    fn similarity_is_rescaled(noon: NaiveDateTime, #[case] similarity: f64, #[case] expected: f64) {
        let venue = Venue::new("v", "V", ORIGIN, Category::Cafe);
        let scored = SemanticScorer::default().score(&venue, similarity, &SearchContext::new(noon));
        assert!((combined(&scored) - expected).abs() < 1e-12);
        assert_eq!(scored.distance_km, 0.0);
    }

    #[rstest]
    fn distance_score_decays_with_distance(noon: NaiveDateTime) {
        // One degree of latitude is about 111.2 km.
        let venue = Venue::new("v", "V", Coord { x: 0.0, y: 1.0 }, Category::Cafe).with_rating(2.5);
        let context = SearchContext::new(noon).with_location(ORIGIN);
        let scored = SemanticScorer::default().score(&venue, 0.0, &context);
        let km = scored.distance_km;
        let expected = 0.3 + 0.25 / (1.0 + km / 10.0) + 0.15 * 0.5;
        assert!((combined(&scored) - expected).abs() < 1e-12);
        assert!((km - 111.19).abs() < 0.01);
    }

    #[rstest]
    fn reasons_cover_tags_proximity_and_price(noon: NaiveDateTime) {
        let venue = Venue::new("v", "V", ORIGIN, Category::Cafe)
            .with_tags(["waterfront"])
            .with_opening_hours(WeeklySchedule::always_open());
        let context = SearchContext::new(noon)
            .with_location(ORIGIN)
            .with_filters(FilterSet::default().with_tags(["waterfront"]).requiring_open_now());
        let scored = SemanticScorer::default().score(&venue, 0.5, &context);
        assert_eq!(
            scored.reasons.as_slice(),
            ["Waterfront", "Nearby", "Open now", "Mid price"]
        );
    }

    #[rstest]
    fn rank_post_filters_and_sorts(noon: NaiveDateTime) {
        let matches = vec![
            VectorMatch {
                venue: Venue::new("low", "Low", ORIGIN, Category::Cafe).with_rating(4.9),
                similarity: 0.1,
            },
            VectorMatch {
                venue: Venue::new("unknown-hours", "U", ORIGIN, Category::Cafe).with_rating(4.9),
                similarity: 0.95,
            },
            VectorMatch {
                venue: Venue::new("high", "High", ORIGIN, Category::Cafe)
                    .with_rating(4.9)
                    .with_opening_hours(WeeklySchedule::always_open()),
                similarity: 0.9,
            },
            VectorMatch {
                venue: Venue::new("poor", "Poor", ORIGIN, Category::Cafe)
                    .with_rating(2.0)
                    .with_opening_hours(WeeklySchedule::always_open()),
                similarity: 0.99,
            },
        ];
        let mut context = SearchContext::new(noon)
            .with_filters(FilterSet::default().with_min_rating(4.0));
        let ranked = SemanticScorer::default().rank(&matches, &context);
        let ids: Vec<_> = ranked.iter().map(|r| r.id().as_str()).collect();
        assert_eq!(ids, vec!["unknown-hours", "high", "low"]);

        context.filters.open_now = true;
        let ranked = SemanticScorer::default().rank(&matches, &context);
        let ids: Vec<_> = ranked.iter().map(|r| r.id().as_str()).collect();
        assert_eq!(ids, vec!["high"]);
    }
}
