//! Ranking, truncation and the best-match gap rule.

use crate::{ScoredVenue, SearchResponse};

/// Sort results by primary score, best first.
///
/// The sort is stable: equal scores keep their input order.
pub fn sort_by_score(results: &mut [ScoredVenue]) {
    results.sort_by(|a, b| b.primary_score().total_cmp(&a.primary_score()));
}

/// Pick the clear winner of an already-sorted result list.
///
/// The top result wins only when it beats the runner-up by strictly more
/// than `gap`. A lone result has no runner-up and always wins.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use geo::Coord;
/// use haunt_core::{Category, SearchContext, Venue};
/// use haunt_scorer::{AttributeScorer, WeatherBias, select_best_match};
///
/// let at = NaiveDate::from_ymd_opt(2024, 7, 1)
///     .and_then(|d| d.and_hms_opt(12, 0, 0))
///     .expect("valid timestamp");
/// let context = SearchContext::new(at);
/// let scorer = AttributeScorer::default();
/// let score = |rating: f64| {
///     let venue = Venue::new("v", "V", Coord { x: 0.0, y: 0.0 }, Category::Cafe)
///         .with_rating(rating);
///     scorer.score(&venue, &context, WeatherBias::at(at), None)
/// };
///
/// // 5.0 and 4.2 stars score 100 and 84 points: a 16-point lead.
/// assert!(select_best_match(&[score(5.0), score(4.2)], 15.0).is_some());
/// // 5.0 and 4.3 stars score 100 and 86 points: a 14-point lead.
/// assert!(select_best_match(&[score(5.0), score(4.3)], 15.0).is_none());
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "the gap rule compares score differences"
)]
pub fn select_best_match(sorted: &[ScoredVenue], gap: f64) -> Option<&ScoredVenue> {
    match sorted {
        [] => None,
        [only] => Some(only),
        [top, runner_up, ..] => {
            (top.primary_score() - runner_up.primary_score() > gap).then_some(top)
        }
    }
}

/// Sort, pick the best match on the full set, then truncate to `limit`.
#[must_use]
pub fn rank_results(mut results: Vec<ScoredVenue>, gap: f64, limit: usize) -> SearchResponse {
    sort_by_score(&mut results);
    let best_match = select_best_match(&results, gap).cloned();
    let total_count = results.len();
    results.truncate(limit);
    SearchResponse {
        results,
        best_match,
        total_count,
    }
}
