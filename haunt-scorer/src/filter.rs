//! Attribute filter: independent exact and set-membership predicates.

use chrono::NaiveDateTime;
use haunt_core::{FilterSet, OpenState, Venue, is_open_at};

/// Whether `venue` satisfies every constraint present in `filters`.
///
/// Tag and cuisine lists use OR semantics: one shared label is enough.
/// `open_now` admits only venues that are definitely open; unknown hours do
/// not qualify.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use geo::Coord;
/// use haunt_core::{Category, FilterSet, Venue};
/// use haunt_scorer::matches_filters;
///
/// let at = NaiveDate::from_ymd_opt(2024, 6, 1)
///     .and_then(|d| d.and_hms_opt(12, 0, 0))
///     .expect("valid timestamp");
/// let venue = Venue::new("v-1", "Pier", Coord { x: 0.0, y: 0.0 }, Category::Bar)
///     .with_tags(["outdoor", "waterfront"]);
/// let filters = FilterSet::default().with_tags(["family-friendly", "waterfront"]);
/// assert!(matches_filters(&venue, &filters, at));
/// ```
#[must_use]
pub fn matches_filters(venue: &Venue, filters: &FilterSet, at: NaiveDateTime) -> bool {
    filters.candidate_query().matches(venue)
        && filters
            .noise_level
            .is_none_or(|noise| venue.noise_level == noise)
        && passes_post_filters(venue, filters, at)
}

/// The predicates a vector index cannot apply: tags, cuisine, rating floor
/// and open-now.
#[must_use]
pub fn passes_post_filters(venue: &Venue, filters: &FilterSet, at: NaiveDateTime) -> bool {
    any_label(&filters.tags, |tag| venue.has_tag(tag))
        && any_label(&filters.cuisine, |cuisine| venue.serves(cuisine))
        && filters
            .min_rating
            .is_none_or(|floor| venue.rating >= floor)
        && (!filters.open_now || is_open_at(venue.opening_hours.as_ref(), at) == OpenState::Open)
}

fn any_label(requested: &[String], has: impl Fn(&str) -> bool) -> bool {
    requested.is_empty() || requested.iter().any(|label| has(label))
}

/// Keep the venues matching `filters`, preserving order.
///
/// The input is left untouched.
#[must_use]
pub fn filter_venues(venues: &[Venue], filters: &FilterSet, at: NaiveDateTime) -> Vec<Venue> {
    venues
        .iter()
        .filter(|venue| matches_filters(venue, filters, at))
        .cloned()
        .collect()
}
