//! Additive attribute scoring with human-readable reasons.

use haunt_core::{
    FilterSet, OpenState, PreferenceProfile, PriceLevel, SearchContext, Venue, distance_km,
    is_open_at,
};

use crate::{AttributeWeights, MatchScore, Reasons, ScoredVenue, WeatherBias};

const OUTDOOR_TAG: &str = "outdoor";
const INDOOR_TAG: &str = "indoor";

/// Scores filtered venues by rating, proximity, openness, season, transit
/// and learned preferences.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use geo::Coord;
/// use haunt_core::{Category, SearchContext, Venue};
/// use haunt_scorer::{AttributeScorer, WeatherBias};
///
/// let at = NaiveDate::from_ymd_opt(2024, 7, 1)
///     .and_then(|d| d.and_hms_opt(12, 0, 0))
///     .expect("valid timestamp");
/// let venue = Venue::new("v-1", "Tea House", Coord { x: 0.0, y: 0.0 }, Category::Cafe)
///     .with_rating(4.0);
/// let scored = AttributeScorer::default().score(
///     &venue,
///     &SearchContext::new(at),
///     WeatherBias::at(at),
///     None,
/// );
/// assert_eq!(scored.primary_score(), 80.0);
/// assert_eq!(scored.reasons.joined(" • "), "Mid price");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct AttributeScorer {
    weights: AttributeWeights,
}

impl AttributeScorer {
    /// Score with explicit weights.
    #[must_use]
    pub const fn new(weights: AttributeWeights) -> Self {
        Self { weights }
    }

    /// Score one venue.
    #[expect(
        clippy::float_arithmetic,
        reason = "attribute scores are additive floating-point bonuses"
    )]
    #[must_use]
    pub fn score(
        &self,
        venue: &Venue,
        context: &SearchContext,
        bias: WeatherBias,
        profile: Option<&PreferenceProfile>,
    ) -> ScoredVenue {
        let w = &self.weights;
        let filters = &context.filters;
        let open_state = is_open_at(venue.opening_hours.as_ref(), context.evaluated_at);
        let mut reasons = Reasons::new();
        let mut score = venue.rating * w.rating_multiplier;

        let distance = context
            .location
            .map_or(0.0, |location| distance_km(location, venue.location));
        if context.location.is_some() {
            if distance < w.nearby_radius_km {
                score += w.nearby_bonus;
                reasons.push("Nearby");
            } else if distance <= w.local_radius_km {
                score += w.local_bonus;
            }
        }

        if filters.open_now && open_state == OpenState::Open {
            score += w.open_now_bonus;
            reasons.push("Open now");
        }

        if bias.is_outdoor_season() && venue.has_tag(OUTDOOR_TAG) {
            score += w.outdoor_bonus;
            reasons.push("Outdoor");
        } else if !bias.is_outdoor_season() && venue.has_tag(INDOOR_TAG) {
            score += w.indoor_bonus;
            reasons.push("Indoor");
        }

        if venue.near_transit() {
            if filters.near_transit {
                score += w.requested_transit_bonus;
                reasons.push(transit_reason(venue.station()));
            } else {
                score += w.transit_bonus;
            }
        }

        if let Some(profile) = profile {
            score += self.preference_bonus(venue, profile);
        }

        push_requested_tags(&mut reasons, venue, filters);
        reasons.push(price_reason(venue.price_level));

        ScoredVenue {
            venue: venue.clone(),
            distance_km: distance,
            open_state,
            reasons,
            score: MatchScore::Attribute { score },
        }
    }

    #[expect(
        clippy::float_arithmetic,
        reason = "preference bonuses scale observed counts"
    )]
    fn preference_bonus(&self, venue: &Venue, profile: &PreferenceProfile) -> f64 {
        let w = &self.weights;
        let tags: f64 = profile
            .tag_counts()
            .filter(|(tag, _)| venue.has_tag(tag))
            .map(|(_, count)| (f64::from(count) * w.preference_per_count).min(w.preference_cap))
            .sum();
        let price = if profile.preferred_price_level() == Some(venue.price_level) {
            w.preferred_price_bonus
        } else {
            0.0
        };
        tags + price
    }

    /// Score every venue, preserving order.
    #[must_use]
    pub fn score_all(
        &self,
        venues: &[Venue],
        context: &SearchContext,
        profile: Option<&PreferenceProfile>,
    ) -> Vec<ScoredVenue> {
        let bias = WeatherBias::at(context.evaluated_at);
        venues
            .iter()
            .map(|venue| self.score(venue, context, bias, profile))
            .collect()
    }
}

fn transit_reason(station: Option<&str>) -> String {
    station.map_or_else(
        || "Near Metro".to_owned(),
        |station| format!("Near {station} Metro"),
    )
}

/// Append each requested tag the venue carries, capitalised.
pub(crate) fn push_requested_tags(reasons: &mut Reasons, venue: &Venue, filters: &FilterSet) {
    for tag in filters.tags.iter().filter(|tag| venue.has_tag(tag)) {
        reasons.push(capitalise(tag.trim()));
    }
}

pub(crate) fn price_reason(price_level: PriceLevel) -> String {
    format!("{} price", price_level.label())
}

fn capitalise(label: &str) -> String {
    let mut chars = label.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use geo::Coord;
    use haunt_core::{Category, DayOfWeek, TransitAccess, WeeklySchedule};
    use rstest::{fixture, rstest};

    const ORIGIN: Coord<f64> = Coord { x: 55.2708, y: 25.2048 };

    /// A point roughly `km` kilometres north of [`ORIGIN`].
    fn north_of_origin(km: f64) -> Coord<f64> {
        Coord {
            x: ORIGIN.x,
            y: ORIGIN.y + km / 111.195,
        }
    }

    #[fixture]
    fn december_evening() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 12, 7)
            .and_then(|d| d.and_hms_opt(19, 0, 0))
            .expect("valid timestamp")
    }

    fn score_of(scored: &ScoredVenue) -> f64 {
        scored.primary_score()
    }

    #[rstest]
    fn additive_example_scores_160(december_evening: NaiveDateTime) {
        let venue = Venue::new("v", "Terrace", north_of_origin(1.2), Category::Restaurant)
            .with_rating(4.5)
            .with_tags(["outdoor"])
            .with_transit(TransitAccess::station("Burj Khalifa"));
        let context = SearchContext::new(december_evening)
            .with_location(ORIGIN)
            .with_filters(FilterSet::default().requiring_transit());
        let scored = AttributeScorer::default().score(
            &venue,
            &context,
            WeatherBias::at(december_evening),
            None,
        );
        assert!((score_of(&scored) - 160.0).abs() < 1e-9);
        assert_eq!(
            scored.reasons.as_slice(),
            ["Nearby", "Outdoor", "Near Burj Khalifa Metro", "Mid price"]
        );
    }

    #[rstest]
    #[case(1.0, 30.0)]
    #[case(3.0, 15.0)]
    #[case(8.0, 0.0)]
    fn distance_bands(december_evening: NaiveDateTime, #[case] km: f64, #[case] bonus: f64) {
        let venue = Venue::new("v", "V", north_of_origin(km), Category::Cafe);
        let context = SearchContext::new(december_evening).with_location(ORIGIN);
        let scored = AttributeScorer::default().score(
            &venue,
            &context,
            WeatherBias::new(false),
            None,
        );
        assert!((score_of(&scored) - bonus).abs() < 1e-9);
        assert!((scored.distance_km - km).abs() < 0.01);
    }

    #[rstest]
    fn no_location_means_zero_distance(december_evening: NaiveDateTime) {
        let venue = Venue::new("v", "V", north_of_origin(1.0), Category::Cafe);
        let scored = AttributeScorer::default().score(
            &venue,
            &SearchContext::new(december_evening),
            WeatherBias::new(false),
            None,
        );
        assert_eq!(scored.distance_km, 0.0);
        assert!(!scored.reasons.contains("Nearby"));
    }

    #[rstest]
    fn open_now_counts_only_when_requested(december_evening: NaiveDateTime) {
        let venue = Venue::new("v", "V", ORIGIN, Category::Bar)
            .with_opening_hours(WeeklySchedule::closed().with_day(DayOfWeek::Saturday, "18:00-23:00"));
        let scorer = AttributeScorer::default();
        let plain = scorer.score(
            &venue,
            &SearchContext::new(december_evening),
            WeatherBias::new(false),
            None,
        );
        let requested = scorer.score(
            &venue,
            &SearchContext::new(december_evening)
                .with_filters(FilterSet::default().requiring_open_now()),
            WeatherBias::new(false),
            None,
        );
        assert_eq!(plain.open_state, OpenState::Open);
        assert!((score_of(&requested) - score_of(&plain) - 25.0).abs() < 1e-9);
        assert_eq!(requested.reasons.as_slice(), ["Open now", "Mid price"]);
    }

    #[rstest]
    fn indoor_bonus_applies_out_of_season(december_evening: NaiveDateTime) {
        let venue = Venue::new("v", "V", ORIGIN, Category::Attraction).with_tags(["indoor", "outdoor"]);
        let context = SearchContext::new(december_evening);
        let summer = AttributeScorer::default().score(&venue, &context, WeatherBias::new(false), None);
        let winter = AttributeScorer::default().score(&venue, &context, WeatherBias::new(true), None);
        assert_eq!(summer.reasons.as_slice(), ["Indoor", "Mid price"]);
        assert!((score_of(&summer) - 15.0).abs() < 1e-9);
        assert_eq!(winter.reasons.as_slice(), ["Outdoor", "Mid price"]);
        assert!((score_of(&winter) - 20.0).abs() < 1e-9);
    }

    #[rstest]
    fn unrequested_transit_adds_five_silently(december_evening: NaiveDateTime) {
        let venue = Venue::new("v", "V", ORIGIN, Category::Cafe).with_transit(TransitAccess::default());
        let scored = AttributeScorer::default().score(
            &venue,
            &SearchContext::new(december_evening),
            WeatherBias::new(false),
            None,
        );
        assert!((score_of(&scored) - 5.0).abs() < 1e-9);
        assert_eq!(scored.reasons.as_slice(), ["Mid price"]);
    }

    #[rstest]
    fn requested_transit_without_station(december_evening: NaiveDateTime) {
        let venue = Venue::new("v", "V", ORIGIN, Category::Cafe).with_transit(TransitAccess::default());
        let context = SearchContext::new(december_evening)
            .with_filters(FilterSet::default().requiring_transit());
        let scored = AttributeScorer::default().score(&venue, &context, WeatherBias::new(false), None);
        assert!(scored.reasons.contains("Near Metro"));
    }

    #[rstest]
    fn preferences_are_capped_per_tag(december_evening: NaiveDateTime) {
        let venue = Venue::new("v", "V", ORIGIN, Category::Cafe)
            .with_tags(["rooftop", "quiet"])
            .with_price_level(PriceLevel::High);
        let profile = PreferenceProfile::new()
            .with_tag_count("rooftop", 25)
            .with_tag_count("quiet", 3)
            .with_tag_count("sports", 9)
            .with_preferred_price(PriceLevel::High);
        let scored = AttributeScorer::default().score(
            &venue,
            &SearchContext::new(december_evening),
            WeatherBias::new(false),
            Some(&profile),
        );
        assert!((score_of(&scored) - (20.0 + 6.0 + 10.0)).abs() < 1e-9);
        assert_eq!(scored.reasons.as_slice(), ["High price"]);
    }

    #[rstest]
    fn requested_tags_are_capitalised_and_deduplicated(december_evening: NaiveDateTime) {
        let venue = Venue::new("v", "V", ORIGIN, Category::Cafe)
            .with_tags(["outdoor", "family-friendly"])
            .with_price_level(PriceLevel::Low);
        let context = SearchContext::new(december_evening).with_filters(
            FilterSet::default().with_tags(["outdoor", "family-friendly", "waterfront"]),
        );
        let scored = AttributeScorer::default().score(&venue, &context, WeatherBias::new(true), None);
        assert_eq!(
            scored.reasons.as_slice(),
            ["Outdoor", "Family-friendly", "Low price"]
        );
    }

    #[rstest]
    fn capitalise_handles_empty_and_unicode() {
        assert_eq!(capitalise(""), "");
        assert_eq!(capitalise("épicerie"), "Épicerie");
    }
}
