//! Query inputs: structured filters and the context of one ranking call.
//!
//! The evaluation instant is always explicit. Nothing in the ranking core
//! reads the wall clock, so identical contexts rank identically.

use std::fmt;

use chrono::NaiveDateTime;
use geo::Coord;

use crate::venue::labels_match;
use crate::{Category, NoiseLevel, PriceLevel, Venue};

/// Identifier of the person a search is run for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct RequesterId(String);

impl RequesterId {
    /// Wrap an identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequesterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RequesterId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Structured search constraints.
///
/// Every field is optional. Tag and cuisine lists use OR semantics: a venue
/// matches when it carries any of the requested labels.
///
/// # Examples
/// ```
/// use haunt_core::{Category, FilterSet};
///
/// let filters = FilterSet::default()
///     .with_category(Category::Cafe)
///     .with_tags(["family-friendly", "waterfront"])
///     .requiring_open_now();
/// assert!(filters.open_now);
/// assert_eq!(filters.tags.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct FilterSet {
    /// Required category.
    pub category: Option<Category>,
    /// Requested tags; any one suffices.
    pub tags: Vec<String>,
    /// Required price band.
    pub price_level: Option<PriceLevel>,
    /// Required area, compared case-insensitively.
    pub area: Option<String>,
    /// Keep only venues near public transport.
    pub near_transit: bool,
    /// Minimum star rating, inclusive.
    pub min_rating: Option<f64>,
    /// Requested cuisines; any one suffices.
    pub cuisine: Vec<String>,
    /// Required noise level.
    pub noise_level: Option<NoiseLevel>,
    /// Keep only venues known to be open at the evaluation instant.
    pub open_now: bool,
}

impl FilterSet {
    /// Require a category.
    #[must_use]
    pub const fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    /// Request any of `tags`.
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Request any of `cuisine`.
    #[must_use]
    pub fn with_cuisine<I, S>(mut self, cuisine: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cuisine = cuisine.into_iter().map(Into::into).collect();
        self
    }

    /// Require a price band.
    #[must_use]
    pub const fn with_price_level(mut self, price_level: PriceLevel) -> Self {
        self.price_level = Some(price_level);
        self
    }

    /// Require an area.
    #[must_use]
    pub fn with_area(mut self, area: impl Into<String>) -> Self {
        self.area = Some(area.into());
        self
    }

    /// Require a noise level.
    #[must_use]
    pub const fn with_noise_level(mut self, noise_level: NoiseLevel) -> Self {
        self.noise_level = Some(noise_level);
        self
    }

    /// Require a minimum rating.
    #[must_use]
    pub const fn with_min_rating(mut self, min_rating: f64) -> Self {
        self.min_rating = Some(min_rating);
        self
    }

    /// Keep only venues near transit.
    #[must_use]
    pub const fn requiring_transit(mut self) -> Self {
        self.near_transit = true;
        self
    }

    /// Keep only venues open at the evaluation instant.
    #[must_use]
    pub const fn requiring_open_now(mut self) -> Self {
        self.open_now = true;
        self
    }

    /// The exact-match subset that stores and indices may apply up front.
    #[must_use]
    pub fn candidate_query(&self) -> CandidateQuery {
        CandidateQuery {
            category: self.category,
            price_level: self.price_level,
            area: self.area.clone(),
            near_transit: self.near_transit,
        }
    }
}

/// Exact-match pre-filter pushed down to candidate stores.
///
/// Applying it is an optimisation only; the attribute filter re-checks every
/// predicate, so stores may ignore it and return the full collection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CandidateQuery {
    /// Required category.
    pub category: Option<Category>,
    /// Required price band.
    pub price_level: Option<PriceLevel>,
    /// Required area, compared case-insensitively.
    pub area: Option<String>,
    /// Keep only venues near transit.
    pub near_transit: bool,
}

impl CandidateQuery {
    /// A query that admits every venue.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Whether `venue` satisfies every present constraint.
    #[must_use]
    pub fn matches(&self, venue: &Venue) -> bool {
        self.category.is_none_or(|category| venue.category == category)
            && self
                .price_level
                .is_none_or(|price| venue.price_level == price)
            && self
                .area
                .as_deref()
                .is_none_or(|area| labels_match(&venue.area, area))
            && (!self.near_transit || venue.near_transit())
    }
}

/// Inputs to one ranking invocation.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use geo::Coord;
/// use haunt_core::{FilterSet, SearchContext};
///
/// let at = NaiveDate::from_ymd_opt(2024, 11, 2)
///     .and_then(|d| d.and_hms_opt(19, 30, 0))
///     .expect("valid timestamp");
/// let context = SearchContext::new(at)
///     .with_filters(FilterSet::default().requiring_open_now())
///     .with_location(Coord { x: 55.27, y: 25.20 });
/// assert!(context.location.is_some());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchContext {
    /// Structured constraints.
    #[cfg_attr(feature = "serde", serde(default))]
    pub filters: FilterSet,
    /// Where the requester is, for distance scoring.
    #[cfg_attr(feature = "serde", serde(default))]
    pub location: Option<Coord<f64>>,
    /// Who the search is for, for learned preferences.
    #[cfg_attr(feature = "serde", serde(default))]
    pub requester: Option<RequesterId>,
    /// Local wall-clock instant the search is evaluated at.
    pub evaluated_at: NaiveDateTime,
}

impl SearchContext {
    /// A context without filters, location or requester.
    #[must_use]
    pub fn new(evaluated_at: NaiveDateTime) -> Self {
        Self {
            filters: FilterSet::default(),
            location: None,
            requester: None,
            evaluated_at,
        }
    }

    /// Replace the filters.
    #[must_use]
    pub fn with_filters(mut self, filters: FilterSet) -> Self {
        self.filters = filters;
        self
    }

    /// Set the requester's location.
    #[must_use]
    pub const fn with_location(mut self, location: Coord<f64>) -> Self {
        self.location = Some(location);
        self
    }

    /// Set the requester.
    #[must_use]
    pub fn with_requester(mut self, requester: impl Into<RequesterId>) -> Self {
        self.requester = Some(requester.into());
        self
    }
}
