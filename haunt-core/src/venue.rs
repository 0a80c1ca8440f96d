//! Venues: read-only snapshots of places a visitor might go.

use std::fmt;

use geo::Coord;
use thiserror::Error;

use crate::{Category, NoiseLevel, PriceLevel, WeeklySchedule};

/// Highest star rating a venue can carry.
pub const MAX_RATING: f64 = 5.0;

/// Opaque, stable venue identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct VenueId(String);

impl VenueId {
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

impl fmt::Display for VenueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VenueId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for VenueId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Public-transport access near a venue.
///
/// A venue that is not near transit carries no `TransitAccess` at all, so a
/// station or walk time can never be attached to it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransitAccess {
    /// Name of the nearest station.
    #[cfg_attr(feature = "serde", serde(default))]
    pub station: Option<String>,
    /// Walking time to the station in minutes.
    #[cfg_attr(feature = "serde", serde(default))]
    pub walk_minutes: Option<u16>,
}

impl TransitAccess {
    /// Transit access via a named station.
    pub fn station(name: impl Into<String>) -> Self {
        Self {
            station: Some(name.into()),
            walk_minutes: None,
        }
    }

    /// Attach a walk time, returning `self` for chaining.
    #[must_use]
    pub const fn with_walk_minutes(mut self, minutes: u16) -> Self {
        self.walk_minutes = Some(minutes);
        self
    }
}

/// A place that can be recommended.
///
/// Coordinates are WGS84 with `x = longitude` and `y = latitude`.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use haunt_core::{Category, PriceLevel, Venue};
///
/// let venue = Venue::new("v-1", "Arabica", Coord { x: 55.27, y: 25.19 }, Category::Cafe)
///     .with_rating(4.6)
///     .with_price_level(PriceLevel::Mid)
///     .with_tags(["outdoor", "waterfront"]);
///
/// assert!(venue.has_tag("Outdoor"));
/// assert!(!venue.near_transit());
/// assert!(venue.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Venue {
    /// Stable identity.
    pub id: VenueId,
    /// Display name.
    pub name: String,
    /// Geospatial position.
    pub location: Coord<f64>,
    /// Neighbourhood label; free text and non-unique.
    #[cfg_attr(feature = "serde", serde(default))]
    pub area: String,
    /// Kind of venue.
    pub category: Category,
    /// Cuisine labels.
    #[cfg_attr(feature = "serde", serde(default))]
    pub cuisine: Vec<String>,
    /// Descriptive labels such as `family-friendly` or `outdoor`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub tags: Vec<String>,
    /// Price band.
    pub price_level: PriceLevel,
    /// Ambient noise.
    pub noise_level: NoiseLevel,
    /// Star rating in `0.0..=5.0`.
    pub rating: f64,
    /// Nearby public transport, if any.
    #[cfg_attr(feature = "serde", serde(default))]
    pub transit: Option<TransitAccess>,
    /// Weekly opening hours; `None` means the hours are unknown.
    #[cfg_attr(feature = "serde", serde(default))]
    pub opening_hours: Option<WeeklySchedule>,
    /// Embedding used for semantic similarity; `None` excludes the venue
    /// from semantic search.
    #[cfg_attr(feature = "serde", serde(default))]
    pub embedding: Option<Vec<f32>>,
}

/// Errors returned by [`Venue::validate`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VenueError {
    /// The identifier was empty or whitespace.
    #[error("venue identifier must not be empty")]
    EmptyId,
    /// The rating was outside `0.0..=5.0` or not finite.
    #[error("venue {id} has rating {rating}; expected 0.0 to 5.0")]
    InvalidRating {
        /// Offending venue.
        id: VenueId,
        /// Rating found.
        rating: f64,
    },
    /// A coordinate was not finite or outside WGS84 bounds.
    #[error("venue {id} has an invalid location")]
    InvalidLocation {
        /// Offending venue.
        id: VenueId,
    },
    /// The embedding was present but empty.
    #[error("venue {id} has an empty embedding")]
    EmptyEmbedding {
        /// Offending venue.
        id: VenueId,
    },
}

impl Venue {
    /// Construct a venue with neutral defaults: no tags, `Mid` price,
    /// `Moderate` noise, zero rating, no transit, unknown hours and no
    /// embedding.
    pub fn new(
        id: impl Into<VenueId>,
        name: impl Into<String>,
        location: Coord<f64>,
        category: Category,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            location,
            area: String::new(),
            category,
            cuisine: Vec::new(),
            tags: Vec::new(),
            price_level: PriceLevel::Mid,
            noise_level: NoiseLevel::Moderate,
            rating: 0.0,
            transit: None,
            opening_hours: None,
            embedding: None,
        }
    }

    /// Set the area label.
    #[must_use]
    pub fn with_area(mut self, area: impl Into<String>) -> Self {
        self.area = area.into();
        self
    }

    /// Set the tag labels.
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Set the cuisine labels.
    #[must_use]
    pub fn with_cuisine<I, S>(mut self, cuisine: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cuisine = cuisine.into_iter().map(Into::into).collect();
        self
    }

    /// Set the price band.
    #[must_use]
    pub const fn with_price_level(mut self, price_level: PriceLevel) -> Self {
        self.price_level = price_level;
        self
    }

    /// Set the noise level.
    #[must_use]
    pub const fn with_noise_level(mut self, noise_level: NoiseLevel) -> Self {
        self.noise_level = noise_level;
        self
    }

    /// Set the rating, clamped into `0.0..=5.0`.
    #[must_use]
    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = rating.clamp(0.0, MAX_RATING);
        self
    }

    /// Mark the venue as near transit.
    #[must_use]
    pub fn with_transit(mut self, transit: TransitAccess) -> Self {
        self.transit = Some(transit);
        self
    }

    /// Attach published opening hours.
    #[must_use]
    pub fn with_opening_hours(mut self, schedule: WeeklySchedule) -> Self {
        self.opening_hours = Some(schedule);
        self
    }

    /// Attach an embedding vector.
    #[must_use]
    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    /// Whether the venue is close to public transport.
    #[must_use]
    pub const fn near_transit(&self) -> bool {
        self.transit.is_some()
    }

    /// Name of the nearest station, if near transit and known.
    #[must_use]
    pub fn station(&self) -> Option<&str> {
        self.transit.as_ref()?.station.as_deref()
    }

    /// Case-insensitive tag membership.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        contains_label(&self.tags, tag)
    }

    /// Case-insensitive cuisine membership.
    #[must_use]
    pub fn serves(&self, cuisine: &str) -> bool {
        contains_label(&self.cuisine, cuisine)
    }

    /// Check the snapshot invariants.
    ///
    /// # Errors
    /// Returns [`VenueError`] describing the first violated invariant.
    pub fn validate(&self) -> Result<(), VenueError> {
        if self.id.as_str().trim().is_empty() {
            return Err(VenueError::EmptyId);
        }
        if !self.rating.is_finite() || !(0.0..=MAX_RATING).contains(&self.rating) {
            return Err(VenueError::InvalidRating {
                id: self.id.clone(),
                rating: self.rating,
            });
        }
        let Coord { x, y } = self.location;
        if !(-180.0..=180.0).contains(&x) || !(-90.0..=90.0).contains(&y) {
            return Err(VenueError::InvalidLocation {
                id: self.id.clone(),
            });
        }
        if self.embedding.as_ref().is_some_and(Vec::is_empty) {
            return Err(VenueError::EmptyEmbedding {
                id: self.id.clone(),
            });
        }
        Ok(())
    }
}

/// Compare two free-text labels ignoring surrounding whitespace and case.
///
/// Case is folded with Unicode lowercase mapping, the same rule
/// [`PreferenceProfile`](crate::PreferenceProfile) applies to its tag keys.
///
/// # Examples
/// ```
/// use haunt_core::labels_match;
///
/// assert!(labels_match(" Café ", "CAFÉ"));
/// assert!(!labels_match("cafe", "café"));
/// ```
#[must_use]
pub fn labels_match(left: &str, right: &str) -> bool {
    left.trim()
        .chars()
        .flat_map(char::to_lowercase)
        .eq(right.trim().chars().flat_map(char::to_lowercase))
}

/// Canonical form of a label under [`labels_match`].
pub(crate) fn fold_label(text: &str) -> String {
    text.trim().chars().flat_map(char::to_lowercase).collect()
}

/// Case-insensitive membership test shared by tag and cuisine lookups.
pub(crate) fn contains_label(labels: &[String], wanted: &str) -> bool {
    labels.iter().any(|label| labels_match(label, wanted))
}
