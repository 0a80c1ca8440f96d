//! Categorical venue attributes.
//!
//! The enums offer compile-time safety for filter predicates. Each parses
//! case-insensitively from its lowercase name.
//!
//! # Examples
//! ```
//! use haunt_core::{Category, PriceLevel};
//!
//! assert_eq!(Category::Cafe.as_str(), "cafe");
//! assert_eq!("MID".parse::<PriceLevel>(), Ok(PriceLevel::Mid));
//! assert!(PriceLevel::Low < PriceLevel::Lux);
//! ```

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Error returned when an attribute label is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownAttribute {
    /// Attribute family, e.g. `"category"`.
    pub kind: &'static str,
    /// Label that failed to parse.
    pub value: String,
}

impl UnknownAttribute {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}

/// Broad kind of venue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Category {
    /// Coffee shops and tea rooms.
    Cafe,
    /// Sit-down dining.
    Restaurant,
    /// Bars, pubs and lounges.
    Bar,
    /// Sights, museums and landmarks.
    Attraction,
    /// Malls, markets and boutiques.
    Shopping,
    /// Cinemas, arcades and live venues.
    Entertainment,
}

impl Category {
    /// Every category in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Cafe,
        Self::Restaurant,
        Self::Bar,
        Self::Attraction,
        Self::Shopping,
        Self::Entertainment,
    ];

    /// Return the category as a lowercase `&str`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cafe => "cafe",
            Self::Restaurant => "restaurant",
            Self::Bar => "bar",
            Self::Attraction => "attraction",
            Self::Shopping => "shopping",
            Self::Entertainment => "entertainment",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = UnknownAttribute;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownAttribute::new("category", s))
    }
}

/// Ordered price band: `Low < Mid < High < Lux`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum PriceLevel {
    /// Budget.
    Low,
    /// Mid-range.
    Mid,
    /// Upscale.
    High,
    /// Luxury.
    Lux,
}

impl PriceLevel {
    /// Every price level, cheapest first.
    pub const ALL: [Self; 4] = [Self::Low, Self::Mid, Self::High, Self::Lux];

    /// Return the capitalised label used in explanations, e.g. `"Mid"`.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Mid => "Mid",
            Self::High => "High",
            Self::Lux => "Lux",
        }
    }
}

impl fmt::Display for PriceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PriceLevel {
    type Err = UnknownAttribute;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownAttribute::new("price level", s))
    }
}

/// Ambient noise at a venue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum NoiseLevel {
    /// Suitable for conversation or work.
    Quiet,
    /// Typical background chatter.
    Moderate,
    /// Loud music or crowds.
    Lively,
}

impl NoiseLevel {
    const ALL: [Self; 3] = [Self::Quiet, Self::Moderate, Self::Lively];

    /// Return the noise level as a lowercase `&str`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Quiet => "quiet",
            Self::Moderate => "moderate",
            Self::Lively => "lively",
        }
    }
}

impl fmt::Display for NoiseLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoiseLevel {
    type Err = UnknownAttribute;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownAttribute::new("noise level", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("cafe", Category::Cafe)]
    #[case("Restaurant", Category::Restaurant)]
    #[case(" BAR ", Category::Bar)]
    fn category_parses_case_insensitively(#[case] input: &str, #[case] expected: Category) {
        assert_eq!(input.parse::<Category>(), Ok(expected));
    }

    #[test]
    fn parsing_rejects_unknown() {
        let err = "spa".parse::<Category>().unwrap_err();
        assert_eq!(err.to_string(), "unknown category 'spa'");
    }

    #[test]
    fn price_levels_are_ordered() {
        assert!(PriceLevel::Low < PriceLevel::Mid);
        assert!(PriceLevel::Mid < PriceLevel::High);
        assert!(PriceLevel::High < PriceLevel::Lux);
    }

    #[test]
    fn display_matches_labels() {
        assert_eq!(PriceLevel::Lux.to_string(), "Lux");
        assert_eq!(NoiseLevel::Quiet.to_string(), "quiet");
        assert_eq!(Category::Attraction.to_string(), "attraction");
    }
}
