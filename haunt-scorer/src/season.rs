//! Seasonal weather bias derived from the evaluation instant.

use chrono::{Datelike, NaiveDateTime};

/// First month of outdoor season.
const OUTDOOR_SEASON_STARTS: u32 = 10;
/// Last month of outdoor season.
const OUTDOOR_SEASON_ENDS: u32 = 3;

/// Whether the weather favours outdoor or indoor venues.
///
/// Outdoor season runs from October to March inclusive.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use haunt_scorer::WeatherBias;
///
/// let december = NaiveDate::from_ymd_opt(2024, 12, 20)
///     .and_then(|d| d.and_hms_opt(18, 0, 0))
///     .expect("valid timestamp");
/// assert!(WeatherBias::at(december).is_outdoor_season());
/// assert!(!WeatherBias::for_month(7).is_outdoor_season());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeatherBias {
    outdoor_season: bool,
}

impl WeatherBias {
    /// Bias for the month of `at`.
    #[must_use]
    pub fn at(at: NaiveDateTime) -> Self {
        Self::for_month(at.month())
    }

    /// Bias for a calendar month numbered from 1.
    #[must_use]
    pub const fn for_month(month: u32) -> Self {
        Self {
            outdoor_season: month >= OUTDOOR_SEASON_STARTS || month <= OUTDOOR_SEASON_ENDS,
        }
    }

    /// An explicit bias, for callers with a live weather signal.
    #[must_use]
    pub const fn new(outdoor_season: bool) -> Self {
        Self { outdoor_season }
    }

    /// Whether outdoor venues are favoured.
    #[must_use]
    pub const fn is_outdoor_season(self) -> bool {
        self.outdoor_season
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, true)]
    #[case(3, true)]
    #[case(4, false)]
    #[case(9, false)]
    #[case(10, true)]
    #[case(12, true)]
    fn season_boundaries(#[case] month: u32, #[case] outdoor: bool) {
        assert_eq!(WeatherBias::for_month(month).is_outdoor_season(), outdoor);
    }
}
