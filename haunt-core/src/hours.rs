//! Weekly opening hours and the open/closed/unknown evaluator.
//!
//! Schedules are held as a fixed seven-slot array indexed by [`DayOfWeek`]
//! (Sunday first). Each slot is parsed once from its textual form:
//! `"Closed"`, `"24/7"`, or one or more comma-separated `HH:MM-HH:MM`
//! ranges. Ranges are same-day only; `22:00-02:00` never matches and must be
//! published as two ranges on consecutive days.
//!
//! # Examples
//! ```
//! use chrono::NaiveDate;
//! use haunt_core::{DayOfWeek, OpenState, WeeklySchedule, is_open_at};
//!
//! let schedule = WeeklySchedule::closed().with_day(DayOfWeek::Monday, "09:00-17:00");
//! // 2024-01-01 was a Monday.
//! let at = NaiveDate::from_ymd_opt(2024, 1, 1)
//!     .and_then(|d| d.and_hms_opt(17, 0, 0))
//!     .expect("valid timestamp");
//! assert_eq!(is_open_at(Some(&schedule), at), OpenState::Open);
//! assert_eq!(is_open_at(None, at), OpenState::Unknown);
//! ```

use std::fmt;

use chrono::{Datelike, NaiveDateTime, Timelike};
use log::warn;

const CLOSED_LABEL: &str = "Closed";
const ALWAYS_OPEN_LABEL: &str = "24/7";
const SECONDS_PER_MINUTE: u32 = 60;
const MINUTES_PER_HOUR: u32 = 60;
const LAST_MINUTE_OF_DAY: u32 = 24 * MINUTES_PER_HOUR;

/// Day of the week, numbered from Sunday (`0`) to Saturday (`6`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum DayOfWeek {
    /// Day 0.
    Sunday,
    /// Day 1.
    Monday,
    /// Day 2.
    Tuesday,
    /// Day 3.
    Wednesday,
    /// Day 4.
    Thursday,
    /// Day 5.
    Friday,
    /// Day 6.
    Saturday,
}

impl DayOfWeek {
    /// Every day, Sunday first.
    pub const ALL: [Self; 7] = [
        Self::Sunday,
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
    ];

    /// Position of the day in a Sunday-first week.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Sunday => 0,
            Self::Monday => 1,
            Self::Tuesday => 2,
            Self::Wednesday => 3,
            Self::Thursday => 4,
            Self::Friday => 5,
            Self::Saturday => 6,
        }
    }

    /// Weekday on which `at` falls.
    #[must_use]
    pub fn of(at: NaiveDateTime) -> Self {
        match at.weekday() {
            chrono::Weekday::Sun => Self::Sunday,
            chrono::Weekday::Mon => Self::Monday,
            chrono::Weekday::Tue => Self::Tuesday,
            chrono::Weekday::Wed => Self::Wednesday,
            chrono::Weekday::Thu => Self::Thursday,
            chrono::Weekday::Fri => Self::Friday,
            chrono::Weekday::Sat => Self::Saturday,
        }
    }
}

/// Whether a venue is open at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum OpenState {
    /// Published hours cover the instant.
    Open,
    /// Published hours exclude the instant.
    Closed,
    /// The venue has no published hours.
    Unknown,
}

/// Inclusive same-day opening window, stored as minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    start: u32,
    end: u32,
}

impl TimeRange {
    /// Parse a `HH:MM-HH:MM` range. Returns `None` when either bound is
    /// missing or malformed.
    ///
    /// # Examples
    /// ```
    /// use haunt_core::TimeRange;
    ///
    /// assert!(TimeRange::parse("09:00-17:30").is_some());
    /// assert!(TimeRange::parse("09:00-").is_none());
    /// ```
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let (start, end) = text.split_once('-')?;
        Some(Self {
            start: parse_clock(start)?,
            end: parse_clock(end)?,
        })
    }

    /// Whether `seconds` since midnight falls within the window, bounds
    /// included.
    #[must_use]
    pub const fn contains(self, seconds: u32) -> bool {
        self.start * SECONDS_PER_MINUTE <= seconds && seconds <= self.end * SECONDS_PER_MINUTE
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}-{:02}:{:02}",
            self.start / MINUTES_PER_HOUR,
            self.start % MINUTES_PER_HOUR,
            self.end / MINUTES_PER_HOUR,
            self.end % MINUTES_PER_HOUR,
        )
    }
}

fn parse_clock(text: &str) -> Option<u32> {
    let (hour_text, minute_text) = text.trim().split_once(':')?;
    let hours: u32 = hour_text.trim().parse().ok()?;
    let minutes: u32 = minute_text.trim().parse().ok()?;
    if minutes >= MINUTES_PER_HOUR {
        return None;
    }
    let total = hours.checked_mul(MINUTES_PER_HOUR)?.checked_add(minutes)?;
    (total <= LAST_MINUTE_OF_DAY).then_some(total)
}

/// Published hours for a single day.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DayHours {
    /// Closed all day.
    #[default]
    Closed,
    /// Open around the clock.
    AlwaysOpen,
    /// Open during any of the listed windows.
    Ranges(Vec<TimeRange>),
}

impl DayHours {
    /// Parse a day entry. Malformed ranges are skipped rather than rejected.
    ///
    /// # Examples
    /// ```
    /// use haunt_core::{DayHours, TimeRange};
    ///
    /// assert_eq!(DayHours::parse("closed"), DayHours::Closed);
    /// assert_eq!(DayHours::parse("24/7"), DayHours::AlwaysOpen);
    /// let split = DayHours::parse("09:00-12:00, 14:00-");
    /// assert_eq!(split, DayHours::Ranges(vec![TimeRange::parse("09:00-12:00").unwrap()]));
    /// ```
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.eq_ignore_ascii_case(CLOSED_LABEL) {
            return Self::Closed;
        }
        if trimmed == ALWAYS_OPEN_LABEL {
            return Self::AlwaysOpen;
        }
        let ranges = trimmed
            .split(',')
            .filter_map(|part| {
                let range = TimeRange::parse(part);
                if range.is_none() {
                    warn!("skipping malformed opening-hours range {part:?}");
                }
                range
            })
            .collect();
        Self::Ranges(ranges)
    }

    /// Whether the day's hours include `seconds` since midnight.
    #[must_use]
    pub fn is_open(&self, seconds: u32) -> bool {
        match self {
            Self::Closed => false,
            Self::AlwaysOpen => true,
            Self::Ranges(ranges) => ranges.iter().any(|range| range.contains(seconds)),
        }
    }
}

impl fmt::Display for DayHours {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => f.write_str(CLOSED_LABEL),
            Self::AlwaysOpen => f.write_str(ALWAYS_OPEN_LABEL),
            Self::Ranges(ranges) => {
                let mut first = true;
                for range in ranges {
                    if !first {
                        f.write_str(", ")?;
                    }
                    first = false;
                    write!(f, "{range}")?;
                }
                Ok(())
            }
        }
    }
}

/// A full week of published hours.
///
/// Days without an entry are closed.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(
        from = "std::collections::BTreeMap<DayOfWeek, String>",
        into = "std::collections::BTreeMap<DayOfWeek, String>"
    )
)]
pub struct WeeklySchedule {
    days: [DayHours; 7],
}

impl WeeklySchedule {
    /// A schedule closed every day.
    #[must_use]
    pub fn closed() -> Self {
        Self {
            days: std::array::from_fn(|_| DayHours::Closed),
        }
    }

    /// A schedule open around the clock every day.
    #[must_use]
    pub fn always_open() -> Self {
        Self {
            days: std::array::from_fn(|_| DayHours::AlwaysOpen),
        }
    }

    /// Build a schedule from textual day entries.
    pub fn from_entries<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (DayOfWeek, &'a str)>,
    {
        entries
            .into_iter()
            .fold(Self::closed(), |schedule, (day, text)| {
                schedule.with_day(day, text)
            })
    }

    /// Replace one day's hours, returning `self` for chaining.
    #[must_use]
    pub fn with_day(mut self, day: DayOfWeek, text: &str) -> Self {
        self.set_day(day, DayHours::parse(text));
        self
    }

    /// Replace one day's hours.
    #[expect(
        clippy::indexing_slicing,
        reason = "DayOfWeek::index is always below seven"
    )]
    pub fn set_day(&mut self, day: DayOfWeek, hours: DayHours) {
        self.days[day.index()] = hours;
    }

    /// Hours published for `day`.
    #[must_use]
    #[expect(
        clippy::indexing_slicing,
        reason = "DayOfWeek::index is always below seven"
    )]
    pub const fn day(&self, day: DayOfWeek) -> &DayHours {
        &self.days[day.index()]
    }

    /// Evaluate the schedule at a local wall-clock instant.
    #[must_use]
    pub fn state_at(&self, at: NaiveDateTime) -> OpenState {
        let seconds = at.time().num_seconds_from_midnight();
        if self.day(DayOfWeek::of(at)).is_open(seconds) {
            OpenState::Open
        } else {
            OpenState::Closed
        }
    }
}

impl Default for WeeklySchedule {
    fn default() -> Self {
        Self::closed()
    }
}

impl From<std::collections::BTreeMap<DayOfWeek, String>> for WeeklySchedule {
    fn from(entries: std::collections::BTreeMap<DayOfWeek, String>) -> Self {
        Self::from_entries(entries.iter().map(|(day, text)| (*day, text.as_str())))
    }
}

impl From<WeeklySchedule> for std::collections::BTreeMap<DayOfWeek, String> {
    fn from(schedule: WeeklySchedule) -> Self {
        DayOfWeek::ALL
            .into_iter()
            .map(|day| (day, schedule.day(day).to_string()))
            .collect()
    }
}

/// Decide whether a venue is open at `at`.
///
/// An absent schedule yields [`OpenState::Unknown`], never `Closed`.
#[must_use]
pub fn is_open_at(schedule: Option<&WeeklySchedule>, at: NaiveDateTime) -> OpenState {
    schedule.map_or(OpenState::Unknown, |hours| hours.state_at(at))
}
