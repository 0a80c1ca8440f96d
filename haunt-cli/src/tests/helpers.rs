//! Fixtures shared by the import and search command tests.

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{NaiveDate, NaiveDateTime};
use geo::Coord;
use haunt_core::{Category, TransitAccess, Venue, WeeklySchedule, persist_venues};
use tempfile::TempDir;

use crate::search::Clock;

/// Requester position used by every catalogue venue distance.
pub(super) const ORIGIN: Coord<f64> = Coord {
    x: 55.2708,
    y: 25.2048,
};

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    std::fs::write(path.as_std_path(), contents).expect("write test file");
}

pub(super) fn workspace() -> (TempDir, Utf8PathBuf) {
    let tmp = TempDir::new().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
    (tmp, root)
}

pub(super) fn timestamp(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, 0, 0))
        .expect("valid timestamp")
}

/// Clock pinned to one instant.
pub(super) struct FixedClock(pub(super) NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Three venues: a rooftop bar with a tea-like embedding, a metro cafe and a
/// quiet restaurant.
pub(super) fn catalogue() -> Vec<Venue> {
    vec![
        Venue::new("rooftop", "Rooftop Bar", ORIGIN, Category::Bar)
            .with_area("Downtown")
            .with_rating(4.7)
            .with_tags(["outdoor", "rooftop"])
            .with_opening_hours(WeeklySchedule::always_open())
            .with_embedding(vec![1.0, 0.0]),
        Venue::new(
            "metro-cafe",
            "Metro Cafe",
            Coord {
                x: 55.2708,
                y: 25.2548,
            },
            Category::Cafe,
        )
        .with_area("Deira")
        .with_rating(3.9)
        .with_transit(TransitAccess::station("Union"))
        .with_embedding(vec![0.0, 1.0]),
        Venue::new("quiet", "Quiet Table", ORIGIN, Category::Restaurant)
            .with_area("Downtown")
            .with_rating(4.1)
            .with_tags(["indoor"])
            .with_embedding(vec![0.6, 0.8]),
    ]
}

/// Persist [`catalogue`] into `venues.db` under `root`.
pub(super) fn seed_store(root: &Utf8Path) -> Utf8PathBuf {
    let db = root.join("venues.db");
    persist_venues(db.as_std_path(), &catalogue()).expect("seed venue store");
    db
}
