//! SQLite-backed venue store.
//!
//! Venues live in a single `venues` table. The exact-match pre-filter
//! columns are stored alongside a JSON payload holding the full snapshot, so
//! the [`CandidateQuery`] can be answered in SQL.

use std::{
    fmt,
    path::{Path, PathBuf},
    sync::Mutex,
};

use log::warn;
use rusqlite::{Connection, OpenFlags, Transaction, params, params_from_iter};
use thiserror::Error;

use crate::venue::fold_label;
use crate::{CandidateQuery, Venue, VenueError, VenueId};

use super::{StoreError, VenueStore};

const CREATE_SCHEMA_SQL: &str = "CREATE TABLE IF NOT EXISTS venues (
        id TEXT PRIMARY KEY,
        category TEXT NOT NULL,
        price_level TEXT NOT NULL,
        area TEXT NOT NULL,
        near_transit INTEGER NOT NULL,
        payload TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS venues_by_category ON venues (category, price_level);";

const INSERT_SQL: &str = "INSERT OR REPLACE INTO venues
        (id, category, price_level, area, near_transit, payload)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)";

const SELECT_SQL: &str = "SELECT id, payload FROM venues";

/// Error raised when opening or querying the venue database.
#[derive(Debug, Error)]
pub enum SqliteVenueStoreError {
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite database at {path}: {source}")]
    OpenDatabase {
        /// Location of the SQLite database on disk.
        path: PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// The database has no usable `venues` table.
    #[error("SQLite database at {path} has no venues table: {source}")]
    MissingSchema {
        /// Location of the SQLite database on disk.
        path: PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// Preparing or executing a query failed.
    #[error("failed to {operation}: {source}")]
    Query {
        /// Description of the failed operation.
        operation: &'static str,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
}

/// Read-only venue store backed by SQLite.
pub struct SqliteVenueStore {
    path: PathBuf,
    connection: Mutex<Connection>,
}

impl fmt::Debug for SqliteVenueStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteVenueStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl SqliteVenueStore {
    /// Open an existing venue database read-only.
    ///
    /// # Errors
    /// Returns [`SqliteVenueStoreError`] when the file cannot be opened or
    /// lacks the `venues` table.
    pub fn open<P>(database_path: P) -> Result<Self, SqliteVenueStoreError>
    where
        P: AsRef<Path>,
    {
        let path = database_path.as_ref().to_path_buf();
        let connection = Connection::open_with_flags(&path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|source| SqliteVenueStoreError::OpenDatabase {
                path: path.clone(),
                source,
            })?;
        connection
            .prepare(SELECT_SQL)
            .map(|_| ())
            .map_err(|source| SqliteVenueStoreError::MissingSchema {
                path: path.clone(),
                source,
            })?;
        Ok(Self {
            path,
            connection: Mutex::new(connection),
        })
    }

    fn load(&self, query: &CandidateQuery) -> Result<Vec<Venue>, StoreError> {
        let connection = self.connection.lock().map_err(|_| StoreError::Unavailable {
            reason: format!("connection to {} is poisoned", self.path.display()),
        })?;
        let (sql, values) = select_statement(query);
        let mut statement = connection
            .prepare_cached(&sql)
            .map_err(|source| backend("prepare venue selection", source))?;
        let rows = statement
            .query_map(params_from_iter(values.iter()), |row| {
                let id: String = row.get(0)?;
                let payload: String = row.get(1)?;
                Ok((id, payload))
            })
            .map_err(|source| backend("query venues", source))?;

        let mut venues = Vec::new();
        for row in rows {
            let (id, payload) = row.map_err(|source| backend("read venue row", source))?;
            match decode_venue(&payload) {
                Ok(venue) => venues.push(venue),
                Err(reason) => warn!("skipping stored venue {id}: {reason}"),
            }
        }
        Ok(venues)
    }
}

impl VenueStore for SqliteVenueStore {
    fn candidates(&self, query: &CandidateQuery) -> Result<Vec<Venue>, StoreError> {
        self.load(query)
    }
}

fn backend(operation: &'static str, source: rusqlite::Error) -> StoreError {
    StoreError::Backend(Box::new(SqliteVenueStoreError::Query { operation, source }))
}

fn select_statement(query: &CandidateQuery) -> (String, Vec<String>) {
    let mut clauses = Vec::new();
    let mut values = Vec::new();
    if let Some(category) = query.category {
        clauses.push("category = ?");
        values.push(category.as_str().to_owned());
    }
    if let Some(price_level) = query.price_level {
        clauses.push("price_level = ?");
        values.push(price_level.label().to_owned());
    }
    if let Some(area) = query.area.as_deref() {
        clauses.push("area = ?");
        values.push(fold_label(area));
    }
    if query.near_transit {
        clauses.push("near_transit = 1");
    }
    let mut sql = SELECT_SQL.to_owned();
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY rowid");
    (sql, values)
}

fn decode_venue(payload: &str) -> Result<Venue, String> {
    let venue: Venue = serde_json::from_str(payload).map_err(|err| err.to_string())?;
    venue.validate().map_err(|err| err.to_string())?;
    Ok(venue)
}

/// Errors raised when persisting venues to SQLite.
#[derive(Debug, Error)]
pub enum PersistVenuesError {
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite database at {path:?}")]
    Open {
        /// Destination database path.
        path: PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// Beginning or committing the transaction failed.
    #[error("failed to {operation} venue persistence transaction")]
    Transaction {
        /// `"begin"` or `"commit"`.
        operation: &'static str,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// Creating the `venues` table failed.
    #[error("failed to create venues table")]
    CreateSchema {
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// A venue broke a snapshot invariant.
    #[error(transparent)]
    InvalidVenue(#[from] VenueError),
    /// Serializing a venue to JSON failed.
    #[error("failed to serialize venue {id}")]
    Serialize {
        /// Identifier of the venue.
        id: VenueId,
        /// Source error produced by `serde_json`.
        #[source]
        source: serde_json::Error,
    },
    /// Writing a venue row failed.
    #[error("failed to persist venue {id}")]
    PersistRow {
        /// Identifier of the venue.
        id: VenueId,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
}

/// Persist venues to a SQLite database on disk.
///
/// The function is idempotent: rows are replaced when identifiers already
/// exist, and the `venues` table is created if missing. Every venue is
/// validated first; nothing is written when any venue is invalid.
///
/// # Errors
/// Returns [`PersistVenuesError`] for invalid venues and SQLite failures.
pub fn persist_venues(path: &Path, venues: &[Venue]) -> Result<(), PersistVenuesError> {
    for venue in venues {
        venue.validate()?;
    }
    let mut connection = Connection::open(path).map_err(|source| PersistVenuesError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let transaction =
        connection
            .transaction()
            .map_err(|source| PersistVenuesError::Transaction {
                operation: "begin",
                source,
            })?;
    transaction
        .execute_batch(CREATE_SCHEMA_SQL)
        .map_err(|source| PersistVenuesError::CreateSchema { source })?;
    persist_rows(&transaction, venues)?;
    transaction
        .commit()
        .map_err(|source| PersistVenuesError::Transaction {
            operation: "commit",
            source,
        })
}

fn persist_rows(transaction: &Transaction<'_>, venues: &[Venue]) -> Result<(), PersistVenuesError> {
    let mut statement =
        transaction
            .prepare_cached(INSERT_SQL)
            .map_err(|source| PersistVenuesError::PersistRow {
                id: VenueId::new("<statement>"),
                source,
            })?;
    for venue in venues {
        let payload =
            serde_json::to_string(venue).map_err(|source| PersistVenuesError::Serialize {
                id: venue.id.clone(),
                source,
            })?;
        statement
            .execute(params![
                venue.id.as_str(),
                venue.category.as_str(),
                venue.price_level.label(),
                fold_label(&venue.area),
                venue.near_transit(),
                payload,
            ])
            .map_err(|source| PersistVenuesError::PersistRow {
                id: venue.id.clone(),
                source,
            })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Category, FilterSet, PriceLevel, TransitAccess, WeeklySchedule};
    use geo::Coord;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn venues() -> Vec<Venue> {
        vec![
            Venue::new("cafe-1", "Brew", Coord { x: 55.27, y: 25.2 }, Category::Cafe)
                .with_area("Downtown")
                .with_rating(4.4)
                .with_opening_hours(WeeklySchedule::always_open()),
            Venue::new("bar-1", "Tap", Coord { x: 55.14, y: 25.08 }, Category::Bar)
                .with_area("Marina")
                .with_price_level(PriceLevel::High)
                .with_transit(TransitAccess::station("DMCC"))
                .with_embedding(vec![0.1, 0.2]),
        ]
    }

    fn persisted(venues: &[Venue]) -> (TempDir, SqliteVenueStore) {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("venues.db");
        persist_venues(&path, venues).expect("persist venues");
        let store = SqliteVenueStore::open(&path).expect("open store");
        (dir, store)
    }

    #[rstest]
    fn round_trips_full_snapshots(venues: Vec<Venue>) {
        let (_dir, store) = persisted(&venues);
        let loaded = store.candidates(&CandidateQuery::all()).expect("load");
        assert_eq!(loaded, venues);
    }

    #[rstest]
    fn applies_exact_match_prefilter(venues: Vec<Venue>) {
        let (_dir, store) = persisted(&venues);
        let query = FilterSet::default()
            .with_area("marina")
            .requiring_transit()
            .candidate_query();
        let loaded = store.candidates(&query).expect("load");
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id.as_str(), "bar-1");
    }

    #[rstest]
    fn area_prefilter_folds_non_ascii_case() {
        let venues = vec![
            Venue::new("souk-1", "Spice", Coord { x: 55.3, y: 25.26 }, Category::Cafe)
                .with_area("Bur Dubaï"),
        ];
        let (_dir, store) = persisted(&venues);
        let query = FilterSet::default().with_area("BUR DUBAÏ").candidate_query();
        let loaded = store.candidates(&query).expect("load");
        assert_eq!(loaded, venues);
    }

    #[rstest]
    fn persisting_twice_replaces_rows(venues: Vec<Venue>) {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("venues.db");
        persist_venues(&path, &venues).expect("first persist");
        persist_venues(&path, &venues).expect("second persist");
        let store = SqliteVenueStore::open(&path).expect("open store");
        assert_eq!(store.candidates(&CandidateQuery::all()).expect("load").len(), 2);
    }

    #[rstest]
    fn invalid_venues_are_rejected_before_writing(mut venues: Vec<Venue>) {
        venues[0].rating = 9.0;
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("venues.db");
        let err = persist_venues(&path, &venues).expect_err("invalid rating");
        assert!(matches!(err, PersistVenuesError::InvalidVenue(_)));
        assert!(!path.exists());
    }

    #[rstest]
    fn opening_without_schema_fails() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("empty.db");
        Connection::open(&path).expect("create empty database");
        let err = SqliteVenueStore::open(&path).expect_err("missing table");
        assert!(matches!(err, SqliteVenueStoreError::MissingSchema { .. }));
    }

    #[rstest]
    fn undecodable_rows_are_skipped(venues: Vec<Venue>) {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("venues.db");
        persist_venues(&path, &venues).expect("persist venues");
        Connection::open(&path)
            .expect("open for corruption")
            .execute(
                "UPDATE venues SET payload = '{not json' WHERE id = 'cafe-1'",
                [],
            )
            .expect("corrupt row");
        let store = SqliteVenueStore::open(&path).expect("open store");
        let loaded = store.candidates(&CandidateQuery::all()).expect("load");
        assert_eq!(loaded.len(), 1);
    }
}
