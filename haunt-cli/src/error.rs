//! Error types emitted by the Haunt CLI.
//!
//! Many helpers return `Result<_, CliError>` and the workspace denies
//! `clippy::result_large_err`, so large sources stay boxed or behind `Arc`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use haunt_core::{PersistVenuesError, SqliteVenueStoreError, StoreError};
use haunt_scorer::{ConfigError, SearchError};
use thiserror::Error;

/// Errors emitted by the Haunt CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Name of the missing option.
        field: &'static str,
        /// Environment variable that can supply it.
        env: &'static str,
    },
    /// A referenced input path does not exist.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        /// Option naming the path.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        /// Option naming the path.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        /// Option naming the path.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },
    /// Opening an input file failed.
    #[error("failed to open {path:?}: {source}")]
    OpenInput {
        /// Offending path.
        path: Utf8PathBuf,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },
    /// The venue catalogue JSON could not be decoded.
    #[error("failed to parse venue catalogue at {path:?}: {source}")]
    ParseVenues {
        /// Offending path.
        path: Utf8PathBuf,
        /// Decoder failure.
        #[source]
        source: serde_json::Error,
    },
    /// Creating the output directory failed.
    #[error("failed to create parent directory of {path:?}: {source}")]
    CreateOutputDirectory {
        /// Output path whose parent could not be created.
        path: Utf8PathBuf,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },
    /// Persisting venues to SQLite failed.
    #[error("failed to persist venues to {path:?}: {source}")]
    PersistVenues {
        /// Database path.
        path: Utf8PathBuf,
        /// Store failure.
        #[source]
        source: PersistVenuesError,
    },
    /// The search request JSON could not be decoded.
    #[error("failed to parse search request at {path:?}: {source}")]
    ParseSearchRequest {
        /// Offending path.
        path: Utf8PathBuf,
        /// Decoder failure.
        #[source]
        source: serde_json::Error,
    },
    /// The search request is well-formed JSON but cannot be run.
    #[error("search request in {path:?} is invalid: {reason}")]
    InvalidSearchRequest {
        /// Offending path.
        path: Utf8PathBuf,
        /// What is wrong with it.
        reason: &'static str,
    },
    /// Opening the SQLite venue store failed.
    #[error(transparent)]
    OpenVenueStore(#[from] SqliteVenueStoreError),
    /// Reading venues for the similarity index failed.
    #[error("failed to load venues for similarity search: {0}")]
    LoadVenues(#[source] StoreError),
    /// The engine configuration derived from CLI options is unusable.
    #[error("invalid engine configuration: {0}")]
    InvalidEngineConfig(#[from] ConfigError),
    /// The search itself failed.
    #[error("search failed: {0}")]
    Search(#[from] SearchError),
    /// Serialising the search response failed.
    #[error("failed to serialise search response: {0}")]
    SerialiseSearchResponse(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
