//! Command-line interface for Haunt venue search.
//!
//! `haunt import` loads a JSON venue catalogue into a SQLite venue store and
//! `haunt search` ranks that store against a JSON search request, printing
//! the response as pretty JSON.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod error;
mod fs;
mod import;
mod search;

pub use error::CliError;

use import::{ImportArgs, run_import};
use search::{SearchArgs, run_search};

pub(crate) const ARG_IMPORT_VENUES: &str = "venues";
pub(crate) const ARG_IMPORT_OUTPUT: &str = "output";
pub(crate) const ENV_IMPORT_VENUES: &str = "HAUNT_CMDS_IMPORT_VENUES_PATH";
pub(crate) const ARG_SEARCH_REQUEST: &str = "request";
pub(crate) const ARG_SEARCH_VENUES_DB: &str = "venues-db";
pub(crate) const ARG_SEARCH_RESULT_LIMIT: &str = "result-limit";
pub(crate) const ENV_SEARCH_REQUEST: &str = "HAUNT_CMDS_SEARCH_REQUEST_PATH";

/// Default file name of the SQLite venue store.
pub const DEFAULT_VENUES_DB: &str = "venues.db";

/// Run the Haunt CLI with the current process arguments and environment.
///
/// # Errors
/// Returns [`CliError`] when argument parsing, configuration layering or the
/// selected command fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse()?;
    match cli.command {
        Command::Import(args) => run_import(args),
        Command::Search(args) => run_search(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "haunt",
    about = "Import venue catalogues and run explainable venue searches",
    version
)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Load a JSON venue catalogue into a SQLite venue store.
    Import(ImportArgs),
    /// Rank stored venues against a JSON search request.
    Search(SearchArgs),
}

#[cfg(test)]
mod tests;
