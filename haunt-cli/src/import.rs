//! Import command: JSON venue catalogue to SQLite venue store.

use std::io::{BufReader, Write};

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use haunt_core::{Venue, persist_venues};
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::fs::{ensure_parent_dir, open_utf8_file, require_existing_file};
use crate::{ARG_IMPORT_VENUES, CliError, DEFAULT_VENUES_DB, ENV_IMPORT_VENUES};

/// CLI arguments for the `import` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Read a JSON array of venues, validate every entry and \
                 upsert them into a SQLite venue store. Re-importing the \
                 same catalogue replaces rows by venue id.",
    about = "Load a venue catalogue into a SQLite store"
)]
#[ortho_config(prefix = "HAUNT")]
pub(crate) struct ImportArgs {
    /// Path to a JSON file containing an array of venues.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) venues_path: Option<Utf8PathBuf>,
    /// Destination SQLite database (defaults to `venues.db`).
    #[arg(long = crate::ARG_IMPORT_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
}

impl ImportArgs {
    pub(crate) fn into_config(self) -> Result<ImportConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ImportConfig::try_from(merged)
    }
}

/// Resolved `import` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ImportConfig {
    /// Source catalogue.
    pub(crate) venues_path: Utf8PathBuf,
    /// Destination database.
    pub(crate) output: Utf8PathBuf,
}

impl TryFrom<ImportArgs> for ImportConfig {
    type Error = CliError;

    fn try_from(args: ImportArgs) -> Result<Self, Self::Error> {
        let venues_path = args.venues_path.ok_or(CliError::MissingArgument {
            field: ARG_IMPORT_VENUES,
            env: ENV_IMPORT_VENUES,
        })?;
        let output = args
            .output
            .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_VENUES_DB));
        Ok(Self {
            venues_path,
            output,
        })
    }
}

pub(crate) fn run_import(args: ImportArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_import_with(args, &mut stdout)
}

pub(crate) fn run_import_with(args: ImportArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    let count = execute_import(&config)?;
    writeln!(writer, "imported {count} venues into {}", config.output)
        .map_err(CliError::WriteOutput)
}

pub(crate) fn execute_import(config: &ImportConfig) -> Result<usize, CliError> {
    require_existing_file(&config.venues_path, ARG_IMPORT_VENUES)?;
    let venues = load_venues(&config.venues_path)?;
    ensure_parent_dir(&config.output).map_err(|source| CliError::CreateOutputDirectory {
        path: config.output.clone(),
        source,
    })?;
    persist_venues(config.output.as_std_path(), &venues).map_err(|source| {
        CliError::PersistVenues {
            path: config.output.clone(),
            source,
        }
    })?;
    info!("imported {} venues into {}", venues.len(), config.output);
    Ok(venues.len())
}

/// Load a JSON array of venues from disk.
pub(crate) fn load_venues(path: &Utf8Path) -> Result<Vec<Venue>, CliError> {
    let file = open_utf8_file(path).map_err(|source| CliError::OpenInput {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| CliError::ParseVenues {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<ImportConfig, CliError> {
    let merged = ImportArgs::merge_from_layers(layers).map_err(CliError::from)?;
    ImportConfig::try_from(merged)
}
