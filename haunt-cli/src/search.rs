//! Search command implementation for the Haunt CLI.
//!
//! A request file names the search mode and its inputs. The CLI stands in
//! for the external collaborators: the request's `query_embedding` is the
//! embedding of `query`, and its `filters` are the parse of `query` with full
//! confidence.

use std::io::{BufReader, Write};

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{Local, NaiveDateTime};
use clap::Parser;
use geo::Coord;
use haunt_core::{
    CandidateQuery, ConversationTurn, Embedder, EmbeddingError, FilterSet, MemoryPreferences,
    MemoryVectorIndex, ParseError, ParsedQuery, PreferenceProfile, QueryParser, RequesterId,
    SearchContext, SqliteVenueStore, VenueStore,
};
use haunt_scorer::{EngineConfig, HybridResponse, SearchEngine, SearchResponse};
use log::debug;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::fs::{open_utf8_file, require_existing_file};
use crate::{
    ARG_SEARCH_REQUEST, ARG_SEARCH_VENUES_DB, CliError, DEFAULT_VENUES_DB, ENV_SEARCH_REQUEST,
};

/// CLI arguments for the `search` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Rank the venues of a SQLite venue store against a \
                 JSON-encoded search request. Attribute searches need only \
                 filters; semantic and hybrid searches also need a query and \
                 its embedding.",
    about = "Run a venue search"
)]
#[ortho_config(prefix = "HAUNT")]
pub(crate) struct SearchArgs {
    /// Path to a JSON file containing a search request.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) request_path: Option<Utf8PathBuf>,
    /// SQLite venue store produced by `haunt import` (defaults to `venues.db`).
    #[arg(long = ARG_SEARCH_VENUES_DB, value_name = "path")]
    #[serde(default)]
    pub(crate) venues_db: Option<Utf8PathBuf>,
    /// Most results to return.
    #[arg(long = crate::ARG_SEARCH_RESULT_LIMIT, value_name = "count")]
    #[serde(default)]
    pub(crate) result_limit: Option<usize>,
}

impl SearchArgs {
    pub(crate) fn into_config(self) -> Result<SearchConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        SearchConfig::try_from(merged)
    }
}

/// Resolved `search` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SearchConfig {
    /// Path to the JSON request file.
    pub(crate) request_path: Utf8PathBuf,
    /// Path to the SQLite venue store.
    pub(crate) venues_db: Utf8PathBuf,
    /// Override for the engine's result limit.
    pub(crate) result_limit: Option<usize>,
}

impl SearchConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_existing_file(&self.request_path, ARG_SEARCH_REQUEST)?;
        require_existing_file(&self.venues_db, ARG_SEARCH_VENUES_DB)?;
        Ok(())
    }

    fn engine_config(&self) -> EngineConfig {
        let mut config = EngineConfig::default();
        if let Some(limit) = self.result_limit {
            config.result_limit = limit;
        }
        config
    }
}

impl TryFrom<SearchArgs> for SearchConfig {
    type Error = CliError;

    fn try_from(args: SearchArgs) -> Result<Self, Self::Error> {
        let request_path = args.request_path.ok_or(CliError::MissingArgument {
            field: ARG_SEARCH_REQUEST,
            env: ENV_SEARCH_REQUEST,
        })?;
        let venues_db = args
            .venues_db
            .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_VENUES_DB));
        Ok(Self {
            request_path,
            venues_db,
            result_limit: args.result_limit,
        })
    }
}

/// Which pipeline a request runs through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum SearchMode {
    /// Filter and score by structured attributes.
    Attribute,
    /// Rank by embedding similarity.
    Semantic,
    /// Merge both pipelines.
    Hybrid,
}

/// JSON search request read from disk.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct SearchRequest {
    /// Pipeline to run; hybrid when a query is present, attribute otherwise.
    #[serde(default)]
    pub(crate) mode: Option<SearchMode>,
    /// Free-text query for semantic and hybrid searches.
    #[serde(default)]
    pub(crate) query: Option<String>,
    /// Embedding of `query`.
    #[serde(default)]
    pub(crate) query_embedding: Option<Vec<f32>>,
    /// Structured constraints.
    #[serde(default)]
    pub(crate) filters: FilterSet,
    /// Requester position (`x` = longitude, `y` = latitude).
    #[serde(default)]
    pub(crate) location: Option<Coord<f64>>,
    /// Who the search is for.
    #[serde(default)]
    pub(crate) requester: Option<RequesterId>,
    /// Learned preferences of `requester`.
    #[serde(default)]
    pub(crate) profile: Option<PreferenceProfile>,
    /// Local wall-clock instant; the current local time when absent.
    #[serde(default)]
    pub(crate) evaluated_at: Option<NaiveDateTime>,
}

impl SearchRequest {
    fn mode(&self) -> SearchMode {
        self.mode.unwrap_or(if self.query.is_some() {
            SearchMode::Hybrid
        } else {
            SearchMode::Attribute
        })
    }

    fn validate(&self) -> Result<(), &'static str> {
        if self.profile.is_some() && self.requester.is_none() {
            return Err("a profile requires a requester");
        }
        match self.mode() {
            SearchMode::Attribute => Ok(()),
            SearchMode::Semantic | SearchMode::Hybrid => {
                if self.query.as_deref().is_none_or(|q| q.trim().is_empty()) {
                    Err("semantic and hybrid searches require a query")
                } else if self.query_embedding.as_ref().is_none_or(Vec::is_empty) {
                    Err("semantic and hybrid searches require a query_embedding")
                } else {
                    Ok(())
                }
            }
        }
    }
}

/// Search output written to stdout.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub(crate) enum SearchOutput {
    /// Attribute or semantic response.
    Ranked(SearchResponse),
    /// Hybrid response with latency and degradation flag.
    Hybrid(HybridResponse),
}

/// Source of the evaluation instant when a request omits one.
pub(crate) trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Reads the local wall clock.
pub(crate) struct LocalClock;

impl Clock for LocalClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Embedder that returns the vector supplied with the request.
struct RequestEmbedder {
    vector: Option<Vec<f32>>,
}

impl Embedder for RequestEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::EmptyInput);
        }
        self.vector
            .clone()
            .ok_or_else(|| EmbeddingError::Unavailable {
                reason: "request carries no query_embedding".to_owned(),
            })
    }
}

/// Parser that returns the request's filters with full confidence.
struct RequestParser {
    filters: FilterSet,
}

impl QueryParser for RequestParser {
    fn parse(&self, text: &str, _history: &[ConversationTurn]) -> Result<ParsedQuery, ParseError> {
        if text.trim().is_empty() {
            return Err(ParseError::EmptyInput);
        }
        Ok(ParsedQuery::new("find_venue", self.filters.clone(), 1.0))
    }
}

type CliEngine = SearchEngine<
    SqliteVenueStore,
    MemoryVectorIndex,
    RequestEmbedder,
    RequestParser,
    MemoryPreferences,
>;

pub(crate) fn run_search(args: SearchArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_search_with(args, &LocalClock, &mut stdout)
}

pub(crate) fn run_search_with(
    args: SearchArgs,
    clock: &dyn Clock,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    let output = execute_search(&config, clock)?;
    write_search_output(writer, &output)
}

pub(crate) fn execute_search(
    config: &SearchConfig,
    clock: &dyn Clock,
) -> Result<SearchOutput, CliError> {
    let request = load_search_request(&config.request_path)?;
    request
        .validate()
        .map_err(|reason| CliError::InvalidSearchRequest {
            path: config.request_path.clone(),
            reason,
        })?;
    let mode = request.mode();
    let evaluated_at = request.evaluated_at.unwrap_or_else(|| clock.now());
    let engine = build_engine(config, &request, mode)?;
    debug!("running {mode:?} search at {evaluated_at}");

    let SearchRequest {
        query,
        filters,
        location,
        requester,
        ..
    } = request;
    let text = query.unwrap_or_default();
    let output = match mode {
        SearchMode::Attribute => {
            let mut context = SearchContext::new(evaluated_at).with_filters(filters);
            context.location = location;
            context.requester = requester;
            SearchOutput::Ranked(engine.search(&context)?)
        }
        SearchMode::Semantic => SearchOutput::Ranked(engine.semantic_search(
            &text,
            &filters,
            location,
            evaluated_at,
        )?),
        SearchMode::Hybrid => SearchOutput::Hybrid(engine.hybrid_search(
            &text,
            location,
            requester.as_ref(),
            evaluated_at,
        )?),
    };
    Ok(output)
}

fn build_engine(
    config: &SearchConfig,
    request: &SearchRequest,
    mode: SearchMode,
) -> Result<CliEngine, CliError> {
    let store = SqliteVenueStore::open(config.venues_db.as_std_path())?;
    let index = match mode {
        SearchMode::Attribute => MemoryVectorIndex::default(),
        SearchMode::Semantic | SearchMode::Hybrid => MemoryVectorIndex::new(
            store
                .candidates(&CandidateQuery::all())
                .map_err(CliError::LoadVenues)?,
        ),
    };
    let preferences = match (&request.requester, &request.profile) {
        (Some(requester), Some(profile)) => {
            MemoryPreferences::new().with_profile(requester.clone(), profile.clone())
        }
        _ => MemoryPreferences::new(),
    };
    let engine = SearchEngine::with_config(
        store,
        index,
        RequestEmbedder {
            vector: request.query_embedding.clone(),
        },
        RequestParser {
            filters: request.filters.clone(),
        },
        preferences,
        config.engine_config(),
    )?;
    Ok(engine)
}

/// Loads a JSON-encoded [`SearchRequest`] from disk.
pub(crate) fn load_search_request(path: &Utf8Path) -> Result<SearchRequest, CliError> {
    let file = open_utf8_file(path).map_err(|source| CliError::OpenInput {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| {
        CliError::ParseSearchRequest {
            path: path.to_path_buf(),
            source,
        }
    })
}

fn write_search_output(writer: &mut dyn Write, output: &SearchOutput) -> Result<(), CliError> {
    let payload =
        serde_json::to_string_pretty(output).map_err(CliError::SerialiseSearchResponse)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<SearchConfig, CliError> {
    let merged = SearchArgs::merge_from_layers(layers).map_err(CliError::from)?;
    SearchConfig::try_from(merged)
}
