//! Search orchestration over the engine's collaborators.

use std::{panic, thread, time::Instant};

use chrono::NaiveDateTime;
use geo::Coord;
use haunt_core::{
    ConversationTurn, Embedder, FilterSet, MAX_CLARIFYING_QUESTIONS, PreferenceProfile,
    PreferenceStore, QueryParser, RequesterId, SearchContext, VectorIndex, VenueStore,
};
use log::{debug, warn};

use crate::{
    AttributeScorer, ConfigError, EngineConfig, HybridResponse, ScoredVenue, SearchError,
    SearchResponse, SemanticFallback, SemanticScorer, filter_venues, merge_all, rank_results,
};

/// What to do with a free-text request.
#[derive(Debug, Clone, PartialEq)]
pub enum Interpretation {
    /// The parse is confident enough to search with.
    Search {
        /// Parser intent label.
        intent: String,
        /// Extracted constraints.
        filters: FilterSet,
    },
    /// The request is ambiguous; ask these questions first.
    Clarify {
        /// At most two follow-up questions.
        questions: Vec<String>,
    },
}

/// Venue search engine.
///
/// The engine is generic over its collaborators: a candidate store, a vector
/// index, an embedding provider, a query parser and a preference store. It
/// never reads the wall clock for ranking; every entry point takes the
/// evaluation instant explicitly.
pub struct SearchEngine<S, I, E, Q, P>
where
    S: VenueStore,
    I: VectorIndex,
    E: Embedder,
    Q: QueryParser,
    P: PreferenceStore,
{
    store: S,
    index: I,
    embedder: E,
    parser: Q,
    preferences: P,
    config: EngineConfig,
}

impl<S, I, E, Q, P> SearchEngine<S, I, E, Q, P>
where
    S: VenueStore,
    I: VectorIndex,
    E: Embedder,
    Q: QueryParser,
    P: PreferenceStore,
{
    /// Construct an engine using default configuration.
    pub fn new(store: S, index: I, embedder: E, parser: Q, preferences: P) -> Self {
        Self {
            store,
            index,
            embedder,
            parser,
            preferences,
            config: EngineConfig::default(),
        }
    }

    /// Construct an engine with explicit configuration.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when `config` fails validation.
    pub fn with_config(
        store: S,
        index: I,
        embedder: E,
        parser: Q,
        preferences: P,
        config: EngineConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            store,
            index,
            embedder,
            parser,
            preferences,
            config,
        })
    }

    /// The active configuration.
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Attribute-only search.
    ///
    /// # Errors
    /// Returns [`SearchError`] when the store or the preference store fails.
    pub fn search(&self, context: &SearchContext) -> Result<SearchResponse, SearchError> {
        let profile = self.profile_for(context.requester.as_ref())?;
        let scored = self.attribute_results(context, profile.as_ref())?;
        Ok(rank_results(
            scored,
            self.config.attribute_best_match_gap,
            self.config.result_limit,
        ))
    }

    /// Semantic search for `query` under `filters`.
    ///
    /// # Errors
    /// Returns [`SearchError`] when embedding or similarity search fails.
    pub fn semantic_search(
        &self,
        query: &str,
        filters: &FilterSet,
        location: Option<Coord<f64>>,
        at: NaiveDateTime,
    ) -> Result<SearchResponse, SearchError> {
        let mut context = SearchContext::new(at).with_filters(filters.clone());
        context.location = location;
        let scored = self.semantic_results(query, &context)?;
        Ok(rank_results(
            scored,
            self.config.normalised_best_match_gap,
            self.config.result_limit,
        ))
    }

    /// Parse `query`, run both pipelines concurrently and merge them.
    ///
    /// Parsed filters are used only when the parse is confident; otherwise
    /// the search runs unfiltered. With [`SemanticFallback::AttributeOnly`]
    /// a failing semantic pipeline is left out and the response is marked
    /// degraded.
    ///
    /// # Errors
    /// Returns [`SearchError`] when parsing, the store or the preference
    /// store fails, or when the semantic pipeline fails and the fallback is
    /// [`SemanticFallback::Propagate`].
    pub fn hybrid_search(
        &self,
        query: &str,
        location: Option<Coord<f64>>,
        requester: Option<&RequesterId>,
        at: NaiveDateTime,
    ) -> Result<HybridResponse, SearchError> {
        let started_at = Instant::now();
        let parsed = self.parser.parse(query, &[])?;
        let filters = if parsed.is_confident(self.config.confidence_threshold) {
            parsed.filters
        } else {
            debug!(
                "parse confidence {:.2} below threshold; searching unfiltered",
                parsed.confidence
            );
            FilterSet::default()
        };
        let mut context = SearchContext::new(at).with_filters(filters);
        context.location = location;
        context.requester = requester.cloned();
        let profile = self.profile_for(requester)?;

        let (attribute_outcome, semantic_outcome) = thread::scope(|scope| {
            let semantic_task = scope.spawn(|| self.semantic_results(query, &context));
            let attribute_outcome = self.attribute_results(&context, profile.as_ref());
            let semantic_outcome = semantic_task
                .join()
                .unwrap_or_else(|payload| panic::resume_unwind(payload));
            (attribute_outcome, semantic_outcome)
        });
        let attribute = attribute_outcome?;
        let (semantic, degraded) = match semantic_outcome {
            Ok(semantic) => (semantic, false),
            Err(err)
                if err.is_semantic()
                    && self.config.semantic_fallback == SemanticFallback::AttributeOnly =>
            {
                warn!("semantic pipeline failed; ranking attribute results only: {err}");
                (Vec::new(), true)
            }
            Err(err) => return Err(err),
        };

        let merged = merge_all(semantic, attribute, &self.config.hybrid);
        let response = rank_results(
            merged,
            self.config.normalised_best_match_gap,
            self.config.result_limit,
        );
        let latency_ms = u64::try_from(started_at.elapsed().as_millis()).unwrap_or(u64::MAX);
        debug!(
            "hybrid search ranked {} venues in {latency_ms} ms",
            response.total_count
        );
        Ok(HybridResponse::from_ranked(response, latency_ms, degraded))
    }

    /// Decide whether free text can be searched directly.
    ///
    /// # Errors
    /// Returns [`SearchError::Parse`] when the parser fails.
    pub fn interpret(
        &self,
        text: &str,
        history: &[ConversationTurn],
    ) -> Result<Interpretation, SearchError> {
        let parsed = self.parser.parse(text, history)?;
        if parsed.is_confident(self.config.confidence_threshold) {
            Ok(Interpretation::Search {
                intent: parsed.intent,
                filters: parsed.filters,
            })
        } else {
            let mut questions = parsed.clarifying_questions;
            questions.truncate(MAX_CLARIFYING_QUESTIONS);
            Ok(Interpretation::Clarify { questions })
        }
    }

    fn profile_for(
        &self,
        requester: Option<&RequesterId>,
    ) -> Result<Option<PreferenceProfile>, SearchError> {
        match requester {
            Some(requester) => Ok(self.preferences.profile(requester)?),
            None => Ok(None),
        }
    }

    fn attribute_results(
        &self,
        context: &SearchContext,
        profile: Option<&PreferenceProfile>,
    ) -> Result<Vec<ScoredVenue>, SearchError> {
        let candidates = self
            .store
            .candidates(&context.filters.candidate_query())?;
        let filtered = filter_venues(&candidates, &context.filters, context.evaluated_at);
        debug!(
            "attribute filter kept {} of {} candidates",
            filtered.len(),
            candidates.len()
        );
        let scorer = AttributeScorer::new(self.config.attribute);
        Ok(scorer.score_all(&filtered, context, profile))
    }

    fn semantic_results(
        &self,
        query: &str,
        context: &SearchContext,
    ) -> Result<Vec<ScoredVenue>, SearchError> {
        let embedding = self.embedder.embed(query)?;
        let matches = self.index.search(
            &embedding,
            &context.filters.candidate_query(),
            self.config.semantic_candidate_limit,
        )?;
        let scorer = SemanticScorer::new(self.config.semantic);
        let ranked = scorer.rank(&matches, context);
        debug!(
            "semantic search kept {} of {} similarity matches",
            ranked.len(),
            matches.len()
        );
        Ok(ranked)
    }
}
