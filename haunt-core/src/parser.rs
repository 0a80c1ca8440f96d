//! Natural-language query parser seam.
//!
//! A parser turns free text (plus optional conversation history) into
//! structured filters with a confidence. The caller decides whether the
//! confidence is high enough to search or whether to ask the clarifying
//! questions instead.

use thiserror::Error;

use crate::FilterSet;

/// Most clarifying questions a parse may surface.
pub const MAX_CLARIFYING_QUESTIONS: usize = 2;

/// Who said a line of conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Speaker {
    /// The person searching.
    User,
    /// The assistant answering.
    Assistant,
}

/// One line of prior conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConversationTurn {
    /// Author of the line.
    pub speaker: Speaker,
    /// Text of the line.
    pub text: String,
}

/// Structured interpretation of free text.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParsedQuery {
    /// Short label for what the requester wants, e.g. `"find_venue"`.
    pub intent: String,
    /// Extracted constraints.
    pub filters: FilterSet,
    /// Follow-up questions for ambiguous requests.
    pub clarifying_questions: Vec<String>,
    /// Parser confidence in `0.0..=1.0`.
    pub confidence: f64,
}

impl ParsedQuery {
    /// A parse with the given filters and confidence and no questions.
    pub fn new(intent: impl Into<String>, filters: FilterSet, confidence: f64) -> Self {
        Self {
            intent: intent.into(),
            filters,
            clarifying_questions: Vec::new(),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    /// Attach clarifying questions; only the first two are kept.
    #[must_use]
    pub fn with_questions<I, S>(mut self, questions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.clarifying_questions = questions
            .into_iter()
            .take(MAX_CLARIFYING_QUESTIONS)
            .map(Into::into)
            .collect();
        self
    }

    /// Whether the parse meets `threshold`.
    #[must_use]
    pub fn is_confident(&self, threshold: f64) -> bool {
        self.confidence >= threshold
    }
}

/// Errors from [`QueryParser::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// No text was supplied.
    #[error("cannot parse an empty query")]
    EmptyInput,
    /// The parsing service could not be reached.
    #[error("query parser unavailable: {reason}")]
    Unavailable {
        /// Human-readable cause.
        reason: String,
    },
    /// The service replied with something that is not a parse.
    #[error("query parser returned a malformed response: {reason}")]
    Malformed {
        /// Human-readable cause.
        reason: String,
    },
}

/// Extract structured filters from free text.
pub trait QueryParser: Send + Sync {
    /// Parse `text` in light of `history`.
    ///
    /// # Errors
    /// Returns [`ParseError`] when the text is blank or the parser fails.
    fn parse(&self, text: &str, history: &[ConversationTurn]) -> Result<ParsedQuery, ParseError>;
}
