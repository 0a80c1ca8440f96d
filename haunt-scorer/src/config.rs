//! Tunable weights and limits for the ranking pipelines.
//!
//! Defaults reproduce the production ranking exactly; tests and callers may
//! override individual fields.

use thiserror::Error;

/// Additive bonuses used by the attribute scorer.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct AttributeWeights {
    /// Points per rating star.
    pub rating_multiplier: f64,
    /// Distances below this radius earn [`Self::nearby_bonus`].
    pub nearby_radius_km: f64,
    /// Bonus for venues within [`Self::nearby_radius_km`].
    pub nearby_bonus: f64,
    /// Distances up to this radius earn [`Self::local_bonus`].
    pub local_radius_km: f64,
    /// Bonus for venues between the nearby and local radii.
    pub local_bonus: f64,
    /// Bonus when open-now was requested and the venue is open.
    pub open_now_bonus: f64,
    /// Bonus for `outdoor` venues in outdoor season.
    pub outdoor_bonus: f64,
    /// Bonus for `indoor` venues outside outdoor season.
    pub indoor_bonus: f64,
    /// Bonus for venues near transit when transit was requested.
    pub requested_transit_bonus: f64,
    /// Bonus for venues near transit when transit was not requested.
    pub transit_bonus: f64,
    /// Points per observed engagement with a preferred tag.
    pub preference_per_count: f64,
    /// Cap on the points a single preferred tag can contribute.
    pub preference_cap: f64,
    /// Bonus when the venue matches the preferred price level.
    pub preferred_price_bonus: f64,
}

impl Default for AttributeWeights {
    fn default() -> Self {
        Self {
            rating_multiplier: 20.0,
            nearby_radius_km: 2.0,
            nearby_bonus: 30.0,
            local_radius_km: 5.0,
            local_bonus: 15.0,
            open_now_bonus: 25.0,
            outdoor_bonus: 20.0,
            indoor_bonus: 15.0,
            requested_transit_bonus: 20.0,
            transit_bonus: 5.0,
            preference_per_count: 2.0,
            preference_cap: 20.0,
            preferred_price_bonus: 10.0,
        }
    }
}

/// Blend weights for semantic scoring.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct SemanticWeights {
    /// Weight of the rescaled query similarity.
    pub similarity: f64,
    /// Weight of the distance score.
    pub distance: f64,
    /// Weight of the rating score.
    pub rating: f64,
    /// Distance, in kilometres, at which the distance score halves.
    pub distance_scale_km: f64,
    /// Distance score used when the requester location is unknown.
    pub neutral_distance_score: f64,
    /// Distances below this radius earn a "Nearby" reason.
    pub nearby_radius_km: f64,
}

impl Default for SemanticWeights {
    fn default() -> Self {
        Self {
            similarity: 0.6,
            distance: 0.25,
            rating: 0.15,
            distance_scale_km: 10.0,
            neutral_distance_score: 0.5,
            nearby_radius_km: 2.0,
        }
    }
}

/// Re-rank weights for the hybrid merge.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct HybridWeights {
    /// Weight of each entry's combined score.
    pub combined: f64,
    /// Weight of each entry's normalised attribute score.
    pub attribute: f64,
    /// Divisor mapping attribute scores onto the semantic scale.
    pub attribute_normaliser: f64,
}

impl Default for HybridWeights {
    fn default() -> Self {
        Self {
            combined: 0.6,
            attribute: 0.4,
            attribute_normaliser: 100.0,
        }
    }
}

/// What hybrid search does when the semantic pipeline fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum SemanticFallback {
    /// Return the embedding or index error to the caller.
    #[default]
    Propagate,
    /// Merge with an empty semantic set and mark the response degraded.
    AttributeOnly,
}

/// Configuration for [`SearchEngine`](crate::SearchEngine).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct EngineConfig {
    /// Attribute scorer bonuses.
    pub attribute: AttributeWeights,
    /// Semantic scorer blend.
    pub semantic: SemanticWeights,
    /// Hybrid re-rank blend.
    pub hybrid: HybridWeights,
    /// Most results returned per response.
    pub result_limit: usize,
    /// Lead an attribute-scored top result needs to be the best match.
    pub attribute_best_match_gap: f64,
    /// Lead a semantic or hybrid top result needs to be the best match.
    pub normalised_best_match_gap: f64,
    /// Most candidates requested from the vector index.
    pub semantic_candidate_limit: usize,
    /// Parser confidence needed before its filters are trusted.
    pub confidence_threshold: f64,
    /// Hybrid behaviour when the semantic pipeline fails.
    pub semantic_fallback: SemanticFallback,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            attribute: AttributeWeights::default(),
            semantic: SemanticWeights::default(),
            hybrid: HybridWeights::default(),
            result_limit: 10,
            attribute_best_match_gap: 15.0,
            normalised_best_match_gap: 0.15,
            semantic_candidate_limit: 50,
            confidence_threshold: 0.7,
            semantic_fallback: SemanticFallback::Propagate,
        }
    }
}

/// Reasons an [`EngineConfig`] cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A weight was NaN or infinite.
    #[error("{name} must be finite")]
    NonFinite {
        /// Field name.
        name: &'static str,
    },
    /// A weight was negative.
    #[error("{name} must not be negative")]
    Negative {
        /// Field name.
        name: &'static str,
    },
    /// A divisor or radius was zero.
    #[error("{name} must be greater than zero")]
    Zero {
        /// Field name.
        name: &'static str,
    },
    /// The confidence threshold was outside `0.0..=1.0`.
    #[error("confidence threshold must be between 0.0 and 1.0")]
    ConfidenceOutOfRange,
}

impl EngineConfig {
    /// Check that every weight is usable.
    ///
    /// # Errors
    /// Returns the first [`ConfigError`] found.
    ///
    /// # Examples
    /// ```
    /// use haunt_scorer::EngineConfig;
    ///
    /// assert!(EngineConfig::default().validate().is_ok());
    /// let broken = EngineConfig { result_limit: 0, ..EngineConfig::default() };
    /// assert!(broken.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in self.weights() {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { name });
            }
            if value < 0.0 {
                return Err(ConfigError::Negative { name });
            }
        }
        for (name, value) in [
            ("semantic.distance_scale_km", self.semantic.distance_scale_km),
            (
                "hybrid.attribute_normaliser",
                self.hybrid.attribute_normaliser,
            ),
        ] {
            if value == 0.0 {
                return Err(ConfigError::Zero { name });
            }
        }
        if self.result_limit == 0 {
            return Err(ConfigError::Zero {
                name: "result_limit",
            });
        }
        if self.semantic_candidate_limit == 0 {
            return Err(ConfigError::Zero {
                name: "semantic_candidate_limit",
            });
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(ConfigError::ConfidenceOutOfRange);
        }
        Ok(())
    }

    fn weights(&self) -> [(&'static str, f64); 24] {
        let a = &self.attribute;
        let s = &self.semantic;
        let h = &self.hybrid;
        [
            ("attribute.rating_multiplier", a.rating_multiplier),
            ("attribute.nearby_radius_km", a.nearby_radius_km),
            ("attribute.nearby_bonus", a.nearby_bonus),
            ("attribute.local_radius_km", a.local_radius_km),
            ("attribute.local_bonus", a.local_bonus),
            ("attribute.open_now_bonus", a.open_now_bonus),
            ("attribute.outdoor_bonus", a.outdoor_bonus),
            ("attribute.indoor_bonus", a.indoor_bonus),
            ("attribute.requested_transit_bonus", a.requested_transit_bonus),
            ("attribute.transit_bonus", a.transit_bonus),
            ("attribute.preference_per_count", a.preference_per_count),
            ("attribute.preference_cap", a.preference_cap),
            ("attribute.preferred_price_bonus", a.preferred_price_bonus),
            ("semantic.similarity", s.similarity),
            ("semantic.distance", s.distance),
            ("semantic.rating", s.rating),
            ("semantic.distance_scale_km", s.distance_scale_km),
            ("semantic.neutral_distance_score", s.neutral_distance_score),
            ("semantic.nearby_radius_km", s.nearby_radius_km),
            ("hybrid.combined", h.combined),
            ("hybrid.attribute", h.attribute),
            ("hybrid.attribute_normaliser", h.attribute_normaliser),
            ("attribute_best_match_gap", self.attribute_best_match_gap),
            ("normalised_best_match_gap", self.normalised_best_match_gap),
        ]
    }
}
