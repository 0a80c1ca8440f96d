//! Hybrid merge of the semantic and attribute result sets.
//!
//! Semantic entries come first and keep their semantic scores. Attribute
//! entries the semantic set lacks are appended with `similarity = 0` and
//! `combined = attribute / 100`. Every entry is then re-ranked by
//! `final = combined * 0.6 + attribute_or_0 / 100 * 0.4`.
//!
//! For attribute-only entries the attribute score therefore enters twice:
//! once through the synthesised `combined` and again through the attribute
//! term. The arithmetic is kept as is so rankings match the deployed
//! behaviour.

use std::collections::{HashMap, HashSet};

use haunt_core::VenueId;

use crate::best_match::sort_by_score;
use crate::{HybridWeights, MatchScore, MatchSource, ScoredVenue};

/// Merge, deduplicate and re-rank without truncating.
///
/// Inputs are expected to carry [`MatchScore::Semantic`] and
/// [`MatchScore::Attribute`] scores respectively; a venue present in both
/// sets appears once, as a semantic entry with the union of both reason
/// lists.
#[must_use]
pub fn merge_all(
    semantic: Vec<ScoredVenue>,
    attribute: Vec<ScoredVenue>,
    weights: &HybridWeights,
) -> Vec<ScoredVenue> {
    let attribute_positions: HashMap<VenueId, usize> = attribute
        .iter()
        .enumerate()
        .map(|(position, entry)| (entry.id().clone(), position))
        .collect();
    let mut seen: HashSet<VenueId> = HashSet::with_capacity(semantic.len());
    let mut merged = Vec::with_capacity(semantic.len() + attribute.len());

    for mut entry in semantic {
        if !seen.insert(entry.id().clone()) {
            continue;
        }
        let (similarity, combined) = semantic_parts(&entry.score);
        let source = match attribute_positions.get(entry.id()) {
            Some(&position) => {
                if let Some(other) = attribute.get(position) {
                    entry.reasons.merge(&other.reasons);
                }
                MatchSource::Both
            }
            None => MatchSource::Semantic,
        };
        entry.score = blend(weights, source, similarity, combined, None);
        merged.push(entry);
    }

    for mut entry in attribute {
        if !seen.insert(entry.id().clone()) {
            continue;
        }
        let score = entry.primary_score();
        let combined = normalise(weights, score);
        entry.score = blend(weights, MatchSource::Attribute, 0.0, combined, Some(score));
        merged.push(entry);
    }

    sort_by_score(&mut merged);
    merged
}

/// Merge both result sets and keep the top `limit` entries.
///
/// An empty semantic set is valid input and yields an attribute-only
/// ranking.
///
/// # Examples
/// ```
/// use haunt_scorer::{HybridWeights, merge_hybrid};
///
/// let merged = merge_hybrid(Vec::new(), Vec::new(), &HybridWeights::default(), 10);
/// assert!(merged.is_empty());
/// ```
#[must_use]
pub fn merge_hybrid(
    semantic: Vec<ScoredVenue>,
    attribute: Vec<ScoredVenue>,
    weights: &HybridWeights,
    limit: usize,
) -> Vec<ScoredVenue> {
    let mut merged = merge_all(semantic, attribute, weights);
    merged.truncate(limit);
    merged
}

fn semantic_parts(score: &MatchScore) -> (f64, f64) {
    match *score {
        MatchScore::Semantic {
            similarity,
            combined,
        }
        | MatchScore::Hybrid {
            similarity,
            combined,
            ..
        } => (similarity, combined),
        MatchScore::Attribute { score } => (0.0, score),
    }
}

#[expect(
    clippy::float_arithmetic,
    reason = "attribute scores are rescaled onto the semantic range"
)]
fn normalise(weights: &HybridWeights, attribute: f64) -> f64 {
    attribute / weights.attribute_normaliser
}

#[expect(
    clippy::float_arithmetic,
    reason = "the re-rank is a weighted sum of scores"
)]
fn blend(
    weights: &HybridWeights,
    source: MatchSource,
    similarity: f64,
    combined: f64,
    attribute: Option<f64>,
) -> MatchScore {
    let attribute_term = normalise(weights, attribute.unwrap_or(0.0));
    MatchScore::Hybrid {
        source,
        similarity,
        combined,
        attribute,
        final_score: combined * weights.combined + attribute_term * weights.attribute,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Reasons;
    use geo::Coord;
    use haunt_core::{Category, OpenState, Venue};
    use proptest::prelude::*;
    use rstest::rstest;

    fn entry(id: &str, score: MatchScore, reasons: &[&str]) -> ScoredVenue {
        let mut list = Reasons::new();
        for reason in reasons {
            list.push(*reason);
        }
        ScoredVenue {
            venue: Venue::new(id, id, Coord { x: 0.0, y: 0.0 }, Category::Cafe),
            distance_km: 0.0,
            open_state: OpenState::Unknown,
            reasons: list,
            score,
        }
    }

    fn semantic(id: &str, combined: f64) -> ScoredVenue {
        entry(
            id,
            MatchScore::Semantic {
                similarity: 0.5,
                combined,
            },
            &["Mid price"],
        )
    }

    fn attribute(id: &str, score: f64) -> ScoredVenue {
        entry(id, MatchScore::Attribute { score }, &["Nearby", "Mid price"])
    }

    fn final_score(entry: &ScoredVenue) -> f64 {
        entry.primary_score()
    }

    #[rstest]
    fn shared_venue_appears_once_with_semantic_score() {
        let merged = merge_all(
            vec![semantic("both", 0.8)],
            vec![attribute("both", 150.0)],
            &HybridWeights::default(),
        );
        assert_eq!(merged.len(), 1);
        let only = &merged[0];
        assert!(matches!(
            only.score,
            MatchScore::Hybrid {
                source: MatchSource::Both,
                attribute: None,
                ..
            }
        ));
        assert!((final_score(only) - 0.48).abs() < 1e-12);
        assert_eq!(only.reasons.as_slice(), ["Mid price", "Nearby"]);
    }

    #[rstest]
    fn attribute_only_entries_double_count() {
        let merged = merge_all(Vec::new(), vec![attribute("a", 120.0)], &HybridWeights::default());
        // combined = 1.2; final = 1.2 * 0.6 + 1.2 * 0.4
        assert!((final_score(&merged[0]) - 1.2).abs() < 1e-12);
        assert!(matches!(
            merged[0].score,
            MatchScore::Hybrid {
                source: MatchSource::Attribute,
                similarity,
                attribute: Some(a),
                ..
            } if similarity == 0.0 && a == 120.0
        ));
    }

    #[rstest]
    fn semantic_only_entries_lose_the_attribute_term() {
        let merged = merge_all(vec![semantic("s", 0.9)], Vec::new(), &HybridWeights::default());
        assert!((final_score(&merged[0]) - 0.54).abs() < 1e-12);
    }

    #[rstest]
    fn merged_list_is_sorted_and_truncated() {
        let semantic_set = (0..8_u32)
            .map(|i| semantic(&format!("s{i}"), f64::from(i) / 10.0))
            .collect();
        let attribute_set = (0..8_u32)
            .map(|i| attribute(&format!("a{i}"), f64::from(i) * 10.0))
            .collect();
        let merged = merge_hybrid(semantic_set, attribute_set, &HybridWeights::default(), 10);
        assert_eq!(merged.len(), 10);
        assert!(
            merged
                .windows(2)
                .all(|pair| final_score(&pair[0]) >= final_score(&pair[1]))
        );
        assert_eq!(merged[0].id().as_str(), "a7");
    }

    proptest! {
        #[test]
        fn every_venue_appears_once(
            semantic_ids in prop::collection::btree_set(0_u8..30, 0..15),
            attribute_ids in prop::collection::btree_set(0_u8..30, 0..15),
        ) {
            let semantic_set = semantic_ids.iter().map(|i| semantic(&i.to_string(), 0.5)).collect();
            let attribute_set = attribute_ids.iter().map(|i| attribute(&i.to_string(), 50.0)).collect();
            let merged = merge_all(semantic_set, attribute_set, &HybridWeights::default());
            let expected: std::collections::BTreeSet<_> = semantic_ids.union(&attribute_ids).collect();
            prop_assert_eq!(merged.len(), expected.len());
            let unique: HashSet<_> = merged.iter().map(|e| e.id().clone()).collect();
            prop_assert_eq!(unique.len(), merged.len());
        }
    }
}
