//! Learned preference profiles: how often a requester engaged with each tag.
//!
//! Profiles are read-only snapshots for the ranking core. Incrementing tag
//! counts is the job of whatever feedback process owns the profile store.

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;

use crate::venue::fold_label;
use crate::{PriceLevel, RequesterId};

/// Per-requester learned weights.
///
/// # Examples
/// ```
/// use haunt_core::{PreferenceProfile, PriceLevel};
///
/// let profile = PreferenceProfile::new()
///     .with_tag_count("outdoor", 4)
///     .with_preferred_price(PriceLevel::Mid);
/// assert_eq!(profile.tag_count("Outdoor"), Some(4));
/// assert_eq!(profile.preferred_price_level(), Some(PriceLevel::Mid));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct PreferenceProfile {
    #[cfg_attr(feature = "serde", serde(deserialize_with = "deserialize_tags"))]
    tags: BTreeMap<String, u32>,
    preferred_price_level: Option<PriceLevel>,
}

impl PreferenceProfile {
    /// Construct an empty profile.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an observed count for a tag. Tags are stored lowercase.
    pub fn set_tag_count(&mut self, tag: &str, count: u32) {
        self.tags.insert(fold_label(tag), count);
    }

    /// Add a tag count while returning `self` for chaining.
    #[must_use]
    pub fn with_tag_count(mut self, tag: &str, count: u32) -> Self {
        self.set_tag_count(tag, count);
        self
    }

    /// Set the preferred price band, returning `self` for chaining.
    #[must_use]
    pub const fn with_preferred_price(mut self, price_level: PriceLevel) -> Self {
        self.preferred_price_level = Some(price_level);
        self
    }

    /// Observed count for `tag`, if any.
    #[must_use]
    pub fn tag_count(&self, tag: &str) -> Option<u32> {
        self.tags.get(&fold_label(tag)).copied()
    }

    /// Iterate over `(tag, count)` pairs in tag order.
    pub fn tag_counts(&self) -> impl Iterator<Item = (&str, u32)> {
        self.tags.iter().map(|(tag, count)| (tag.as_str(), *count))
    }

    /// Preferred price band, if learned.
    #[must_use]
    pub const fn preferred_price_level(&self) -> Option<PriceLevel> {
        self.preferred_price_level
    }
}

#[cfg(feature = "serde")]
fn deserialize_tags<'de, D>(deserializer: D) -> Result<BTreeMap<String, u32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: BTreeMap<String, u32> = serde::Deserialize::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(tag, count)| (fold_label(&tag), count))
        .collect())
}

/// Errors from [`PreferenceStore::profile`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreferenceError {
    /// The backing store could not be reached.
    #[error("preference store unavailable: {reason}")]
    Unavailable {
        /// Human-readable cause.
        reason: String,
    },
}

/// Read-only access to learned preference profiles.
pub trait PreferenceStore: Send + Sync {
    /// Fetch the profile for `requester`; `Ok(None)` when nothing is known.
    ///
    /// # Errors
    /// Returns [`PreferenceError`] when the store cannot be consulted.
    fn profile(&self, requester: &RequesterId)
    -> Result<Option<PreferenceProfile>, PreferenceError>;
}

/// In-memory profile store.
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferences {
    profiles: HashMap<RequesterId, PreferenceProfile>,
}

impl MemoryPreferences {
    /// Construct an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a profile, returning `self` for chaining.
    #[must_use]
    pub fn with_profile(
        mut self,
        requester: impl Into<RequesterId>,
        profile: PreferenceProfile,
    ) -> Self {
        self.profiles.insert(requester.into(), profile);
        self
    }
}

impl PreferenceStore for MemoryPreferences {
    fn profile(
        &self,
        requester: &RequesterId,
    ) -> Result<Option<PreferenceProfile>, PreferenceError> {
        Ok(self.profiles.get(requester).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_lookup_is_case_insensitive() {
        let profile = PreferenceProfile::new().with_tag_count("Rooftop", 3);
        assert_eq!(profile.tag_count("rooftop"), Some(3));
        assert!(profile.tag_count("garden").is_none());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn decoded_tags_share_the_lookup_folding() {
        let profile: PreferenceProfile =
            serde_json::from_str(r#"{"tags": {"Café": 2}}"#).expect("decode profile");
        assert_eq!(profile.tag_count("CAFÉ"), Some(2));
    }

    #[test]
    fn memory_store_returns_known_profiles() {
        let store = MemoryPreferences::new()
            .with_profile("ada", PreferenceProfile::new().with_tag_count("quiet", 2));
        let known = store.profile(&RequesterId::new("ada")).expect("lookup");
        assert_eq!(known.and_then(|p| p.tag_count("quiet")), Some(2));
        let unknown = store.profile(&RequesterId::new("bob")).expect("lookup");
        assert!(unknown.is_none());
    }
}
