//! Location classification.

use regex::Regex;

use crate::config::PageConfig;
use crate::engine::PageClassification;
use crate::error::Result;

/// Maps a location to a [`PageClassification`].
///
/// The hub marker is checked first: a location carrying both the hub marker
/// and a detour pattern is the list page.
#[derive(Debug, Clone)]
pub struct PageClassifier {
    hub_marker: String,
    detour: Regex,
}

impl PageClassifier {
    /// Build from a hub substring and a detour regex.
    pub fn new(hub_marker: impl Into<String>, detour_pattern: &str) -> Result<Self> {
        Ok(Self {
            hub_marker: hub_marker.into(),
            detour: Regex::new(detour_pattern)?,
        })
    }

    /// Build from page configuration.
    pub fn from_config(config: &PageConfig) -> Result<Self> {
        Self::new(config.hub_marker.clone(), &config.detour_pattern)
    }

    /// Whether the location is the list page.
    #[must_use]
    pub fn is_list(&self, location: &str) -> bool {
        location.contains(&self.hub_marker)
    }

    #[must_use]
    pub fn classify(&self, location: &str) -> PageClassification {
        if self.is_list(location) {
            PageClassification::List
        } else if self.detour.is_match(location) {
            PageClassification::Detour
        } else {
            PageClassification::Detail
        }
    }
}
