//! Engine configuration.

use std::time::Duration;

/// Tunables for nearest-station selection.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionConfig {
    /// How many stations nearest a from/to point are considered.
    pub nearest_count: usize,

    /// Maximum distance spread (metres) tolerated among the nearest
    /// stations. When exceeded, stations farther than the closest one plus
    /// this margin are dropped.
    pub cluster_spread_m: f64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            nearest_count: 5,
            cluster_spread_m: 500.0,
        }
    }
}

/// Configuration for one deployment's station engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// URL of the GBFS manifest (`gbfs.json`).
    pub manifest_url: String,

    /// Language used when the manifest offers it.
    pub preferred_language: String,

    /// Case-insensitive find → replace pairs for display names, applied in order.
    pub name_replacements: Vec<(String, String)>,

    pub selection: SelectionConfig,

    /// Lower bound on any refresh delay, so a zero TTL cannot spin.
    pub min_refresh_interval: Duration,
}

impl EngineConfig {
    pub fn new(manifest_url: impl Into<String>) -> Self {
        Self {
            manifest_url: manifest_url.into(),
            preferred_language: "en".to_string(),
            name_replacements: Vec::new(),
            selection: SelectionConfig::default(),
            min_refresh_interval: Duration::from_secs(5),
        }
    }

    pub fn with_preferred_language(mut self, language: impl Into<String>) -> Self {
        self.preferred_language = language.into();
        self
    }

    pub fn with_name_replacements(mut self, replacements: Vec<(String, String)>) -> Self {
        self.name_replacements = replacements;
        self
    }

    pub fn with_selection(mut self, selection: SelectionConfig) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_min_refresh_interval(mut self, interval: Duration) -> Self {
        self.min_refresh_interval = interval;
        self
    }
}
