//! Server settings, loaded from a JSON file.

use std::fmt;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

use crate::domain::SystemId;
use crate::engine::{EngineConfig, SelectionConfig};

/// Environment variable naming the settings file.
pub const SETTINGS_ENV: &str = "BIKESHARE_SETTINGS";

/// Settings file used when neither an argument nor the environment names one.
pub const DEFAULT_SETTINGS_PATH: &str = "settings.json";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("cannot read settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed settings: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid settings: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,

    /// Timeout for each feed request.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    pub bike_share_systems: Vec<SystemSettings>,

    #[serde(default)]
    pub selection: SelectionSettings,
}

/// One bike-share deployment.
#[derive(Debug, Clone, Deserialize)]
pub struct SystemSettings {
    pub system_id: String,
    pub manifest_url: String,

    #[serde(default = "default_language")]
    pub preferred_language: String,

    /// Find → replace pairs, in file order.
    #[serde(default, deserialize_with = "ordered_pairs")]
    pub station_name_replacements: Vec<(String, String)>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectionSettings {
    pub nearest_count: usize,
    pub cluster_spread_m: f64,
}

impl Default for SelectionSettings {
    fn default() -> Self {
        let defaults = SelectionConfig::default();
        Self {
            nearest_count: defaults.nearest_count,
            cluster_spread_m: defaults.cluster_spread_m,
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 3000))
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_language() -> String {
    "en".to_string()
}

/// Read a JSON object as key/value pairs without losing key order.
fn ordered_pairs<'de, D>(deserializer: D) -> Result<Vec<(String, String)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct PairsVisitor;

    impl<'de> Visitor<'de> for PairsVisitor {
        type Value = Vec<(String, String)>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("an object of string replacements")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut pairs = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(pair) = map.next_entry::<String, String>()? {
                pairs.push(pair);
            }
            Ok(pairs)
        }
    }

    deserializer.deserialize_map(PairsVisitor)
}

impl Settings {
    /// Where to read settings from: the first argument, else
    /// `$BIKESHARE_SETTINGS`, else `settings.json`.
    pub fn locate(arg: Option<String>, env: Option<String>) -> String {
        arg.or(env)
            .unwrap_or_else(|| DEFAULT_SETTINGS_PATH.to_string())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.bike_share_systems.is_empty() {
            return Err(SettingsError::Invalid(
                "no bike share systems configured".to_string(),
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for system in &self.bike_share_systems {
            if system.system_id.trim().is_empty() {
                return Err(SettingsError::Invalid("empty system_id".to_string()));
            }
            if !seen.insert(system.system_id.as_str()) {
                return Err(SettingsError::Invalid(format!(
                    "duplicate system_id: {}",
                    system.system_id
                )));
            }
            if system.manifest_url.trim().is_empty() {
                return Err(SettingsError::Invalid(format!(
                    "empty manifest_url for {}",
                    system.system_id
                )));
            }
        }

        if self.selection.nearest_count == 0 {
            return Err(SettingsError::Invalid(
                "selection.nearest_count must be at least 1".to_string(),
            ));
        }
        let spread = self.selection.cluster_spread_m;
        if !spread.is_finite() || spread < 0.0 {
            return Err(SettingsError::Invalid(format!(
                "selection.cluster_spread_m must be a non-negative number, got {spread}"
            )));
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn selection_config(&self) -> SelectionConfig {
        SelectionConfig {
            nearest_count: self.selection.nearest_count,
            cluster_spread_m: self.selection.cluster_spread_m,
        }
    }

    /// Engine configuration for every deployment, in file order.
    pub fn engine_configs(&self) -> Vec<(SystemId, EngineConfig)> {
        self.bike_share_systems
            .iter()
            .map(|system| {
                let config = EngineConfig::new(&system.manifest_url)
                    .with_preferred_language(&system.preferred_language)
                    .with_name_replacements(system.station_name_replacements.clone())
                    .with_selection(self.selection_config());
                (SystemId::new(&system.system_id), config)
            })
            .collect()
    }
}
