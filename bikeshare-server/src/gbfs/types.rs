//! GBFS wire types.
//!
//! These mirror the JSON published by GBFS v1/v2 feeds. Station flags are
//! accepted both as booleans and as 0/1 integers, and station ids both as
//! strings and as numbers, since real-world feeds use either.

use std::collections::BTreeMap;

use serde::Deserialize;

/// Common envelope wrapping every GBFS document.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    /// POSIX timestamp of the last data update.
    #[serde(default)]
    pub last_updated: Option<i64>,
    /// Seconds before the document should be fetched again.
    #[serde(default)]
    pub ttl: u64,
    pub data: T,
}

/// `gbfs.json` payload: feeds keyed by language.
pub type ManifestData = BTreeMap<String, LanguageEntry>;

#[derive(Debug, Clone, Deserialize)]
pub struct LanguageEntry {
    pub feeds: Vec<FeedEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedEntry {
    pub name: String,
    pub url: String,
}

/// `station_information.json` / `station_status.json` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct StationList<T> {
    pub stations: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StationInformationDto {
    pub station_id: FlexibleId,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StationStatusDto {
    pub station_id: FlexibleId,
    pub num_bikes_available: i64,
    pub num_docks_available: i64,
    pub is_installed: Flag,
    pub is_renting: Flag,
    pub is_returning: Flag,
}

/// A station id published as either a string or a number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FlexibleId {
    Text(String),
    Number(i64),
}

impl FlexibleId {
    pub fn into_string(self) -> String {
        match self {
            FlexibleId::Text(s) => s,
            FlexibleId::Number(n) => n.to_string(),
        }
    }
}

/// A boolean published as either `true`/`false` or `1`/`0`.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
pub enum Flag {
    Bool(bool),
    Int(i64),
}

impl Flag {
    pub fn is_set(self) -> bool {
        match self {
            Flag::Bool(b) => b,
            Flag::Int(n) => n != 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_v1_manifest() {
        let json = r#"{
            "last_updated": 1500000000,
            "ttl": 60,
            "data": {
                "en": {
                    "feeds": [
                        {"name": "system_information", "url": "https://x/en/system_information.json"},
                        {"name": "station_information", "url": "https://x/en/station_information.json"},
                        {"name": "station_status", "url": "https://x/en/station_status.json"}
                    ]
                },
                "fr": {
                    "feeds": [
                        {"name": "station_information", "url": "https://x/fr/station_information.json"}
                    ]
                }
            }
        }"#;

        let manifest: Envelope<ManifestData> = serde_json::from_str(json).unwrap();
        assert_eq!(manifest.ttl, 60);
        assert_eq!(manifest.last_updated, Some(1_500_000_000));
        assert_eq!(manifest.data.len(), 2);
        assert_eq!(manifest.data["en"].feeds.len(), 3);
    }

    #[test]
    fn parse_status_with_integer_flags() {
        let json = r#"{
            "ttl": 10,
            "data": {"stations": [
                {"station_id": "7", "num_bikes_available": 3, "num_docks_available": 12,
                 "is_installed": 1, "is_renting": 1, "is_returning": 0, "last_reported": 1500000000}
            ]}
        }"#;

        let status: Envelope<StationList<StationStatusDto>> = serde_json::from_str(json).unwrap();
        let row = &status.data.stations[0];
        assert!(row.is_installed.is_set());
        assert!(row.is_renting.is_set());
        assert!(!row.is_returning.is_set());
        assert!(status.last_updated.is_none());
    }

    #[test]
    fn parse_status_with_boolean_flags_and_numeric_id() {
        let json = r#"{
            "ttl": 10,
            "data": {"stations": [
                {"station_id": 42, "num_bikes_available": 0, "num_docks_available": 5,
                 "is_installed": true, "is_renting": false, "is_returning": true}
            ]}
        }"#;

        let status: Envelope<StationList<StationStatusDto>> = serde_json::from_str(json).unwrap();
        let row = status.data.stations[0].clone();
        assert!(!row.is_renting.is_set());
        assert_eq!(row.station_id.into_string(), "42");
    }

    #[test]
    fn missing_ttl_defaults_to_zero() {
        let json = r#"{"data": {"stations": []}}"#;
        let info: Envelope<StationList<StationInformationDto>> = serde_json::from_str(json).unwrap();
        assert_eq!(info.ttl, 0);
    }
}
