//! Feed documents and the fetch capability consumed by the engine.

use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::domain::{StationInformation, StationStatus};

use super::error::FeedError;

/// Station feed URLs published for one language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageFeeds {
    pub station_information: String,
    pub station_status: String,
}

/// The top-level GBFS manifest.
///
/// Replaced wholesale on every fetch. Languages are kept sorted, so the
/// first entry is deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    pub ttl: Duration,
    pub last_updated: Option<DateTime<Utc>>,
    pub languages: BTreeMap<String, LanguageFeeds>,
}

impl Manifest {
    /// Pick the working language: `preferred` if listed, else the first
    /// language in sorted order. `None` if the manifest lists no language.
    pub fn select_language(&self, preferred: &str) -> Option<&str> {
        self.languages
            .get_key_value(preferred)
            .or_else(|| self.languages.iter().next())
            .map(|(language, _)| language.as_str())
    }

    pub fn feeds(&self, language: &str) -> Option<&LanguageFeeds> {
        self.languages.get(language)
    }
}

/// A fetched sub-document with its own time-to-live.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedDocument<T> {
    pub ttl: Duration,
    pub last_updated: Option<DateTime<Utc>>,
    pub data: T,
}

pub type InformationDocument = FeedDocument<Vec<StationInformation>>;
pub type StatusDocument = FeedDocument<Vec<StationStatus>>;

/// Asynchronous access to a GBFS feed.
///
/// This abstraction allows the engine to be driven by scripted feeds in tests.
pub trait FeedClient: Send + Sync + 'static {
    /// Fetch and parse the manifest at `url`.
    fn fetch_manifest(&self, url: &str)
    -> impl Future<Output = Result<Manifest, FeedError>> + Send;

    /// Fetch and parse a `station_information` document.
    fn fetch_station_information(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<InformationDocument, FeedError>> + Send;

    /// Fetch and parse a `station_status` document.
    fn fetch_station_status(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<StatusDocument, FeedError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest(languages: &[&str]) -> Manifest {
        Manifest {
            ttl: Duration::from_secs(60),
            last_updated: None,
            languages: languages
                .iter()
                .map(|lang| {
                    (
                        lang.to_string(),
                        LanguageFeeds {
                            station_information: format!("https://x/{lang}/info.json"),
                            station_status: format!("https://x/{lang}/status.json"),
                        },
                    )
                })
                .collect(),
        }
    }

    #[test]
    fn prefers_requested_language() {
        let m = manifest(&["de", "en", "fr"]);
        assert_eq!(m.select_language("en"), Some("en"));
    }

    #[test]
    fn falls_back_to_only_language() {
        let m = manifest(&["fr"]);
        assert_eq!(m.select_language("en"), Some("fr"));
    }

    #[test]
    fn fallback_is_first_in_sorted_order() {
        let m = manifest(&["nl", "fr", "de"]);
        assert_eq!(m.select_language("en"), Some("de"));
    }

    #[test]
    fn no_languages() {
        let m = manifest(&[]);
        assert_eq!(m.select_language("en"), None);
    }
}
