//! In-memory feed client for tests.
//!
//! Responses are scripted per URL and can be swapped at any time; every
//! fetch is counted so tests can observe refresh cadence.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use super::error::FeedError;
use super::feed::{FeedClient, InformationDocument, Manifest, StatusDocument};

#[derive(Default)]
struct MockState {
    manifests: HashMap<String, Result<Manifest, String>>,
    information: HashMap<String, Result<InformationDocument, String>>,
    status: HashMap<String, Result<StatusDocument, String>>,
    calls: HashMap<String, usize>,
}

/// Feed client serving scripted documents.
///
/// Clones share the same script.
#[derive(Clone, Default)]
pub struct MockFeedClient {
    state: Arc<Mutex<MockState>>,
}

impl MockFeedClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut MockState) -> R) -> R {
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    pub fn set_manifest(&self, url: &str, manifest: Manifest) {
        self.with_state(|s| s.manifests.insert(url.to_string(), Ok(manifest)));
    }

    pub fn set_information(&self, url: &str, document: InformationDocument) {
        self.with_state(|s| s.information.insert(url.to_string(), Ok(document)));
    }

    pub fn set_status(&self, url: &str, document: StatusDocument) {
        self.with_state(|s| s.status.insert(url.to_string(), Ok(document)));
    }

    /// Make every subsequent fetch of `url` fail, whatever its document type.
    pub fn fail(&self, url: &str, message: &str) {
        self.with_state(|s| {
            let message = message.to_string();
            if s.manifests.contains_key(url) {
                s.manifests.insert(url.to_string(), Err(message.clone()));
            }
            if s.information.contains_key(url) {
                s.information.insert(url.to_string(), Err(message.clone()));
            }
            if s.status.contains_key(url) {
                s.status.insert(url.to_string(), Err(message));
            }
        });
    }

    /// Number of fetches issued for `url` so far.
    pub fn calls(&self, url: &str) -> usize {
        self.with_state(|s| s.calls.get(url).copied().unwrap_or(0))
    }

    fn respond<T: Clone>(
        &self,
        url: &str,
        table: impl FnOnce(&MockState) -> Option<&Result<T, String>>,
    ) -> Result<T, FeedError> {
        self.with_state(|s| {
            *s.calls.entry(url.to_string()).or_default() += 1;
            match table(s) {
                Some(Ok(doc)) => Ok(doc.clone()),
                Some(Err(message)) => Err(FeedError::Api {
                    status: 503,
                    message: message.clone(),
                }),
                None => Err(FeedError::Api {
                    status: 404,
                    message: format!("no mock document for {url}"),
                }),
            }
        })
    }
}

impl FeedClient for MockFeedClient {
    fn fetch_manifest(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<Manifest, FeedError>> + Send {
        let result = self.respond(url, |s| s.manifests.get(url));
        async move { result }
    }

    fn fetch_station_information(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<InformationDocument, FeedError>> + Send {
        let result = self.respond(url, |s| s.information.get(url));
        async move { result }
    }

    fn fetch_station_status(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<StatusDocument, FeedError>> + Send {
        let result = self.respond(url, |s| s.status.get(url));
        async move { result }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::time::Duration;

    use super::*;

    fn empty_manifest() -> Manifest {
        Manifest {
            ttl: Duration::from_secs(60),
            last_updated: None,
            languages: BTreeMap::new(),
        }
    }

    #[tokio::test]
    async fn serves_scripted_documents_and_counts_calls() {
        let client = MockFeedClient::new();
        client.set_manifest("m", empty_manifest());

        assert!(client.fetch_manifest("m").await.is_ok());
        assert!(client.fetch_manifest("m").await.is_ok());
        assert_eq!(client.calls("m"), 2);
        assert_eq!(client.calls("other"), 0);
    }

    #[tokio::test]
    async fn unknown_url_is_not_found() {
        let client = MockFeedClient::new();
        let result = client.fetch_station_status("nowhere").await;
        assert!(matches!(result, Err(FeedError::Api { status: 404, .. })));
        assert_eq!(client.calls("nowhere"), 1);
    }

    #[tokio::test]
    async fn fail_replaces_document() {
        let client = MockFeedClient::new();
        client.set_manifest("m", empty_manifest());
        client.fail("m", "boom");

        let result = client.fetch_manifest("m").await;
        assert!(matches!(result, Err(FeedError::Api { status: 503, .. })));
    }
}
