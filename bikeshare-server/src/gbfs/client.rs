//! GBFS HTTP client.

use serde::de::DeserializeOwned;

use super::convert::{convert_information, convert_manifest, convert_status};
use super::error::FeedError;
use super::feed::{FeedClient, InformationDocument, Manifest, StatusDocument};
use super::types::{Envelope, ManifestData, StationInformationDto, StationList, StationStatusDto};

/// Default user agent sent with every request.
const DEFAULT_USER_AGENT: &str = concat!("bikeshare-server/", env!("CARGO_PKG_VERSION"));

/// Configuration for the GBFS client.
#[derive(Debug, Clone)]
pub struct GbfsClientConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// User agent header value
    pub user_agent: String,
}

impl GbfsClientConfig {
    pub fn new() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

impl Default for GbfsClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Client for GBFS feeds.
///
/// Stateless apart from the connection pool; one client can serve every
/// deployment.
#[derive(Debug, Clone)]
pub struct GbfsClient {
    http: reqwest::Client,
}

impl GbfsClient {
    pub fn new(config: GbfsClientConfig) -> Result<Self, FeedError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { http })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FeedError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::Api {
                status: status.as_u16(),
                message: body.chars().take(500).collect(),
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| FeedError::Json {
            message: e.to_string(),
        })
    }
}

impl FeedClient for GbfsClient {
    async fn fetch_manifest(&self, url: &str) -> Result<Manifest, FeedError> {
        let envelope: Envelope<ManifestData> = self.get_json(url).await?;
        Ok(convert_manifest(envelope))
    }

    async fn fetch_station_information(
        &self,
        url: &str,
    ) -> Result<InformationDocument, FeedError> {
        let envelope: Envelope<StationList<StationInformationDto>> = self.get_json(url).await?;
        Ok(convert_information(envelope))
    }

    async fn fetch_station_status(&self, url: &str) -> Result<StatusDocument, FeedError> {
        let envelope: Envelope<StationList<StationStatusDto>> = self.get_json(url).await?;
        Ok(convert_status(envelope))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = GbfsClientConfig::default();
        assert_eq!(config.timeout_secs, 30);
        assert!(config.user_agent.starts_with("bikeshare-server/"));
    }

    #[test]
    fn config_builders() {
        let config = GbfsClientConfig::new()
            .with_timeout(5)
            .with_user_agent("test-agent");
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.user_agent, "test-agent");
    }

    #[tokio::test]
    async fn unreachable_host_is_fetch_failure() {
        let client = GbfsClient::new(GbfsClientConfig::new().with_timeout(2)).unwrap();
        let result = client.fetch_manifest("http://127.0.0.1:9/gbfs.json").await;
        assert!(matches!(result, Err(FeedError::Http(_))));
    }
}
