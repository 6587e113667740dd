//! Feed client error types.

/// Errors that can occur when fetching a GBFS document.
///
/// Every variant is a fetch failure from the engine's point of view: the
/// affected cache table is left untouched.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server returned a non-success status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response JSON
    #[error("JSON parse error: {message}")]
    Json { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = FeedError::Api {
            status: 503,
            message: "Service Unavailable".into(),
        };
        assert_eq!(err.to_string(), "API error 503: Service Unavailable");

        let err = FeedError::Json {
            message: "missing field `ttl`".into(),
        };
        assert_eq!(err.to_string(), "JSON parse error: missing field `ttl`");
    }
}
