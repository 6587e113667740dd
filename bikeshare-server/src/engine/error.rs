//! Engine error types.

/// The manifest cannot drive station refreshes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ManifestError {
    /// No language publishes both station feeds.
    #[error("manifest lists no language with station feeds")]
    AmbiguousLanguage,
}

/// A query could not be answered from the cached tables.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    /// No station passes the eligibility and area filters.
    #[error("no eligible stations in the area of interest")]
    EmptyEligibleSet,
}

/// Failure of a query sent to an engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error(transparent)]
    Selection(#[from] SelectionError),

    /// The engine's event loop is no longer running.
    #[error("engine has stopped")]
    EngineStopped,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(
            ManifestError::AmbiguousLanguage.to_string(),
            "manifest lists no language with station feeds"
        );
        assert_eq!(
            QueryError::from(SelectionError::EmptyEligibleSet).to_string(),
            "no eligible stations in the area of interest"
        );
        assert_eq!(QueryError::EngineStopped.to_string(), "engine has stopped");
    }
}
