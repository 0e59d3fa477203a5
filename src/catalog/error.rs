//! Error types for catalog lookups.

use thiserror::Error;

/// Failure of a single request against the catalog API.
#[derive(Debug, Error)]
pub enum LookupError {
    /// Request exceeded the configured timeout
    #[error("Request timed out after {0}s")]
    Timeout(u64),

    /// Could not reach the API host
    #[error("Cannot connect to {0}")]
    Connect(String),

    /// Any other transport failure
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success HTTP status
    #[error("API error {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body did not have the expected shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// Request could not be built (bad base URL or subject key)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Search returned no candidate documents
    #[error("No results for \"{0}\"")]
    NoResults(String),
}

/// Errors that escape the aggregator.
///
/// Secondary lookup failures are absorbed into placeholder values, so the
/// only ways to fail are a bad subject key or losing the base listing.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog unavailable for subject '{subject}': {source}")]
    CatalogUnavailable {
        subject: String,
        #[source]
        source: LookupError,
    },

    #[error("Invalid subject key: '{0}'")]
    InvalidSubject(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_error_message_includes_cause() {
        let err = CatalogError::CatalogUnavailable {
            subject: "science_fiction".to_string(),
            source: LookupError::Status {
                status: 503,
                body: "maintenance".to_string(),
            },
        };
        let message = err.to_string();
        assert!(message.contains("science_fiction"));
        assert!(message.contains("503"));
    }

    #[test]
    fn test_source_is_preserved() {
        let err = CatalogError::CatalogUnavailable {
            subject: "x".to_string(),
            source: LookupError::Timeout(30),
        };
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("Request timed out after 30s"));
    }
}
