//! Index error types

use thiserror::Error;

use crate::fetch::FetchError;

/// Errors that can occur while loading an index document
#[derive(Error, Debug)]
pub enum IndexError {
    /// Network or HTTP failure
    #[error("{0}")]
    Fetch(#[from] FetchError),

    /// Body is not valid JSON
    #[error("Malformed index JSON: {0}")]
    Parse(String),

    /// Valid JSON of an unexpected shape
    #[error("Unexpected index shape: {0}")]
    Schema(String),
}

impl From<serde_json::Error> for IndexError {
    fn from(err: serde_json::Error) -> Self {
        IndexError::Parse(err.to_string())
    }
}

/// Result type alias for index operations
pub type IndexResult<T> = Result<T, IndexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IndexError::Schema("expected an array".to_string());
        assert_eq!(err.to_string(), "Unexpected index shape: expected an array");

        let err = IndexError::Fetch(FetchError::Status {
            url: "http://localhost/data/index.json".to_string(),
            status: 404,
        });
        assert_eq!(
            err.to_string(),
            "HTTP 404 for http://localhost/data/index.json"
        );
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err: IndexError = json_err.into();
        assert!(matches!(err, IndexError::Parse(_)));
    }
}
