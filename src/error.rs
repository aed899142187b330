//! Error types for findopts.

use thiserror::Error;

/// The main error type for findopts operations.
///
/// The builder itself never fails; these errors come from the strict
/// operator path, the chain parser and the CLI configuration layer.
#[derive(Debug, Error)]
pub enum QueryError {
    /// An operator was applied before any field was established with `where`.
    #[error("No active field for '{method}'. Call where(field) first")]
    NoActiveField { method: &'static str },

    /// Failed to parse a builder chain.
    #[error("Parse error at position {position}: {message}")]
    Parse { position: usize, message: String },

    /// The chain called a method the builder does not have.
    #[error("Unknown method: '{0}'")]
    UnknownMethod(String),

    /// Wrong number of arguments for a method.
    #[error("{method}() takes {expected} argument(s), got {found}")]
    Arity {
        method: String,
        expected: &'static str,
        found: usize,
    },

    /// An argument had the wrong shape for its method.
    #[error("Invalid argument to {method}(): {message}")]
    InvalidArgument { method: String, message: String },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl QueryError {
    /// Create a parse error at the given position.
    pub fn parse(position: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            position,
            message: message.into(),
        }
    }

    /// Create an invalid argument error.
    pub fn invalid(method: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            method: method.into(),
            message: message.into(),
        }
    }

    /// Create an arity error.
    pub fn arity(method: impl Into<String>, expected: &'static str, found: usize) -> Self {
        Self::Arity {
            method: method.into(),
            expected,
            found,
        }
    }
}

/// Result type alias for findopts operations.
pub type QueryResult<T> = Result<T, QueryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = QueryError::parse(5, "unexpected character");
        assert_eq!(
            err.to_string(),
            "Parse error at position 5: unexpected character"
        );
    }

    #[test]
    fn test_no_active_field_display() {
        let err = QueryError::NoActiveField { method: "gte" };
        assert_eq!(
            err.to_string(),
            "No active field for 'gte'. Call where(field) first"
        );
    }

    #[test]
    fn test_arity_display() {
        let err = QueryError::arity("eq", "exactly 1", 2);
        assert_eq!(err.to_string(), "eq() takes exactly 1 argument(s), got 2");
    }
}
