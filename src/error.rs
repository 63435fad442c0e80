//! Error types for the feedback analytics service.
//!
//! Defines the main error enum used throughout the application.

use thiserror::Error;

/// Main error type for analytics operations.
#[derive(Error, Debug)]
pub enum AnalyticsError {
    /// Database connection errors (host unreachable, auth failed, pool exhausted, etc.)
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution errors (syntax errors, constraint violations, etc.)
    #[error("Query error: {0}")]
    Query(String),

    /// A stored sentiment or topic code outside the known set.
    #[error("Mapping error: {0}")]
    Mapping(String),

    /// A request parameter that was rejected (e.g. limit < 1).
    #[error("Invalid parameter: {0}")]
    InvalidParam(String),

    /// Configuration errors (invalid config file, missing required fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal application errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AnalyticsError {
    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a query error with the given message.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates a mapping error with the given message.
    pub fn mapping(msg: impl Into<String>) -> Self {
        Self::Mapping(msg.into())
    }

    /// Creates an invalid-parameter error with the given message.
    pub fn invalid_param(msg: impl Into<String>) -> Self {
        Self::InvalidParam(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Connection(_) => "Connection Error",
            Self::Query(_) => "Query Error",
            Self::Mapping(_) => "Mapping Error",
            Self::InvalidParam(_) => "Invalid Parameter",
            Self::Config(_) => "Configuration Error",
            Self::Internal(_) => "Internal Error",
        }
    }

    /// Returns true if the error was caused by the caller's request.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidParam(_))
    }
}

/// Result type alias using AnalyticsError.
pub type Result<T> = std::result::Result<T, AnalyticsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_connection() {
        let err = AnalyticsError::connection("Cannot connect to localhost:5432");
        assert_eq!(
            err.to_string(),
            "Connection error: Cannot connect to localhost:5432"
        );
        assert_eq!(err.category(), "Connection Error");
    }

    #[test]
    fn test_error_display_query() {
        let err = AnalyticsError::query("relation \"prediction\" does not exist");
        assert_eq!(
            err.to_string(),
            "Query error: relation \"prediction\" does not exist"
        );
        assert_eq!(err.category(), "Query Error");
    }

    #[test]
    fn test_error_display_mapping() {
        let err = AnalyticsError::mapping("unknown sentiment code 7");
        assert_eq!(err.to_string(), "Mapping error: unknown sentiment code 7");
        assert_eq!(err.category(), "Mapping Error");
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_error_display_invalid_param() {
        let err = AnalyticsError::invalid_param("limit must be at least 1");
        assert_eq!(
            err.to_string(),
            "Invalid parameter: limit must be at least 1"
        );
        assert!(err.is_client_error());
    }

    #[test]
    fn test_error_display_config() {
        let err = AnalyticsError::config("missing field 'database' in connections.default");
        assert_eq!(
            err.to_string(),
            "Configuration error: missing field 'database' in connections.default"
        );
        assert_eq!(err.category(), "Configuration Error");
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AnalyticsError>();
    }
}
