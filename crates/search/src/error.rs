//! Error types for the search client layer

use std::fmt;

/// Errors that can occur while talking to the search engine
#[derive(Debug)]
pub enum SearchError {
    /// Transport-level failure (connection refused, network error)
    Transport(String),

    /// Request timed out
    Timeout(String),

    /// Non-success HTTP status from the engine
    Status { status: u16, body: String },

    /// Response could not be parsed
    Parse(String),

    /// Configuration error
    Config(String),

    /// Other error
    Other(String),
}

impl SearchError {
    /// Whether this error is worth retrying.
    ///
    /// Transport failures, timeouts, and 5xx statuses are transient;
    /// 4xx statuses, parse failures, and configuration errors are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout(_) => true,
            Self::Status { status, .. } => *status >= 500,
            Self::Parse(_) | Self::Config(_) | Self::Other(_) => false,
        }
    }
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(msg) => write!(f, "Transport failure: {msg}"),
            Self::Timeout(msg) => write!(f, "Request timed out: {msg}"),
            Self::Status { status, body } => {
                write!(f, "Search engine returned {status}: {body}")
            }
            Self::Parse(msg) => write!(f, "Failed to parse response: {msg}"),
            Self::Config(msg) => write!(f, "Configuration error: {msg}"),
            Self::Other(msg) => write!(f, "Search error: {msg}"),
        }
    }
}

impl std::error::Error for SearchError {}

impl From<SearchError> for bazaar_core::error::Error {
    fn from(err: SearchError) -> Self {
        bazaar_core::error::Error::Search(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_and_timeout_are_retryable() {
        assert!(SearchError::Transport("connection refused".into()).is_retryable());
        assert!(SearchError::Timeout("5s elapsed".into()).is_retryable());
    }

    #[test]
    fn server_errors_are_retryable_client_errors_are_not() {
        assert!(SearchError::Status {
            status: 503,
            body: String::new()
        }
        .is_retryable());
        assert!(!SearchError::Status {
            status: 401,
            body: String::new()
        }
        .is_retryable());
        assert!(!SearchError::Status {
            status: 400,
            body: String::new()
        }
        .is_retryable());
    }

    #[test]
    fn parse_and_config_are_fatal() {
        assert!(!SearchError::Parse("bad json".into()).is_retryable());
        assert!(!SearchError::Config("missing key".into()).is_retryable());
    }
}
