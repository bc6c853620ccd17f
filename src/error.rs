// src/error.rs
// =============================================================================
// Library error type.
//
// Only two kinds of failure ever leave this crate as an Err:
// - contract violations by the caller (zero batch size, empty input, ...)
// - single-shot calls that have no batch to absorb them (update_post, etc.)
//
// Everything that happens to ONE item inside a batch or pool (timeouts,
// non-200 responses, bad XML) is folded into that item's outcome instead.
// =============================================================================

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl Error {
    /// True when the underlying request ran out of time.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Network(msg) if msg == TIMEOUT_MESSAGE)
    }
}

// reqwest folds timeouts into its generic error type; we keep a stable
// message for them so callers can report "Timeout" without string guessing
const TIMEOUT_MESSAGE: &str = "Timeout";

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Network(TIMEOUT_MESSAGE.to_string())
        } else {
            Error::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Parse(err.to_string())
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_detection() {
        assert!(Error::Network("Timeout".to_string()).is_timeout());
        assert!(!Error::Network("connection refused".to_string()).is_timeout());
        assert!(!Error::Parse("Timeout".to_string()).is_timeout());
    }

    #[test]
    fn test_api_error_display() {
        let err = Error::Api {
            status: 404,
            message: "rest_post_invalid_id".to_string(),
        };
        assert_eq!(err.to_string(), "API error (status 404): rest_post_invalid_id");
    }
}
