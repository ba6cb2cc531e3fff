// src/error.rs
use thiserror::Error;

/// Failures surfaced by the search client.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Network-level failure (unreachable host, reset connection, timeout).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-success HTTP status.
    #[error("server returned {status}: {body}")]
    HttpStatus {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The backend emitted a `type: "error"` line mid-stream.
    #[error("search failed: {0}")]
    Stream(String),

    /// The response body was HTML, which almost always means the base URL
    /// points at a web server rather than the API.
    #[error("received HTML instead of JSON; check the API base URL")]
    HtmlBody,

    /// The response claimed JSON but the body did not parse as the expected
    /// result shape.
    #[error("unexpected response body: {0}")]
    UnexpectedBody(String),

    /// The caller abandoned the in-flight stream.
    #[error("search cancelled")]
    Cancelled,
}

/// Coarse category for free-text backend error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Missing or rejected credentials / API key on the backend side.
    Auth,
    /// The search pipeline itself reported a failure.
    Search,
    /// Anything we cannot place.
    Unknown,
}

impl ErrorCategory {
    /// Short message suitable for direct display.
    pub fn user_message(&self) -> &'static str {
        match self {
            ErrorCategory::Auth => {
                "The search service is not authorized. Contact an administrator."
            }
            ErrorCategory::Search => "The search could not be completed. Try a simpler query.",
            ErrorCategory::Unknown => "Something went wrong. Please try again.",
        }
    }
}

/// Classify a backend error string into a coarse category.
///
/// The backend only reports free text, so this is heuristic by nature. The
/// exact mappings are implementation-defined; keep every heuristic in this
/// one function so it stays testable and easy to retire once the backend
/// grows structured error codes.
pub fn classify_error_text(text: &str) -> ErrorCategory {
    let lower = text.to_lowercase();
    if lower.contains("api_key") || lower.contains("unauthorized") || lower.contains("forbidden") {
        ErrorCategory::Auth
    } else if lower.contains("search error") || lower.contains("embedding") {
        ErrorCategory::Search
    } else {
        ErrorCategory::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_auth_errors() {
        assert_eq!(
            classify_error_text("OpenAI api_key not configured"),
            ErrorCategory::Auth
        );
        assert_eq!(classify_error_text("401 Unauthorized"), ErrorCategory::Auth);
    }

    #[test]
    fn test_classify_search_errors() {
        assert_eq!(
            classify_error_text("Search error: index unavailable"),
            ErrorCategory::Search
        );
        assert_eq!(
            classify_error_text("embedding service timed out"),
            ErrorCategory::Search
        );
    }

    #[test]
    fn test_classify_unknown() {
        assert_eq!(classify_error_text("boom"), ErrorCategory::Unknown);
        assert_ne!(ErrorCategory::Unknown.user_message(), "");
    }

    #[test]
    fn test_stream_error_keeps_server_message() {
        let err = SearchError::Stream("boom".to_string());
        assert!(err.to_string().contains("boom"));
    }
}
