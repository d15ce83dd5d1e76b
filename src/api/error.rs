//! Error types for the API module.
//!
//! Every variant carries the URL that was requested, so a failed run always
//! says which endpoint stopped it.

use thiserror::Error;

/// Errors that can occur while talking to the Omeka API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The bootstrap request was refused with HTTP 403: the API is switched off.
    #[error("Omeka API is not enabled for {url}")]
    Disabled {
        /// The API root that was probed.
        url: String,
    },

    /// The bootstrap request returned something other than 200 or 403.
    #[error("missing Omeka at {url} (HTTP {status})")]
    Missing {
        /// The API root that was probed.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// A page or record request returned a non-2xx status with a non-empty body.
    #[error("HTTP {status} fetching {url}")]
    Status {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error fetching {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout fetching {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// The response body is not valid JSON.
    #[error("invalid JSON from {url}: {source}")]
    Parse {
        /// The URL whose body failed to decode.
        url: String,
        /// The underlying decode error.
        #[source]
        source: serde_json::Error,
    },

    /// The body decoded, but not into the expected shape.
    #[error("expected {expected} from {url}, got {found}")]
    UnexpectedShape {
        /// The URL whose body had the wrong shape.
        url: String,
        /// What the caller needed.
        expected: &'static str,
        /// What the server sent.
        found: &'static str,
    },

    /// An endpoint could not be turned into a URL.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The rejected endpoint.
        url: String,
    },

    /// The run was cancelled while the request was in flight.
    #[error("request to {url} interrupted")]
    Interrupted {
        /// The URL whose request was abandoned.
        url: String,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {source}")]
    Client {
        /// The underlying builder error.
        #[source]
        source: reqwest::Error,
    },
}

impl ApiError {
    /// Creates a network or timeout error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout { url: url.into() }
        } else {
            Self::Network {
                url: url.into(),
                source,
            }
        }
    }

    /// Creates an HTTP status error.
    pub fn status(url: impl Into<String>, status: u16) -> Self {
        Self::Status {
            url: url.into(),
            status,
        }
    }

    /// Creates a JSON decode error.
    pub fn parse(url: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Parse {
            url: url.into(),
            source,
        }
    }

    /// Creates a shape mismatch error, naming the JSON type that was found.
    pub fn unexpected_shape(
        url: impl Into<String>,
        expected: &'static str,
        found: &serde_json::Value,
    ) -> Self {
        Self::UnexpectedShape {
            url: url.into(),
            expected,
            found: json_type_name(found),
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Whether the server refused or does not expose the requested resource.
    #[must_use]
    pub fn is_access_denied(&self) -> bool {
        matches!(self, Self::Status { status: 401 | 403 | 404, .. })
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_disabled_display_mentions_not_enabled() {
        let error = ApiError::Disabled {
            url: "http://example.org/api/".to_string(),
        };
        let msg = error.to_string();
        assert!(msg.contains("not enabled"), "Expected 'not enabled' in: {msg}");
        assert!(msg.contains("http://example.org/api/"), "Expected URL in: {msg}");
    }

    #[test]
    fn test_missing_display_includes_status() {
        let error = ApiError::Missing {
            url: "http://example.org/api/".to_string(),
            status: 404,
        };
        let msg = error.to_string();
        assert!(msg.starts_with("missing Omeka"), "Unexpected message: {msg}");
        assert!(msg.contains("404"), "Expected status in: {msg}");
    }

    #[test]
    fn test_status_display_and_access_denied() {
        let error = ApiError::status("http://example.org/api/users?page=1", 403);
        let msg = error.to_string();
        assert!(msg.contains("403"), "Expected status in: {msg}");
        assert!(msg.contains("/api/users"), "Expected URL in: {msg}");
        assert!(error.is_access_denied());
        assert!(!ApiError::status("http://x", 500).is_access_denied());
    }

    #[test]
    fn test_unexpected_shape_names_found_type() {
        let error = ApiError::unexpected_shape("http://x/api/items", "a JSON array", &json!({}));
        assert_eq!(
            error.to_string(),
            "expected a JSON array from http://x/api/items, got an object"
        );
    }
}
