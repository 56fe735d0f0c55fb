//! Error types returned by the facade.

use reqwest::StatusCode;

/// Errors produced by [`HttpLight`](crate::HttpLight) calls.
#[derive(Debug, thiserror::Error)]
pub enum HttpLightError {
    /// The server answered with a non-success status.
    /// The raw body is kept so callers can inspect error payloads.
    #[error("Request failed with status {status}: {body}")]
    RequestFailed { status: StatusCode, body: String },

    /// The status was successful but the body did not parse into the requested type.
    #[error("Failed to deserialize response into {type_name}")]
    DeserializeFailed {
        type_name: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Every attempt allowed by the retry policy failed.
    #[error("Request failed after {attempts} attempts")]
    RetryExhausted {
        attempts: u32,
        #[source]
        last_error: Box<HttpLightError>,
    },

    /// The cancellation token fired before the call completed.
    #[error("Request was cancelled")]
    Cancelled,

    /// The transport could not complete the exchange.
    #[error(transparent)]
    Transport(#[from] anyhow::Error),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error("Invalid value for {name}: {message}")]
    Config { name: String, message: String },

    #[error("Failed to start blocking runtime")]
    Runtime(#[source] std::io::Error),

    /// A `_blocking` method was called on a thread that is already driving an
    /// async runtime.
    #[error("Blocking call made from inside an async runtime; use the async method instead")]
    BlockingInAsyncContext,
}

impl HttpLightError {
    /// Returns true if the call ended because its cancellation token fired.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, HttpLightError::Cancelled)
    }

    /// Returns the HTTP status of a [`HttpLightError::RequestFailed`].
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            HttpLightError::RequestFailed { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the error that ended the last attempt of an exhausted retry sequence.
    pub fn last_error(&self) -> Option<&HttpLightError> {
        match self {
            HttpLightError::RetryExhausted { last_error, .. } => Some(last_error),
            _ => None,
        }
    }
}

impl From<reqwest::header::InvalidHeaderName> for HttpLightError {
    fn from(e: reqwest::header::InvalidHeaderName) -> Self {
        HttpLightError::InvalidHeader(e.to_string())
    }
}

impl From<reqwest::header::InvalidHeaderValue> for HttpLightError {
    fn from(e: reqwest::header::InvalidHeaderValue) -> Self {
        HttpLightError::InvalidHeader(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_request_failed_display() {
        let err = HttpLightError::RequestFailed {
            status: StatusCode::NOT_FOUND,
            body: "not found".to_string(),
        };
        assert!(err.to_string().contains("404"));
        assert!(err.to_string().contains("not found"));
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    }

    #[test]
    fn test_deserialize_failed_names_type() {
        let source = serde_json::from_str::<u32>("nope").unwrap_err();
        let err = HttpLightError::DeserializeFailed {
            type_name: "my::Type",
            source,
        };
        assert!(err.to_string().contains("my::Type"));
        assert!(err.source().is_some());
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_retry_exhausted_keeps_last_error() {
        let err = HttpLightError::RetryExhausted {
            attempts: 3,
            last_error: Box::new(HttpLightError::RequestFailed {
                status: StatusCode::BAD_GATEWAY,
                body: String::new(),
            }),
        };
        assert!(err.to_string().contains("3 attempts"));
        assert_eq!(
            err.last_error().and_then(HttpLightError::status),
            Some(StatusCode::BAD_GATEWAY)
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn test_is_cancelled() {
        assert!(HttpLightError::Cancelled.is_cancelled());
        assert!(!HttpLightError::Transport(anyhow::anyhow!("boom")).is_cancelled());
    }

    #[test]
    fn test_transport_error_is_transparent() {
        let err = HttpLightError::from(anyhow::anyhow!("connection reset"));
        assert_eq!(err.to_string(), "connection reset");
    }

    #[test]
    fn test_invalid_header_value_conversion() {
        let bad = reqwest::header::HeaderValue::from_str("line\nbreak").unwrap_err();
        let err = HttpLightError::from(bad);
        assert!(matches!(err, HttpLightError::InvalidHeader(_)));
    }
}
