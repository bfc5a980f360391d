//! Fetch error types for the stats sources.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP error: {status_code} - {message}")]
    Http { status_code: u16, message: String },

    #[error("Rate limited (retry after {retry_after}s)")]
    RateLimited { retry_after: u64 },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Request failed after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded { attempts: u32, last_error: String },
}

impl FetchError {
    /// Build an error from a non-success response body. JSON bodies with a
    /// `message` field (at the top level or under `error`) use that text.
    pub fn from_response(status_code: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|json| {
                let error = json.get("error").unwrap_or(&json);
                error
                    .get("message")
                    .and_then(|v| v.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| body.trim().to_string());

        Self::Http {
            status_code,
            message,
        }
    }

    /// Whether this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. }
                | Self::Network(_)
                | Self::Timeout(_)
                | Self::Http {
                    status_code: 500..=599,
                    ..
                }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_response_message() {
        let err = FetchError::from_response(404, r#"{"message": "Object not found"}"#);
        assert!(matches!(err, FetchError::Http { status_code: 404, ref message } if message == "Object not found"));

        let err = FetchError::from_response(400, r#"{"error": {"message": "bad gamePk"}}"#);
        assert!(matches!(err, FetchError::Http { ref message, .. } if message == "bad gamePk"));

        let err = FetchError::from_response(403, "Access Denied\n");
        assert!(matches!(err, FetchError::Http { ref message, .. } if message == "Access Denied"));
    }

    #[test]
    fn test_retryable() {
        assert!(FetchError::Http { status_code: 503, message: String::new() }.is_retryable());
        assert!(!FetchError::Http { status_code: 404, message: String::new() }.is_retryable());
        assert!(FetchError::Timeout("slow".into()).is_retryable());
        assert!(!FetchError::Deserialization("eof".into()).is_retryable());
    }
}
