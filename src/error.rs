use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Failure of a single provider call (detect, translate or list languages).
///
/// These never leave the translation orchestrator; they are logged and
/// folded into a degraded `TranslationResult`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProviderError {
    #[error("translation provider is disabled")]
    Disabled,

    #[error("unsupported language pair: {source_language} -> {target_language}")]
    UnsupportedLanguagePair {
        source_language: String,
        target_language: String,
    },

    #[error("provider call timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("provider API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("provider request failed: {0}")]
    Request(String),

    #[error("invalid provider response: {0}")]
    InvalidResponse(String),

    #[error("failed to sign request: {0}")]
    Signing(String),
}

impl ProviderError {
    /// Short label used for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::Disabled => "disabled",
            ProviderError::UnsupportedLanguagePair { .. } => "unsupported_language_pair",
            ProviderError::Timeout(_) => "timeout",
            ProviderError::Api { .. } => "api",
            ProviderError::Request(_) => "request",
            ProviderError::InvalidResponse(_) => "invalid_response",
            ProviderError::Signing(_) => "signing",
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ProviderError::InvalidResponse(err.to_string())
        } else {
            ProviderError::Request(err.to_string())
        }
    }
}

/// Failure of `EmailProcessor::process`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProcessError {
    /// `from` or `to` is absent or empty.
    #[error("Missing required fields: from, to")]
    MissingField,

    #[error("{0}")]
    Internal(String),
}

/// Errors returned by HTTP handlers, rendered as `{"error": "..."}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ProcessError> for ApiError {
    fn from(err: ProcessError) -> Self {
        match err {
            ProcessError::MissingField => ApiError::BadRequest(err.to_string()),
            ProcessError::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_kinds() {
        assert_eq!(ProviderError::Disabled.kind(), "disabled");
        assert_eq!(
            ProviderError::Timeout(std::time::Duration::from_secs(1)).kind(),
            "timeout"
        );
        assert_eq!(
            ProviderError::UnsupportedLanguagePair {
                source_language: "vi".to_string(),
                target_language: "en".to_string(),
            }
            .kind(),
            "unsupported_language_pair"
        );
    }

    #[test]
    fn test_provider_error_display_includes_status() {
        let err = ProviderError::Api {
            status: 503,
            body: "Service Unavailable".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("503"));
        assert!(message.contains("Service Unavailable"));
    }

    #[test]
    fn test_missing_field_message() {
        let err = ProcessError::MissingField;
        assert_eq!(err.to_string(), "Missing required fields: from, to");
    }

    #[test]
    fn test_process_error_maps_to_api_status() {
        let bad: ApiError = ProcessError::MissingField.into();
        assert_eq!(bad.status_code(), StatusCode::BAD_REQUEST);

        let internal: ApiError = ProcessError::Internal("boom".to_string()).into();
        assert_eq!(internal.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(internal.to_string(), "boom");
    }
}
