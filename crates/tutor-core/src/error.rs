//! Error types shared across the workspace.
//!
//! `ProviderError` represents failures when talking to a text-generation
//! provider. It lives in `tutor-core` so the feedback service can downcast
//! and log the failure class without string matching. `FeedbackError` is the
//! taxonomy the feedback endpoint reports to callers.

use thiserror::Error;

/// Errors that can occur when interacting with an LLM provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Authentication failed (invalid API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The requested model was not found.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),
}

impl ProviderError {
    /// Short label for the failure class, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::RateLimited { .. } => "rate_limited",
            ProviderError::AuthenticationFailed(_) => "auth",
            ProviderError::ModelNotFound(_) => "model_not_found",
            ProviderError::ApiError { .. } => "api",
            ProviderError::Timeout(_) => "timeout",
            ProviderError::NetworkError(_) => "network",
        }
    }
}

/// Why a feedback request could not be answered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedbackError {
    /// The student answer is missing or too short.
    #[error("Please write your answer before requesting feedback.")]
    InvalidAnswer,

    /// The request body could not be parsed.
    #[error("Invalid JSON body: {0}")]
    MalformedBody(String),

    /// No credential is configured for the selected provider.
    #[error("Missing {credential} on server.")]
    MissingCredential { credential: String },

    /// The provider call failed; the message is passed through verbatim.
    #[error("{0}")]
    Provider(String),
}

impl FeedbackError {
    /// `true` for errors caused by the caller's input.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            FeedbackError::InvalidAnswer | FeedbackError::MalformedBody(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credential_names_the_key() {
        let err = FeedbackError::MissingCredential {
            credential: "GEMINI_API_KEY".into(),
        };
        assert_eq!(err.to_string(), "Missing GEMINI_API_KEY on server.");
        assert!(!err.is_client_error());
    }

    #[test]
    fn provider_message_passes_through() {
        let err = FeedbackError::Provider("API error (HTTP 500): boom".into());
        assert_eq!(err.to_string(), "API error (HTTP 500): boom");
    }

    #[test]
    fn invalid_answer_is_client_error() {
        assert!(FeedbackError::InvalidAnswer.is_client_error());
        assert!(FeedbackError::MalformedBody("eof".into()).is_client_error());
    }
}
