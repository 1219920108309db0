//! HTTP plumbing shared by the provider clients.

use std::time::Duration;

use serde::Deserialize;

use tutor_core::error::ProviderError;

/// Build a client. No timeout is set unless one is configured.
pub(crate) fn build_client(timeout_secs: Option<u64>) -> anyhow::Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if let Some(secs) = timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    Ok(builder.build()?)
}

/// Classify a transport-level failure.
pub(crate) fn send_error(e: reqwest::Error, timeout_secs: Option<u64>) -> ProviderError {
    match timeout_secs {
        Some(secs) if e.is_timeout() => ProviderError::Timeout(secs),
        _ => ProviderError::NetworkError(e.to_string()),
    }
}

/// Both OpenAI and Gemini wrap failures as `{"error": {"message": ...}}`.
#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

fn error_message(body: String) -> String {
    serde_json::from_str::<ErrorEnvelope>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body)
}

/// Turn a non-success response into a `ProviderError`; pass successes through.
pub(crate) async fn check_status(
    response: reqwest::Response,
    model: &str,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status().as_u16();
    if status < 400 {
        return Ok(response);
    }
    if status == 429 {
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(5)
            * 1000;
        return Err(ProviderError::RateLimited {
            retry_after_ms: retry_after,
        });
    }
    let body = response.text().await.unwrap_or_default();
    Err(match status {
        401 | 403 => ProviderError::AuthenticationFailed(error_message(body)),
        404 => ProviderError::ModelNotFound(model.to_string()),
        _ => ProviderError::ApiError {
            status,
            message: error_message(body),
        },
    })
}
