//! Mock provider for testing.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use tutor_core::error::ProviderError;
use tutor_core::traits::{GenerateRequest, GenerateResponse, LlmProvider};

enum Reply {
    Text(String),
    Fail(String),
}

/// A mock LLM provider for exercising the feedback service without real
/// API calls.
pub struct MockProvider {
    reply: Reply,
    /// Number of calls made.
    call_count: AtomicU32,
    /// Last request received.
    last_request: Mutex<Option<GenerateRequest>>,
}

impl MockProvider {
    fn with_reply(reply: Reply) -> Self {
        Self {
            reply,
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Create a mock that always returns the same text.
    pub fn with_fixed_response(response: &str) -> Self {
        Self::with_reply(Reply::Text(response.to_string()))
    }

    /// Create a mock whose replies carry no content.
    pub fn with_empty_response() -> Self {
        Self::with_reply(Reply::Text(String::new()))
    }

    /// Create a mock that fails every call with an API error carrying
    /// `message`.
    pub fn failing(message: &str) -> Self {
        Self::with_reply(Reply::Fail(message.to_string()))
    }

    /// Get the number of calls made to this provider.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Get the last request made to this provider.
    pub fn last_request(&self) -> Option<GenerateRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self.last_request.lock().unwrap() = Some(request.clone());

        match &self.reply {
            Reply::Text(content) => Ok(GenerateResponse {
                content: content.clone(),
                model: request.model.clone(),
                latency_ms: 1,
            }),
            Reply::Fail(message) => Err(ProviderError::ApiError {
                status: 503,
                message: message.clone(),
            }
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> GenerateRequest {
        GenerateRequest {
            model: "mock".into(),
            system_prompt: "system".into(),
            prompt: "anything".into(),
            temperature: None,
            max_tokens: None,
        }
    }

    #[tokio::test]
    async fn fixed_response() {
        let provider = MockProvider::with_fixed_response("Think about trade-offs.");
        let response = provider.generate(&request()).await.unwrap();
        assert_eq!(response.content, "Think about trade-offs.");
        assert_eq!(provider.call_count(), 1);
        assert_eq!(provider.last_request().unwrap().prompt, "anything");
    }

    #[tokio::test]
    async fn failing_provider() {
        let provider = MockProvider::failing("overloaded");
        let err = provider.generate(&request()).await.unwrap_err();
        assert_eq!(err.to_string(), "API error (HTTP 503): overloaded");
        assert_eq!(provider.call_count(), 1);
    }
}
