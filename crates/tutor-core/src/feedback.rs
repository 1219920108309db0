//! The feedback service behind `POST /api/tutor`.
//!
//! A request goes through the same steps every time: validate the answer,
//! check that a provider credential is configured, build the prompt, call
//! the provider once, and fall back to a fixed phrase when the provider
//! returns nothing. There are no retries and no shared mutable state.

use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::error::{FeedbackError, ProviderError};
use crate::prompt::{build_prompt, FALLBACK_FEEDBACK, TUTOR_SYSTEM_PROMPT};
use crate::traits::{GenerateRequest, LlmProvider};

/// Minimum number of characters in a trimmed answer.
pub const MIN_ANSWER_CHARS: usize = 5;

/// Payload sent by the exercise page when a student asks for feedback.
///
/// Every field is optional on the wire; absent keys and contexts behave as
/// empty strings, an absent answer fails validation. Non-string scalars are
/// accepted and rendered as text, so `123456` is the answer `"123456"`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    #[serde(default, deserialize_with = "lenient_text")]
    pub field_key: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub prompt_context: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub student_answer: Option<String>,
}

/// Read any JSON value as text. `null`, `false`, `0` and `""` count as absent.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = match Value::deserialize(deserializer)? {
        Value::Null | Value::Bool(false) => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    };
    Ok(text)
}

impl FeedbackRequest {
    pub fn new(field_key: &str, prompt_context: &str, student_answer: &str) -> Self {
        Self {
            field_key: Some(field_key.to_string()),
            prompt_context: Some(prompt_context.to_string()),
            student_answer: Some(student_answer.to_string()),
        }
    }

    /// Parse a raw JSON body. An empty body is treated as `{}`.
    pub fn from_json_bytes(body: &[u8]) -> Result<Self, FeedbackError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body).map_err(|e| FeedbackError::MalformedBody(e.to_string()))
    }

    pub fn field_key(&self) -> &str {
        self.field_key.as_deref().unwrap_or_default()
    }

    pub fn prompt_context(&self) -> &str {
        self.prompt_context.as_deref().unwrap_or_default()
    }

    pub fn student_answer(&self) -> &str {
        self.student_answer.as_deref().unwrap_or_default()
    }

    /// Reject missing or too-short answers.
    pub fn validate(&self) -> Result<(), FeedbackError> {
        match &self.student_answer {
            Some(answer) if answer.trim().chars().count() >= MIN_ANSWER_CHARS => Ok(()),
            _ => Err(FeedbackError::InvalidAnswer),
        }
    }
}

/// Feedback returned to the exercise page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackResponse {
    pub text: String,
}

/// Model settings applied to every provider call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSettings {
    pub model: String,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

/// The provider a service talks to, or the credential it is waiting for.
#[derive(Clone)]
pub enum Backend {
    Ready(Arc<dyn LlmProvider>),
    MissingCredential { credential: String },
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Ready(provider) => f.debug_tuple("Ready").field(&provider.name()).finish(),
            Backend::MissingCredential { credential } => f
                .debug_struct("MissingCredential")
                .field("credential", credential)
                .finish(),
        }
    }
}

/// Stateless feedback service; cheap to clone and share across requests.
#[derive(Debug, Clone)]
pub struct TutorService {
    backend: Backend,
    settings: GenerationSettings,
}

impl TutorService {
    pub fn new(backend: Backend, settings: GenerationSettings) -> Self {
        Self { backend, settings }
    }

    /// Name of the configured provider, or `"unconfigured"`.
    pub fn provider_name(&self) -> &str {
        match &self.backend {
            Backend::Ready(provider) => provider.name(),
            Backend::MissingCredential { .. } => "unconfigured",
        }
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    /// Answer one feedback request.
    #[instrument(skip_all, fields(field_key = %request.field_key()))]
    pub async fn feedback(
        &self,
        request: &FeedbackRequest,
    ) -> Result<FeedbackResponse, FeedbackError> {
        request.validate()?;

        let provider = match &self.backend {
            Backend::Ready(provider) => provider,
            Backend::MissingCredential { credential } => {
                warn!(%credential, "feedback requested without a provider credential");
                return Err(FeedbackError::MissingCredential {
                    credential: credential.clone(),
                });
            }
        };

        let generate = GenerateRequest {
            model: self.settings.model.clone(),
            system_prompt: TUTOR_SYSTEM_PROMPT.to_string(),
            prompt: build_prompt(
                request.field_key(),
                request.prompt_context(),
                request.student_answer(),
            ),
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };

        let response = provider.generate(&generate).await.map_err(|e| {
            let kind = e
                .downcast_ref::<ProviderError>()
                .map(ProviderError::kind)
                .unwrap_or("other");
            warn!(provider = provider.name(), kind, error = %e, "provider call failed");
            FeedbackError::Provider(e.to_string())
        })?;

        info!(
            provider = provider.name(),
            model = %response.model,
            latency_ms = response.latency_ms,
            "feedback generated"
        );

        let text = response.text().unwrap_or(FALLBACK_FEEDBACK).to_string();
        Ok(FeedbackResponse { text })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;

    use crate::traits::GenerateResponse;

    struct Echo {
        reply: String,
        calls: AtomicU32,
    }

    #[async_trait]
    impl LlmProvider for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            Ok(GenerateResponse {
                content: self.reply.clone(),
                model: request.model.clone(),
                latency_ms: 0,
            })
        }
    }

    fn settings() -> GenerationSettings {
        GenerationSettings {
            model: "test-model".into(),
            temperature: Some(0.4),
            max_tokens: None,
        }
    }

    fn service(reply: &str) -> (Arc<Echo>, TutorService) {
        let echo = Arc::new(Echo {
            reply: reply.into(),
            calls: AtomicU32::new(0),
        });
        let service = TutorService::new(Backend::Ready(echo.clone()), settings());
        (echo, service)
    }

    #[test]
    fn validation_counts_trimmed_chars() {
        assert!(FeedbackRequest::new("k", "c", "   ok  ").validate().is_err());
        assert!(FeedbackRequest::new("k", "c", "four").validate().is_err());
        assert!(FeedbackRequest::new("k", "c", " fiver ").validate().is_ok());
        assert!(FeedbackRequest::default().validate().is_err());
    }

    #[test]
    fn validation_counts_characters_not_bytes() {
        assert!(FeedbackRequest::new("k", "c", "éé").validate().is_err());
        assert!(FeedbackRequest::new("k", "c", "ééééé").validate().is_ok());
    }

    #[test]
    fn parse_empty_body_as_empty_object() {
        let request = FeedbackRequest::from_json_bytes(b"  ").unwrap();
        assert_eq!(request, FeedbackRequest::default());
    }

    #[test]
    fn parse_camel_case_body() {
        let body = br#"{"fieldKey":"partB_0","promptContext":"Housing","studentAnswer":"ok"}"#;
        let request = FeedbackRequest::from_json_bytes(body).unwrap();
        assert_eq!(request.field_key(), "partB_0");
        assert_eq!(request.prompt_context(), "Housing");
        assert_eq!(request.student_answer(), "ok");
    }

    #[test]
    fn parse_scalar_answer_as_text() {
        let request = FeedbackRequest::from_json_bytes(br#"{"studentAnswer":123456}"#).unwrap();
        assert_eq!(request.student_answer(), "123456");
        assert!(request.validate().is_ok());

        for falsy in ["null", "false", "0", "\"\""] {
            let body = format!(r#"{{"fieldKey":"partA","studentAnswer":{falsy}}}"#);
            let request = FeedbackRequest::from_json_bytes(body.as_bytes()).unwrap();
            assert_eq!(request.student_answer, None, "{falsy}");
            assert_eq!(request.validate(), Err(FeedbackError::InvalidAnswer));
        }
    }

    #[test]
    fn parse_rejects_malformed_json() {
        let err = FeedbackRequest::from_json_bytes(b"{not json").unwrap_err();
        assert!(matches!(err, FeedbackError::MalformedBody(_)));
    }

    #[tokio::test]
    async fn short_answer_never_calls_provider() {
        let (echo, service) = service("unused");
        let err = service
            .feedback(&FeedbackRequest::new("partB_0", "ctx", "ok"))
            .await
            .unwrap_err();
        assert_eq!(err, FeedbackError::InvalidAnswer);
        assert_eq!(echo.calls.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn returns_trimmed_provider_text() {
        let (echo, service) = service("  What makes land scarce here?  ");
        let response = service
            .feedback(&FeedbackRequest::new(
                "partA",
                "x",
                "Land is scarce because forests compete with housing.",
            ))
            .await
            .unwrap();
        assert_eq!(response.text, "What makes land scarce here?");
        assert_eq!(echo.calls.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn empty_reply_uses_fallback() {
        let (_, service) = service("");
        let response = service
            .feedback(&FeedbackRequest::new("partB_1", "ctx", "A valid answer"))
            .await
            .unwrap();
        assert_eq!(response.text, FALLBACK_FEEDBACK);
    }

    #[tokio::test]
    async fn missing_credential_rejects_valid_requests() {
        let service = TutorService::new(
            Backend::MissingCredential {
                credential: "OPENAI_API_KEY".into(),
            },
            settings(),
        );
        let err = service
            .feedback(&FeedbackRequest::new("partA", "", "A long enough answer"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Missing OPENAI_API_KEY on server.");
        assert_eq!(service.provider_name(), "unconfigured");
    }

    #[tokio::test]
    async fn validation_precedes_credential_check() {
        let service = TutorService::new(
            Backend::MissingCredential {
                credential: "GEMINI_API_KEY".into(),
            },
            settings(),
        );
        let err = service
            .feedback(&FeedbackRequest::new("partA", "", "no"))
            .await
            .unwrap_err();
        assert_eq!(err, FeedbackError::InvalidAnswer);
    }
}
