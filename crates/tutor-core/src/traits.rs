//! Core trait definitions for text-generation providers.
//!
//! The trait is implemented by the `tutor-providers` crate for OpenAI and
//! Gemini, and by its mock provider for tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// LLM Provider trait
// ---------------------------------------------------------------------------

/// Trait for text-generation backends that turn a prompt into feedback text.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g. "openai").
    fn name(&self) -> &str;

    /// Generate text from a prompt. Exactly one upstream call per invocation.
    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse>;
}

/// Request to generate text from an LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Model identifier (e.g. "gpt-4o-mini").
    pub model: String,
    /// System role instruction.
    pub system_prompt: String,
    /// The user turn.
    pub prompt: String,
    /// Sampling temperature; `None` leaves the provider default.
    #[serde(default)]
    pub temperature: Option<f64>,
    /// Maximum tokens to generate; `None` leaves the provider default.
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

/// Response from an LLM generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// The raw response content. Empty when the provider returned none.
    pub content: String,
    /// Model that actually generated the response.
    pub model: String,
    /// Latency in milliseconds.
    pub latency_ms: u64,
}

impl GenerateResponse {
    /// The trimmed content, or `None` if there is nothing but whitespace.
    pub fn text(&self) -> Option<&str> {
        let trimmed = self.content.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    }
}
