//! tutor-providers — text-generation provider integrations.
//!
//! Implements the `LlmProvider` trait for OpenAI and Gemini, plus a mock
//! provider, and turns configuration into a ready `TutorService`.

pub mod config;
pub mod gemini;
mod http;
pub mod mock;
pub mod openai;

pub use config::{build_service, create_provider, load_config, ProviderConfig, TutorConfig};
pub use tutor_core::error::ProviderError;
