//! tutor-core — prompt construction, the feedback service, and the Dover
//! Forest exercise domain model.
//!
//! This crate defines the provider trait and the data types the rest of the
//! dover-tutor workspace builds on.

pub mod auth;
pub mod error;
pub mod exercise;
pub mod feedback;
pub mod prompt;
pub mod submission;
pub mod traits;

pub use error::{FeedbackError, ProviderError};
pub use feedback::{Backend, FeedbackRequest, FeedbackResponse, GenerationSettings, TutorService};
pub use traits::{GenerateRequest, GenerateResponse, LlmProvider};
