//! tutor-server — the HTTP surface of dover-tutor.
//!
//! Exposes `POST /api/tutor` (Socratic feedback on a student answer) and a
//! `GET /health` probe. The `dover-tutor` binary wraps this router together
//! with the submission and prompt commands.

pub mod app;
pub mod response;
pub mod routes;

pub use app::{router, AppState};
