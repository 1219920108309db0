//! HTTP route groups.

pub mod health;
pub mod tutor;
