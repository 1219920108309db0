//! Teacher sign-in gate.
//!
//! The identity provider itself is external: all this module needs is
//! something that can send a one-time code to an email address and later
//! turn `(email, code)` into an [`Identity`]. The gate adds the rules around
//! it: normalized emails, the institutional domain suffix, and the 6
//! character code format.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// Domain suffix teachers sign in with unless configured otherwise.
pub const DEFAULT_TEACHER_DOMAIN: &str = "@ri.edu.sg";

/// Length of the one-time code sent by email.
pub const OTP_LEN: usize = 6;

/// An authenticated user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub email: String,
}

/// Email one-time-code identity provider.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Ask the provider to email a code.
    async fn send_code(&self, email: &str) -> anyhow::Result<()>;

    /// Exchange an emailed code for an identity.
    async fn verify_code(&self, email: &str, code: &str) -> anyhow::Result<Identity>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Email must end with {0}.")]
    DomainNotAllowed(String),

    #[error("Enter the 6 digit OTP.")]
    InvalidCode,

    /// The provider rejected the request; its message is passed through.
    #[error("{0}")]
    Provider(String),
}

/// Applies the teacher-console rules on top of an [`Authenticator`].
#[derive(Debug, Clone)]
pub struct TeacherGate {
    domain: String,
}

impl Default for TeacherGate {
    fn default() -> Self {
        Self::new(DEFAULT_TEACHER_DOMAIN)
    }
}

impl TeacherGate {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into().to_lowercase(),
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Trim and lowercase an email address.
    pub fn normalize_email(email: &str) -> String {
        email.trim().to_lowercase()
    }

    /// Whether a session belongs to a teacher.
    pub fn is_teacher(&self, identity: &Identity) -> bool {
        identity.email.to_lowercase().ends_with(&self.domain)
    }

    /// Validate the email and ask the provider for a code.
    pub async fn request_code(
        &self,
        auth: &dyn Authenticator,
        email: &str,
    ) -> Result<String, AuthError> {
        let email = Self::normalize_email(email);
        if !email.ends_with(&self.domain) {
            return Err(AuthError::DomainNotAllowed(self.domain.clone()));
        }
        auth.send_code(&email).await.map_err(|e| {
            warn!(error = %e, "sending sign-in code failed");
            AuthError::Provider(e.to_string())
        })?;
        Ok(email)
    }

    /// Verify a code and confirm the resulting identity is a teacher.
    pub async fn sign_in(
        &self,
        auth: &dyn Authenticator,
        email: &str,
        code: &str,
    ) -> Result<Identity, AuthError> {
        let email = Self::normalize_email(email);
        let code = code.trim();
        if code.chars().count() != OTP_LEN {
            return Err(AuthError::InvalidCode);
        }
        let identity = auth.verify_code(&email, code).await.map_err(|e| {
            warn!(error = %e, "code verification failed");
            AuthError::Provider(e.to_string())
        })?;
        if !self.is_teacher(&identity) {
            return Err(AuthError::DomainNotAllowed(self.domain.clone()));
        }
        info!(email = %identity.email, "teacher signed in");
        Ok(identity)
    }
}
