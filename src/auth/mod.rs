use async_trait::async_trait;
use thiserror::Error;

pub mod firebase;
pub mod jwt;

pub use firebase::FirebaseVerifier;
pub use jwt::{issue_token, JwtVerifier};

/// Identity resolved from a verified credential
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub uid: String,
    pub email: Option<String>,
}

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("Malformed token: {0}")]
    Malformed(String),

    #[error("Invalid token: {0}")]
    Invalid(String),

    #[error("No signing key with id '{0}'")]
    UnknownKey(String),

    #[error("Failed to fetch signing keys: {0}")]
    KeyFetch(String),

    #[error("Token verifier misconfigured: {0}")]
    Misconfigured(&'static str),
}

/// Verifies an opaque credential and resolves the identity it carries
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<AuthUser, VerifyError>;
}

/// Maps decoded claims to an identity, refusing tokens without a subject
pub(crate) fn user_from_claims(sub: String, email: Option<String>) -> Result<AuthUser, VerifyError> {
    if sub.trim().is_empty() {
        return Err(VerifyError::Invalid("token has an empty subject".to_string()));
    }
    Ok(AuthUser { uid: sub, email })
}
