use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::{user_from_claims, AuthUser, TokenVerifier, VerifyError};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    /// Lifetimes past the representable range saturate to the latest timestamp
    pub fn new(sub: impl Into<String>, email: Option<String>, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = i64::try_from(expiry_hours)
            .ok()
            .and_then(Duration::try_hours)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .map_or(i64::MAX, |at| at.timestamp());

        Self {
            sub: sub.into(),
            email,
            exp,
            iat: now.timestamp(),
        }
    }
}

/// Signs an HS256 token for the given subject
pub fn issue_token(secret: &str, claims: &Claims) -> Result<String, VerifyError> {
    if secret.is_empty() {
        return Err(VerifyError::Misconfigured("JWT secret is empty"));
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| VerifyError::Malformed(e.to_string()))
}

/// Verifier for HS256 tokens signed with a shared secret
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str) -> Result<Self, VerifyError> {
        if secret.is_empty() {
            return Err(VerifyError::Misconfigured("JWT secret is empty"));
        }

        Ok(Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::default(),
        })
    }
}

#[async_trait]
impl TokenVerifier for JwtVerifier {
    async fn verify(&self, token: &str) -> Result<AuthUser, VerifyError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| VerifyError::Invalid(e.to_string()))?;

        user_from_claims(token_data.claims.sub, token_data.claims.email)
    }
}
