use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::{decode, decode_header, jwk::JwkSet, Algorithm, DecodingKey, Validation};
use reqwest::header::CACHE_CONTROL;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::{user_from_claims, AuthUser, TokenVerifier, VerifyError};

/// Google's published signing keys for Firebase ID tokens
pub const FIREBASE_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

const DEFAULT_KEY_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Deserialize)]
struct FirebaseClaims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    auth_time: Option<i64>,
}

struct CachedKeys {
    keys: JwkSet,
    expires_at: Instant,
}

/// Verifies Firebase ID tokens (RS256) for one project
pub struct FirebaseVerifier {
    project_id: String,
    jwks_url: String,
    client: reqwest::Client,
    cache: RwLock<Option<CachedKeys>>,
}

impl FirebaseVerifier {
    pub fn new(project_id: impl Into<String>) -> Result<Self, VerifyError> {
        Self::with_jwks_url(project_id, FIREBASE_JWKS_URL)
    }

    pub fn with_jwks_url(project_id: impl Into<String>, jwks_url: impl Into<String>) -> Result<Self, VerifyError> {
        let project_id = project_id.into();
        if project_id.trim().is_empty() {
            return Err(VerifyError::Misconfigured("FIREBASE_PROJECT_ID is empty"));
        }

        Ok(Self {
            project_id,
            jwks_url: jwks_url.into(),
            client: reqwest::Client::new(),
            cache: RwLock::new(None),
        })
    }

    fn issuer(&self) -> String {
        format!("https://securetoken.google.com/{}", self.project_id)
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.project_id]);
        validation.set_issuer(&[self.issuer()]);
        validation.set_required_spec_claims(&["exp", "sub", "aud", "iss"]);
        validation
    }

    async fn signing_keys(&self) -> Result<JwkSet, VerifyError> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.expires_at > Instant::now() {
                    return Ok(cached.keys.clone());
                }
            }
        }

        let response = self
            .client
            .get(&self.jwks_url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| VerifyError::KeyFetch(e.to_string()))?;

        let ttl = response
            .headers()
            .get(CACHE_CONTROL)
            .and_then(|v| v.to_str().ok())
            .and_then(max_age)
            .unwrap_or(DEFAULT_KEY_TTL);

        let keys: JwkSet = response
            .json()
            .await
            .map_err(|e| VerifyError::KeyFetch(e.to_string()))?;

        info!("Fetched {} Firebase signing key(s), cached for {:?}", keys.keys.len(), ttl);

        let mut cache = self.cache.write().await;
        *cache = Some(CachedKeys {
            keys: keys.clone(),
            expires_at: Instant::now() + ttl,
        });
        Ok(keys)
    }
}

#[async_trait]
impl TokenVerifier for FirebaseVerifier {
    async fn verify(&self, token: &str) -> Result<AuthUser, VerifyError> {
        let header = decode_header(token).map_err(|e| VerifyError::Malformed(e.to_string()))?;
        if header.alg != Algorithm::RS256 {
            return Err(VerifyError::Invalid(format!("unexpected algorithm {:?}", header.alg)));
        }
        let kid = header
            .kid
            .ok_or_else(|| VerifyError::Malformed("token header has no kid".to_string()))?;

        let keys = self.signing_keys().await?;
        let jwk = keys
            .find(&kid)
            .ok_or_else(|| VerifyError::UnknownKey(kid.clone()))?;
        let decoding_key =
            DecodingKey::from_jwk(jwk).map_err(|e| VerifyError::Invalid(e.to_string()))?;

        let token_data = decode::<FirebaseClaims>(token, &decoding_key, &self.validation())
            .map_err(|e| VerifyError::Invalid(e.to_string()))?;

        let claims = token_data.claims;
        if let Some(auth_time) = claims.auth_time {
            if auth_time > chrono::Utc::now().timestamp() {
                return Err(VerifyError::Invalid("auth_time is in the future".to_string()));
            }
        }

        debug!("Verified Firebase token for subject {}", claims.sub);
        user_from_claims(claims.sub, claims.email)
    }
}

/// Extracts `max-age` from a Cache-Control header value
fn max_age(cache_control: &str) -> Option<Duration> {
    cache_control
        .split(',')
        .filter_map(|directive| directive.trim().strip_prefix("max-age="))
        .find_map(|secs| secs.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
