use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Request header carrying the opaque identity token
pub const AUTH_TOKEN_HEADER: &str = "authtoken";

/// Identity attached to every `/api` request; `None` for anonymous callers
#[derive(Clone, Debug, Default)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl MaybeAuthUser {
    pub fn uid(&self) -> Option<&str> {
        self.0.as_ref().map(|u| u.uid.as_str())
    }
}

enum TokenHeader {
    Absent,
    Present(String),
    Unreadable,
}

/// Best-effort identity resolution. Requests without a token pass through
/// anonymously; a token that fails verification ends the request here.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let identity = match extract_token(request.headers()) {
        TokenHeader::Absent => None,
        TokenHeader::Present(token) => match state.verifier.verify(&token).await {
            Ok(user) => {
                debug!("Resolved identity {} for {}", user.uid, request.uri().path());
                Some(user)
            }
            Err(e) => {
                warn!("Token verification failed for {}: {}", request.uri().path(), e);
                return Err(verification_failure(&state));
            }
        },
        TokenHeader::Unreadable => {
            warn!("Unreadable {} header on {}", AUTH_TOKEN_HEADER, request.uri().path());
            return Err(verification_failure(&state));
        }
    };

    request.extensions_mut().insert(MaybeAuthUser(identity));
    Ok(next.run(request).await)
}

fn extract_token(headers: &HeaderMap) -> TokenHeader {
    match headers.get(AUTH_TOKEN_HEADER) {
        None => TokenHeader::Absent,
        Some(value) => match value.to_str() {
            Ok(token) if token.trim().is_empty() => TokenHeader::Absent,
            Ok(token) => TokenHeader::Present(token.trim().to_string()),
            Err(_) => TokenHeader::Unreadable,
        },
    }
}

// Rejected credentials answer 404 unless masking is switched off
fn verification_failure(state: &AppState) -> ApiError {
    if state.mask_verification_failures {
        ApiError::not_found("Not found")
    } else {
        ApiError::unauthorized("Invalid authentication token")
    }
}
