use axum::{extract::Request, middleware::Next, response::Response};

use super::auth::MaybeAuthUser;
use crate::error::ApiError;

/// Access gate for mutating routes. Turns the optional identity left by
/// `authenticate` into a required `AuthUser` extension, or answers 401
/// before the handler (and the store) is reached.
pub async fn require_user(mut request: Request, next: Next) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<MaybeAuthUser>()
        .and_then(|maybe| maybe.0.clone())
        .ok_or_else(|| {
            tracing::debug!("Rejected anonymous {} {}", request.method(), request.uri().path());
            ApiError::unauthorized("Authentication required")
        })?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}
