use axum::{
    extract::DefaultBodyLimit,
    http::{header::CONTENT_TYPE, HeaderName, HeaderValue, Method},
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::config::{AppConfig, SecurityConfig};
use crate::error::ApiError;
use crate::handlers::{self, protected, public};
use crate::middleware::{authenticate, require_user, AUTH_TOKEN_HEADER};
use crate::state::AppState;

/// Full application: `/api` routes, health check, and the SPA shell for
/// every other path.
pub fn app(state: AppState, config: &AppConfig) -> Router {
    let static_dir = &config.server.static_dir;
    let spa = ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html")));

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api", api_routes(state.clone()))
        .fallback_service(spa)
        // Global middleware
        .layer(DefaultBodyLimit::max(config.server.max_request_size_bytes))
        .layer(cors_layer(&config.security))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Article routes, relative to `/api`.
///
/// Every route runs the authentication gate first. The fetch route is
/// registered outside the access gate; upvote and comment sit behind it.
pub fn api_routes(state: AppState) -> Router<AppState> {
    let public_routes = Router::new().route("/articles/:name", get(public::article_get));

    let protected_routes = Router::new()
        .route("/articles/:name/upvote", put(protected::upvote_put))
        .route("/articles/:name/comments", post(protected::comment_post))
        .route_layer(middleware::from_fn(require_user));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .fallback(api_not_found)
        .layer(middleware::from_fn_with_state(state, authenticate))
}

async fn api_not_found() -> ApiError {
    ApiError::not_found("Route not found")
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }
    if security.cors_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::PUT, Method::POST])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static(AUTH_TOKEN_HEADER)])
}
