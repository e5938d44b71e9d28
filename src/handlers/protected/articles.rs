// handlers/protected/articles.rs - mutating article handlers
//
// PUT  /api/articles/:name/upvote
// POST /api/articles/:name/comments

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde::Deserialize;
use tracing::debug;

use crate::auth::AuthUser;
use crate::database::{Article, Comment};
use crate::error::ApiError;
use crate::state::AppState;

const MISSING_ARTICLE: &str = "That article doesn't exist";

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    /// Stored as given; no length or content checks
    pub text: String,
}

/// PUT /api/articles/:name/upvote - record the caller's vote once.
///
/// The eligibility check and the increment are a single conditional store
/// update, so repeated or concurrent votes from one subject count once. A
/// vote that does not apply is not an error; the current article is returned
/// either way.
pub async fn upvote_put(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Article>, ApiError> {
    let applied = state.store.record_upvote(&name, &user.uid).await?;
    debug!("Upvote by {} on '{}' applied: {}", user.uid, name, applied);

    let article = state
        .store
        .find_by_name(&name)
        .await?
        .ok_or_else(|| ApiError::not_found(MISSING_ARTICLE))?;

    Ok(Json(article))
}

/// POST /api/articles/:name/comments - append `{postedBy, text}` and return the article
pub async fn comment_post(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<CommentRequest>, JsonRejection>,
) -> Result<Json<Article>, ApiError> {
    let Json(body) = payload?;

    let comment = Comment {
        posted_by: user.email,
        text: body.text,
    };

    if !state.store.push_comment(&name, comment).await? {
        return Err(ApiError::not_found(MISSING_ARTICLE));
    }
    debug!("Comment by {} on '{}'", user.uid, name);

    let article = state
        .store
        .find_by_name(&name)
        .await?
        .ok_or_else(|| ApiError::not_found(MISSING_ARTICLE))?;

    Ok(Json(article))
}
