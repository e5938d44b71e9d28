// handlers/public/articles.rs - GET /api/articles/:name handler

use axum::{
    extract::{Path, State},
    Extension, Json,
};

use crate::database::ArticleView;
use crate::error::ApiError;
use crate::middleware::MaybeAuthUser;
use crate::state::AppState;

/// GET /api/articles/:name - article annotated with `canUpvote` for the caller.
///
/// Eligibility is derived from the `upvoteIds` just read, so a caller who has
/// already voted sees `false`; anonymous callers always see `false`.
pub async fn article_get(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Extension(user): Extension<MaybeAuthUser>,
) -> Result<Json<ArticleView>, ApiError> {
    let article = state
        .store
        .find_by_name(&name)
        .await?
        .ok_or_else(|| ApiError::not_found("Article not found"))?;

    Ok(Json(ArticleView::for_caller(article, user.uid())))
}
