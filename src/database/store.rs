use async_trait::async_trait;
use thiserror::Error;

use super::models::{Article, Comment};

/// Errors from article store backends
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Corrupt document: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Document collection of articles keyed by name.
///
/// Every mutating method is a single atomic operation against one document;
/// callers never combine a read and a write to enforce an invariant.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Point lookup by article name
    async fn find_by_name(&self, name: &str) -> Result<Option<Article>, StoreError>;

    /// Atomic conditional upvote: matches `{name, upvote_ids not containing uid}`
    /// and then increments `upvotes` and appends `uid` in the same update.
    ///
    /// Returns `true` when the vote was applied. `false` means either the
    /// article does not exist or `uid` had already voted.
    async fn record_upvote(&self, name: &str, uid: &str) -> Result<bool, StoreError>;

    /// Appends a comment to the article's sequence. Returns `false` when no
    /// article matched `name`.
    async fn push_comment(&self, name: &str, comment: Comment) -> Result<bool, StoreError>;

    /// Inserts the article unless one with the same name exists.
    /// Returns `true` when a new document was written.
    async fn insert_if_absent(&self, article: Article) -> Result<bool, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}
