use std::time::Duration;

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, types::Json, FromRow, PgPool};
use tracing::info;

use super::models::{Article, Comment};
use super::store::{ArticleStore, StoreError};
use crate::config::StoreConfig;

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS articles (
        name TEXT PRIMARY KEY,
        upvotes BIGINT NOT NULL DEFAULT 0 CHECK (upvotes >= 0),
        upvote_ids TEXT[] NOT NULL DEFAULT '{}',
        comments JSONB NOT NULL DEFAULT '[]'::jsonb
    )
"#;

const SELECT_BY_NAME: &str =
    "SELECT name, upvotes, upvote_ids, comments FROM articles WHERE name = $1";

// Match and mutation in one statement; a concurrent duplicate finds no row.
const UPVOTE_IF_ABSENT: &str = r#"
    UPDATE articles
    SET upvotes = upvotes + 1,
        upvote_ids = array_append(upvote_ids, $2)
    WHERE name = $1
    AND NOT ($2 = ANY(upvote_ids))
"#;

const PUSH_COMMENT: &str = r#"
    UPDATE articles
    SET comments = comments || jsonb_build_array(
        jsonb_build_object('postedBy', $2::text, 'text', $3::text)
    )
    WHERE name = $1
"#;

const INSERT_IF_ABSENT: &str = r#"
    INSERT INTO articles (name, upvotes, upvote_ids, comments)
    VALUES ($1, $2, $3, $4)
    ON CONFLICT (name) DO NOTHING
"#;

#[derive(Debug, FromRow)]
struct ArticleRow {
    name: String,
    upvotes: i64,
    upvote_ids: Vec<String>,
    comments: Json<Vec<Comment>>,
}

impl TryFrom<ArticleRow> for Article {
    type Error = StoreError;

    fn try_from(row: ArticleRow) -> Result<Self, Self::Error> {
        let upvotes = u64::try_from(row.upvotes).map_err(|_| {
            StoreError::Corrupt(format!("article '{}' has negative upvotes", row.name))
        })?;
        Ok(Article {
            name: row.name,
            upvotes,
            upvote_ids: row.upvote_ids,
            comments: row.comments.0,
        })
    }
}

/// Article collection backed by a Postgres table
pub struct PgArticleStore {
    pool: PgPool,
}

impl PgArticleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let url = config
            .database_url
            .as_deref()
            .ok_or(StoreError::ConfigMissing("DATABASE_URL"))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        info!("Created database pool ({} max connections)", config.max_connections);
        Ok(Self::new(pool))
    }

    /// Creates the articles table when it does not exist yet
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl ArticleStore for PgArticleStore {
    async fn find_by_name(&self, name: &str) -> Result<Option<Article>, StoreError> {
        let row = sqlx::query_as::<_, ArticleRow>(SELECT_BY_NAME)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Article::try_from).transpose()
    }

    async fn record_upvote(&self, name: &str, uid: &str) -> Result<bool, StoreError> {
        let result = sqlx::query(UPVOTE_IF_ABSENT)
            .bind(name)
            .bind(uid)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn push_comment(&self, name: &str, comment: Comment) -> Result<bool, StoreError> {
        let result = sqlx::query(PUSH_COMMENT)
            .bind(name)
            .bind(comment.posted_by)
            .bind(comment.text)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn insert_if_absent(&self, article: Article) -> Result<bool, StoreError> {
        let upvotes = i64::try_from(article.upvotes).map_err(|_| {
            StoreError::Corrupt(format!("article '{}' upvotes out of range", article.name))
        })?;

        let result = sqlx::query(INSERT_IF_ABSENT)
            .bind(&article.name)
            .bind(upvotes)
            .bind(&article.upvote_ids)
            .bind(Json(&article.comments))
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
