use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::models::{Article, Comment};
use super::store::{ArticleStore, StoreError};

/// In-process article collection. Each mutation holds the write lock for the
/// whole match-and-update, which gives the same atomicity as a single
/// document update in a database.
#[derive(Default)]
pub struct MemoryArticleStore {
    articles: RwLock<HashMap<String, Article>>,
}

impl MemoryArticleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_articles(articles: impl IntoIterator<Item = Article>) -> Self {
        let articles = articles
            .into_iter()
            .map(|a| (a.name.clone(), a))
            .collect();
        Self {
            articles: RwLock::new(articles),
        }
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.articles.read().await.len()
    }
}

#[async_trait]
impl ArticleStore for MemoryArticleStore {
    async fn find_by_name(&self, name: &str) -> Result<Option<Article>, StoreError> {
        Ok(self.articles.read().await.get(name).cloned())
    }

    async fn record_upvote(&self, name: &str, uid: &str) -> Result<bool, StoreError> {
        let mut articles = self.articles.write().await;
        match articles.get_mut(name) {
            Some(article) if !article.has_upvoted(uid) => {
                article.upvotes += 1;
                article.upvote_ids.push(uid.to_string());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn push_comment(&self, name: &str, comment: Comment) -> Result<bool, StoreError> {
        let mut articles = self.articles.write().await;
        match articles.get_mut(name) {
            Some(article) => {
                article.comments.push(comment);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_if_absent(&self, article: Article) -> Result<bool, StoreError> {
        let mut articles = self.articles.write().await;
        if articles.contains_key(&article.name) {
            return Ok(false);
        }
        articles.insert(article.name.clone(), article);
        Ok(true)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
