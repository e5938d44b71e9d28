use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use crate::auth::{AuthUser, TokenVerifier, VerifyError};
use crate::config::AppConfig;
use crate::database::{Article, ArticleStore, Comment, MemoryArticleStore, StoreError};
use crate::middleware::AUTH_TOKEN_HEADER;
use crate::state::AppState;

/// Verifier that accepts a fixed table of tokens
#[derive(Default)]
pub struct StaticTokenVerifier {
    tokens: HashMap<String, AuthUser>,
}

impl StaticTokenVerifier {
    pub fn with_user(mut self, token: &str, uid: &str, email: &str) -> Self {
        self.tokens.insert(
            token.to_string(),
            AuthUser {
                uid: uid.to_string(),
                email: Some(email.to_string()),
            },
        );
        self
    }
}

#[async_trait]
impl TokenVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> Result<AuthUser, VerifyError> {
        self.tokens
            .get(token)
            .cloned()
            .ok_or_else(|| VerifyError::Invalid("unknown test token".to_string()))
    }
}

/// Store wrapper counting every call that reaches the backend
pub struct CountingStore {
    inner: Arc<MemoryArticleStore>,
    calls: AtomicUsize,
}

impl CountingStore {
    pub fn new(inner: Arc<MemoryArticleStore>) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ArticleStore for CountingStore {
    async fn find_by_name(&self, name: &str) -> Result<Option<Article>, StoreError> {
        self.touch();
        self.inner.find_by_name(name).await
    }

    async fn record_upvote(&self, name: &str, uid: &str) -> Result<bool, StoreError> {
        self.touch();
        self.inner.record_upvote(name, uid).await
    }

    async fn push_comment(&self, name: &str, comment: Comment) -> Result<bool, StoreError> {
        self.touch();
        self.inner.push_comment(name, comment).await
    }

    async fn insert_if_absent(&self, article: Article) -> Result<bool, StoreError> {
        self.touch();
        self.inner.insert_if_absent(article).await
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        self.inner.health_check().await
    }
}

/// In-process application over the memory store.
///
/// Known tokens: `token-u1` (u1, u1@example.com), `token-u2` (u2, u2@example.com).
pub struct TestContext {
    pub store: Arc<MemoryArticleStore>,
    pub counter: Arc<CountingStore>,
    pub router: Router,
}

impl TestContext {
    pub fn new(articles: impl IntoIterator<Item = Article>) -> Self {
        Self::build(articles, true)
    }

    pub fn empty() -> Self {
        Self::new(Vec::<Article>::new())
    }

    /// Same as `new`, but rejected credentials answer 401 instead of 404
    pub fn unmasked(articles: impl IntoIterator<Item = Article>) -> Self {
        Self::build(articles, false)
    }

    fn build(articles: impl IntoIterator<Item = Article>, mask: bool) -> Self {
        let store = Arc::new(MemoryArticleStore::with_articles(articles));
        let counter = Arc::new(CountingStore::new(store.clone()));
        let verifier = StaticTokenVerifier::default()
            .with_user("token-u1", "u1", "u1@example.com")
            .with_user("token-u2", "u2", "u2@example.com");

        let state = AppState::new(counter.clone(), Arc::new(verifier)).with_masked_failures(mask);
        let router = crate::app(state, &AppConfig::development());

        Self { store, counter, router }
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::GET, path, token, None).await
    }

    pub async fn put(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::PUT, path, token, None).await
    }

    pub async fn post_json(&self, path: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, path, token, Some(body.to_string())).await
    }

    pub async fn send(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<String>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(AUTH_TOKEN_HEADER, token);
        }
        let request = match body {
            Some(body) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body)),
            None => builder.body(Body::empty()),
        }
        .expect("valid request");

        let response = self.router.clone().oneshot(request).await.expect("infallible");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        (status, value)
    }
}

pub fn article(name: &str, upvotes: u64, upvote_ids: &[&str]) -> Article {
    Article {
        name: name.to_string(),
        upvotes,
        upvote_ids: upvote_ids.iter().map(|id| id.to_string()).collect(),
        comments: Vec::new(),
    }
}
