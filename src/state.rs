use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use crate::auth::{FirebaseVerifier, JwtVerifier, TokenVerifier};
use crate::config::{AppConfig, AuthMode, StoreBackend};
use crate::database::{seed, ArticleStore, MemoryArticleStore, PgArticleStore};

/// Capabilities injected into every handler through the router state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ArticleStore>,
    pub verifier: Arc<dyn TokenVerifier>,
    pub mask_verification_failures: bool,
}

impl AppState {
    pub fn new(store: Arc<dyn ArticleStore>, verifier: Arc<dyn TokenVerifier>) -> Self {
        Self {
            store,
            verifier,
            mask_verification_failures: true,
        }
    }

    pub fn with_masked_failures(mut self, mask: bool) -> Self {
        self.mask_verification_failures = mask;
        self
    }

    /// Builds the store and token verifier selected by configuration and
    /// applies the optional seed file.
    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let store: Arc<dyn ArticleStore> = match config.store.backend {
            StoreBackend::Memory => {
                warn!("Using in-memory article store; data is lost on restart");
                Arc::new(MemoryArticleStore::new())
            }
            StoreBackend::Postgres => {
                let store = PgArticleStore::connect(&config.store)
                    .await
                    .context("failed to connect to Postgres")?;
                store
                    .ensure_schema()
                    .await
                    .context("failed to create articles table")?;
                info!("Connected to database");
                Arc::new(store)
            }
        };

        if let Some(path) = &config.store.seed_file {
            let articles = seed::read_seed_file(path).await?;
            seed::seed_articles(store.as_ref(), articles).await?;
        }

        let verifier: Arc<dyn TokenVerifier> = match config.security.auth_mode {
            AuthMode::Jwt => Arc::new(
                JwtVerifier::new(&config.security.jwt_secret).context("JWT_SECRET must be set for AUTH_MODE=jwt")?,
            ),
            AuthMode::Firebase => {
                let project_id = config
                    .security
                    .firebase_project_id
                    .as_deref()
                    .context("FIREBASE_PROJECT_ID must be set for AUTH_MODE=firebase")?;
                Arc::new(FirebaseVerifier::new(project_id)?)
            }
        };
        info!("Token verification mode: {:?}", config.security.auth_mode);

        Ok(Self::new(store, verifier).with_masked_failures(config.security.mask_verification_failures))
    }
}
