use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    /// Directory holding the built single-page application
    pub static_dir: PathBuf,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreBackend {
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
    /// JSON array of articles inserted at startup when missing
    pub seed_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthMode {
    /// HS256 tokens signed with `jwt_secret`
    Jwt,
    /// Firebase ID tokens checked against Google's published keys
    Firebase,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub auth_mode: AuthMode,
    pub jwt_secret: String,
    pub firebase_project_id: Option<String>,
    /// Answer rejected credentials with 404 instead of 401
    pub mask_verification_failures: bool,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Ok(v) = env::var("STATIC_DIR") {
            self.server.static_dir = PathBuf::from(v);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.server.max_request_size_bytes = v.parse().unwrap_or(self.server.max_request_size_bytes);
        }

        // Store overrides
        if let Ok(v) = env::var("ARTICLES_STORE") {
            self.store.backend = parse_store_backend(&v).unwrap_or(self.store.backend);
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            self.store.database_url = Some(v);
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.store.max_connections = v.parse().unwrap_or(self.store.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.store.connection_timeout = v.parse().unwrap_or(self.store.connection_timeout);
        }
        if let Ok(v) = env::var("ARTICLES_SEED_FILE") {
            self.store.seed_file = Some(PathBuf::from(v));
        }

        // Security overrides
        if let Ok(v) = env::var("AUTH_MODE") {
            self.security.auth_mode = parse_auth_mode(&v).unwrap_or(self.security.auth_mode);
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("FIREBASE_PROJECT_ID") {
            self.security.firebase_project_id = Some(v);
        }
        if let Ok(v) = env::var("SECURITY_MASK_VERIFICATION_FAILURES") {
            self.security.mask_verification_failures =
                v.parse().unwrap_or(self.security.mask_verification_failures);
        }
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                port: 8000,
                static_dir: PathBuf::from("build"),
                max_request_size_bytes: 1024 * 1024, // 1MB
            },
            store: StoreConfig {
                backend: StoreBackend::Memory,
                database_url: None,
                max_connections: 5,
                connection_timeout: 30,
                seed_file: None,
            },
            security: SecurityConfig {
                auth_mode: AuthMode::Jwt,
                jwt_secret: "development-secret".to_string(),
                firebase_project_id: None,
                mask_verification_failures: true,
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string()],
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                port: 8000,
                static_dir: PathBuf::from("build"),
                max_request_size_bytes: 256 * 1024,
            },
            store: StoreConfig {
                backend: StoreBackend::Postgres,
                database_url: None,
                max_connections: 10,
                connection_timeout: 10,
                seed_file: None,
            },
            security: SecurityConfig {
                auth_mode: AuthMode::Firebase,
                jwt_secret: String::new(),
                firebase_project_id: None,
                mask_verification_failures: true,
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                port: 8000,
                static_dir: PathBuf::from("build"),
                max_request_size_bytes: 64 * 1024,
            },
            store: StoreConfig {
                backend: StoreBackend::Postgres,
                database_url: None,
                max_connections: 20,
                connection_timeout: 5,
                seed_file: None,
            },
            security: SecurityConfig {
                auth_mode: AuthMode::Firebase,
                jwt_secret: String::new(),
                firebase_project_id: None,
                mask_verification_failures: true,
                // The SPA is served from the same origin
                enable_cors: false,
                cors_origins: Vec::new(),
            },
        }
    }
}

fn parse_store_backend(value: &str) -> Option<StoreBackend> {
    match value.trim().to_ascii_lowercase().as_str() {
        "memory" | "mem" => Some(StoreBackend::Memory),
        "postgres" | "postgresql" | "pg" => Some(StoreBackend::Postgres),
        other => {
            tracing::warn!("Unknown ARTICLES_STORE '{}', keeping default", other);
            None
        }
    }
}

fn parse_auth_mode(value: &str) -> Option<AuthMode> {
    match value.trim().to_ascii_lowercase().as_str() {
        "jwt" | "hs256" => Some(AuthMode::Jwt),
        "firebase" => Some(AuthMode::Firebase),
        other => {
            tracing::warn!("Unknown AUTH_MODE '{}', keeping default", other);
            None
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.security.auth_mode, AuthMode::Jwt);
        assert!(config.security.mask_verification_failures);
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.store.backend, StoreBackend::Postgres);
        assert_eq!(config.security.auth_mode, AuthMode::Firebase);
        assert!(config.security.jwt_secret.is_empty());
        assert!(!config.security.enable_cors);
    }

    #[test]
    fn parses_backend_and_auth_aliases() {
        assert_eq!(parse_store_backend("PG"), Some(StoreBackend::Postgres));
        assert_eq!(parse_store_backend(" memory "), Some(StoreBackend::Memory));
        assert_eq!(parse_store_backend("mongo"), None);
        assert_eq!(parse_auth_mode("Firebase"), Some(AuthMode::Firebase));
        assert_eq!(parse_auth_mode("hs256"), Some(AuthMode::Jwt));
        assert_eq!(parse_auth_mode("none"), None);
    }
}
