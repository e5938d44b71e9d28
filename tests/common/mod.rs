use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use articles_api::auth::{issue_token, jwt::Claims};
use reqwest::StatusCode;
use serde_json::Value;

pub const JWT_SECRET: &str = "integration-test-secret";

/// A running server binary over the in-memory store; killed on drop
pub struct TestServer {
    pub base_url: String,
    child: Child,
    seed_path: PathBuf,
}

impl TestServer {
    pub async fn start(seed: Value) -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let seed_path = std::env::temp_dir().join(format!("articles-api-seed-{}.json", port));
        std::fs::write(&seed_path, seed.to_string()).context("failed to write seed file")?;

        let child = Command::new(env!("CARGO_BIN_EXE_articles-api"))
            .env("APP_ENV", "development")
            .env("PORT", port.to_string())
            .env("ARTICLES_STORE", "memory")
            .env("ARTICLES_SEED_FILE", &seed_path)
            .env("AUTH_MODE", "jwt")
            .env("JWT_SECRET", JWT_SECRET)
            .env("SECURITY_MASK_VERIFICATION_FAILURES", "true")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .context("failed to spawn server binary")?;

        let server = Self { base_url, child, seed_path };
        server.wait_ready(Duration::from_secs(10)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
        let _ = std::fs::remove_file(&self.seed_path);
    }
}

/// Signs a token the spawned server accepts
pub fn token_for(uid: &str, email: &str) -> String {
    issue_token(JWT_SECRET, &Claims::new(uid, Some(email.to_string()), 1)).expect("token")
}
