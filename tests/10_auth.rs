mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

use articles_api::auth::{issue_token, jwt::Claims};

fn seed() -> serde_json::Value {
    json!([{ "name": "learn-rust", "upvotes": 0, "upvoteIds": [], "comments": [] }])
}

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let server = common::TestServer::start(seed()).await?;

    let res = reqwest::get(server.url("/health")).await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn anonymous_reads_but_cannot_write() -> Result<()> {
    let server = common::TestServer::start(seed()).await?;
    let client = reqwest::Client::new();

    let res = client.get(server.url("/api/articles/learn-rust")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["canUpvote"], false);

    let res = client.put(server.url("/api/articles/learn-rust/upvote")).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .post(server.url("/api/articles/learn-rust/comments"))
        .json(&json!({ "text": "hello" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn forged_token_is_answered_with_not_found() -> Result<()> {
    let server = common::TestServer::start(seed()).await?;
    let forged = issue_token("some-other-secret", &Claims::new("u1", None, 1))?;

    let res = reqwest::Client::new()
        .get(server.url("/api/articles/learn-rust"))
        .header("authtoken", forged)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["error"], true);
    Ok(())
}

#[tokio::test]
async fn verified_token_unlocks_eligibility() -> Result<()> {
    let server = common::TestServer::start(seed()).await?;

    let res = reqwest::Client::new()
        .get(server.url("/api/articles/learn-rust"))
        .header("authtoken", common::token_for("u1", "u1@example.com"))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["canUpvote"], true);
    Ok(())
}
