use std::path::Path;

use anyhow::{bail, Context};
use tracing::info;

use super::models::Article;
use super::store::ArticleStore;

/// Reads a JSON array of articles from disk
pub async fn read_seed_file(path: &Path) -> anyhow::Result<Vec<Article>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read seed file {}", path.display()))?;

    serde_json::from_str(&raw)
        .with_context(|| format!("seed file {} is not a JSON array of articles", path.display()))
}

/// Rejects documents that break the upvote invariants: a subject listed twice,
/// or fewer upvotes than listed subjects. Counts above the list are allowed
/// for votes recorded before subjects were tracked.
fn validate(article: &Article) -> anyhow::Result<()> {
    if let Some(uid) = article.duplicate_upvoter() {
        bail!("seed article '{}' lists upvoter '{}' more than once", article.name, uid);
    }
    if article.upvotes < article.upvote_ids.len() as u64 {
        bail!(
            "seed article '{}' has {} upvote(s) but {} upvoter(s)",
            article.name,
            article.upvotes,
            article.upvote_ids.len()
        );
    }
    Ok(())
}

/// Inserts every seed article that is not stored yet. Returns how many were written.
///
/// The whole batch is validated before anything is written.
pub async fn seed_articles(store: &dyn ArticleStore, articles: Vec<Article>) -> anyhow::Result<usize> {
    articles.iter().try_for_each(validate)?;

    let mut inserted = 0;
    for article in articles {
        let name = article.name.clone();
        if store
            .insert_if_absent(article)
            .await
            .with_context(|| format!("failed to seed article '{}'", name))?
        {
            inserted += 1;
        }
    }
    info!("Seeded {} article(s)", inserted);
    Ok(inserted)
}
