use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// A stored article document, keyed by its unique `name`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub name: String,
    #[serde(default)]
    pub upvotes: u64,
    /// Subjects that have upvoted; never holds the same id twice
    #[serde(default)]
    pub upvote_ids: Vec<String>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Email of the author; tokens without an email claim leave it empty
    pub posted_by: Option<String>,
    pub text: String,
}

impl Article {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            upvotes: 0,
            upvote_ids: Vec::new(),
            comments: Vec::new(),
        }
    }

    pub fn has_upvoted(&self, uid: &str) -> bool {
        self.upvote_ids.iter().any(|id| id == uid)
    }

    /// First subject listed more than once in `upvote_ids`, if any
    pub fn duplicate_upvoter(&self) -> Option<&str> {
        let mut seen = HashSet::new();
        self.upvote_ids
            .iter()
            .find(|id| !seen.insert(id.as_str()))
            .map(String::as_str)
    }

    /// Upvote eligibility against the ids currently stored on this document.
    /// Anonymous callers are never eligible.
    pub fn can_upvote(&self, uid: Option<&str>) -> bool {
        match uid {
            Some(uid) if !uid.is_empty() => !self.has_upvoted(uid),
            _ => false,
        }
    }
}

/// Article as returned by the fetch route, annotated with the caller's eligibility
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleView {
    #[serde(flatten)]
    pub article: Article,
    pub can_upvote: bool,
}

impl ArticleView {
    pub fn for_caller(article: Article, uid: Option<&str>) -> Self {
        let can_upvote = article.can_upvote(uid);
        Self { article, can_upvote }
    }
}
