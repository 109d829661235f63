use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use nd_core::{Article, Error, Result};
use sha2::{Digest, Sha256};
use tracing::warn;

/// How far back a fresh batch reaches.
pub const RETENTION_HOURS: i64 = 24;

/// Stable id for an article: the first 16 hex digits of the URL's hash.
pub fn generate_article_id(url: &str) -> String {
    let digest = Sha256::digest(url.as_bytes());
    digest.iter().take(8).map(|b| format!("{:02x}", b)).collect()
}

/// Gives every article without an id one derived from its URL.
pub fn assign_missing_ids(articles: &mut [Article]) {
    for article in articles.iter_mut().filter(|a| a.id.trim().is_empty()) {
        article.id = generate_article_id(&article.url);
    }
}

pub fn validate_article(article: &Article) -> Result<()> {
    let required = [
        ("id", &article.id),
        ("title", &article.title),
        ("source", &article.source),
        ("url", &article.url),
        ("published_at", &article.published_at),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(Error::Storage(format!(
                "Invalid article {:?}: missing required field {}",
                article.title, field
            )));
        }
    }
    Ok(())
}

/// Merges a fresh batch into the stored articles.
///
/// Articles in `new` come first, in their order, taking the saved flag of a
/// stored article with the same id. Repeated ids in `new` keep the first
/// occurrence. Stored articles that are saved but missing from `new` are
/// appended; unsaved ones are dropped.
pub fn merge_articles(existing: &[Article], new: Vec<Article>) -> Vec<Article> {
    let saved_by_id: HashMap<&str, bool> = existing
        .iter()
        .map(|a| (a.id.as_str(), a.saved))
        .collect();

    let mut seen = HashSet::new();
    let mut merged = Vec::with_capacity(new.len());

    for mut article in new {
        if let Some(&saved) = saved_by_id.get(article.id.as_str()) {
            article.saved = saved;
        }
        if seen.insert(article.id.clone()) {
            merged.push(article);
        }
    }

    for article in existing {
        if article.saved && seen.insert(article.id.clone()) {
            merged.push(article.clone());
        }
    }

    merged
}

/// Keeps articles published within the last [`RETENTION_HOURS`] of `now`.
///
/// Saved articles are always kept, and so are articles whose date does not
/// parse.
pub fn filter_recent(articles: Vec<Article>, now: DateTime<Utc>) -> Vec<Article> {
    let cutoff = now - Duration::hours(RETENTION_HOURS);
    articles
        .into_iter()
        .filter(|article| {
            if article.saved {
                return true;
            }
            match article.published() {
                Some(published) => published >= cutoff,
                None => {
                    warn!("⚠️ Could not parse date for {:?}, keeping it", article.title);
                    true
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(id: &str) -> Article {
        Article::new(id, "Title", "Reddit", format!("https://x/{}", id), "2024-01-01T00:00:00Z")
    }

    fn ids(articles: &[Article]) -> Vec<&str> {
        articles.iter().map(|a| a.id.as_str()).collect()
    }

    #[test]
    fn test_generate_article_id() {
        let id = generate_article_id("https://example.com/post");
        assert_eq!(id.len(), 16);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(id, generate_article_id("https://example.com/post"));
        assert_ne!(id, generate_article_id("https://example.com/other"));
    }

    #[test]
    fn test_assign_missing_ids() {
        let mut articles = vec![article(""), article("keep")];
        assign_missing_ids(&mut articles);
        assert_eq!(articles[0].id, generate_article_id("https://x/"));
        assert_eq!(articles[1].id, "keep");
    }

    #[test]
    fn test_validate_article() {
        assert!(validate_article(&article("a")).is_ok());

        let mut missing_url = article("a");
        missing_url.url = String::new();
        let err = validate_article(&missing_url).unwrap_err();
        assert!(err.to_string().contains("url"));
    }

    #[test]
    fn test_filter_recent() {
        let now = DateTime::parse_from_rfc3339("2024-01-02T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let dated = |id: &str, at: &str| {
            Article::new(id, "Title", "Reddit", format!("https://x/{}", id), at)
        };
        let articles = vec![
            dated("fresh", "2024-01-02T11:00:00Z"),
            dated("edge", "2024-01-01T12:00:00Z"),
            dated("stale", "2024-01-01T11:59:59Z"),
            dated("stale-saved", "2023-12-01T00:00:00Z").with_saved(true),
            dated("undated", "sometime last week"),
            dated("blank", ""),
        ];

        let kept = filter_recent(articles, now);
        assert_eq!(ids(&kept), vec!["fresh", "edge", "stale-saved", "undated", "blank"]);
    }

    #[test]
    fn test_merge_keeps_saved_flags() {
        let existing = vec![
            article("a").with_saved(true),
            article("b"),
            article("old-saved").with_saved(true),
            article("old"),
        ];
        let new = vec![article("b"), article("a"), article("c"), article("a")];

        let merged = merge_articles(&existing, new);
        assert_eq!(ids(&merged), vec!["b", "a", "c", "old-saved"]);
        assert!(merged[1].saved);
        assert!(!merged[0].saved);
        assert!(merged[3].saved);
    }
}
