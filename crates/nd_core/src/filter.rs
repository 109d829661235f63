use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::types::Article;

/// Which articles the dashboard shows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum FilterKey {
    #[default]
    All,
    Saved,
    /// Exact, case-sensitive match on `Article::source`.
    Source(String),
}

impl FilterKey {
    pub fn as_str(&self) -> &str {
        match self {
            Self::All => "all",
            Self::Saved => "saved",
            Self::Source(source) => source,
        }
    }

    pub fn matches(&self, article: &Article) -> bool {
        match self {
            Self::All => true,
            Self::Saved => article.saved,
            Self::Source(source) => article.source == *source,
        }
    }
}

impl From<&str> for FilterKey {
    fn from(value: &str) -> Self {
        match value {
            "all" => Self::All,
            "saved" => Self::Saved,
            other => Self::Source(other.to_string()),
        }
    }
}

impl FromStr for FilterKey {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn filter_articles<'a>(articles: &'a [Article], key: &FilterKey) -> Vec<&'a Article> {
    articles.iter().filter(|a| key.matches(a)).collect()
}

/// Newest first. `sort_by` is stable, so equal timestamps keep their input
/// order; unparseable timestamps count as the earliest possible time.
pub fn sort_newest_first(articles: &mut [&Article]) {
    let key = |a: &Article| a.published().unwrap_or(DateTime::<Utc>::MIN_UTC);
    articles.sort_by(|a, b| key(b).cmp(&key(a)));
}

/// The list the renderer draws for `key`.
pub fn display_list<'a>(articles: &'a [Article], key: &FilterKey) -> Vec<&'a Article> {
    let mut filtered = filter_articles(articles, key);
    sort_newest_first(&mut filtered);
    filtered
}

/// Distinct sources in first-seen order, for building filter controls.
pub fn sources(articles: &[Article]) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::new();
    for article in articles {
        if !seen.contains(&article.source.as_str()) {
            seen.push(&article.source);
        }
    }
    seen
}
