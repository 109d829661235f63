use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::time::parse_timestamp;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    /// Empty only for imported articles that have not been assigned one yet.
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub source: String,
    pub url: String,
    /// Kept as received; parsed on demand so a bad value never fails a load.
    /// Missing or null becomes empty, numbers keep their digits.
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub published_at: String,
    #[serde(default)]
    pub saved: bool,
    /// Fields the dashboard does not use (category, metadata, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Article {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        source: impl Into<String>,
        url: impl Into<String>,
        published_at: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            summary: None,
            source: source.into(),
            url: url.into(),
            published_at: published_at.into(),
            saved: false,
            extra: Map::new(),
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn with_saved(mut self, saved: bool) -> Self {
        self.saved = saved;
        self
    }

    pub fn published(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.published_at)
    }

    /// Summary text worth showing, if any.
    pub fn display_summary(&self) -> Option<&str> {
        self.summary.as_deref().filter(|s| !s.trim().is_empty())
    }
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    #[serde(default)]
    pub articles: Vec<Article>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

impl DashboardSnapshot {
    pub fn new(articles: Vec<Article>, last_updated: impl Into<String>) -> Self {
        Self {
            articles,
            last_updated: Some(last_updated.into()),
        }
    }
}

/// Body of `POST /api/articles/{id}/save`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveRequest {
    #[serde(default)]
    pub saved: bool,
}
