use crate::types::{Article, DashboardSnapshot};

/// Counters shown in the stats bar.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stats {
    pub total: usize,
    pub saved: usize,
    /// Relative label for the snapshot time; `None` leaves the current label alone.
    pub last_updated: Option<String>,
}

/// Client-side copy of the latest snapshot. Holds the saved flags the
/// dashboard shows; nothing else writes them.
#[derive(Debug, Clone, Default)]
pub struct ArticleStore {
    articles: Vec<Article>,
    last_updated: Option<String>,
}

impl ArticleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swaps in a whole snapshot. Nothing from the previous one survives.
    pub fn replace(&mut self, snapshot: DashboardSnapshot) {
        self.articles = snapshot.articles;
        self.last_updated = snapshot.last_updated;
    }

    pub fn find(&self, id: &str) -> Option<&Article> {
        self.articles.iter().find(|a| a.id == id)
    }

    /// Sets the flag on the article with `id`; unknown ids are ignored.
    pub fn set_saved(&mut self, id: &str, saved: bool) {
        if let Some(article) = self.articles.iter_mut().find(|a| a.id == id) {
            article.saved = saved;
        }
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn last_updated(&self) -> Option<&str> {
        self.last_updated.as_deref()
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    pub fn saved_count(&self) -> usize {
        self.articles.iter().filter(|a| a.saved).count()
    }

    /// Counts only; the caller decides whether the last-updated label changes.
    pub fn stats(&self) -> Stats {
        Stats {
            total: self.len(),
            saved: self.saved_count(),
            last_updated: None,
        }
    }
}
