use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::filter::{display_list, FilterKey};
use crate::sanitize::source_class;
use crate::store::{ArticleStore, Stats};
use crate::time::{time_ago, Clock, SystemClock};
use crate::types::Article;
use crate::view::{ArticleCard, DashboardView, ViewState};

/// Turns the store and the current filter into what the view shows.
#[derive(Clone)]
pub struct Renderer {
    clock: Arc<dyn Clock>,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl Renderer {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// `Empty` when nothing matches the filter, otherwise one card per match,
    /// newest first.
    pub fn project(&self, articles: &[Article], filter: &FilterKey) -> ViewState {
        let list = display_list(articles, filter);
        if list.is_empty() {
            return ViewState::Empty;
        }
        let now = self.now();
        ViewState::Populated(list.into_iter().map(|a| card_at(a, now)).collect())
    }

    /// Redraws the article area.
    pub fn render<V: DashboardView + ?Sized>(&self, view: &mut V, store: &ArticleStore, filter: &FilterKey) {
        let state = self.project(store.articles(), filter);
        tracing::debug!("Rendering {} cards for filter {}", state.cards().len(), filter);
        view.show_state(&state);
    }

    /// Stats for the bar. The last-updated label is only recomputed when
    /// `with_timestamp` is set, i.e. after a load.
    pub fn stats(&self, store: &ArticleStore, with_timestamp: bool) -> Stats {
        let mut stats = store.stats();
        if with_timestamp {
            stats.last_updated = store.last_updated().map(|ts| time_ago(ts, self.now()));
        }
        stats
    }
}

fn card_at(article: &Article, now: DateTime<Utc>) -> ArticleCard {
    ArticleCard {
        id: article.id.clone(),
        source_label: article.source.clone(),
        source_class: source_class(&article.source),
        saved: article.saved,
        title: article.title.clone(),
        summary: article.display_summary().map(str::to_string),
        time_ago: time_ago(&article.published_at, now),
        url: article.url.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::FixedClock;
    use crate::types::DashboardSnapshot;
    use crate::view::NotificationKind;
    use chrono::TimeZone;

    #[derive(Default)]
    struct RecordingView {
        states: Vec<ViewState>,
    }

    impl DashboardView for RecordingView {
        fn show_state(&mut self, state: &ViewState) {
            self.states.push(state.clone());
        }
        fn update_stats(&mut self, _stats: &Stats) {}
        fn show_notification(&mut self, _text: &str, _kind: NotificationKind) {}
        fn hide_notification(&mut self) {}
    }

    fn renderer() -> Renderer {
        Renderer::new(Arc::new(FixedClock(
            Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
        )))
    }

    #[test]
    fn test_empty_snapshot_renders_empty_state() {
        let mut view = RecordingView::default();
        let store = ArticleStore::new();
        renderer().render(&mut view, &store, &FilterKey::All);
        assert_eq!(view.states, vec![ViewState::Empty]);
        assert!(view.states[0].cards().is_empty());
    }

    #[test]
    fn test_cards() {
        let mut store = ArticleStore::new();
        store.replace(DashboardSnapshot::new(
            vec![
                Article::new("a", "<b>Old</b>", "Ben's Bites", "https://a", "2024-01-01T11:55:00Z")
                    .with_summary(""),
                Article::new("b", "New", "Reddit", "https://b", "2024-01-01T11:59:45Z")
                    .with_summary("Short")
                    .with_saved(true),
            ],
            "2024-01-01T10:00:00Z",
        ));

        let state = renderer().project(store.articles(), &FilterKey::All);
        let cards = state.cards();
        assert_eq!(cards.len(), 2);

        assert_eq!(cards[0].id, "b");
        assert_eq!(cards[0].time_ago, "Just now");
        assert_eq!(cards[0].summary.as_deref(), Some("Short"));
        assert_eq!(cards[0].save_icon(), "❤️");

        assert_eq!(cards[1].title, "<b>Old</b>");
        assert_eq!(cards[1].source_label, "Ben's Bites");
        assert_eq!(cards[1].source_class, "bensbites");
        assert_eq!(cards[1].summary, None);
        assert_eq!(cards[1].time_ago, "5 minutes ago");
        assert_eq!(cards[1].save_icon(), "🤍");
    }

    #[test]
    fn test_filter_without_matches_is_empty() {
        let mut store = ArticleStore::new();
        store.replace(DashboardSnapshot::new(
            vec![Article::new("a", "A", "Reddit", "https://a", "2024-01-01T00:00:00Z")],
            "2024-01-01T00:00:00Z",
        ));
        assert_eq!(renderer().project(store.articles(), &FilterKey::Saved), ViewState::Empty);
    }

    #[test]
    fn test_stats_label_only_with_timestamp() {
        let mut store = ArticleStore::new();
        store.replace(DashboardSnapshot::new(vec![], "2024-01-01T10:00:00Z"));
        assert_eq!(renderer().stats(&store, true).last_updated.as_deref(), Some("2 hours ago"));
        assert_eq!(renderer().stats(&store, false).last_updated, None);
    }
}
