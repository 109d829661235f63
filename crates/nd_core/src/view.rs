use crate::filter::FilterKey;
use crate::store::Stats;

pub const SAVED_ICON: &str = "❤️";
pub const UNSAVED_ICON: &str = "🤍";

/// One article as the view draws it. Text fields are raw; each view escapes
/// for its own output format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleCard {
    pub id: String,
    /// The source exactly as received.
    pub source_label: String,
    pub source_class: String,
    pub saved: bool,
    pub title: String,
    pub summary: Option<String>,
    pub time_ago: String,
    pub url: String,
}

impl ArticleCard {
    pub fn save_icon(&self) -> &'static str {
        if self.saved {
            SAVED_ICON
        } else {
            UNSAVED_ICON
        }
    }
}

/// The mutually exclusive main-area states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    Loading,
    Empty,
    Error(String),
    Populated(Vec<ArticleCard>),
}

impl ViewState {
    pub fn cards(&self) -> &[ArticleCard] {
        match self {
            Self::Populated(cards) => cards,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Normal,
    Error,
}

/// The presentation surface the dashboard draws into.
///
/// Every `show_state` call replaces whatever was shown before, cards
/// included. User input comes back through a single event channel owned by
/// the view implementation, keyed by article id.
pub trait DashboardView {
    fn show_state(&mut self, state: &ViewState);

    fn update_stats(&mut self, stats: &Stats);

    fn set_active_filter(&mut self, _filter: &FilterKey) {}

    fn show_notification(&mut self, text: &str, kind: NotificationKind);

    fn hide_notification(&mut self);
}
