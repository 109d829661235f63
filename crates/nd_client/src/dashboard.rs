use std::time::Duration;

use nd_core::{
    ArticleStore, DashboardError, DashboardSnapshot, DashboardView, FilterKey, NotificationKind,
    Renderer, Result, ViewState,
};
use tracing::{error, info, warn};

use crate::notify::{NotificationPresenter, NotificationTicket};

pub const REFRESHED_MESSAGE: &str = "Dashboard refreshed";
pub const SAVED_MESSAGE: &str = "Article saved!";
pub const UNSAVED_MESSAGE: &str = "Article unsaved";

/// A save toggle that has been decided but not yet confirmed by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSave {
    pub id: String,
    pub saved: bool,
}

/// Everything one dashboard instance owns: the view it draws into, the
/// article snapshot, the active filter and the notification slot.
///
/// Methods here are synchronous and never await; the controller calls them
/// before and after each network round trip.
pub struct Dashboard<V> {
    view: V,
    store: ArticleStore,
    filter: FilterKey,
    renderer: Renderer,
    notifications: NotificationPresenter,
    refresh_failures: u32,
}

impl<V: DashboardView> Dashboard<V> {
    pub fn new(view: V, renderer: Renderer, notification_duration: Duration) -> Self {
        Self {
            view,
            store: ArticleStore::new(),
            filter: FilterKey::All,
            renderer,
            notifications: NotificationPresenter::new(notification_duration),
            refresh_failures: 0,
        }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn store(&self) -> &ArticleStore {
        &self.store
    }

    pub fn filter(&self) -> &FilterKey {
        &self.filter
    }

    /// Consecutive silent refreshes that failed.
    pub fn refresh_failures(&self) -> u32 {
        self.refresh_failures
    }

    pub fn render(&mut self) {
        self.renderer.render(&mut self.view, &self.store, &self.filter);
    }

    fn update_stats(&mut self, with_timestamp: bool) {
        let stats = self.renderer.stats(&self.store, with_timestamp);
        self.view.update_stats(&stats);
    }

    pub fn begin_load(&mut self, silent: bool) {
        if !silent {
            self.view.show_state(&ViewState::Loading);
        }
    }

    /// Applies a finished load. A silent success returns the ticket of the
    /// "refreshed" notification.
    pub fn apply_load(
        &mut self,
        silent: bool,
        result: Result<DashboardSnapshot>,
    ) -> Option<NotificationTicket> {
        match result {
            Ok(snapshot) => {
                info!("📰 Loaded {} articles", snapshot.articles.len());
                self.refresh_failures = 0;
                self.store.replace(snapshot);
                self.update_stats(true);
                self.render();
                silent.then(|| self.notify(REFRESHED_MESSAGE, NotificationKind::Normal))
            }
            Err(e) => {
                error!("Error loading articles: {}", e);
                if silent {
                    self.refresh_failures += 1;
                    if self.refresh_failures > 1 {
                        warn!(
                            "⚠️ {} consecutive background refreshes failed",
                            self.refresh_failures
                        );
                    }
                } else {
                    let failure = DashboardError::load(&e);
                    self.view.show_state(&ViewState::Error(failure.to_string()));
                }
                None
            }
        }
    }

    /// Changes the filter without redrawing.
    pub fn set_filter(&mut self, filter: FilterKey) {
        info!("🔍 Filter set to {}", filter);
        self.filter = filter;
        self.view.set_active_filter(&self.filter);
    }

    pub fn select_filter(&mut self, filter: FilterKey) {
        self.set_filter(filter);
        self.render();
    }

    /// Decides the new flag for `id`. `None` when the article is unknown, in
    /// which case nothing should be sent.
    pub fn prepare_save(&self, id: &str) -> Option<PendingSave> {
        self.store.find(id).map(|article| PendingSave {
            id: article.id.clone(),
            saved: !article.saved,
        })
    }

    /// Applies the server's answer to a save. Local state only changes on
    /// success.
    pub fn apply_save(&mut self, pending: &PendingSave, result: Result<()>) -> NotificationTicket {
        match result {
            Ok(()) => {
                self.store.set_saved(&pending.id, pending.saved);
                self.update_stats(false);
                self.render();
                let text = if pending.saved { SAVED_MESSAGE } else { UNSAVED_MESSAGE };
                self.notify(text, NotificationKind::Normal)
            }
            Err(e) => {
                error!("Error toggling save for {}: {}", pending.id, e);
                let failure = DashboardError::save(&e);
                self.notify(&failure.to_string(), NotificationKind::Error)
            }
        }
    }

    pub fn notify(&mut self, text: &str, kind: NotificationKind) -> NotificationTicket {
        self.notifications.show(&mut self.view, text, kind)
    }

    pub fn expire_notification(&mut self, generation: u64) {
        self.notifications.expire(&mut self.view, generation);
    }
}
