use std::sync::Arc;
use std::time::Duration;

use nd_core::{ArticleApi, DashboardSnapshot, DashboardView, FilterKey, Renderer, Result};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::config::DashboardConfig;
use crate::dashboard::{Dashboard, PendingSave};
use crate::notify::NotificationTicket;

/// User input, delivered by the view through one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardEvent {
    SelectFilter(FilterKey),
    /// Save button pressed on the card with this article id.
    ToggleSave(String),
    Reload,
    Quit,
}

enum Completion {
    Loaded {
        silent: bool,
        result: Result<DashboardSnapshot>,
    },
    Saved {
        pending: PendingSave,
        result: Result<()>,
    },
    NotificationExpired(u64),
}

/// Drives a [`Dashboard`] against an [`ArticleApi`]: the initial load, the
/// periodic silent refresh and save round trips.
///
/// [`SyncController::run`] is a single event loop. Network calls run in
/// spawned tasks and report back through a channel, so a slow request never
/// blocks input handling, and every state change happens on the loop one
/// handler at a time. Results apply in the order they arrive.
pub struct SyncController<V> {
    api: Arc<dyn ArticleApi>,
    dashboard: Dashboard<V>,
    refresh_interval: Duration,
    completions_tx: UnboundedSender<Completion>,
    completions_rx: Option<UnboundedReceiver<Completion>>,
}

impl<V: DashboardView> SyncController<V> {
    pub fn new(
        api: Arc<dyn ArticleApi>,
        view: V,
        renderer: Renderer,
        config: &DashboardConfig,
    ) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            api,
            dashboard: Dashboard::new(view, renderer, config.notification_duration),
            refresh_interval: config.refresh_interval,
            completions_tx,
            completions_rx: Some(completions_rx),
        }
    }

    pub fn dashboard(&self) -> &Dashboard<V> {
        &self.dashboard
    }

    pub fn dashboard_mut(&mut self) -> &mut Dashboard<V> {
        &mut self.dashboard
    }

    /// Loads and applies a snapshot, waiting for the response.
    pub async fn load(&mut self, silent: bool) {
        self.dashboard.begin_load(silent);
        let result = self.api.fetch_snapshot().await;
        if let Some(ticket) = self.dashboard.apply_load(silent, result) {
            self.schedule_expiry(ticket);
        }
    }

    /// Flips the saved flag of `id` on the server, then locally. Unknown ids
    /// are ignored without a request.
    pub async fn toggle_save(&mut self, id: &str) {
        let Some(pending) = self.dashboard.prepare_save(id) else {
            debug!("Ignoring save for unknown article {}", id);
            return;
        };
        let result = self.api.set_saved(&pending.id, pending.saved).await;
        let ticket = self.dashboard.apply_save(&pending, result);
        self.schedule_expiry(ticket);
    }

    pub fn select_filter(&mut self, filter: FilterKey) {
        self.dashboard.select_filter(filter);
    }

    fn spawn_load(&mut self, silent: bool) {
        self.dashboard.begin_load(silent);
        let api = self.api.clone();
        let tx = self.completions_tx.clone();
        tokio::spawn(async move {
            let result = api.fetch_snapshot().await;
            let _ = tx.send(Completion::Loaded { silent, result });
        });
    }

    fn spawn_save(&self, pending: PendingSave) {
        let api = self.api.clone();
        let tx = self.completions_tx.clone();
        tokio::spawn(async move {
            let result = api.set_saved(&pending.id, pending.saved).await;
            let _ = tx.send(Completion::Saved { pending, result });
        });
    }

    fn schedule_expiry(&self, ticket: NotificationTicket) {
        let tx = self.completions_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(ticket.duration).await;
            let _ = tx.send(Completion::NotificationExpired(ticket.generation));
        });
    }

    fn complete(&mut self, completion: Completion) {
        match completion {
            Completion::Loaded { silent, result } => {
                if let Some(ticket) = self.dashboard.apply_load(silent, result) {
                    self.schedule_expiry(ticket);
                }
            }
            Completion::Saved { pending, result } => {
                let ticket = self.dashboard.apply_save(&pending, result);
                self.schedule_expiry(ticket);
            }
            Completion::NotificationExpired(generation) => {
                self.dashboard.expire_notification(generation);
            }
        }
    }

    /// Returns `false` once the loop should stop.
    fn handle(&mut self, event: DashboardEvent) -> bool {
        match event {
            DashboardEvent::SelectFilter(filter) => self.dashboard.select_filter(filter),
            DashboardEvent::ToggleSave(id) => match self.dashboard.prepare_save(&id) {
                Some(pending) => self.spawn_save(pending),
                None => debug!("Ignoring save for unknown article {}", id),
            },
            DashboardEvent::Reload => self.spawn_load(false),
            DashboardEvent::Quit => return false,
        }
        true
    }

    /// Runs until `Quit` arrives or the event channel closes, then hands the
    /// dashboard back. Requests still in flight are abandoned.
    pub async fn run(mut self, mut events: mpsc::Receiver<DashboardEvent>) -> Dashboard<V> {
        let Some(mut completions) = self.completions_rx.take() else {
            return self.dashboard;
        };

        let period = self.refresh_interval;
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!("🚀 Dashboard started, refreshing every {}s", period.as_secs());
        self.spawn_load(false);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    debug!("Background refresh");
                    self.spawn_load(true);
                }
                Some(completion) = completions.recv() => self.complete(completion),
                event = events.recv() => match event {
                    Some(event) => {
                        if !self.handle(event) {
                            break;
                        }
                    }
                    None => break,
                },
            }
        }

        info!("👋 Dashboard stopped");
        self.dashboard
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::tests::{renderer, snapshot, FakeView};
    use crate::dashboard::{REFRESHED_MESSAGE, SAVED_MESSAGE};
    use async_trait::async_trait;
    use nd_core::{DashboardError, Error, NotificationKind, ViewState};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeApi {
        snapshot: Mutex<DashboardSnapshot>,
        fail_loads: AtomicBool,
        save_error: Mutex<Option<u16>>,
        fetches: AtomicUsize,
        saves: AtomicUsize,
    }

    impl FakeApi {
        fn with_snapshot(snapshot: DashboardSnapshot) -> Arc<Self> {
            Arc::new(Self {
                snapshot: Mutex::new(snapshot),
                ..Self::default()
            })
        }
    }

    #[async_trait]
    impl ArticleApi for FakeApi {
        async fn fetch_snapshot(&self) -> Result<DashboardSnapshot> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail_loads.load(Ordering::SeqCst) {
                return Err(Error::Status { code: 503, reason: "Service Unavailable".to_string() });
            }
            Ok(self.snapshot.lock().unwrap().clone())
        }

        async fn set_saved(&self, id: &str, saved: bool) -> Result<()> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            if let Some(code) = *self.save_error.lock().unwrap() {
                return Err(Error::Status { code, reason: "Nope".to_string() });
            }
            let mut snapshot = self.snapshot.lock().unwrap();
            if let Some(article) = snapshot.articles.iter_mut().find(|a| a.id == id) {
                article.saved = saved;
            }
            Ok(())
        }
    }

    fn controller(api: Arc<FakeApi>) -> SyncController<FakeView> {
        SyncController::new(api, FakeView::default(), renderer(), &DashboardConfig::default())
    }

    #[tokio::test]
    async fn test_inline_load_and_toggle() {
        let api = FakeApi::with_snapshot(snapshot());
        let mut controller = controller(api.clone());

        controller.load(false).await;
        assert_eq!(controller.dashboard().view().states[0], ViewState::Loading);
        assert_eq!(controller.dashboard().store().len(), 2);

        controller.toggle_save("a").await;
        assert!(controller.dashboard().store().find("a").unwrap().saved);
        assert!(api.snapshot.lock().unwrap().articles[0].saved);

        controller.toggle_save("missing").await;
        assert_eq!(api.saves.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unsupported_save_keeps_flag() {
        let api = FakeApi::with_snapshot(snapshot());
        *api.save_error.lock().unwrap() = Some(405);
        let mut controller = controller(api.clone());

        controller.load(false).await;
        controller.toggle_save("a").await;

        assert!(!controller.dashboard().store().find("a").unwrap().saved);
        assert_eq!(
            controller.dashboard().view().last_notification(),
            Some(&(DashboardError::SaveUnsupported.to_string(), NotificationKind::Error))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_loop() {
        let api = FakeApi::with_snapshot(snapshot());
        let (tx, rx) = mpsc::channel(8);
        let handle = tokio::spawn(controller(api.clone()).run(rx));

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(api.fetches.load(Ordering::SeqCst), 1);

        tx.send(DashboardEvent::ToggleSave("a".to_string())).await.unwrap();
        tx.send(DashboardEvent::SelectFilter(FilterKey::Saved)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;

        // Notification from the save is hidden after three seconds.
        tokio::time::sleep(Duration::from_secs(4)).await;

        // One silent refresh at the one minute mark.
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(api.fetches.load(Ordering::SeqCst), 2);

        tx.send(DashboardEvent::Quit).await.unwrap();
        let dashboard = handle.await.unwrap();
        let view = dashboard.view();

        assert_eq!(view.states[0], ViewState::Loading);
        assert!(view
            .notifications
            .iter()
            .any(|(text, _)| text == SAVED_MESSAGE));
        assert_eq!(view.last_notification().unwrap().0, REFRESHED_MESSAGE);
        assert!(view.hidden >= 1);

        assert_eq!(dashboard.filter(), &FilterKey::Saved);
        let cards = view.last_state().unwrap().cards();
        let ids: Vec<_> = cards.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_background_failures_stay_quiet() {
        let api = FakeApi::with_snapshot(snapshot());
        let (tx, rx) = mpsc::channel(8);
        let handle = tokio::spawn(controller(api.clone()).run(rx));

        tokio::time::sleep(Duration::from_millis(10)).await;
        api.fail_loads.store(true, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(125)).await;
        assert_eq!(api.fetches.load(Ordering::SeqCst), 3);

        tx.send(DashboardEvent::Quit).await.unwrap();
        let dashboard = handle.await.unwrap();

        assert_eq!(dashboard.refresh_failures(), 2);
        assert_eq!(dashboard.store().len(), 2);
        assert!(!dashboard
            .view()
            .states
            .iter()
            .any(|s| matches!(s, ViewState::Error(_))));
        assert!(dashboard.view().notifications.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_explicit_reload_shows_error() {
        let api = FakeApi::with_snapshot(snapshot());
        let (tx, rx) = mpsc::channel(8);
        let handle = tokio::spawn(controller(api.clone()).run(rx));

        tokio::time::sleep(Duration::from_millis(10)).await;
        api.fail_loads.store(true, Ordering::SeqCst);
        tx.send(DashboardEvent::Reload).await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;

        drop(tx);
        let dashboard = handle.await.unwrap();
        assert_eq!(
            dashboard.view().last_state(),
            Some(&ViewState::Error("HTTP 503: Service Unavailable".to_string()))
        );
        assert_eq!(dashboard.store().len(), 2);
    }
}
