use std::time::Duration;

use nd_core::{DashboardView, NotificationKind};

/// A shown notification. Hand it back to [`NotificationPresenter::expire`]
/// once `duration` has passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationTicket {
    pub generation: u64,
    pub duration: Duration,
}

/// Keeps at most one notification on screen. A new one replaces the text of
/// the current one; expiry of an older generation is ignored.
#[derive(Debug)]
pub struct NotificationPresenter {
    duration: Duration,
    generation: u64,
    visible: bool,
}

impl NotificationPresenter {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            generation: 0,
            visible: false,
        }
    }

    pub fn show<V: DashboardView + ?Sized>(
        &mut self,
        view: &mut V,
        text: &str,
        kind: NotificationKind,
    ) -> NotificationTicket {
        self.generation += 1;
        self.visible = true;
        view.show_notification(text, kind);
        NotificationTicket {
            generation: self.generation,
            duration: self.duration,
        }
    }

    /// Hides the notification if `generation` is still the one on screen.
    /// Returns whether anything was hidden.
    pub fn expire<V: DashboardView + ?Sized>(&mut self, view: &mut V, generation: u64) -> bool {
        if generation != self.generation || !self.visible {
            return false;
        }
        self.visible = false;
        view.hide_notification();
        true
    }
}
