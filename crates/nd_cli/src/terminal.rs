use std::io::Write;
use std::sync::{Arc, Mutex};

use crossterm::style::Stylize;
use nd_client::DashboardEvent;
use nd_core::{DashboardView, FilterKey, NotificationKind, Stats, ViewState};
use tracing::warn;

/// Ids of the cards currently on screen, in display order. Shared with the
/// input reader so `s 3` can name the third card.
pub type VisibleIds = Arc<Mutex<Vec<String>>>;

/// Line-oriented dashboard for a terminal.
pub struct TerminalView<W: Write> {
    out: W,
    visible: VisibleIds,
    filter: FilterKey,
    last_updated: Option<String>,
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            visible: Arc::new(Mutex::new(Vec::new())),
            filter: FilterKey::All,
            last_updated: None,
        }
    }

    pub fn visible_ids(&self) -> VisibleIds {
        self.visible.clone()
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn set_visible(&self, ids: Vec<String>) {
        if let Ok(mut visible) = self.visible.lock() {
            *visible = ids;
        }
    }

    fn write_line(&mut self, line: std::fmt::Arguments<'_>) -> std::io::Result<()> {
        writeln!(self.out, "{}", line)?;
        self.out.flush()
    }

    fn draw(&mut self, state: &ViewState) -> std::io::Result<()> {
        let out = &mut self.out;
        writeln!(out)?;
        writeln!(out, "{}", format!("── {} ──", self.filter).bold())?;
        match state {
            ViewState::Loading => writeln!(out, "⏳ Loading articles...")?,
            ViewState::Empty => writeln!(out, "📭 No articles found.")?,
            ViewState::Error(message) => {
                writeln!(out, "{} {}", "❌ Error:".red().bold(), message)?
            }
            ViewState::Populated(cards) => {
                for (i, card) in cards.iter().enumerate() {
                    writeln!(
                        out,
                        "{:>3}. {} {} {}",
                        i + 1,
                        card.save_icon(),
                        format!("[{}]", card.source_label).cyan(),
                        card.title.as_str().bold()
                    )?;
                    if let Some(summary) = &card.summary {
                        writeln!(out, "     {}", summary)?;
                    }
                    writeln!(out, "     {} · {}", card.time_ago.as_str().dim(), card.url)?;
                }
            }
        }
        out.flush()
    }
}

impl<W: Write> DashboardView for TerminalView<W> {
    fn show_state(&mut self, state: &ViewState) {
        self.set_visible(state.cards().iter().map(|c| c.id.clone()).collect());
        if let Err(e) = self.draw(state) {
            warn!("Failed to draw dashboard: {}", e);
        }
    }

    fn update_stats(&mut self, stats: &Stats) {
        if let Some(label) = &stats.last_updated {
            self.last_updated = Some(label.clone());
        }
        let updated = self.last_updated.clone().unwrap_or_else(|| "-".to_string());
        let written = self.write_line(format_args!(
            "📊 {} articles · {} saved · updated {}",
            stats.total, stats.saved, updated
        ));
        if let Err(e) = written {
            warn!("Failed to draw stats: {}", e);
        }
    }

    fn set_active_filter(&mut self, filter: &FilterKey) {
        self.filter = filter.clone();
    }

    fn show_notification(&mut self, text: &str, kind: NotificationKind) {
        let line = match kind {
            NotificationKind::Normal => format!("🔔 {}", text).green(),
            NotificationKind::Error => format!("🔔 {}", text).red(),
        };
        if let Err(e) = self.write_line(format_args!("{}", line)) {
            warn!("Failed to draw notification: {}", e);
        }
    }

    fn hide_notification(&mut self) {}
}

/// Turns one line of user input into an event.
///
/// `f <key>` filters, `s <n|id>` toggles the save flag of the n-th visible
/// card or of an article id, `r` reloads and `q` quits.
pub fn parse_command(line: &str, visible: &[String]) -> Option<DashboardEvent> {
    let line = line.trim();
    let (command, arg) = match line.split_once(char::is_whitespace) {
        Some((command, arg)) => (command, arg.trim()),
        None => (line, ""),
    };

    match command {
        "q" | "quit" => Some(DashboardEvent::Quit),
        "r" | "reload" => Some(DashboardEvent::Reload),
        "f" | "filter" if !arg.is_empty() => Some(DashboardEvent::SelectFilter(FilterKey::from(arg))),
        "s" | "save" if !arg.is_empty() => {
            let id = match arg.parse::<usize>() {
                Ok(n) if n >= 1 && n <= visible.len() => visible[n - 1].clone(),
                _ => arg.to_string(),
            };
            Some(DashboardEvent::ToggleSave(id))
        }
        _ => None,
    }
}

pub const HELP: &str = "Commands: f <all|saved|source>  s <n|id>  r (reload)  q (quit)";
