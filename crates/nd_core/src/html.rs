//! HTML markup for the dashboard page.
//!
//! Free text is escaped at the point it is interpolated. Save buttons carry
//! the article id in `data-id` so one delegated click handler covers every
//! card.

use std::fmt::Write;

use url::form_urlencoded::byte_serialize;

use crate::filter::FilterKey;
use crate::sanitize::escape_html;
use crate::store::Stats;
use crate::view::{ArticleCard, ViewState};

pub fn card_html(card: &ArticleCard) -> String {
    let id = escape_html(&card.id);
    let saved_class = if card.saved { " saved" } else { "" };

    let mut html = String::new();
    let _ = write!(
        html,
        r#"<div class="article-card" data-id="{id}">
    <div class="article-header">
        <span class="source-badge {class}">{label}</span>
        <button class="save-btn{saved_class}" data-id="{id}">{icon}</button>
    </div>
    <h3 class="article-title">{title}</h3>
"#,
        class = card.source_class,
        label = escape_html(&card.source_label),
        icon = card.save_icon(),
        title = escape_html(&card.title),
    );
    if let Some(summary) = &card.summary {
        let _ = writeln!(html, r#"    <p class="article-summary">{}</p>"#, escape_html(summary));
    }
    let _ = write!(
        html,
        r#"    <div class="article-footer">
        <span class="article-meta">{time_ago}</span>
        <a href="{url}" target="_blank" rel="noopener noreferrer" class="read-more">Read More →</a>
    </div>
</div>
"#,
        time_ago = escape_html(&card.time_ago),
        url = escape_html(&card.url),
    );
    html
}

/// Contents of the article grid. Empty for every state but `Populated`.
pub fn grid_html(state: &ViewState) -> String {
    state.cards().iter().map(card_html).collect()
}

fn region(id: &str, visible: bool, body: &str) -> String {
    let display = if visible { "block" } else { "none" };
    format!(r#"<div id="{id}" style="display: {display}">{body}</div>"#)
}

/// A complete page: stats bar, filter controls, the four state regions and
/// the notification area.
pub fn page_html(state: &ViewState, stats: &Stats, active: &FilterKey, sources: &[&str]) -> String {
    let mut filters = vec![FilterKey::All, FilterKey::Saved];
    filters.extend(sources.iter().map(|s| FilterKey::Source(s.to_string())));

    let mut controls = String::new();
    for key in &filters {
        let active_class = if key == active { " active" } else { "" };
        let value = escape_html(key.as_str());
        let _ = write!(
            controls,
            r#"<a class="filter-btn{active_class}" data-filter="{value}" href="/?filter={href}">{value}</a>"#,
            href = byte_serialize(key.as_str().as_bytes()).collect::<String>(),
        );
    }

    let error_body = match state {
        ViewState::Error(message) => format!(
            r#"<p id="error-message">{}</p>"#,
            escape_html(message)
        ),
        _ => String::new(),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>News Dashboard</title>
</head>
<body>
<header class="stats">
<span id="total-count">{total}</span> articles, <span id="saved-count">{saved}</span> saved, updated <span id="last-updated">{updated}</span>
</header>
<nav class="filters">{controls}</nav>
{loading}
{empty}
{error}
<div id="articles-grid">
{grid}</div>
<div id="notification"><span id="notification-text"></span></div>
</body>
</html>
"#,
        total = stats.total,
        saved = stats.saved,
        updated = escape_html(stats.last_updated.as_deref().unwrap_or("-")),
        loading = region("loading", matches!(state, ViewState::Loading), "Loading articles..."),
        empty = region("empty-state", matches!(state, ViewState::Empty), "No articles found."),
        error = region("error-state", matches!(state, ViewState::Error(_)), &error_body),
        grid = grid_html(state),
    )
}
