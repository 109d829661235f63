use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use nd_core::filter::sources;
use nd_core::html::page_html;
use nd_core::types::SaveRequest;
use nd_core::{ArticleStore, DashboardError, DashboardSnapshot, FilterKey, ViewState};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::AppState;

/// Storage failures become a 500 with the message in the body.
pub struct ApiError(nd_core::Error);

impl From<nd_core::Error> for ApiError {
    fn from(err: nd_core::Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!("❌ Request failed: {}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": self.0.to_string() })),
        )
            .into_response()
    }
}

pub async fn list_articles(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DashboardSnapshot>, ApiError> {
    Ok(Json(state.storage.load_snapshot().await?))
}

pub async fn save_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<SaveRequest>,
) -> Result<Response, ApiError> {
    if state.storage.update_saved_status(&id, request.saved).await? {
        info!("💾 Article {} saved={}", id, request.saved);
        Ok((StatusCode::OK, Json(json!({ "success": true }))).into_response())
    } else {
        Ok((
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Article not found" })),
        )
            .into_response())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct IndexQuery {
    pub filter: Option<String>,
}

/// The dashboard rendered on the server for the requested filter. A storage
/// failure renders the page in its error state.
pub async fn index(
    State(state): State<Arc<AppState>>,
    Query(query): Query<IndexQuery>,
) -> (StatusCode, Html<String>) {
    let filter = query
        .filter
        .as_deref()
        .map(FilterKey::from)
        .unwrap_or_default();

    let mut store = ArticleStore::new();
    let (status, view) = match state.storage.load_snapshot().await {
        Ok(snapshot) => {
            store.replace(snapshot);
            (StatusCode::OK, state.renderer.project(store.articles(), &filter))
        }
        Err(e) => {
            error!("❌ Failed to load articles for the page: {}", e);
            let failure = DashboardError::load(&e);
            (StatusCode::INTERNAL_SERVER_ERROR, ViewState::Error(failure.to_string()))
        }
    };

    let stats = state.renderer.stats(&store, true);
    let sources = sources(store.articles());
    (status, Html(page_html(&view, &stats, &filter, &sources)))
}
