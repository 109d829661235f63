use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tracing::info;

pub mod handlers;
pub mod state;

pub use state::AppState;

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/", get(handlers::index))
        .route("/index.html", get(handlers::index))
        .route("/api/articles", get(handlers::list_articles))
        .route("/api/articles/:id/save", post(handlers::save_article))
        .layer(ServiceBuilder::new().layer(cors))
        .with_state(Arc::new(state))
}

/// Binds `addr` and serves the dashboard until the process stops.
pub async fn serve(addr: SocketAddr, state: AppState) -> nd_core::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("🚀 News dashboard server running at http://{}", listener.local_addr()?);
    axum::serve(listener, create_app(state)).await?;
    Ok(())
}

pub mod prelude {
    pub use crate::{create_app, serve, AppState};
    pub use nd_core::{Article, Error, Result};
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use async_trait::async_trait;
    use axum::http::{header, Method, Request, StatusCode};
    use nd_core::{Article, ArticleStorage, DashboardSnapshot};
    use nd_storage::InMemoryStorage;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn articles() -> Vec<Article> {
        vec![
            Article::new("a1", "<script>x</script>", "Reddit", "https://a", "2024-01-01T10:00:00Z"),
            Article::new("b2", "Digest", "Ben's Bites", "https://b", "2024-01-01T11:00:00Z")
                .with_saved(true),
        ]
    }

    fn app() -> Router {
        let storage = Arc::new(InMemoryStorage::with_articles(articles()));
        create_app(AppState::new(storage))
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn save_request(id: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(format!("/api/articles/{}/save", id))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_list_articles() {
        let response = app()
            .oneshot(Request::get("/api/articles").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["articles"].as_array().unwrap().len(), 2);
        assert!(body["last_updated"].is_string());
    }

    #[tokio::test]
    async fn test_save_article() {
        let app = app();
        let response = app
            .clone()
            .oneshot(save_request("a1", r#"{"saved": true}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({ "success": true }));

        let response = app
            .oneshot(Request::get("/api/articles").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["articles"][0]["saved"], json!(true));
    }

    #[tokio::test]
    async fn test_save_missing_flag_defaults_to_false() {
        let app = app();
        let response = app.clone().oneshot(save_request("b2", "{}")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(Request::get("/api/articles").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(body_json(response).await["articles"][1]["saved"], json!(false));
    }

    #[tokio::test]
    async fn test_save_unknown_article() {
        let response = app()
            .oneshot(save_request("nope", r#"{"saved": true}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await, json!({ "error": "Article not found" }));
    }

    #[tokio::test]
    async fn test_index_page() {
        let response = app()
            .oneshot(Request::get("/?filter=saved").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let page = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(page.contains(r#"data-id="b2""#));
        assert!(!page.contains(r#"data-id="a1""#));
        assert!(page.contains(r#"class="filter-btn active" data-filter="saved""#));
        assert!(page.contains(r#"<span id="total-count">2</span>"#));
    }

    #[tokio::test]
    async fn test_index_escapes_titles() {
        let response = app()
            .oneshot(Request::get("/index.html").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let page = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(page.contains("&lt;script&gt;x&lt;/script&gt;"));
        assert!(!page.contains("<script>x</script>"));
    }

    struct BrokenStorage;

    #[async_trait]
    impl ArticleStorage for BrokenStorage {
        async fn load_snapshot(&self) -> nd_core::Result<DashboardSnapshot> {
            Err(nd_core::Error::Storage("disk unavailable".to_string()))
        }
        async fn update_saved_status(&self, _id: &str, _saved: bool) -> nd_core::Result<bool> {
            Err(nd_core::Error::Storage("disk unavailable".to_string()))
        }
        async fn store_articles(&self, _articles: Vec<Article>) -> nd_core::Result<usize> {
            Err(nd_core::Error::Storage("disk unavailable".to_string()))
        }
    }

    #[tokio::test]
    async fn test_index_shows_error_state_when_storage_fails() {
        let app = create_app(AppState::new(Arc::new(BrokenStorage)));
        let response = app
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let page = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(page.contains(r#"<div id="error-state" style="display: block">"#));
        assert!(page.contains("Storage error: disk unavailable"));
        assert!(page.contains(r#"<span id="total-count">0</span>"#));
    }

    #[tokio::test]
    async fn test_api_reports_storage_failure_as_json() {
        let app = create_app(AppState::new(Arc::new(BrokenStorage)));
        let response = app
            .oneshot(Request::get("/api/articles").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "Storage error: disk unavailable" })
        );
    }

    #[tokio::test]
    async fn test_cors_preflight() {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/articles")
            .header(header::ORIGIN, "http://example.com")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    }
}
