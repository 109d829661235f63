use async_trait::async_trait;

use crate::types::DashboardSnapshot;
use crate::Result;

/// The remote endpoint the dashboard reads from and writes saves to.
#[async_trait]
pub trait ArticleApi: Send + Sync {
    /// `GET /api/articles`. Any non-2xx status is an error.
    async fn fetch_snapshot(&self) -> Result<DashboardSnapshot>;

    /// `POST /api/articles/{id}/save` with `{ "saved": saved }`.
    async fn set_saved(&self, id: &str, saved: bool) -> Result<()>;
}
