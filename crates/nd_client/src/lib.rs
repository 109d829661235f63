pub mod config;
pub mod controller;
pub mod dashboard;
pub mod http;
pub mod notify;

pub use config::DashboardConfig;
pub use controller::{DashboardEvent, SyncController};
pub use dashboard::Dashboard;
pub use http::HttpArticleApi;
pub use notify::NotificationPresenter;

pub mod prelude {
    pub use super::{Dashboard, DashboardConfig, DashboardEvent, HttpArticleApi, SyncController};
    pub use nd_core::{ArticleApi, DashboardView, FilterKey, Result, Error};
}
