pub mod api;
pub mod error;
pub mod filter;
pub mod html;
pub mod render;
pub mod sanitize;
pub mod storage;
pub mod store;
pub mod time;
pub mod types;
pub mod view;

pub use api::ArticleApi;
pub use error::{DashboardError, Error};
pub use filter::FilterKey;
pub use render::Renderer;
pub use storage::ArticleStorage;
pub use store::{ArticleStore, Stats};
pub use time::{Clock, SystemClock};
pub use types::{Article, DashboardSnapshot};
pub use view::{ArticleCard, DashboardView, NotificationKind, ViewState};

pub type Result<T> = std::result::Result<T, Error>;

pub mod prelude {
    pub use crate::{
        Article, ArticleApi, ArticleStorage, ArticleStore, DashboardError, DashboardSnapshot,
        DashboardView, Error, FilterKey, Result, ViewState,
    };
}
