use std::sync::Arc;

use nd_core::{ArticleStorage, Renderer};

pub struct AppState {
    pub storage: Arc<dyn ArticleStorage>,
    pub renderer: Renderer,
}

impl AppState {
    pub fn new(storage: Arc<dyn ArticleStorage>) -> Self {
        Self {
            storage,
            renderer: Renderer::default(),
        }
    }
}
