use async_trait::async_trait;
use nd_core::types::SaveRequest;
use nd_core::{ArticleApi, DashboardSnapshot, Error, Result};
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::config::DashboardConfig;

/// [`ArticleApi`] over HTTP against the dashboard server.
#[derive(Debug, Clone)]
pub struct HttpArticleApi {
    client: Client,
    base_url: Url,
}

impl HttpArticleApi {
    pub fn new(config: &DashboardConfig) -> Result<Self> {
        let base_url = config.validate()?;
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[async_trait]
impl ArticleApi for HttpArticleApi {
    async fn fetch_snapshot(&self) -> Result<DashboardSnapshot> {
        let url = self.endpoint(&["api", "articles"])?;
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(Error::status(response.status()));
        }
        Ok(response.json::<DashboardSnapshot>().await?)
    }

    async fn set_saved(&self, id: &str, saved: bool) -> Result<()> {
        let url = self.endpoint(&["api", "articles", id, "save"])?;
        debug!("POST {} saved={}", url, saved);
        let response = self
            .client
            .post(url)
            .json(&SaveRequest { saved })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Error::status(response.status()));
        }
        Ok(())
    }
}
