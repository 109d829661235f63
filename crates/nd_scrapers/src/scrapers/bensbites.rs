use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::SecondsFormat;
use nd_core::{Article, Clock, Error, Result};
use nd_storage::generate_article_id;
use reqwest::Client;
use scraper::{Html, Selector};
use serde_json::json;
use tracing::{info, warn};
use url::Url;

use super::utils::{fetch_with_retry, parse_url, truncate_summary};
use super::Scraper;

pub const SOURCE: &str = "Ben's Bites";
pub const BASE_URL: &str = "https://bensbites.com";
pub const ARTICLE_LIMIT: usize = 10;
pub const DEFAULT_AUTHOR: &str = "Ben Tossell";

/// What an article page tells us beyond its title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMetadata {
    pub published_at: Option<String>,
    pub summary: Option<String>,
    pub author: String,
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::Scraping(format!("Invalid selector {}: {}", css, e)))
}

/// Newsletter posts linked from the archive page as `(href, title)`, first
/// occurrence of each href only.
pub fn archive_links(html: &str) -> Result<Vec<(String, String)>> {
    let document = Html::parse_document(html);
    let links = selector(r#"a[href*="/p/"]"#)?;

    let mut seen = HashSet::new();
    Ok(document
        .select(&links)
        .filter_map(|a| {
            let href = a.value().attr("href")?.to_string();
            let title = a.text().collect::<Vec<_>>().join(" ");
            let title = title.split_whitespace().collect::<Vec<_>>().join(" ");
            seen.insert(href.clone()).then_some((href, title))
        })
        .collect())
}

/// Reads the publish time, description and author from an article page.
pub fn page_metadata(html: &str) -> Result<PageMetadata> {
    let document = Html::parse_document(html);
    let time = selector("time[datetime]")?;
    let descriptions = [
        selector(r#"meta[property="og:description"]"#)?,
        selector(r#"meta[name="description"]"#)?,
    ];
    let author = selector(r#"meta[property="article:author"]"#)?;

    let content_of = |sel: &Selector| {
        document
            .select(sel)
            .next()
            .and_then(|el| el.value().attr("content"))
            .map(str::to_string)
    };

    Ok(PageMetadata {
        published_at: document
            .select(&time)
            .next()
            .and_then(|el| el.value().attr("datetime"))
            .map(str::to_string),
        summary: descriptions
            .iter()
            .find_map(|sel| content_of(sel))
            .and_then(|text| truncate_summary(&text)),
        author: content_of(&author).unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
    })
}

/// The Ben's Bites newsletter archive. Each listed post is fetched for its
/// date and description.
#[derive(Clone)]
pub struct BensBitesScraper {
    client: Client,
    clock: Arc<dyn Clock>,
    base_url: String,
    limit: usize,
    retries: u32,
    retry_delay: Duration,
    /// Pause between article pages.
    delay: Duration,
}

impl BensBitesScraper {
    pub fn new(client: Client, clock: Arc<dyn Clock>) -> Self {
        Self {
            client,
            clock,
            base_url: BASE_URL.to_string(),
            limit: ARTICLE_LIMIT,
            retries: 1,
            retry_delay: Duration::from_secs(5),
            delay: Duration::from_secs(1),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        parse_url(base_url)?;
        self.base_url = base_url.to_string();
        Ok(self)
    }

    pub fn with_delays(mut self, delay: Duration, retry_delay: Duration) -> Self {
        self.delay = delay;
        self.retry_delay = retry_delay;
        self
    }

    fn archive_url(&self) -> Result<Url> {
        let mut url = parse_url(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|_| Error::InvalidUrl(format!("{} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .push("archive");
        Ok(url)
    }

    /// Metadata of one post. Fetch failures fall back to "now", no summary
    /// and the default author.
    async fn metadata(&self, url: &Url) -> PageMetadata {
        let page = fetch_with_retry(&self.client, url, self.retries, self.retry_delay).await;
        match page.and_then(|html| page_metadata(&html)) {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!("⚠️ Could not fetch metadata for {}: {}", url, e);
                PageMetadata {
                    published_at: None,
                    summary: None,
                    author: DEFAULT_AUTHOR.to_string(),
                }
            }
        }
    }
}

#[async_trait]
impl Scraper for BensBitesScraper {
    fn source(&self) -> &str {
        SOURCE
    }

    fn cli_names(&self) -> Vec<&str> {
        vec!["bensbites", "bens-bites"]
    }

    async fn fetch_articles(&self) -> Result<Vec<Article>> {
        let archive = self.archive_url()?;
        info!("🔍 Fetching Ben's Bites archive...");
        let html = fetch_with_retry(&self.client, &archive, self.retries, self.retry_delay).await?;

        let links = archive_links(&html)?;
        info!("📰 Processing {} unique articles (limit: {})", links.len(), self.limit);

        let mut articles = Vec::new();
        for (i, (href, title)) in links.into_iter().take(self.limit).enumerate() {
            if i > 0 {
                tokio::time::sleep(self.delay).await;
            }
            let url = match archive.join(&href) {
                Ok(url) => url,
                Err(e) => {
                    warn!("⚠️ Skipping link {}: {}", href, e);
                    continue;
                }
            };
            info!("  [{}/{}] {}", i + 1, self.limit, title);

            let metadata = self.metadata(&url).await;
            let published_at = metadata.published_at.unwrap_or_else(|| {
                self.clock.now().to_rfc3339_opts(SecondsFormat::Secs, true)
            });

            let url = url.to_string();
            let mut article = Article::new(generate_article_id(&url), title, SOURCE, url, published_at);
            article.summary = metadata.summary;
            article.extra.insert("category".to_string(), json!("AI News"));
            article.extra.insert(
                "metadata".to_string(),
                json!({ "author": metadata.author, "newsletter_issue": "" }),
            );
            articles.push(article);
        }

        info!("✅ Scraped {} articles from Ben's Bites", articles.len());
        Ok(articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archive_links() {
        let html = r#"
            <html><body>
              <a href="/p/first-issue">  First
                 issue </a>
              <a href="/about">About</a>
              <a href="https://bensbites.com/p/second">Second</a>
              <a href="/p/first-issue">First again</a>
            </body></html>
        "#;
        let links = archive_links(html).unwrap();
        assert_eq!(
            links,
            vec![
                ("/p/first-issue".to_string(), "First issue".to_string()),
                ("https://bensbites.com/p/second".to_string(), "Second".to_string()),
            ]
        );
    }

    #[test]
    fn test_page_metadata() {
        let html = r#"
            <html><head>
              <meta name="description" content="Plain description">
              <meta property="og:description" content="Open graph description">
              <meta property="article:author" content="Keith">
            </head><body>
              <time datetime="2024-05-01T08:00:00.000Z">May 1</time>
            </body></html>
        "#;
        let metadata = page_metadata(html).unwrap();
        assert_eq!(metadata.published_at.as_deref(), Some("2024-05-01T08:00:00.000Z"));
        assert_eq!(metadata.summary.as_deref(), Some("Open graph description"));
        assert_eq!(metadata.author, "Keith");

        let bare = page_metadata(r#"<meta name="description" content="Only this">"#).unwrap();
        assert_eq!(bare.published_at, None);
        assert_eq!(bare.summary.as_deref(), Some("Only this"));
        assert_eq!(bare.author, DEFAULT_AUTHOR);
    }
}
