use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use nd_core::{Article, Clock, Error, Result};
use nd_storage::generate_article_id;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, info};
use url::Url;

use super::utils::{parse_url, truncate_summary};
use super::Scraper;

pub const SOURCE: &str = "Reddit";
pub const BASE_URL: &str = "https://reddit.com";
pub const SUBREDDITS: [&str; 3] = ["artificial", "MachineLearning", "Singularity"];
pub const POSTS_PER_SUBREDDIT: usize = 10;

#[derive(Debug, Default, Deserialize)]
struct Listing {
    #[serde(default)]
    data: ListingData,
}

#[derive(Debug, Default, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Child>,
}

#[derive(Debug, Deserialize)]
struct Child {
    #[serde(default)]
    data: Post,
}

#[derive(Debug, Default, Deserialize)]
struct Post {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    ups: i64,
    author: Option<String>,
    created_utc: Option<f64>,
    #[serde(default)]
    selftext: String,
}

/// Top posts of the day from a few AI subreddits, through Reddit's public
/// JSON listings.
#[derive(Clone)]
pub struct RedditScraper {
    client: Client,
    clock: Arc<dyn Clock>,
    base_url: String,
    subreddits: Vec<String>,
    limit: usize,
    /// Pause between subreddits.
    delay: Duration,
}

impl RedditScraper {
    pub fn new(client: Client, clock: Arc<dyn Clock>) -> Self {
        Self {
            client,
            clock,
            base_url: BASE_URL.to_string(),
            subreddits: SUBREDDITS.iter().map(|s| s.to_string()).collect(),
            limit: POSTS_PER_SUBREDDIT,
            delay: Duration::from_secs(1),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        parse_url(base_url)?;
        self.base_url = base_url.to_string();
        Ok(self)
    }

    pub fn with_subreddits(mut self, subreddits: Vec<String>) -> Self {
        self.subreddits = subreddits;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn listing_url(&self, subreddit: &str) -> Result<Url> {
        let mut url = parse_url(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|_| Error::InvalidUrl(format!("{} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(["r", subreddit, "top.json"]);
        url.query_pairs_mut()
            .append_pair("t", "day")
            .append_pair("limit", &self.limit.to_string());
        Ok(url)
    }

    async fn fetch_subreddit(&self, subreddit: &str) -> Result<Vec<Article>> {
        let url = self.listing_url(subreddit)?;
        info!("🔍 Fetching r/{}...", subreddit);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::status(status));
        }
        let listing: Listing = response.json().await?;
        info!("📰 Found {} posts from r/{}", listing.data.children.len(), subreddit);

        Ok(listing
            .data
            .children
            .into_iter()
            .filter_map(|child| self.to_article(child.data, subreddit))
            .collect())
    }

    fn to_article(&self, post: Post, subreddit: &str) -> Option<Article> {
        if post.title.trim().is_empty() || post.url.trim().is_empty() {
            debug!("Skipping post without title or url in r/{}", subreddit);
            return None;
        }

        let published = post
            .created_utc
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs as i64, 0))
            .unwrap_or_else(|| self.clock.now());

        let mut article = Article::new(
            generate_article_id(&post.url),
            post.title,
            SOURCE,
            post.url,
            published.to_rfc3339_opts(SecondsFormat::Secs, true),
        );
        article.summary = truncate_summary(&post.selftext);
        article.extra.insert("category".to_string(), json!(format!("r/{}", subreddit)));
        article.extra.insert(
            "metadata".to_string(),
            json!({
                "author": post.author.unwrap_or_else(|| "Unknown".to_string()),
                "upvotes": post.ups,
                "subreddit": subreddit,
            }),
        );
        Some(article)
    }
}

#[async_trait]
impl Scraper for RedditScraper {
    fn source(&self) -> &str {
        SOURCE
    }

    fn cli_names(&self) -> Vec<&str> {
        vec!["reddit"]
    }

    /// Subreddits that fail are skipped. Only when every one of them fails
    /// does the scraper report an error.
    async fn fetch_articles(&self) -> Result<Vec<Article>> {
        let mut articles = Vec::new();
        let mut failures = Vec::new();

        for (i, subreddit) in self.subreddits.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.delay).await;
            }
            match self.fetch_subreddit(subreddit).await {
                Ok(mut posts) => articles.append(&mut posts),
                Err(e) => {
                    error!("❌ Error scraping r/{}: {}", subreddit, e);
                    failures.push(format!("r/{}: {}", subreddit, e));
                }
            }
        }

        if !self.subreddits.is_empty() && failures.len() == self.subreddits.len() {
            return Err(Error::Scraping(failures.join("; ")));
        }
        info!("✅ Scraped {} total posts from Reddit", articles.len());
        Ok(articles)
    }
}
