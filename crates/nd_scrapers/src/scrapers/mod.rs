use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use nd_core::{Article, Clock, Error, Result};
use reqwest::Client;
use tracing::warn;
use url::Url;

pub mod bensbites;
pub mod reddit;

pub use bensbites::BensBitesScraper;
pub use reddit::RedditScraper;

pub const USER_AGENT: &str = "AI-News-Dashboard/1.0";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
/// Longest summary kept from a source, in characters, before the ellipsis.
pub const SUMMARY_LIMIT: usize = 200;

#[async_trait]
pub trait Scraper: Send + Sync {
    /// Name of the news source, as shown on the dashboard.
    fn source(&self) -> &str;

    /// Shorthand names accepted by `nd scrape --source`.
    fn cli_names(&self) -> Vec<&str> {
        vec![]
    }

    /// Fetches the latest articles. Ids are already assigned.
    async fn fetch_articles(&self) -> Result<Vec<Article>>;
}

pub type BoxedScraper = Box<dyn Scraper>;

/// Client shared by every scraper.
pub fn http_client() -> Result<Client> {
    Ok(Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()?)
}

/// Every known scraper, in the order a run visits them.
pub fn all_scrapers(client: &Client, clock: Arc<dyn Clock>) -> Vec<BoxedScraper> {
    let bensbites: BoxedScraper = Box::new(BensBitesScraper::new(client.clone(), clock.clone()));
    let reddit: BoxedScraper = Box::new(RedditScraper::new(client.clone(), clock));
    vec![bensbites, reddit]
}

/// The scrapers answering to `name`, or all of them when `name` is `None`.
pub fn scrapers_for(
    name: Option<&str>,
    client: &Client,
    clock: Arc<dyn Clock>,
) -> Result<Vec<BoxedScraper>> {
    let scrapers = all_scrapers(client, clock);
    let Some(name) = name else {
        return Ok(scrapers);
    };
    let name = name.to_lowercase();
    let selected: Vec<_> = scrapers
        .into_iter()
        .filter(|s| s.cli_names().contains(&name.as_str()))
        .collect();
    if selected.is_empty() {
        return Err(Error::Config(format!("Unknown news source: {}", name)));
    }
    Ok(selected)
}

pub(crate) mod utils {
    use super::*;

    pub fn parse_url(url: &str) -> Result<Url> {
        Url::parse(url).map_err(|e| Error::InvalidUrl(format!("{}: {}", url, e)))
    }

    /// Cuts `text` to [`SUMMARY_LIMIT`] characters, marking the cut with
    /// `...`. Blank text gives `None`.
    pub fn truncate_summary(text: &str) -> Option<String> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        if text.chars().count() <= SUMMARY_LIMIT {
            return Some(text.to_string());
        }
        let cut: String = text.chars().take(SUMMARY_LIMIT - 3).collect();
        Some(format!("{}...", cut.trim_end()))
    }

    /// GET with `retries` extra attempts, waiting `delay` between them.
    /// Non-2xx responses count as failures.
    pub async fn fetch_with_retry(
        client: &Client,
        url: &Url,
        retries: u32,
        delay: Duration,
    ) -> Result<String> {
        let mut attempt = 0;
        loop {
            let result = async {
                let response = client.get(url.clone()).send().await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(Error::status(status));
                }
                Ok::<_, Error>(response.text().await?)
            }
            .await;

            match result {
                Ok(body) => return Ok(body),
                Err(e) if attempt < retries => {
                    attempt += 1;
                    warn!("⚠️ Retry {}/{} for {}: {}", attempt, retries, url, e);
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::utils::*;
    use super::*;
    use nd_core::SystemClock;

    #[test]
    fn test_parse_url() {
        assert!(parse_url("https://bensbites.com/archive").is_ok());
        assert!(parse_url("not a url").is_err());
    }

    #[test]
    fn test_truncate_summary() {
        assert_eq!(truncate_summary("   "), None);
        assert_eq!(truncate_summary("short").as_deref(), Some("short"));

        let long = "é".repeat(250);
        let cut = truncate_summary(&long).unwrap();
        assert_eq!(cut.chars().count(), SUMMARY_LIMIT);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn test_scrapers_for() {
        let client = http_client().unwrap();
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let all = scrapers_for(None, &client, clock.clone()).unwrap();
        assert_eq!(
            all.iter().map(|s| s.source()).collect::<Vec<_>>(),
            vec!["Ben's Bites", "Reddit"]
        );

        let reddit = scrapers_for(Some("Reddit"), &client, clock.clone()).unwrap();
        assert_eq!(reddit.len(), 1);
        assert_eq!(reddit[0].source(), "Reddit");

        assert!(scrapers_for(Some("rundown"), &client, clock).is_err());
    }
}
