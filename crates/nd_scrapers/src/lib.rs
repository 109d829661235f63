pub mod manager;
pub mod scrapers;

pub use manager::{append_progress, ScrapeReport, ScraperManager};
pub use scrapers::{
    all_scrapers, http_client, scrapers_for, BensBitesScraper, BoxedScraper, RedditScraper, Scraper,
};

pub mod prelude {
    pub use super::scrapers::*;
    pub use super::{ScrapeReport, ScraperManager};
}
