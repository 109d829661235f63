use std::time::Duration;

use nd_core::{Error, Result};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const AUTO_REFRESH_INTERVAL: Duration = Duration::from_secs(60);
pub const NOTIFICATION_DURATION: Duration = Duration::from_secs(3);

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub base_url: String,
    pub refresh_interval: Duration,
    pub notification_duration: Duration,
    /// `None` leaves the transport default in place.
    pub request_timeout: Option<Duration>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            refresh_interval: AUTO_REFRESH_INTERVAL,
            notification_duration: NOTIFICATION_DURATION,
            request_timeout: None,
        }
    }
}

impl DashboardConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    pub fn with_notification_duration(mut self, duration: Duration) -> Self {
        self.notification_duration = duration;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Checks the settings and returns the parsed base URL. The base must be
    /// http(s) and able to carry path segments.
    pub fn validate(&self) -> Result<Url> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| Error::InvalidUrl(format!("{}: {}", self.base_url, e)))?;
        if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
            return Err(Error::InvalidUrl(format!(
                "{}: expected an http(s) base URL",
                self.base_url
            )));
        }
        if self.refresh_interval.is_zero() {
            return Err(Error::Config("refresh interval must be non-zero".to_string()));
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DashboardConfig::default();
        assert_eq!(config.refresh_interval, Duration::from_secs(60));
        assert_eq!(config.notification_duration, Duration::from_secs(3));
        assert!(config.request_timeout.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_base_urls() {
        assert!(DashboardConfig::new("not a url").validate().is_err());
        assert!(DashboardConfig::new("ftp://example.com").validate().is_err());
        assert!(DashboardConfig::new("mailto:me@example.com").validate().is_err());
        assert!(DashboardConfig::default()
            .with_refresh_interval(Duration::ZERO)
            .validate()
            .is_err());
    }
}
