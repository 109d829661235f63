use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {code}: {reason}")]
    Status { code: u16, reason: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Scraping error: {0}")]
    Scraping(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Builds a [`Error::Status`] from a response status code.
    pub fn status(status: reqwest::StatusCode) -> Self {
        Self::Status {
            code: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { code, .. } => Some(*code),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Failures the dashboard surfaces to the user. None of them stop the
/// dashboard; they become either the error state or a notification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DashboardError {
    #[error("{0}")]
    LoadFailed(String),

    #[error("Save functionality is not available in this deployment. Use the local server for full features.")]
    SaveUnsupported,

    #[error("Failed to save article")]
    SaveFailed,
}

impl DashboardError {
    pub fn load(err: &Error) -> Self {
        Self::LoadFailed(err.to_string())
    }

    /// 404 and 405 mean the write path does not exist in this deployment.
    pub fn save(err: &Error) -> Self {
        match err.status_code() {
            Some(404) | Some(405) => Self::SaveUnsupported,
            _ => Self::SaveFailed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_status_message() {
        let err = Error::status(StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "HTTP 500: Internal Server Error");
        assert_eq!(
            DashboardError::load(&err),
            DashboardError::LoadFailed("HTTP 500: Internal Server Error".to_string())
        );
    }

    #[test]
    fn test_save_classification() {
        let not_found = Error::status(StatusCode::NOT_FOUND);
        let not_allowed = Error::status(StatusCode::METHOD_NOT_ALLOWED);
        let server = Error::status(StatusCode::BAD_GATEWAY);

        assert_eq!(DashboardError::save(&not_found), DashboardError::SaveUnsupported);
        assert_eq!(DashboardError::save(&not_allowed), DashboardError::SaveUnsupported);
        assert_eq!(DashboardError::save(&server), DashboardError::SaveFailed);
        assert_eq!(
            DashboardError::save(&Error::Storage("disk full".to_string())),
            DashboardError::SaveFailed
        );
    }
}
