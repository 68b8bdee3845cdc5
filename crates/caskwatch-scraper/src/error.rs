use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("failed to load catalog {path}: {reason}")]
    Catalog { path: String, reason: String },

    #[error("{source_name}: all {units} units failed")]
    AllUnitsFailed { source_name: String, units: usize },

    #[error("worker task lost before reporting: {0}")]
    TaskLost(String),
}

impl ScraperError {
    /// Whether the failure is worth another attempt after a backoff.
    ///
    /// Status failures and transport errors count as upstream throttling;
    /// malformed bodies do not.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ScraperError::Http(_) | ScraperError::UnexpectedStatus { .. }
        )
    }
}
