//! Polling knobs shared by every source.

use std::time::Duration;

use caskwatch_core::AppConfig;

use crate::error::ScraperError;

/// Polling behaviour for a source, usually derived from [`AppConfig`].
#[derive(Debug, Clone)]
pub struct SourceSettings {
    pub request_timeout: Duration,
    pub user_agent: String,
    /// Sleep before every sequential request except the first.
    pub base_delay: Duration,
    /// Attempts per store before the store is abandoned for the run.
    pub max_retries: u32,
    /// Length of one backoff step. Production uses one second.
    pub backoff_unit: Duration,
    /// Upper bound on the backoff multiplier, in `backoff_unit`s.
    pub backoff_ceiling: u64,
    pub max_concurrent: usize,
    /// Sleep at the start of each concurrent task.
    pub task_delay: Duration,
}

impl SourceSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            request_timeout: config.request_timeout(),
            user_agent: config.user_agent.clone(),
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_retries: config.max_retries,
            backoff_unit: Duration::from_secs(1),
            backoff_ceiling: config.backoff_ceiling_secs,
            max_concurrent: config.max_concurrent.max(1),
            task_delay: Duration::from_millis(config.task_delay_ms),
        }
    }

    pub(crate) fn build_client(&self) -> Result<reqwest::Client, reqwest::Error> {
        reqwest::Client::builder()
            .timeout(self.request_timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(&self.user_agent)
            .build()
    }
}

/// Validates a site origin and strips any trailing slash.
pub(crate) fn normalize_origin(origin: &str) -> Result<String, ScraperError> {
    let trimmed = origin.trim().trim_end_matches('/');
    let has_host = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .is_some_and(|rest| !rest.is_empty());
    if !has_host {
        return Err(ScraperError::InvalidUrl {
            url: origin.to_owned(),
            reason: "expected an http(s) origin".to_owned(),
        });
    }
    Ok(trimmed.to_owned())
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            user_agent: "caskwatch/0.1".to_owned(),
            base_delay: Duration::from_millis(250),
            max_retries: 5,
            backoff_unit: Duration::from_secs(1),
            backoff_ceiling: 512,
            max_concurrent: 15,
            task_delay: Duration::from_millis(200),
        }
    }
}
