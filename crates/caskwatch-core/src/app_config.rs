use std::time::Duration;

/// Process-wide settings read from the environment.
#[derive(Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Delay between consecutive store requests in the sequential source.
    pub base_delay_ms: u64,
    /// Attempts per store before it is abandoned for the run.
    pub max_retries: u32,
    pub backoff_ceiling_secs: u64,
    /// In-flight request ceiling for the concurrent source.
    pub max_concurrent: usize,
    /// Pre-request delay applied inside each concurrent task.
    pub task_delay_ms: u64,
    /// Delay between successful alert sends.
    pub email_delay_ms: u64,
    pub mailgun_domain: Option<String>,
    pub mailgun_api_key: Option<String>,
    pub mailgun_base_url: String,
}

impl AppConfig {
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("log_level", &self.log_level)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("base_delay_ms", &self.base_delay_ms)
            .field("max_retries", &self.max_retries)
            .field("backoff_ceiling_secs", &self.backoff_ceiling_secs)
            .field("max_concurrent", &self.max_concurrent)
            .field("task_delay_ms", &self.task_delay_ms)
            .field("email_delay_ms", &self.email_delay_ms)
            .field("mailgun_domain", &self.mailgun_domain)
            .field(
                "mailgun_api_key",
                &self.mailgun_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("mailgun_base_url", &self.mailgun_base_url)
            .finish()
    }
}
