//! Mailgun HTTP API transport.

use std::time::Duration;

use async_trait::async_trait;
use caskwatch_core::{AppConfig, InventoryItem, Subscriber, TransportConfig};
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;

use super::Notifier;
use crate::error::NotifyError;
use crate::render::render_alert;

/// Everything needed to talk to Mailgun.
#[derive(Clone)]
pub struct MailgunSettings {
    pub base_url: String,
    pub domain: String,
    pub api_key: String,
    /// Sender address; `postmaster@<domain>` when unset.
    pub from_email: Option<String>,
    pub from_name: Option<String>,
    pub request_timeout: Duration,
    pub send_delay: Duration,
}

impl std::fmt::Debug for MailgunSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailgunSettings")
            .field("base_url", &self.base_url)
            .field("domain", &self.domain)
            .field("api_key", &"[redacted]")
            .field("from_email", &self.from_email)
            .field("from_name", &self.from_name)
            .field("request_timeout", &self.request_timeout)
            .field("send_delay", &self.send_delay)
            .finish()
    }
}

impl MailgunSettings {
    /// Combines environment credentials with the subscription file's sender.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::MissingConfig`] when `MAILGUN_DOMAIN` or
    /// `MAILGUN_API_KEY` is unset.
    pub fn from_config(app: &AppConfig, transport: &TransportConfig) -> Result<Self, NotifyError> {
        let domain = app
            .mailgun_domain
            .clone()
            .ok_or(NotifyError::MissingConfig("MAILGUN_DOMAIN"))?;
        let api_key = app
            .mailgun_api_key
            .clone()
            .ok_or(NotifyError::MissingConfig("MAILGUN_API_KEY"))?;

        Ok(Self {
            base_url: app.mailgun_base_url.clone(),
            domain,
            api_key,
            from_email: transport.from_email.clone().filter(|v| !v.trim().is_empty()),
            from_name: transport.from_name.clone().filter(|v| !v.trim().is_empty()),
            request_timeout: app.request_timeout(),
            send_delay: Duration::from_millis(app.email_delay_ms),
        })
    }
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    #[serde(default)]
    id: String,
}

pub struct MailgunNotifier {
    client: Client,
    endpoint: String,
    api_key: String,
    from: String,
    send_delay: Duration,
}

impl MailgunNotifier {
    /// # Errors
    ///
    /// Returns [`NotifyError::Http`] if the HTTP client cannot be built.
    pub fn new(settings: MailgunSettings) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(settings.request_timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        let from_email = settings
            .from_email
            .unwrap_or_else(|| format!("postmaster@{}", settings.domain));
        let from = match settings.from_name {
            Some(name) => format!("{name} <{from_email}>"),
            None => from_email,
        };

        Ok(Self {
            client,
            endpoint: format!(
                "{}/v3/{}/messages",
                settings.base_url.trim_end_matches('/'),
                settings.domain
            ),
            api_key: settings.api_key,
            from,
            send_delay: settings.send_delay,
        })
    }

    /// The `From` header value used for every message.
    #[must_use]
    pub fn sender(&self) -> &str {
        &self.from
    }
}

#[async_trait]
impl Notifier for MailgunNotifier {
    fn name(&self) -> &str {
        "mailgun"
    }

    fn send_delay(&self) -> Duration {
        self.send_delay
    }

    async fn send_alert(
        &self,
        subscriber: &Subscriber,
        items: &[InventoryItem],
    ) -> Result<(), NotifyError> {
        if items.is_empty() {
            return Ok(());
        }

        let alert = render_alert(&subscriber.id, items, Utc::now());
        let form = [
            ("from", self.from.as_str()),
            ("to", subscriber.email.as_str()),
            ("subject", alert.subject.as_str()),
            ("text", alert.text.as_str()),
            ("html", alert.html.as_str()),
        ];

        let response = self
            .client
            .post(&self.endpoint)
            .basic_auth("api", Some(&self.api_key))
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let id = serde_json::from_str::<SendResponse>(&body)
            .map(|r| r.id)
            .unwrap_or_default();
        tracing::debug!(subscriber = %subscriber.id, message_id = %id, "mailgun accepted message");
        Ok(())
    }
}
