//! Subscriber configuration: who gets alerted, and about what.

use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
});

const VALID_STATES: [&str; 2] = ["VA", "NC"];
const VALID_LISTING_TYPES: [&str; 5] = ["Listed", "Limited", "Allocation", "Barrel", "Christmas"];

/// Top-level subscriptions document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionConfig {
    pub version: String,
    /// Transport settings; opaque to the pipeline, consumed by the notifier.
    #[serde(rename = "smtp", default)]
    pub transport: TransportConfig,
    #[serde(default)]
    pub subscribers: Vec<Subscriber>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransportConfig {
    #[serde(default)]
    pub enabled: bool,
    pub from_email: Option<String>,
    pub from_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscriber {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub preferences: Preferences,
}

/// Allow-lists narrowing which items a subscriber hears about.
///
/// An empty list places no restriction on its dimension.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub states: Vec<String>,
    #[serde(default)]
    pub counties: Vec<String>,
    #[serde(default)]
    pub listing_types: Vec<String>,
    /// Case-insensitive product name substrings; `"*"` matches everything.
    #[serde(default)]
    pub products: Vec<String>,
    #[serde(default)]
    pub product_ids: Vec<String>,
    #[serde(default)]
    pub min_quantity: i64,
}

/// Load and validate the subscriptions file.
///
/// Files ending in `.yaml` or `.yml` are parsed as YAML, everything else as
/// JSON.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails
/// validation. Any invalid subscriber rejects the whole file.
pub fn load_subscriptions(path: &Path) -> Result<SubscriptionConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    let config: SubscriptionConfig = if is_yaml {
        serde_yaml::from_str(&content).map_err(|e| ConfigError::YamlParse {
            path: path.display().to_string(),
            source: e,
        })?
    } else {
        serde_json::from_str(&content).map_err(|e| ConfigError::JsonParse {
            path: path.display().to_string(),
            source: e,
        })?
    };

    validate_subscriptions(&config)?;

    Ok(config)
}

/// Returns clones of the enabled subscribers, in file order.
#[must_use]
pub fn enabled_subscribers(config: &SubscriptionConfig) -> Vec<Subscriber> {
    config
        .subscribers
        .iter()
        .filter(|s| s.enabled)
        .cloned()
        .collect()
}

fn validate_subscriptions(config: &SubscriptionConfig) -> Result<(), ConfigError> {
    if config.version.trim().is_empty() {
        return Err(ConfigError::Validation(
            "version field is required".to_string(),
        ));
    }

    let mut seen_ids = HashSet::new();
    for sub in &config.subscribers {
        if sub.id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "subscriber id must be non-empty".to_string(),
            ));
        }
        if !seen_ids.insert(sub.id.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate subscriber id: '{}'",
                sub.id
            )));
        }
        validate_email(&sub.email).map_err(|reason| {
            ConfigError::Validation(format!("subscriber '{}': {reason}", sub.id))
        })?;
        validate_preferences(&sub.preferences).map_err(|reason| {
            ConfigError::Validation(format!("subscriber '{}': {reason}", sub.id))
        })?;
    }

    Ok(())
}

fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("email must be non-empty".to_string());
    }
    if !EMAIL_RE.is_match(email) {
        return Err(format!("invalid email format: {email}"));
    }
    Ok(())
}

fn validate_preferences(prefs: &Preferences) -> Result<(), String> {
    if let Some(state) = prefs
        .states
        .iter()
        .find(|s| !VALID_STATES.contains(&s.as_str()))
    {
        return Err(format!("invalid state '{state}'; must be VA or NC"));
    }

    if let Some(lt) = prefs
        .listing_types
        .iter()
        .find(|lt| !VALID_LISTING_TYPES.contains(&lt.as_str()))
    {
        return Err(format!(
            "invalid listing type '{lt}'; must be one of {}",
            VALID_LISTING_TYPES.join(", ")
        ));
    }

    if prefs.min_quantity < 0 {
        return Err("min_quantity cannot be negative".to_string());
    }

    Ok(())
}

#[cfg(test)]
#[path = "subscriptions_test.rs"]
mod tests;
