use crate::app_config::AppConfig;
use crate::ConfigError;

pub(crate) const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from variables already in the process.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Parsing and validation, decoupled from the real environment so tests can
/// drive it with a plain map.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().filter(|v| !v.trim().is_empty())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let log_level = or_default("CASKWATCH_LOG_LEVEL", "info");
    let request_timeout_secs = parse_u64("CASKWATCH_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("CASKWATCH_USER_AGENT", DEFAULT_USER_AGENT);
    let base_delay_ms = parse_u64("CASKWATCH_BASE_DELAY_MS", "250")?;
    let max_retries = parse_u32("CASKWATCH_MAX_RETRIES", "5")?;
    let backoff_ceiling_secs = parse_u64("CASKWATCH_BACKOFF_CEILING_SECS", "512")?;
    let max_concurrent = parse_usize("CASKWATCH_MAX_CONCURRENT", "15")?;
    let task_delay_ms = parse_u64("CASKWATCH_TASK_DELAY_MS", "200")?;
    let email_delay_ms = parse_u64("CASKWATCH_EMAIL_DELAY_MS", "500")?;

    if max_retries == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "CASKWATCH_MAX_RETRIES".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    if max_concurrent == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "CASKWATCH_MAX_CONCURRENT".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    Ok(AppConfig {
        log_level,
        request_timeout_secs,
        user_agent,
        base_delay_ms,
        max_retries,
        backoff_ceiling_secs,
        max_concurrent,
        task_delay_ms,
        email_delay_ms,
        mailgun_domain: optional("MAILGUN_DOMAIN"),
        mailgun_api_key: optional("MAILGUN_API_KEY"),
        mailgun_base_url: or_default("MAILGUN_BASE_URL", "https://api.mailgun.net"),
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
