use anyhow::{bail, Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str =
    "https://practicum.yandex.ru/api/user_api/homework_statuses/";

const DEFAULT_POLL_INTERVAL_SECS: u64 = 600;
const DEFAULT_LOG_PATH: &str = "homework_bot.log";

#[derive(Clone)]
pub struct Config {
    pub practicum_token: String,
    pub telegram_token: String,
    pub telegram_chat_id: String,
    /// Status service endpoint. Overridable so the bot can be pointed at a
    /// local stand-in.
    pub endpoint: String,
    pub poll_interval: Duration,
    pub log_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let practicum_token = require_secret("PRACTICUM_TOKEN")?;
        let telegram_token = require_secret("TELEGRAM_TOKEN")?;
        let telegram_chat_id = require_secret("TELEGRAM_CHAT_ID")?;

        let endpoint =
            env::var("PRACTICUM_ENDPOINT").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());

        let poll_interval = parse_poll_interval(env::var("POLL_INTERVAL_SECS").ok())
            .context("POLL_INTERVAL_SECS must be a positive number of seconds")?;

        let log_path = env::var("BOT_LOG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_LOG_PATH));

        Ok(Config {
            practicum_token,
            telegram_token,
            telegram_chat_id,
            endpoint,
            poll_interval,
            log_path,
        })
    }
}

fn require_secret(name: &str) -> Result<String> {
    let value =
        env::var(name).with_context(|| format!("{name} environment variable is required"))?;
    match non_empty(Some(value)) {
        Some(value) => Ok(value),
        None => bail!("{name} must not be empty"),
    }
}

/// Treats empty or whitespace-only values as unset.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn parse_poll_interval(value: Option<String>) -> Result<Duration> {
    let secs = match non_empty(value) {
        Some(raw) => raw.parse::<u64>()?,
        None => DEFAULT_POLL_INTERVAL_SECS,
    };
    if secs == 0 {
        bail!("interval of zero seconds would spin on the endpoint");
    }
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty_none() {
        assert_eq!(non_empty(None), None);
    }

    #[test]
    fn test_non_empty_empty_string() {
        // Empty secret should be treated as unset (None)
        assert_eq!(non_empty(Some("".to_string())), None);
    }

    #[test]
    fn test_non_empty_whitespace_only() {
        assert_eq!(non_empty(Some("   ".to_string())), None);
        assert_eq!(non_empty(Some("\t\n".to_string())), None);
    }

    #[test]
    fn test_non_empty_valid() {
        assert_eq!(
            non_empty(Some("secret-token".to_string())),
            Some("secret-token".to_string())
        );
    }

    #[test]
    fn test_poll_interval_defaults() {
        let interval = parse_poll_interval(None).unwrap();
        assert_eq!(interval, Duration::from_secs(600));
    }

    #[test]
    fn test_poll_interval_parses_override() {
        let interval = parse_poll_interval(Some("30".to_string())).unwrap();
        assert_eq!(interval, Duration::from_secs(30));
    }

    #[test]
    fn test_poll_interval_rejects_garbage() {
        assert!(parse_poll_interval(Some("soon".to_string())).is_err());
    }

    #[test]
    fn test_poll_interval_rejects_zero() {
        assert!(parse_poll_interval(Some("0".to_string())).is_err());
    }
}
