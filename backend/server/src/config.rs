use std::{env, fmt::Display, fs::read_to_string, str::FromStr, time::Duration};

use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid {key} value: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("Secret {0} is neither in the environment nor in /run/secrets")]
    MissingSecret(&'static str),

    #[error("HTTP client setup failed: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Service-level 1C account, sent as standard Basic auth on every upstream call.
#[derive(Clone)]
pub struct ServiceCredentials {
    pub login: String,
    pub password: String,
}

#[derive(Clone)]
pub struct Config {
    pub port: u16,
    pub upstream_base_url: String,
    pub date_from: String,
    pub date_to: String,
    pub list_timeout: Duration,
    pub allowed_origin: String,
    pub service: ServiceCredentials,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Ok(Self {
            port: try_load("RUST_PORT", "8080")?,
            upstream_base_url: try_load::<String>("UPSTREAM_BASE_URL", "http://127.0.0.1:8090/hs/api")?
                .trim_end_matches('/')
                .to_string(),
            date_from: try_load("PEREVOZKI_DATE_FROM", "2024-01-01")?,
            date_to: try_load("PEREVOZKI_DATE_TO", "2026-01-01")?,
            list_timeout: Duration::from_secs(try_load("LIST_TIMEOUT_SECS", "15")?),
            allowed_origin: try_load("ALLOWED_ORIGIN", "*")?,
            service: ServiceCredentials {
                login: read_secret("ONEC_SERVICE_LOGIN")?,
                password: read_secret("ONEC_SERVICE_PASSWORD")?,
            },
        })
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e: T::Err| {
            warn!("Invalid {key} value: {e}");
            ConfigError::Invalid {
                key,
                reason: e.to_string(),
            }
        })
}

fn read_secret(secret_name: &'static str) -> Result<String, ConfigError> {
    if let Some(value) = var(secret_name) {
        return Ok(value.trim().to_string());
    }

    let path = format!("/run/secrets/{secret_name}");

    read_to_string(&path)
        .map(|s| s.trim().to_string())
        .map_err(|e| {
            warn!("Failed to read {secret_name} from file: {e}");
            ConfigError::MissingSecret(secret_name)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_applies_when_unset() {
        let port: u16 = try_load("PEREVOZKI_TEST_UNSET_PORT", "1111").unwrap();
        assert_eq!(port, 1111);
    }

    #[test]
    fn test_invalid_default_is_an_error() {
        let result = try_load::<u16>("PEREVOZKI_TEST_UNSET_NUMBER", "not a port");
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                key: "PEREVOZKI_TEST_UNSET_NUMBER",
                ..
            })
        ));
    }

    #[test]
    fn test_missing_secret() {
        assert!(matches!(
            read_secret("PEREVOZKI_TEST_NO_SUCH_SECRET"),
            Err(ConfigError::MissingSecret(_))
        ));
    }
}
