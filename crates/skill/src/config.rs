use std::env;
use std::time::Duration;

use subway_status::{StatusClientConfig, DEFAULT_CONTAINER_ID, DEFAULT_STATUS_ENDPOINT};
use url::Url;

pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 4_000;
pub const DEFAULT_INVOCATION_DEADLINE_MS: u64 = 8_000;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("SUBWAY_STATUS_ENDPOINT is not a valid URL: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
    #[error("invocation deadline ({deadline:?}) must exceed the fetch timeout ({fetch:?})")]
    DeadlineTooShort { deadline: Duration, fetch: Duration },
}

#[derive(Debug, Clone)]
pub struct SkillConfig {
    pub status: StatusClientConfig,
    pub invocation_deadline: Duration,
}

impl SkillConfig {
    pub fn new(status: StatusClientConfig, invocation_deadline: Duration) -> Result<Self, ConfigError> {
        if invocation_deadline <= status.timeout {
            return Err(ConfigError::DeadlineTooShort {
                deadline: invocation_deadline,
                fetch: status.timeout,
            });
        }

        Ok(Self {
            status,
            invocation_deadline,
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let endpoint = env::var("SUBWAY_STATUS_ENDPOINT")
            .unwrap_or_else(|_| DEFAULT_STATUS_ENDPOINT.to_string());
        let container_id = env::var("SUBWAY_STATUS_CONTAINER_ID")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_CONTAINER_ID.to_string());

        Self::new(
            StatusClientConfig {
                endpoint: Url::parse(&endpoint)?,
                container_id,
                timeout: env_millis("SUBWAY_FETCH_TIMEOUT_MS", DEFAULT_FETCH_TIMEOUT_MS),
            },
            env_millis(
                "SUBWAY_INVOCATION_DEADLINE_MS",
                DEFAULT_INVOCATION_DEADLINE_MS,
            ),
        )
    }
}

fn env_millis(key: &str, default: u64) -> Duration {
    Duration::from_millis(
        env::var(key)
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .filter(|value| *value > 0)
            .unwrap_or(default),
    )
}
