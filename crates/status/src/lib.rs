mod extract;

use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use scraper::Selector;
use subway_core::LineGroup;
use tracing::{info, instrument, warn};
use url::Url;

pub use extract::extract_status;

pub const DEFAULT_STATUS_ENDPOINT: &str = "http://service.mta.info/ServiceStatus/statusmessage.aspx";
pub const DEFAULT_CONTAINER_ID: &str = "status-contents";
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(4);
pub const SUBWAY_MODE: &str = "Subways";

static CONTAINER_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_-]*$").expect("valid container id regex"));

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("line group {0} has no status feed")]
    NoFeed(LineGroup),
    #[error("status request timed out")]
    Timeout(#[source] reqwest::Error),
    #[error("status request failed")]
    Transport(#[source] reqwest::Error),
    #[error("status endpoint answered {0}")]
    Status(reqwest::StatusCode),
    #[error("status container #{0} not found in document")]
    MissingContainer(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout(error)
        } else {
            Self::Transport(error)
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("invalid status container id {0:?}")]
    InvalidContainerId(String),
    #[error("failed to build HTTP client")]
    Client(#[from] reqwest::Error),
}

/// Anything that can answer "what is the status of this line group".
pub trait StatusSource: Send + Sync {
    async fn fetch_status(&self, group: LineGroup) -> Result<String, FetchError>;
}

#[derive(Debug, Clone)]
pub struct StatusClientConfig {
    pub endpoint: Url,
    pub container_id: String,
    pub timeout: Duration,
}

impl Default for StatusClientConfig {
    fn default() -> Self {
        Self {
            endpoint: Url::parse(DEFAULT_STATUS_ENDPOINT).expect("valid default status endpoint"),
            container_id: DEFAULT_CONTAINER_ID.to_string(),
            timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

/// Posts the line form to the status page and scrapes the status container.
///
/// One outbound request per call, no pooling beyond what `reqwest` does for a single client.
#[derive(Debug, Clone)]
pub struct HttpStatusClient {
    client: Client,
    endpoint: Url,
    container_id: String,
    selector: Selector,
}

impl HttpStatusClient {
    pub fn new(config: StatusClientConfig) -> Result<Self, BuildError> {
        // Only a bare element id may reach the CSS parser.
        if !CONTAINER_ID.is_match(&config.container_id) {
            return Err(BuildError::InvalidContainerId(config.container_id));
        }
        let selector = Selector::parse(&format!("#{}", config.container_id))
            .map_err(|_| BuildError::InvalidContainerId(config.container_id.clone()))?;

        let client = Client::builder()
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint,
            container_id: config.container_id,
            selector,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl StatusSource for HttpStatusClient {
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn fetch_status(&self, group: LineGroup) -> Result<String, FetchError> {
        if !group.is_recognized() {
            return Err(FetchError::NoFeed(group));
        }

        let response = self
            .client
            .post(self.endpoint.clone())
            .form(&[("lineName", group.as_code()), ("mode", SUBWAY_MODE)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(line = %group, %status, "status endpoint returned error");
            return Err(FetchError::Status(status));
        }

        let body = response.text().await?;
        let text = extract_status(&body, &self.selector)
            .ok_or_else(|| FetchError::MissingContainer(self.container_id.clone()))?;

        info!(line = %group, chars = text.len(), "service status fetched");
        Ok(text)
    }
}
