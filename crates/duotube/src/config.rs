use std::time::Duration;

use reqwest::{
    Client, ClientBuilder,
    header::{HeaderMap, HeaderValue},
};

use crate::error::{Result, SourceError};
use crate::retry::RetryPolicy;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/142.0.0.0 Safari/537.36";

pub const PRIMARY_API_BASE: &str = "https://www.googleapis.com/youtube/v3";
pub const PRIMARY_SITE: &str = "https://www.youtube.com";

/// Video id requested by mirror health checks.
pub const DEFAULT_PROBE_VIDEO_ID: &str = "dQw4w9WgXcQ";

/// Mirror instances known at build time.
pub const DEFAULT_INSTANCES: &[&str] = &[
    "https://invidious.snopyta.org",
    "https://yewtu.be",
    "https://invidious.kavin.rocks",
    "https://vid.puffyan.us",
    "https://inv.riverside.rocks",
    "https://yt.artemislena.eu",
    "https://invidious.flokinet.to",
    "https://invidious.esmailelbob.xyz",
    "https://inv.bp.projectsegfau.lt",
    "https://invidious.projectsegfau.lt",
];

/// Upper bound on mirror attempts per request, whatever the pool size.
pub const MAX_MIRROR_ATTEMPTS: usize = 5;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Timeout for a single request attempt.
    pub timeout: Duration,

    pub connect_timeout: Duration,

    pub user_agent: String,

    /// Mirror allow-list. Order matters only for health-check iteration.
    pub instances: Vec<String>,

    pub probe_video_id: String,

    pub primary_api_base: String,

    /// Origin used for primary embed and watch URLs.
    pub primary_site: String,

    /// Delay schedule between mirror attempts.
    pub retry_policy: RetryPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            instances: DEFAULT_INSTANCES.iter().map(|s| s.to_string()).collect(),
            probe_video_id: DEFAULT_PROBE_VIDEO_ID.to_owned(),
            primary_api_base: PRIMARY_API_BASE.to_owned(),
            primary_site: PRIMARY_SITE.to_owned(),
            retry_policy: RetryPolicy::default(),
        }
    }
}

impl ClientConfig {
    pub fn with_instances<I, S>(mut self, instances: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.instances = instances
            .into_iter()
            .map(|s| s.into().trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .collect();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    pub fn with_probe_video_id(mut self, id: impl Into<String>) -> Self {
        self.probe_video_id = id.into();
        self
    }

    /// Attempts per mirror request: the pool size, capped at [`MAX_MIRROR_ATTEMPTS`].
    pub fn max_mirror_attempts(&self) -> usize {
        self.instances.len().clamp(1, MAX_MIRROR_ATTEMPTS)
    }

    pub fn default_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            HeaderValue::from_static("en-US,en;q=0.9"),
        );
        headers
    }

    pub fn validate(&self) -> Result<()> {
        if self.instances.is_empty() {
            return Err(SourceError::malformed(
                "mirror allow-list must contain at least one instance",
            ));
        }
        for instance in &self.instances {
            url::Url::parse(instance).map_err(|e| {
                SourceError::malformed(format!("invalid mirror instance `{instance}`: {e}"))
            })?;
        }
        Ok(())
    }
}

pub fn create_client_builder(config: &ClientConfig) -> ClientBuilder {
    let mut builder = Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(ClientConfig::default_headers())
        .connect_timeout(config.connect_timeout);
    if config.timeout > Duration::ZERO {
        builder = builder.timeout(config.timeout);
    }
    builder
}

pub fn default_client(config: &ClientConfig) -> Result<Client> {
    create_client_builder(config)
        .build()
        .map_err(|e| SourceError::transport("client", e))
}
