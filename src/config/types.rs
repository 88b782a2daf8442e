use serde::Deserialize;
use std::time::Duration;

/// Number of fetch workers when nothing else is configured
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Per-request timeout in seconds when nothing else is configured
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 2;

/// Main configuration structure for URL Visitor
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub visitor: VisitorConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
}

/// Worker pool and timing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct VisitorConfig {
    /// Number of concurrent fetch workers
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Timeout applied to each individual request (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Overall deadline for the whole run (seconds), unbounded when absent
    #[serde(rename = "deadline-secs", default)]
    pub deadline_secs: Option<u64>,
}

impl VisitorConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_secs.map(Duration::from_secs)
    }
}

impl Default for VisitorConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            deadline_secs: None,
        }
    }
}

/// Identification sent with every request
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Value of the `User-Agent` header
    #[serde(default = "default_user_agent")]
    pub header: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            header: default_user_agent(),
        }
    }
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_user_agent() -> String {
    format!("url-visitor/{}", env!("CARGO_PKG_VERSION"))
}
