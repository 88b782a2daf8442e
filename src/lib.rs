//! URL Visitor: a bounded-concurrency HTTP visitor
//!
//! This crate visits a list of URLs with a fixed-size pool of workers, collects
//! the status code and body size of every completed visit, and reports the
//! results ordered by body size (largest first).

pub mod config;
pub mod output;
pub mod shutdown;
pub mod source;
pub mod state;
pub mod url;
pub mod visitor;

use thiserror::Error;

/// Main error type for URL Visitor operations
#[derive(Debug, Error)]
pub enum VisitorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The run was cancelled before every outcome was collected
    #[error("Run was cancelled before it completed")]
    Cancelled,

    #[error("Task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::RunState,
        to: state::RunState,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Empty URL")]
    Empty,

    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,

    #[error("Invalid host: {0}")]
    InvalidHost(String),
}

/// Errors from a single fetch attempt
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Could not build request for {url}: {message}")]
    Build { url: String, message: String },

    #[error("Request to {url} failed: {source}")]
    Transport { url: String, source: reqwest::Error },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Could not read body from {url}: {message}")]
    Body { url: String, message: String },

    #[error("Request to {url} was cancelled")]
    Cancelled { url: String },

    #[error("Stub client error: {0}")]
    Stub(String),
}

/// Result type alias for URL Visitor operations
pub type Result<T> = std::result::Result<T, VisitorError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use output::{Report, VisitStats};
pub use state::RunState;
pub use url::{NormalizedUrl, UrlValidator};
pub use visitor::{Coordinator, HttpClient, ReqwestClient, VisitOutcome};
