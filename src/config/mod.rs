//! Configuration module for URL Visitor
//!
//! Configuration is resolved in layers: built-in defaults, an optional TOML
//! file, environment variables, and finally command-line flags.
//! [`resolve_config`] merges them and checks the result with [`validate`].
//!
//! # Example
//!
//! ```no_run
//! use url_visitor::config::{resolve_config, CliOverrides};
//! use std::path::Path;
//!
//! let config = resolve_config(
//!     Some(Path::new("visitor.toml")),
//!     |key| std::env::var(key).ok(),
//!     &CliOverrides::default(),
//! )
//! .unwrap();
//! println!("Running with {} workers", config.visitor.concurrency);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, UserAgentConfig, VisitorConfig, DEFAULT_CONCURRENCY, DEFAULT_REQUEST_TIMEOUT_SECS,
};

// Re-export parser functions
pub use parser::{
    apply_overrides_from, load_config, resolve_config, CliOverrides, ENV_DEADLINE,
    ENV_MAX_CONCURRENCY, ENV_REQUEST_TIMEOUT,
};
pub use validation::validate;
