use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;
use std::str::FromStr;

/// Environment variable overriding the number of workers
pub const ENV_MAX_CONCURRENCY: &str = "MAX_CONCURRENCY";

/// Environment variable overriding the per-request timeout (seconds)
pub const ENV_REQUEST_TIMEOUT: &str = "HTTP_TIMEOUT_SECONDS";

/// Environment variable setting the overall run deadline (seconds)
pub const ENV_DEADLINE: &str = "VISIT_DEADLINE_SECONDS";

/// Loads and parses a configuration file from the given path
///
/// Missing sections and keys fall back to their defaults.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let config = read_config(path)?;
    validate(&config)?;
    Ok(config)
}

fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Settings given as command-line flags, the highest-precedence layer
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub concurrency: Option<usize>,
    pub request_timeout_secs: Option<u64>,
    pub deadline_secs: Option<u64>,
}

/// Resolves the configuration for a run
///
/// Layers, lowest precedence first: defaults, the file at `path`, variables
/// found through `lookup`, then `cli`. Only the merged result is validated, so
/// a later layer can correct a value an earlier one got wrong.
pub fn resolve_config<F>(
    path: Option<&Path>,
    lookup: F,
    cli: &CliOverrides,
) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => {
            tracing::debug!("Loading configuration from: {}", path.display());
            read_config(path)?
        }
        None => Config::default(),
    };

    apply_overrides_from(&mut config, lookup);

    if let Some(concurrency) = cli.concurrency {
        config.visitor.concurrency = concurrency;
    }
    if let Some(timeout) = cli.request_timeout_secs {
        config.visitor.request_timeout_secs = timeout;
    }
    if let Some(deadline) = cli.deadline_secs {
        config.visitor.deadline_secs = Some(deadline);
    }

    validate(&config)?;
    Ok(config)
}

/// Applies overrides from an arbitrary key lookup
///
/// Values that are present but cannot be parsed are logged and ignored, so the
/// previous layer's value stands.
pub fn apply_overrides_from<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(concurrency) = parse_override::<usize, _>(&lookup, ENV_MAX_CONCURRENCY) {
        config.visitor.concurrency = concurrency;
    }

    if let Some(timeout) = parse_override::<u64, _>(&lookup, ENV_REQUEST_TIMEOUT) {
        config.visitor.request_timeout_secs = timeout;
    }

    if let Some(deadline) = parse_override::<u64, _>(&lookup, ENV_DEADLINE) {
        config.visitor.deadline_secs = Some(deadline);
    }
}

fn parse_override<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            let error = ConfigError::InvalidValue {
                key: key.to_string(),
                value: raw.to_string(),
            };
            tracing::warn!("{}, keeping previous value", error);
            None
        }
    }
}
