use crate::config::types::{Config, UserAgentConfig, VisitorConfig};
use crate::ConfigError;
use reqwest::header::HeaderValue;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_visitor_config(&config.visitor)?;
    validate_user_agent_config(&config.user_agent)?;
    Ok(())
}

/// Validates worker pool and timing configuration
fn validate_visitor_config(config: &VisitorConfig) -> Result<(), ConfigError> {
    if config.concurrency < 1 {
        return Err(ConfigError::Validation(format!(
            "concurrency must be a positive integer, got {}",
            config.concurrency
        )));
    }

    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be greater than 0".to_string(),
        ));
    }

    if config.deadline_secs == Some(0) {
        return Err(ConfigError::Validation(
            "deadline_secs must be greater than 0 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates the identifying header
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.header.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent header cannot be empty".to_string(),
        ));
    }

    HeaderValue::from_str(&config.header).map_err(|_| {
        ConfigError::Validation(format!(
            "user-agent header '{}' is not a valid HTTP header value",
            config.header
        ))
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_concurrency_bounds() {
        let mut config = Config::default();

        config.visitor.concurrency = 0;
        assert!(validate(&config).is_err());

        config.visitor.concurrency = 1;
        assert!(validate(&config).is_ok());

        config.visitor.concurrency = 100;
        assert!(validate(&config).is_ok());

        config.visitor.concurrency = 200;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_validate_timeouts() {
        let mut config = Config::default();
        config.visitor.request_timeout_secs = 0;
        assert!(validate(&config).is_err());

        let mut config = Config::default();
        config.visitor.deadline_secs = Some(0);
        assert!(validate(&config).is_err());

        config.visitor.deadline_secs = Some(1);
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_validate_user_agent() {
        let mut config = Config::default();

        config.user_agent.header = "   ".to_string();
        assert!(validate(&config).is_err());

        config.user_agent.header = "bad\nheader".to_string();
        assert!(validate(&config).is_err());

        config.user_agent.header = "Visitor/1.0 (+https://example.com)".to_string();
        assert!(validate(&config).is_ok());
    }
}
