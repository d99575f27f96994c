//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::FetcherConfig;
use crate::config::validation::validate_config;
use crate::error::ConfigError;

/// Parse and validate configuration from a TOML string.
pub fn parse_config(content: &str) -> Result<FetcherConfig, ConfigError> {
    let config: FetcherConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<FetcherConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let config = parse_config(
            r#"
            [retry]
            retry_count = 4
            wait_time_ms = 50

            [transport]
            user_agent = "tests"
            "#,
        )
        .unwrap();
        assert_eq!(config.retry.retry_count, 4);
        assert_eq!(config.transport.user_agent, "tests");
    }

    #[test]
    fn test_parse_rejects_zero_retries() {
        let err = parse_config("[retry]\nretry_count = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_parse_rejects_bad_toml() {
        let err = parse_config("[retry\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_config(Path::new("/nonexistent/fetch-control.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
