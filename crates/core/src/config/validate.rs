use super::{types::Config, ConfigError};
use crate::discovery::Selection;

/// Validate configuration
/// Currently validates:
/// - delivery root URL shape (the walker concatenates prefixes onto it)
/// - all selection and inspection patterns compile
/// - nightly primary channel is one of the configured channels
/// - pipeline worker count is not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if !config.delivery.root_url.ends_with('/') {
        return Err(ConfigError::ValidationError(
            "delivery.root_url must end with '/'".to_string(),
        ));
    }

    Selection::compile(&config.delivery.selection, &config.delivery.product)
        .map_err(|e| ConfigError::ValidationError(e.to_string()))?;

    regex_lite::Regex::new(&config.inspect.include_pattern).map_err(|e| {
        ConfigError::ValidationError(format!("inspect.include_pattern: {}", e))
    })?;

    if !config.delivery.nightly.channels.is_empty()
        && !config
            .delivery
            .nightly
            .channels
            .contains(&config.delivery.nightly.primary)
    {
        return Err(ConfigError::ValidationError(format!(
            "delivery.nightly.primary '{}' is not a configured channel",
            config.delivery.nightly.primary
        )));
    }

    if !config
        .delivery
        .nightly
        .path_template
        .contains("{CHANNEL}")
    {
        return Err(ConfigError::ValidationError(
            "delivery.nightly.path_template must contain {CHANNEL}".to_string(),
        ));
    }

    if config.pipeline.workers == 0 {
        return Err(ConfigError::ValidationError(
            "pipeline.workers cannot be 0".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_root_url_without_slash_fails() {
        let mut config = Config::default();
        config.delivery.root_url = "https://archive.example/pub/firefox".to_string();
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_bad_pattern_fails() {
        let mut config = Config::default();
        config.delivery.selection.version = "([5-9]".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_workers_fails() {
        let mut config = Config::default();
        config.pipeline.workers = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_unknown_primary_channel_fails() {
        let mut config = Config::default();
        config.delivery.nightly.primary = "esr".to_string();
        assert!(validate_config(&config).is_err());
    }
}
