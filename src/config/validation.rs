use crate::config::types::{FetchConfig, OutputConfig, PipelineConfig, ScribeConfig, TransformConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &ScribeConfig) -> Result<(), ConfigError> {
    validate_fetch_config(&config.fetch)?;
    validate_transform_config(&config.transform)?;
    validate_output_config(&config.output)?;
    validate_pipeline_config(&config.pipeline)?;
    Ok(())
}

/// Validates fetch configuration
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "timeout-ms must be positive".to_string(),
        ));
    }

    if config.max_concurrent_requests < 1 || config.max_concurrent_requests > 100 {
        return Err(ConfigError::Validation(format!(
            "max-concurrent-requests must be between 1 and 100, got {}",
            config.max_concurrent_requests
        )));
    }

    if config.wait_until.trim().is_empty() {
        return Err(ConfigError::Validation(
            "wait-until cannot be empty".to_string(),
        ));
    }

    if let Some(session_id) = &config.session_id {
        if session_id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "session-id cannot be empty when set".to_string(),
            ));
        }
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates transform configuration
fn validate_transform_config(config: &TransformConfig) -> Result<(), ConfigError> {
    validate_model_name(&config.model)?;

    if config.max_tokens == 0 {
        return Err(ConfigError::Validation(
            "max-tokens must be positive".to_string(),
        ));
    }

    if let Some(key) = &config.api_key_env {
        if key.trim().is_empty() {
            return Err(ConfigError::Validation(
                "api-key-env cannot be empty when set".to_string(),
            ));
        }
    }

    if let Some(base_url) = &config.base_url {
        Url::parse(base_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;
    }

    Ok(())
}

/// Validates a `provider/model-name` identifier
fn validate_model_name(model: &str) -> Result<(), ConfigError> {
    let (provider, name) = model.trim().split_once('/').ok_or_else(|| {
        ConfigError::Validation(format!(
            "model should include a provider (e.g. 'openrouter/model-name'), got '{}'",
            model
        ))
    })?;

    if provider.is_empty() || name.is_empty() {
        return Err(ConfigError::Validation(format!(
            "both provider and model name must be specified, got '{}'",
            model
        )));
    }

    let is_valid_part = |part: &str| {
        part.chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    };

    if !is_valid_part(provider) || !name.split('/').all(is_valid_part) {
        return Err(ConfigError::Validation(format!(
            "model contains invalid characters (use letters, numbers, dots, hyphens, underscores), got '{}'",
            model
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    if !config.extension.is_empty() && !config.extension.starts_with('.') {
        return Err(ConfigError::Validation(format!(
            "extension must start with '.', got '{}'",
            config.extension
        )));
    }

    if config.max_filename_length == 0 || config.max_filename_length > 200 {
        return Err(ConfigError::Validation(format!(
            "max-filename-length must be between 1 and 200, got {}",
            config.max_filename_length
        )));
    }

    Ok(())
}

/// Validates pipeline configuration
fn validate_pipeline_config(config: &PipelineConfig) -> Result<(), ConfigError> {
    if config.politeness_delay_ms > 60_000 {
        return Err(ConfigError::Validation(format!(
            "politeness-delay-ms must be at most 60000, got {}",
            config.politeness_delay_ms
        )));
    }

    Ok(())
}
