use crate::config::types::ScribeConfig;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Reads, parses and validates the TOML file at `path`
pub fn load_config(path: &Path) -> Result<ScribeConfig, ConfigError> {
    parse_config(&std::fs::read_to_string(path)?)
}

/// Parses and validates configuration from TOML text
///
/// Missing sections and keys fall back to their defaults, so `""` yields
/// [`ScribeConfig::default`].
pub fn parse_config(content: &str) -> Result<ScribeConfig, ConfigError> {
    let config: ScribeConfig = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Loads a configuration together with the hex-encoded SHA-256 of the exact
/// text parsed, as recorded in run summaries
///
/// The file is read once, so the hash always describes the configuration
/// that was actually used.
pub fn load_config_with_hash(path: &Path) -> Result<(ScribeConfig, String), ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    Ok((config, digest(&content)))
}

fn digest(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}
