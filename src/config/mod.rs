//! Configuration module for Scroll-Scribe
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, so running without a config file is supported.
//!
//! # Example
//!
//! ```no_run
//! use scroll_scribe::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("scribe.toml")).unwrap();
//! println!("Writing artifacts to {}", config.output.directory.display());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    FetchConfig, OutputConfig, PipelineConfig, ScribeConfig, TransformConfig,
    DEFAULT_MIN_CONTENT_LENGTH, DEFAULT_MODEL, DEFAULT_TIMEOUT_MS,
};

// Re-export parser functions
pub use parser::{load_config, load_config_with_hash, parse_config};
pub use validation::validate;

impl ScribeConfig {
    /// Looks up the transform credential named by `transform.api-key-env`
    ///
    /// Returns `Ok(None)` when no credential is configured, and
    /// [`ConfigError::MissingCredential`](crate::ConfigError::MissingCredential)
    /// when one is configured but the variable is unset or blank.
    pub fn credential(&self) -> crate::ConfigResult<Option<String>> {
        let Some(key) = &self.transform.api_key_env else {
            return Ok(None);
        };

        match std::env::var(key) {
            Ok(value) if !value.trim().is_empty() => Ok(Some(value)),
            _ => Err(crate::ConfigError::MissingCredential { key: key.clone() }),
        }
    }
}
