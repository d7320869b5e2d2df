//! Configuration module for the storefront binary.
//!
//! Handles loading configuration from a TOML file and CLI or environment
//! overrides, and resolves them into an [`ApiConfig`].

pub mod file;

use crate::config::file::{ApiSection, FileConfig};
use std::path::{Path, PathBuf};
use storefront_sdk::config::ApiConfig;
use thiserror::Error;
use url::Url;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: PathBuf,
    origin_override: Option<Url>,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(config_path: impl AsRef<Path>, origin_override: Option<Url>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            origin_override,
        }
    }

    /// Load and resolve the configuration.
    ///
    /// A missing file is tolerated when an origin override is present; the
    /// override then supplies everything.
    pub fn load(&self) -> Result<ApiConfig, ConfigError> {
        let file_config = match std::fs::read_to_string(&self.config_path) {
            Ok(content) => toml::from_str(&content)?,
            Err(e)
                if e.kind() == std::io::ErrorKind::NotFound
                    && self.origin_override.is_some() =>
            {
                tracing::debug!(
                    path = %self.config_path.display(),
                    "Config file not found, using origin override"
                );
                FileConfig::default()
            }
            Err(e) => return Err(e.into()),
        };

        resolve(file_config, self.origin_override.clone())
    }
}

/// Apply the override and derive the endpoints.
pub fn resolve(
    mut file_config: FileConfig,
    origin_override: Option<Url>,
) -> Result<ApiConfig, ConfigError> {
    if let Some(origin) = origin_override {
        file_config.api.origin = Some(origin);
    }
    validate(&file_config.api)?;

    let ApiSection {
        origin,
        base_url,
        cdn_url,
    } = file_config.api;

    let derived = origin.as_ref().map(ApiConfig::from_origin).transpose()?;
    let base_url = match (base_url, &derived) {
        (Some(base_url), _) => base_url,
        (None, Some(derived)) => derived.base_url.clone(),
        (None, None) => {
            return Err(ConfigError::ValidationError(
                "api.base_url or api.origin must be set".to_string(),
            ));
        }
    };
    let cdn_url = match (cdn_url, derived) {
        (Some(cdn_url), _) => cdn_url,
        (None, Some(derived)) => derived.cdn_url,
        (None, None) => {
            return Err(ConfigError::ValidationError(
                "api.cdn_url must be set when api.origin is not".to_string(),
            ));
        }
    };

    Ok(ApiConfig::new(base_url, cdn_url))
}

fn validate(api: &ApiSection) -> Result<(), ConfigError> {
    for url in [&api.origin, &api.base_url].into_iter().flatten() {
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::ValidationError(format!(
                "{url} must use http or https"
            )));
        }
    }
    Ok(())
}
