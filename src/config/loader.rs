//! Configuration loader

use config::{Config, Environment, File};
use std::path::Path;

use super::types::AppConfig;
use crate::common::errors::{Result, TraderError};

/// Load configuration from file and environment variables
///
/// Priority (highest to lowest):
/// 1. Environment variables (prefixed with APP_, `__` separated)
/// 2. Configuration file (TOML or YAML, chosen by extension)
/// 3. Default values
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    let mut builder = Config::builder();

    if let Some(path) = config_path {
        if !Path::new(path).exists() {
            return Err(TraderError::Configuration(format!(
                "configuration file not found: {}",
                path
            )));
        }
        builder = builder.add_source(File::with_name(path));
    }

    // e.g. APP__MARKETS__BINANCE__API_SECRET
    builder = builder.add_source(
        Environment::with_prefix("APP")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder
        .build()
        .map_err(|e| TraderError::Configuration(e.to_string()))?;

    config
        .try_deserialize()
        .map_err(|e| TraderError::Configuration(e.to_string()))
}
