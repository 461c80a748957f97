//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::KilnConfig;
use std::path::Path;

/// Name of the configuration file in a project directory.
pub const CONFIG_FILE: &str = "kiln.toml";

/// Loads and validates a `kiln.toml` configuration from a project directory.
pub fn load_config(project_dir: &Path) -> Result<KilnConfig, ConfigError> {
    let config_path = project_dir.join(CONFIG_FILE);
    let content = std::fs::read_to_string(&config_path)?;
    load_config_from_str(&content)
}

/// Parses and validates a `kiln.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<KilnConfig, ConfigError> {
    let config: KilnConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates that required fields are present and values are consistent.
fn validate_config(config: &KilnConfig) -> Result<(), ConfigError> {
    let assets = &config.assets;
    if assets.target.is_empty() {
        return Err(ConfigError::MissingField("assets.target".to_string()));
    }
    if assets.paths.is_empty() {
        return Err(ConfigError::MissingField("assets.paths".to_string()));
    }
    if let Some(ref pattern) = assets.compress {
        regex::Regex::new(pattern).map_err(|e| {
            ConfigError::ValidationError(format!("assets.compress is not a valid pattern: {e}"))
        })?;
    }
    if assets.clean_after_precompile && !assets.manifest {
        return Err(ConfigError::ValidationError(
            "assets.clean_after_precompile requires assets.manifest".to_string(),
        ));
    }
    Ok(())
}
