//! YAML configuration loader.

use std::path::Path;

use super::error::ConfigError;
use super::types::ServerConfig;

/// YAML configuration loader.
pub struct YamlLoader;

impl YamlLoader {
    /// Load and validate server configuration from a file.
    pub fn load_config(path: impl AsRef<Path>) -> Result<ServerConfig, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileReadError {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_config(&content)
    }

    /// Parse and validate server configuration from a YAML string.
    pub fn parse_config(yaml: &str) -> Result<ServerConfig, ConfigError> {
        // An empty document means "all defaults".
        if yaml.trim().is_empty() {
            return Ok(ServerConfig::default());
        }
        let config: ServerConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }
}
