//! Configuration handling for routectl

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub cache: CacheConfig,
    pub exec: ExecConfig,
}

/// Snapshot time-to-live per cached resource kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub route_ttl_secs: u64,
    pub interface_ttl_secs: u64,
}

/// Subprocess timeouts: table fetches and mutations get the long one, the
/// fast interface probe gets the short one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecConfig {
    pub table_timeout_secs: u64,
    pub probe_timeout_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            route_ttl_secs: 60,
            interface_ttl_secs: 30,
        }
    }
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            table_timeout_secs: 10,
            probe_timeout_secs: 5,
        }
    }
}

impl Config {
    pub fn load(path: &PathBuf) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self, path: &PathBuf) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).expect("Failed to serialize config");
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load from the default locations, falling back to built-in defaults.
    ///
    /// Checked in order: `routectl.toml` in the current directory, then
    /// `routectl/config.toml` under the platform config directory.
    pub fn discover() -> Self {
        let local = PathBuf::from("routectl.toml");
        if local.exists() {
            if let Ok(config) = Self::load(&local) {
                return config;
            }
        }

        if let Some(dir) = dirs::config_dir() {
            let path = dir.join("routectl").join("config.toml");
            if path.exists() {
                if let Ok(config) = Self::load(&path) {
                    return config;
                }
            }
        }

        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.cache.route_ttl_secs, 60);
        assert_eq!(config.cache.interface_ttl_secs, 30);
        assert_eq!(config.exec.table_timeout_secs, 10);
        assert_eq!(config.exec.probe_timeout_secs, 5);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");

        let mut config = Config::default();
        config.cache.route_ttl_secs = 120;
        config.exec.probe_timeout_secs = 2;
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.cache.route_ttl_secs, 120);
        assert_eq!(loaded.cache.interface_ttl_secs, 30);
        assert_eq!(loaded.exec.probe_timeout_secs, 2);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[cache]\nroute_ttl_secs = 15\n").unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.cache.route_ttl_secs, 15);
        assert_eq!(loaded.exec.table_timeout_secs, 10);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "cache = \"nope\"").unwrap();

        assert!(matches!(
            Config::load(&path),
            Err(ConfigError::ParseError(_))
        ));
    }
}
