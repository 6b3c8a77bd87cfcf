//! Configuration management for the catalog tree
//!
//! Handles loading and saving tree settings to ~/.config/catalog-tree/config.json

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::error::CatalogError;

/// Tree settings
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct TreeConfig {
    /// Compare identifiers case-sensitively (set before the first update)
    pub case_sensitive_identifiers: bool,
    /// Whether expansion events trigger loading
    pub events_enabled: bool,
    /// Filter applied to the filtered view at startup
    pub filter: Option<String>,
    /// Default catalog fixture for `catalog_dump`
    pub fixture: Option<PathBuf>,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            case_sensitive_identifiers: false,
            events_enabled: true,
            filter: None,
            fixture: None,
        }
    }
}

impl TreeConfig {
    /// Get the config file path (~/.config/catalog-tree/config.json)
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("catalog-tree");

        Ok(config_dir.join("config.json"))
    }

    /// Load configuration from disk, creating the default config if it doesn't exist
    pub fn load() -> Self {
        match Self::try_load() {
            Ok(config) => config,
            Err(err) => {
                log::debug!("using default configuration: {:#}", err);
                let config = Self::default();
                if let Err(err) = config.save() {
                    log::warn!("could not write default configuration: {:#}", err);
                }
                config
            }
        }
    }

    /// Try to load configuration from disk
    pub fn try_load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        Self::from_json_str(&contents).context("Failed to parse config file")
    }

    /// Parse settings; missing fields take their defaults
    pub fn from_json_str(contents: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(contents)?)
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&path, contents).context("Failed to write config file")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TreeConfig::default();
        assert!(!config.case_sensitive_identifiers);
        assert!(config.events_enabled);
        assert!(config.filter.is_none());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = TreeConfig::from_json_str(r#"{ "filter": "sakila.act" }"#).unwrap();
        assert_eq!(config.filter.as_deref(), Some("sakila.act"));
        assert!(config.events_enabled);

        let config = TreeConfig::from_json_str(r#"{ "case_sensitive_identifiers": true, "events_enabled": false }"#).unwrap();
        assert!(config.case_sensitive_identifiers);
        assert!(!config.events_enabled);
    }

    #[test]
    fn test_invalid_json() {
        let err = TreeConfig::from_json_str("{ filter: ").unwrap_err();
        assert!(matches!(err, CatalogError::Config(_)));
    }

    #[test]
    fn test_json_round_trip() {
        let config = TreeConfig {
            case_sensitive_identifiers: true,
            events_enabled: false,
            filter: Some("world".to_string()),
            fixture: Some(PathBuf::from("catalog.toml")),
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(TreeConfig::from_json_str(&json).unwrap(), config);
    }
}
