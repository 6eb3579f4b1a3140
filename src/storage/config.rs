//! Simulator configuration
//!
//! TOML file at `~/.config/tableau-sim/config.toml` (or `--config-dir`).
//! Priority for the API version: TABSIM_API_VERSION environment variable >
//! config.toml > built-in default.

use super::Result;
use crate::core::pager::{DEFAULT_MAX_PAGE_SIZE, DEFAULT_PAGE_SIZE};
use crate::error::{ConfigError, StorageError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub const API_VERSION_ENV: &str = "TABSIM_API_VERSION";

/// Settings of one simulated server
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct SimulatorConfig {
    /// REST API version reported by `serverinfo`
    pub api_version: String,
    /// Product version reported by `serverinfo`
    pub product_version: String,
    pub site_name: String,
    /// Empty for the default site
    pub site_content_url: String,
    pub default_page_size: usize,
    /// Upper bound for `pageSize`; 0 for no limit
    pub max_page_size: usize,
    /// Require `X-Tableau-Auth` on every operation except sign-in and server info
    pub enforce_auth: bool,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            api_version: "3.19".to_string(),
            product_version: "2023.1.0".to_string(),
            site_name: "Default".to_string(),
            site_content_url: String::new(),
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
            enforce_auth: true,
        }
    }
}

impl SimulatorConfig {
    pub const FIELDS: &'static [&'static str] = &[
        "api_version",
        "product_version",
        "site_name",
        "site_content_url",
        "default_page_size",
        "max_page_size",
        "enforce_auth",
    ];

    /// Load configuration from file
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p,
            None => Self::config_file_path()?,
        };

        if !config_path.exists() {
            return Ok(SimulatorConfig::default());
        }

        let content = fs::read_to_string(&config_path).map_err(|source| StorageError::FileIo {
            path: config_path.to_string_lossy().to_string(),
            source,
        })?;

        let config: SimulatorConfig =
            toml::from_str(&content).map_err(|e| StorageError::ConfigParseError {
                message: format!("Failed to parse config file: {}", e),
            })?;

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: Option<PathBuf>) -> Result<()> {
        let config_path = match path {
            Some(p) => p,
            None => Self::config_file_path()?,
        };

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|source| StorageError::FileIo {
                path: parent.to_string_lossy().to_string(),
                source,
            })?;
        }

        let toml_content = toml::to_string(self).map_err(|e| StorageError::ConfigParseError {
            message: format!("Failed to serialize config: {}", e),
        })?;

        fs::write(&config_path, toml_content).map_err(|source| StorageError::FileIo {
            path: config_path.to_string_lossy().to_string(),
            source,
        })?;

        Ok(())
    }

    pub fn config_file_path() -> Result<PathBuf> {
        let home_dir = dirs::home_dir().ok_or(StorageError::ConfigDirNotFound)?;

        let app_config_dir = home_dir.join(".config").join("tableau-sim");
        let config_file = app_config_dir.join("config.toml");

        Ok(config_file)
    }

    /// Apply environment overrides
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(version) = std::env::var(API_VERSION_ENV)
            .ok()
            .filter(|s| !s.trim().is_empty())
        {
            self.api_version = version.trim().to_string();
        }
        self
    }

    /// Current value of a field, rendered as text
    pub fn get(&self, field: &str) -> Option<String> {
        let value = match field {
            "api_version" => self.api_version.clone(),
            "product_version" => self.product_version.clone(),
            "site_name" => self.site_name.clone(),
            "site_content_url" => self.site_content_url.clone(),
            "default_page_size" => self.default_page_size.to_string(),
            "max_page_size" => self.max_page_size.to_string(),
            "enforce_auth" => self.enforce_auth.to_string(),
            _ => return None,
        };
        Some(value)
    }

    /// Set a field from text. Returns `Ok(false)` for an unknown field.
    pub fn set(&mut self, field: &str, value: &str) -> std::result::Result<bool, ConfigError> {
        match field {
            "api_version" => self.api_version = non_empty(field, value)?,
            "product_version" => self.product_version = non_empty(field, value)?,
            "site_name" => self.site_name = non_empty(field, value)?,
            "site_content_url" => self.site_content_url = value.trim().to_string(),
            "default_page_size" => self.default_page_size = positive(field, value)?,
            "max_page_size" => self.max_page_size = non_negative(field, value)?,
            "enforce_auth" => {
                self.enforce_auth = value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                    field: field.to_string(),
                    value: value.to_string(),
                    reason: "expected true or false".to_string(),
                })?
            }
            _ => return Ok(false),
        }
        Ok(true)
    }
}

fn non_empty(field: &str, value: &str) -> std::result::Result<String, ConfigError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: "must not be empty".to_string(),
        });
    }
    Ok(value.to_string())
}

fn positive(field: &str, value: &str) -> std::result::Result<usize, ConfigError> {
    match value.trim().parse::<usize>() {
        Ok(number) if number > 0 => Ok(number),
        _ => Err(ConfigError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: "must be a positive integer".to_string(),
        }),
    }
}

fn non_negative(field: &str, value: &str) -> std::result::Result<usize, ConfigError> {
    value
        .trim()
        .parse::<usize>()
        .map_err(|_| ConfigError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: "must be 0 (no limit) or a positive integer".to_string(),
        })
}
