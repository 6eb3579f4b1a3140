//! Input validation for CLI arguments and configuration values.

use crate::error::{CliError, ConfigError};
use crate::storage::config::SimulatorConfig;

/// Validate a REST API version such as `3.19`
pub fn validate_api_version(version: &str) -> crate::Result<()> {
    let mut parts = version.split('.');
    let well_formed = matches!(
        (parts.next(), parts.next(), parts.next()),
        (Some(major), Some(minor), None)
            if !major.is_empty()
                && !minor.is_empty()
                && major.chars().all(|c| c.is_ascii_digit())
                && minor.chars().all(|c| c.is_ascii_digit())
    );

    if !well_formed {
        return Err(ConfigError::InvalidValue {
            field: "api_version".to_string(),
            value: version.to_string(),
            reason: "expected <major>.<minor>, e.g. 3.19".to_string(),
        }
        .into());
    }

    Ok(())
}

/// Validate that `field` names a configuration field
pub fn validate_config_field(field: &str) -> crate::Result<()> {
    if !SimulatorConfig::FIELDS.contains(&field) {
        return Err(CliError::UnknownField {
            field: field.to_string(),
        }
        .into());
    }
    Ok(())
}

/// Validate a site content URL: empty for the default site, otherwise a slug
pub fn validate_content_url(content_url: &str) -> crate::Result<()> {
    let valid = content_url
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        return Err(ConfigError::InvalidValue {
            field: "site_content_url".to_string(),
            value: content_url.to_string(),
            reason: "only letters, digits, '-' and '_' are allowed".to_string(),
        }
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_api_version_accepts_valid_versions() {
        assert!(validate_api_version("3.19").is_ok());
        assert!(validate_api_version("2.8").is_ok());
    }

    #[test]
    fn test_validate_api_version_rejects_invalid_versions() {
        assert!(validate_api_version("").is_err());
        assert!(validate_api_version("3").is_err());
        assert!(validate_api_version("3.19.1").is_err());
        assert!(validate_api_version("v3.19").is_err());
    }

    #[test]
    fn test_validate_config_field() {
        assert!(validate_config_field("enforce_auth").is_ok());
        assert!(validate_config_field("profile").is_err());
    }

    #[test]
    fn test_validate_content_url() {
        assert!(validate_content_url("").is_ok());
        assert!(validate_content_url("marketing_team-2").is_ok());
        assert!(validate_content_url("a/b").is_err());
    }
}
