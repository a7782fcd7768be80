//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use super::Settings;
use crate::utils::errors::{Result, WorkshopHubError};

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_server_config(&settings.server)?;
    validate_database_config(&settings.database)?;
    validate_sslcommerz_config(&settings.sslcommerz)?;
    validate_mail_config(&settings.mail)?;
    validate_site_config(&settings.site)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

fn validate_server_config(config: &super::ServerConfig) -> Result<()> {
    if config.host.is_empty() {
        return Err(WorkshopHubError::Config(
            "Server host is required".to_string(),
        ));
    }

    Ok(())
}

fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(WorkshopHubError::Config(
            "Database URL is required".to_string(),
        ));
    }

    if config.max_connections == 0 {
        return Err(WorkshopHubError::Config(
            "Max connections must be greater than 0".to_string(),
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(WorkshopHubError::Config(
            "Min connections cannot be greater than max connections".to_string(),
        ));
    }

    Ok(())
}

/// Validate payment gateway configuration
///
/// Credentials may be blank when running only free workshops; the gateway
/// client refuses to initiate a payment without them.
fn validate_sslcommerz_config(config: &super::SslCommerzConfig) -> Result<()> {
    if config.timeout_seconds == 0 {
        return Err(WorkshopHubError::Config(
            "Gateway timeout must be greater than 0".to_string(),
        ));
    }

    if !config.is_sandbox && (config.store_id.is_empty() || config.store_password.is_empty()) {
        return Err(WorkshopHubError::Config(
            "SSLCommerz credentials are required outside sandbox mode".to_string(),
        ));
    }

    Ok(())
}

fn validate_mail_config(config: &super::MailConfig) -> Result<()> {
    match config.backend.as_str() {
        "console" => {}
        "smtp" => {
            if config.smtp_host.is_empty() {
                return Err(WorkshopHubError::Config(
                    "SMTP host is required for the smtp mail backend".to_string(),
                ));
            }
        }
        other => {
            return Err(WorkshopHubError::Config(format!(
                "Invalid mail backend: {}. Valid backends: console, smtp",
                other
            )));
        }
    }

    if config.from_address.is_empty() {
        return Err(WorkshopHubError::Config(
            "Mail from address is required".to_string(),
        ));
    }

    Ok(())
}

fn validate_site_config(config: &super::SiteConfig) -> Result<()> {
    if config.domain.is_empty() {
        return Err(WorkshopHubError::Config(
            "Site domain is required (used for gateway callback URLs)".to_string(),
        ));
    }

    if config.currency.is_empty() {
        return Err(WorkshopHubError::Config(
            "Currency code is required".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(WorkshopHubError::Config("Log level is required".to_string()));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(WorkshopHubError::Config(format!(
            "Invalid log level: {}. Valid levels: {:?}",
            config.level, valid_levels
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_validate() {
        let settings = Settings::default();
        assert!(validate_settings(&settings).is_ok());
    }

    #[test]
    fn test_production_requires_gateway_credentials() {
        let mut settings = Settings::default();
        settings.sslcommerz.is_sandbox = false;
        assert!(validate_settings(&settings).is_err());

        settings.sslcommerz.store_id = "store".to_string();
        settings.sslcommerz.store_password = "secret".to_string();
        assert!(validate_settings(&settings).is_ok());
    }

    #[test]
    fn test_invalid_mail_backend_rejected() {
        let mut settings = Settings::default();
        settings.mail.backend = "carrier-pigeon".to_string();
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let mut settings = Settings::default();
        settings.logging.level = "verbose".to_string();
        assert!(validate_settings(&settings).is_err());
    }
}
