//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use serde::{Deserialize, Serialize};

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub sslcommerz: SslCommerzConfig,
    pub mail: MailConfig,
    pub site: SiteConfig,
    pub admin: AdminConfig,
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// SSLCommerz payment gateway configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SslCommerzConfig {
    pub store_id: String,
    pub store_password: String,
    pub is_sandbox: bool,
    pub timeout_seconds: u64,
}

impl SslCommerzConfig {
    /// Gateway session-initiation endpoint for the configured environment
    pub fn api_url(&self) -> &'static str {
        if self.is_sandbox {
            "https://sandbox.sslcommerz.com/gwprocess/v4/api.php"
        } else {
            "https://securepay.sslcommerz.com/gwprocess/v4/api.php"
        }
    }

    /// Server-side transaction validation endpoint
    pub fn validation_url(&self) -> &'static str {
        if self.is_sandbox {
            "https://sandbox.sslcommerz.com/validator/api/validationserverAPI.php"
        } else {
            "https://securepay.sslcommerz.com/validator/api/validationserverAPI.php"
        }
    }
}

/// Outbound email configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MailConfig {
    /// "smtp" sends through the configured relay, "console" logs instead
    pub backend: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub from_address: String,
}

/// Site-wide presentation settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SiteConfig {
    /// Public base URL used to build gateway callback URLs
    pub domain: String,
    pub currency: String,
    pub school_name: String,
    pub club_name: String,
    pub contact_email: String,
}

/// Admin panel configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AdminConfig {
    /// Bearer token required on /admin endpoints
    pub token: String,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file_path: String,
}

impl Settings {
    /// Load settings from configuration file and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::with_prefix("WORKSHOPHUB").separator("__"))
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::WorkshopHubError> {
        super::validation::validate_settings(self)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8000,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/workshophub".to_string(),
                max_connections: 10,
                min_connections: 1,
            },
            sslcommerz: SslCommerzConfig {
                store_id: String::new(),
                store_password: String::new(),
                is_sandbox: true,
                timeout_seconds: 30,
            },
            mail: MailConfig {
                backend: "console".to_string(),
                smtp_host: "localhost".to_string(),
                smtp_port: 587,
                smtp_username: String::new(),
                smtp_password: String::new(),
                from_address: "noreply@titanium.sjis.edu.bd".to_string(),
            },
            site: SiteConfig {
                domain: "http://127.0.0.1:8000".to_string(),
                currency: "BDT".to_string(),
                school_name: "St. Joseph International School".to_string(),
                club_name: "Titanium Science Club".to_string(),
                contact_email: "info@titanium.sjis.edu.bd".to_string(),
            },
            admin: AdminConfig {
                token: String::new(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: "./logs".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sandbox_urls() {
        let config = SslCommerzConfig {
            store_id: "test".to_string(),
            store_password: "test".to_string(),
            is_sandbox: true,
            timeout_seconds: 30,
        };
        assert!(config.api_url().contains("sandbox"));
        assert!(config.validation_url().contains("sandbox"));
    }

    #[test]
    fn test_production_urls() {
        let config = SslCommerzConfig {
            store_id: "test".to_string(),
            store_password: "test".to_string(),
            is_sandbox: false,
            timeout_seconds: 30,
        };
        assert!(config.api_url().contains("securepay"));
        assert!(config.validation_url().contains("securepay"));
    }
}
