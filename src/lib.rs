//! WorkshopHub workshop registration platform
//!
//! Web application for school science-club workshop registration. This
//! library provides modular components for workshop listing, student
//! registration with form validation, SSLCommerz payment processing,
//! email confirmations, PDF receipts and an admin panel with Excel export.

#![allow(non_snake_case)]

pub mod config;
pub mod handlers;
pub mod services;
pub mod models;
pub mod database;
pub mod middleware;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{WorkshopHubError, Result};

// Re-export main components for easy access
pub use database::DatabaseService;
pub use handlers::{build_router, AppState};
pub use services::ServiceFactory;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
