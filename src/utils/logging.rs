//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the WorkshopHub application.

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;
use crate::utils::errors::Result;

/// Initialize logging based on configuration
///
/// Returns the appender guard; dropping it flushes and stops the file writer,
/// so the caller must hold it for the lifetime of the process.
pub fn init_logging(config: &LoggingConfig) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let file_appender = tracing_appender::rolling::daily(&config.file_path, "workshophub.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking))
        .init();

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log registration lifecycle events with structured data
pub fn log_registration_event(registration_number: &str, event: &str, details: Option<&str>) {
    info!(
        registration_number = registration_number,
        event = event,
        details = details,
        "Registration event"
    );
}

/// Log payment lifecycle transitions
pub fn log_payment_event(transaction_id: &str, status: &str, details: Option<&str>) {
    info!(
        transaction_id = transaction_id,
        status = status,
        details = details,
        "Payment event"
    );
}

/// Log admin actions
pub fn log_admin_action(action: &str, target: Option<&str>) {
    warn!(action = action, target = target, "Admin action performed");
}
