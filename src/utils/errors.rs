//! Error handling for WorkshopHub
//!
//! This module defines the main error types used throughout the application
//! and provides a unified error handling strategy, including the mapping of
//! errors onto HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Main error type for the WorkshopHub application
#[derive(Error, Debug)]
pub enum WorkshopHubError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Payment gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Mail error: {0}")]
    Mail(#[from] MailError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Template rendering error: {0}")]
    Template(#[from] tera::Error),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Workshop not found: {workshop_id}")]
    WorkshopNotFound { workshop_id: i64 },

    #[error("Registration not found: {registration_id}")]
    RegistrationNotFound { registration_id: i64 },

    #[error("Payment not found for transaction: {transaction_id}")]
    PaymentNotFound { transaction_id: String },

    #[error("Already registered for this workshop")]
    DuplicateRegistration,

    #[error("Workshop is full")]
    WorkshopFull,

    #[error("Workshop is not accepting registrations")]
    WorkshopClosed,

    #[error("Receipt not available for unconfirmed registration")]
    ReceiptUnavailable,

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("PDF generation error: {0}")]
    Pdf(String),

    #[error("Excel export error: {0}")]
    Export(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// SSLCommerz gateway specific errors
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Gateway request failed: {0}")]
    RequestFailed(String),

    #[error("Gateway request timed out")]
    Timeout,

    #[error("Invalid gateway response: {0}")]
    InvalidResponse(String),

    #[error("Payment initiation rejected: {0}")]
    InitiationRejected(String),

    #[error("Payment validation failed")]
    ValidationFailed,

    #[error("Payment amount mismatch: expected {expected}, got {received}")]
    AmountMismatch { expected: String, received: String },

    #[error("Gateway service unavailable")]
    ServiceUnavailable,
}

/// Mail delivery specific errors
#[derive(Error, Debug)]
pub enum MailError {
    #[error("Invalid mail address: {0}")]
    InvalidAddress(String),

    #[error("Failed to build message: {0}")]
    MessageBuild(String),

    #[error("SMTP transport error: {0}")]
    Transport(String),
}

/// Result type alias for WorkshopHub operations
pub type Result<T> = std::result::Result<T, WorkshopHubError>;

/// Result type alias for gateway operations
pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

impl WorkshopHubError {
    /// HTTP status code this error surfaces as
    pub fn status_code(&self) -> StatusCode {
        match self {
            WorkshopHubError::WorkshopNotFound { .. }
            | WorkshopHubError::RegistrationNotFound { .. }
            | WorkshopHubError::PaymentNotFound { .. }
            | WorkshopHubError::ReceiptUnavailable => StatusCode::NOT_FOUND,
            WorkshopHubError::DuplicateRegistration => StatusCode::CONFLICT,
            WorkshopHubError::InvalidInput(_)
            | WorkshopHubError::WorkshopFull
            | WorkshopHubError::WorkshopClosed => StatusCode::UNPROCESSABLE_ENTITY,
            WorkshopHubError::PermissionDenied(_) => StatusCode::UNAUTHORIZED,
            WorkshopHubError::Gateway(_) | WorkshopHubError::Http(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Check whether the underlying database error is a unique constraint violation
    pub fn is_unique_violation(err: &sqlx::Error) -> bool {
        match err {
            sqlx::Error::Database(db_err) => db_err
                .code()
                .map(|code| code == "23505")
                .unwrap_or(false),
            _ => false,
        }
    }
}

impl IntoResponse for WorkshopHubError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, status = %status, "Request rejected");
        }
        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_errors_map_to_404() {
        let err = WorkshopHubError::WorkshopNotFound { workshop_id: 7 };
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let err = WorkshopHubError::ReceiptUnavailable;
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_duplicate_maps_to_conflict() {
        let err = WorkshopHubError::DuplicateRegistration;
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_gateway_errors_map_to_bad_gateway() {
        let err = WorkshopHubError::Gateway(GatewayError::Timeout);
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_validation_errors_map_to_unprocessable() {
        let err = WorkshopHubError::InvalidInput("grade out of range".to_string());
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
