//! Services module
//!
//! This module contains business logic services

pub mod export;
pub mod mailer;
pub mod receipt;
pub mod registration;
pub mod sslcommerz;

// Re-export commonly used services
pub use export::{payments_to_xlsx, registrations_to_xlsx, workshops_to_xlsx};
pub use mailer::Mailer;
pub use receipt::{generate_receipt_pdf, receipt_filename, ReceiptData};
pub use registration::{ConfirmedPayment, NewRegistration, PaymentRedirect, RegistrationService};
pub use sslcommerz::{InitiateParams, InitiatedSession, SslCommerzClient, ValidatedTransaction};

use crate::config::Settings;
use crate::database::DatabaseService;
use crate::utils::errors::Result;

/// Service factory for creating and managing all services
#[derive(Clone)]
pub struct ServiceFactory {
    pub registration_service: RegistrationService,
    pub gateway: SslCommerzClient,
    pub mailer: Mailer,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized
    pub fn new(db: DatabaseService, settings: Settings) -> Result<Self> {
        let gateway = SslCommerzClient::new(settings.clone())?;
        Self::with_gateway(db, settings, gateway)
    }

    /// Create a factory with a pre-built gateway client (used by tests to
    /// point the client at a mock server)
    pub fn with_gateway(
        db: DatabaseService,
        settings: Settings,
        gateway: SslCommerzClient,
    ) -> Result<Self> {
        let mailer = Mailer::new(settings.clone())?;
        let registration_service =
            RegistrationService::new(db, gateway.clone(), mailer.clone(), settings);

        Ok(Self {
            registration_service,
            gateway,
            mailer,
        })
    }
}
