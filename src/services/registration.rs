//! Registration and payment orchestration
//!
//! This service owns the registration lifecycle: form submission, gateway
//! session initiation, IPN confirmation, and receipt assembly. Handlers stay
//! thin; every state transition goes through here.

use tracing::{info, warn};

use crate::config::Settings;
use crate::database::DatabaseService;
use crate::models::payment::{CreatePaymentRequest, PaymentMethod};
use crate::models::registration::{CreateRegistrationRequest, PaymentStatus, Registration};
use crate::services::mailer::Mailer;
use crate::services::receipt::ReceiptData;
use crate::services::sslcommerz::{InitiateParams, SslCommerzClient};
use crate::utils::errors::{GatewayError, Result, WorkshopHubError};
use crate::utils::helpers::{generate_registration_number, generate_transaction_id};
use crate::utils::logging::{log_payment_event, log_registration_event};

/// A validated registration form, produced by the handlers' form validation
#[derive(Debug, Clone)]
pub struct NewRegistration {
    pub student_name: String,
    pub grade: i32,
    pub school_id: i64,
    pub contact_number: String,
    pub email: String,
}

/// Where to send the browser after a payment-confirmation POST
#[derive(Debug, Clone)]
pub enum PaymentRedirect {
    /// Registration needs no (further) payment
    AlreadyConfirmed,
    /// Redirect to the gateway-hosted checkout page
    Checkout(String),
}

/// Result of processing an IPN success callback
#[derive(Debug, Clone)]
pub struct ConfirmedPayment {
    pub registration_id: i64,
    /// True when the callback was a replay of an already-completed transaction
    pub replayed: bool,
}

#[derive(Clone)]
pub struct RegistrationService {
    db: DatabaseService,
    gateway: SslCommerzClient,
    mailer: Mailer,
    settings: Settings,
}

impl RegistrationService {
    pub fn new(
        db: DatabaseService,
        gateway: SslCommerzClient,
        mailer: Mailer,
        settings: Settings,
    ) -> Self {
        Self {
            db,
            gateway,
            mailer,
            settings,
        }
    }

    /// Create a registration from a validated form submission
    ///
    /// Free workshops are confirmed immediately; paid workshops start pending.
    /// The confirmation email is sent either way.
    pub async fn submit_registration(
        &self,
        workshop_id: i64,
        form: NewRegistration,
    ) -> Result<Registration> {
        let workshop = self
            .db
            .workshops
            .find_by_id(workshop_id)
            .await?
            .ok_or(WorkshopHubError::WorkshopNotFound { workshop_id })?;

        if !workshop.is_active {
            return Err(WorkshopHubError::WorkshopClosed);
        }

        let confirmed = self
            .db
            .workshops
            .count_confirmed_registrations(workshop_id)
            .await?;
        if confirmed >= workshop.capacity as i64 {
            return Err(WorkshopHubError::WorkshopFull);
        }

        if self
            .db
            .registrations
            .exists_for_workshop(&form.email, workshop_id)
            .await?
        {
            return Err(WorkshopHubError::DuplicateRegistration);
        }

        let school = self
            .db
            .schools
            .find_active_by_id(form.school_id)
            .await?
            .ok_or_else(|| WorkshopHubError::InvalidInput("Unknown school".to_string()))?;

        let status = if workshop.is_free() {
            PaymentStatus::Free
        } else {
            PaymentStatus::Pending
        };

        let registration = self
            .db
            .registrations
            .create(CreateRegistrationRequest {
                registration_number: generate_registration_number(),
                workshop_id,
                student_name: form.student_name,
                grade: form.grade,
                school_id: school.id,
                contact_number: form.contact_number,
                email: form.email,
                payment_status: status,
            })
            .await?;

        log_registration_event(
            &registration.registration_number,
            "created",
            Some(status.as_str()),
        );

        self.mailer
            .send_registration_confirmation(&registration, &workshop, &school)
            .await;

        Ok(registration)
    }

    /// Initiate a gateway checkout session for a pending paid registration
    pub async fn initiate_payment(&self, registration_id: i64) -> Result<PaymentRedirect> {
        let registration = self
            .db
            .registrations
            .find_by_id(registration_id)
            .await?
            .ok_or(WorkshopHubError::RegistrationNotFound { registration_id })?;

        let workshop = self
            .db
            .workshops
            .find_by_id(registration.workshop_id)
            .await?
            .ok_or(WorkshopHubError::WorkshopNotFound {
                workshop_id: registration.workshop_id,
            })?;

        if workshop.is_free() || registration.is_confirmed() {
            return Ok(PaymentRedirect::AlreadyConfirmed);
        }

        let school_name = self
            .db
            .schools
            .find_by_id(registration.school_id)
            .await?
            .map(|s| s.name)
            .unwrap_or_default();

        let transaction_id = generate_transaction_id(&registration.registration_number);
        let domain = self.settings.site.domain.trim_end_matches('/');

        let params = InitiateParams {
            transaction_id: transaction_id.clone(),
            amount: workshop.fee,
            currency: self.settings.site.currency.clone(),
            student_name: registration.student_name.clone(),
            email: registration.email.clone(),
            school_name,
            contact_number: registration.contact_number.clone(),
            product_name: workshop.name.clone(),
            registration_number: registration.registration_number.clone(),
            workshop_id: workshop.id,
            success_url: format!("{}/payment/success", domain),
            fail_url: format!("{}/payment/fail", domain),
            cancel_url: format!("{}/payment/cancel", domain),
        };

        let session = self.gateway.initiate_payment(&params).await?;

        let payment = self
            .db
            .payments
            .create_or_replace(CreatePaymentRequest {
                registration_id: registration.id,
                transaction_id: transaction_id.clone(),
                amount: workshop.fee,
                currency: self.settings.site.currency.clone(),
                payment_method: PaymentMethod::SslCommerz,
                gateway_data: Some(session.raw),
            })
            .await?;

        // The payment completed between our status check and the upsert;
        // the guarded row was left untouched, so the new session is moot.
        if payment.is_none() {
            log_payment_event(&transaction_id, "discarded", Some("payment already completed"));
            return Ok(PaymentRedirect::AlreadyConfirmed);
        }

        log_payment_event(&transaction_id, "initiated", None);

        Ok(PaymentRedirect::Checkout(session.gateway_url))
    }

    /// Process the gateway's IPN success callback
    ///
    /// Validates the transaction server-side, checks the amount against the
    /// workshop fee, and confirms the registration. A replay of an already
    /// completed transaction is a no-op: no state change, no second email.
    pub async fn confirm_payment(
        &self,
        val_id: &str,
        transaction_id: &str,
        posted_amount: &str,
    ) -> Result<ConfirmedPayment> {
        let payment = self
            .db
            .payments
            .find_by_transaction_id(transaction_id)
            .await?
            .ok_or_else(|| WorkshopHubError::PaymentNotFound {
                transaction_id: transaction_id.to_string(),
            })?;

        if payment.is_completed() {
            log_payment_event(transaction_id, "replayed", Some("already completed"));
            return Ok(ConfirmedPayment {
                registration_id: payment.registration_id,
                replayed: true,
            });
        }

        let registration = self
            .db
            .registrations
            .find_by_id(payment.registration_id)
            .await?
            .ok_or(WorkshopHubError::RegistrationNotFound {
                registration_id: payment.registration_id,
            })?;

        let workshop = self
            .db
            .workshops
            .find_by_id(registration.workshop_id)
            .await?
            .ok_or(WorkshopHubError::WorkshopNotFound {
                workshop_id: registration.workshop_id,
            })?;

        let validated = match self.gateway.validate_payment(val_id).await {
            Ok(validated) => validated,
            Err(err) => {
                warn!(transaction_id = transaction_id, error = %err, "Gateway validation failed, marking payment failed");
                self.db
                    .payments
                    .mark_unsuccessful(payment.id, PaymentStatus::Failed)
                    .await?;
                return Err(err);
            }
        };

        let reported_amount = validated
            .amount
            .as_deref()
            .unwrap_or(posted_amount)
            .to_string();
        if !SslCommerzClient::verify_amount(&reported_amount, workshop.fee) {
            self.db
                .payments
                .mark_unsuccessful(payment.id, PaymentStatus::Failed)
                .await?;
            return Err(GatewayError::AmountMismatch {
                expected: workshop.fee.to_string(),
                received: reported_amount,
            }
            .into());
        }

        let payment = self
            .db
            .payments
            .mark_completed(payment.id, validated.raw)
            .await?;
        let registration = self
            .db
            .registrations
            .find_by_id(payment.registration_id)
            .await?
            .ok_or(WorkshopHubError::RegistrationNotFound {
                registration_id: payment.registration_id,
            })?;

        log_payment_event(transaction_id, "completed", None);
        info!(
            registration_number = %registration.registration_number,
            transaction_id = transaction_id,
            "Payment confirmed"
        );

        self.mailer
            .send_payment_confirmation(&registration, &workshop, &payment)
            .await;

        Ok(ConfirmedPayment {
            registration_id: registration.id,
            replayed: false,
        })
    }

    /// Process the gateway's fail callback
    pub async fn fail_payment(&self, transaction_id: &str) -> Result<()> {
        self.mark_unsuccessful(transaction_id, PaymentStatus::Failed)
            .await
    }

    /// Process the gateway's cancel callback
    pub async fn cancel_payment(&self, transaction_id: &str) -> Result<()> {
        self.mark_unsuccessful(transaction_id, PaymentStatus::Cancelled)
            .await
    }

    async fn mark_unsuccessful(&self, transaction_id: &str, status: PaymentStatus) -> Result<()> {
        let payment = self
            .db
            .payments
            .find_by_transaction_id(transaction_id)
            .await?
            .ok_or_else(|| WorkshopHubError::PaymentNotFound {
                transaction_id: transaction_id.to_string(),
            })?;

        // A completed payment cannot be demoted by a late or replayed callback
        if payment.is_completed() {
            log_payment_event(transaction_id, "ignored", Some("already completed"));
            return Ok(());
        }

        self.db.payments.mark_unsuccessful(payment.id, status).await?;
        log_payment_event(transaction_id, status.as_str(), None);
        Ok(())
    }

    /// Assemble the data needed to render a receipt
    ///
    /// Receipts exist only for confirmed registrations.
    pub async fn receipt_data(&self, registration_id: i64) -> Result<ReceiptData> {
        let registration = self
            .db
            .registrations
            .find_by_id(registration_id)
            .await?
            .ok_or(WorkshopHubError::RegistrationNotFound { registration_id })?;

        if !registration.is_confirmed() {
            return Err(WorkshopHubError::ReceiptUnavailable);
        }

        let workshop = self
            .db
            .workshops
            .find_by_id(registration.workshop_id)
            .await?
            .ok_or(WorkshopHubError::WorkshopNotFound {
                workshop_id: registration.workshop_id,
            })?;

        let school_name = self
            .db
            .schools
            .find_by_id(registration.school_id)
            .await?
            .map(|s| s.name)
            .unwrap_or_default();

        let payment = self
            .db
            .payments
            .find_by_registration_id(registration.id)
            .await?;

        Ok(ReceiptData {
            registration,
            workshop,
            school_name,
            payment,
        })
    }
}
