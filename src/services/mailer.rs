//! Transactional email service
//!
//! Sends registration and payment confirmation emails over SMTP, with a
//! console backend for development that logs the message instead of sending
//! it. Send failures are logged and swallowed by callers: a lost email must
//! never fail a registration.

use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{error, info};

use crate::config::Settings;
use crate::models::{Payment, Registration, School, Workshop};
use crate::utils::errors::{MailError, Result, WorkshopHubError};
use crate::utils::helpers::format_fee;

/// Mail delivery backend
enum Backend {
    Smtp(AsyncSmtpTransport<Tokio1Executor>),
    /// Log the message instead of sending (development)
    Console,
}

/// Email service
#[derive(Clone)]
pub struct Mailer {
    backend: std::sync::Arc<Backend>,
    settings: Settings,
}

impl Mailer {
    /// Create a new Mailer from configuration
    pub fn new(settings: Settings) -> Result<Self> {
        let backend = match settings.mail.backend.as_str() {
            "smtp" => {
                let mut builder =
                    AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.mail.smtp_host)
                        .map_err(|e| MailError::Transport(e.to_string()))?
                        .port(settings.mail.smtp_port);

                if !settings.mail.smtp_username.is_empty() {
                    builder = builder.credentials(Credentials::new(
                        settings.mail.smtp_username.clone(),
                        settings.mail.smtp_password.clone(),
                    ));
                }

                Backend::Smtp(builder.build())
            }
            _ => Backend::Console,
        };

        Ok(Self {
            backend: std::sync::Arc::new(backend),
            settings,
        })
    }

    /// Send the registration confirmation email
    ///
    /// Returns whether the email was sent; failures are logged, not propagated.
    pub async fn send_registration_confirmation(
        &self,
        registration: &Registration,
        workshop: &Workshop,
        school: &School,
    ) -> bool {
        let subject = format!("Workshop Registration Confirmed - {}", workshop.name);
        let body = registration_email_body(registration, workshop, school, &self.settings);
        self.deliver(&registration.email, &subject, body).await
    }

    /// Send the payment confirmation email after gateway validation
    pub async fn send_payment_confirmation(
        &self,
        registration: &Registration,
        workshop: &Workshop,
        payment: &Payment,
    ) -> bool {
        let subject = format!("Payment Confirmed - {}", workshop.name);
        let body = payment_email_body(registration, workshop, payment, &self.settings);
        self.deliver(&registration.email, &subject, body).await
    }

    async fn deliver(&self, to: &str, subject: &str, body: String) -> bool {
        match self.try_deliver(to, subject, body).await {
            Ok(()) => {
                info!(to = to, subject = subject, "Email sent");
                true
            }
            Err(e) => {
                error!(to = to, subject = subject, error = %e, "Failed to send email");
                false
            }
        }
    }

    async fn try_deliver(&self, to: &str, subject: &str, body: String) -> Result<()> {
        match self.backend.as_ref() {
            Backend::Console => {
                info!(to = to, subject = subject, body = %body, "Console mail backend");
                Ok(())
            }
            Backend::Smtp(transport) => {
                let from: Mailbox = self
                    .settings
                    .mail
                    .from_address
                    .parse()
                    .map_err(|_| MailError::InvalidAddress(self.settings.mail.from_address.clone()))?;
                let to: Mailbox = to
                    .parse()
                    .map_err(|_| MailError::InvalidAddress(to.to_string()))?;

                let message = Message::builder()
                    .from(from)
                    .to(to)
                    .subject(subject)
                    .body(body)
                    .map_err(|e| MailError::MessageBuild(e.to_string()))?;

                transport
                    .send(message)
                    .await
                    .map_err(|e| WorkshopHubError::Mail(MailError::Transport(e.to_string())))?;
                Ok(())
            }
        }
    }
}

/// Body of the registration confirmation email
pub fn registration_email_body(
    registration: &Registration,
    workshop: &Workshop,
    school: &School,
    settings: &Settings,
) -> String {
    format!(
        "Dear {student},\n\n\
         Your registration for the workshop \"{workshop}\" has been confirmed!\n\n\
         Registration Details:\n\
         - Registration Number: {number}\n\
         - Workshop: {workshop}\n\
         - Date: {date}\n\
         - Time: {time}\n\
         - Venue: {venue}\n\
         - Fee: {fee}\n\n\
         Student Information:\n\
         - Name: {student}\n\
         - Grade: {grade}\n\
         - School: {school}\n\
         - Contact: {contact}\n\
         - Email: {email}\n\n\
         Please save your registration number for future reference.\n\n\
         For any queries, please contact us at {contact_email}\n\n\
         Best regards,\n\
         {club}\n\
         {host}",
        student = registration.student_name,
        workshop = workshop.name,
        number = registration.registration_number,
        date = workshop.workshop_date,
        time = workshop.time_slot,
        venue = workshop.venue,
        fee = format_fee(workshop.fee),
        grade = registration.grade,
        school = school.name,
        contact = registration.contact_number,
        email = registration.email,
        contact_email = settings.site.contact_email,
        club = settings.site.club_name,
        host = settings.site.school_name,
    )
}

/// Body of the payment confirmation email
pub fn payment_email_body(
    registration: &Registration,
    workshop: &Workshop,
    payment: &Payment,
    settings: &Settings,
) -> String {
    let paid_at = payment
        .completed_at
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "N/A".to_string());

    format!(
        "Dear {student},\n\n\
         Your payment for the workshop \"{workshop}\" has been successfully processed!\n\n\
         Payment Details:\n\
         - Transaction ID: {tran_id}\n\
         - Amount: \u{09F3}{amount}\n\
         - Status: Completed\n\
         - Date: {paid_at}\n\n\
         Registration Details:\n\
         - Registration Number: {number}\n\
         - Workshop: {workshop}\n\
         - Date: {date}\n\
         - Time: {time}\n\
         - Venue: {venue}\n\n\
         You can download your receipt from the website using your registration number.\n\n\
         Best regards,\n\
         {club}\n\
         {host}",
        student = registration.student_name,
        workshop = workshop.name,
        tran_id = payment.transaction_id,
        amount = payment.amount,
        paid_at = paid_at,
        number = registration.registration_number,
        date = workshop.workshop_date,
        time = workshop.time_slot,
        venue = workshop.venue,
        club = settings.site.club_name,
        host = settings.site.school_name,
    )
}
