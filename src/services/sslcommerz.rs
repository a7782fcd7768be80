//! SSLCommerz payment gateway client
//!
//! Handles the outbound calls to the gateway: session initiation before the
//! browser redirect, and server-side transaction validation when the IPN
//! callback arrives. Response parsing and error mapping live here so the rest
//! of the application only sees typed outcomes.

use std::str::FromStr;
use std::time::Duration;

use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::Settings;
use crate::utils::errors::{GatewayError, Result, WorkshopHubError};

/// Parameters for a gateway session initiation
#[derive(Debug, Clone)]
pub struct InitiateParams {
    pub transaction_id: String,
    pub amount: Decimal,
    pub currency: String,
    pub student_name: String,
    pub email: String,
    pub school_name: String,
    pub contact_number: String,
    pub product_name: String,
    pub registration_number: String,
    pub workshop_id: i64,
    pub success_url: String,
    pub fail_url: String,
    pub cancel_url: String,
}

/// Successful initiation: where to send the browser, plus the raw response
#[derive(Debug, Clone)]
pub struct InitiatedSession {
    pub gateway_url: String,
    pub raw: Value,
}

/// Successful validation of a transaction
#[derive(Debug, Clone)]
pub struct ValidatedTransaction {
    pub transaction_id: Option<String>,
    pub amount: Option<String>,
    pub currency: Option<String>,
    pub card_type: Option<String>,
    pub raw: Value,
}

#[derive(Debug, Deserialize)]
struct InitiateResponse {
    status: String,
    #[serde(rename = "GatewayPageURL")]
    gateway_page_url: Option<String>,
    failedreason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ValidationResponse {
    status: String,
    tran_id: Option<String>,
    amount: Option<String>,
    currency_type: Option<String>,
    card_type: Option<String>,
}

/// Gateway client
#[derive(Debug, Clone)]
pub struct SslCommerzClient {
    client: Client,
    settings: Settings,
    api_url: String,
    validation_url: String,
}

impl SslCommerzClient {
    /// Create a new client against the environment configured in settings
    pub fn new(settings: Settings) -> Result<Self> {
        let api_url = settings.sslcommerz.api_url().to_string();
        let validation_url = settings.sslcommerz.validation_url().to_string();
        Self::with_endpoints(settings, api_url, validation_url)
    }

    /// Create a client against explicit endpoints (used by tests)
    pub fn with_endpoints(
        settings: Settings,
        api_url: String,
        validation_url: String,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.sslcommerz.timeout_seconds))
            .user_agent("WorkshopHub/1.0")
            .build()
            .map_err(WorkshopHubError::Http)?;

        Ok(Self {
            client,
            settings,
            api_url,
            validation_url,
        })
    }

    /// Initiate a payment session and return the hosted checkout URL
    pub async fn initiate_payment(&self, params: &InitiateParams) -> Result<InitiatedSession> {
        if self.settings.sslcommerz.store_id.is_empty() {
            return Err(GatewayError::RequestFailed(
                "SSLCommerz store credentials are not configured".to_string(),
            )
            .into());
        }

        debug!(transaction_id = %params.transaction_id, amount = %params.amount, "Initiating gateway session");

        let form = [
            ("store_id", self.settings.sslcommerz.store_id.clone()),
            ("store_passwd", self.settings.sslcommerz.store_password.clone()),
            ("total_amount", params.amount.to_string()),
            ("currency", params.currency.clone()),
            ("tran_id", params.transaction_id.clone()),
            ("success_url", params.success_url.clone()),
            ("fail_url", params.fail_url.clone()),
            ("cancel_url", params.cancel_url.clone()),
            ("cus_name", params.student_name.clone()),
            ("cus_email", params.email.clone()),
            ("cus_add1", params.school_name.clone()),
            ("cus_city", "Dhaka".to_string()),
            ("cus_country", "Bangladesh".to_string()),
            ("cus_phone", params.contact_number.clone()),
            ("product_name", params.product_name.clone()),
            ("product_category", "Workshop Registration".to_string()),
            ("product_profile", "general".to_string()),
            ("shipping_method", "NO".to_string()),
            ("num_of_item", "1".to_string()),
            // Carried through the gateway and echoed back on the IPN callback
            ("value_a", params.registration_number.clone()),
            ("value_b", params.workshop_id.to_string()),
        ];

        let response = self
            .client
            .post(&self.api_url)
            .form(&form)
            .send()
            .await
            .map_err(map_request_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::RequestFailed(format!("HTTP {}: {}", status, body)).into());
        }

        let raw: Value = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

        let parsed: InitiateResponse = serde_json::from_value(raw.clone())
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

        if parsed.status != "SUCCESS" {
            let reason = parsed
                .failedreason
                .unwrap_or_else(|| "Payment initiation failed".to_string());
            warn!(transaction_id = %params.transaction_id, reason = %reason, "Gateway rejected initiation");
            return Err(GatewayError::InitiationRejected(reason).into());
        }

        let gateway_url = parsed.gateway_page_url.ok_or_else(|| {
            GatewayError::InvalidResponse("Missing GatewayPageURL in SUCCESS response".to_string())
        })?;

        Ok(InitiatedSession { gateway_url, raw })
    }

    /// Validate a transaction after the IPN callback
    pub async fn validate_payment(&self, val_id: &str) -> Result<ValidatedTransaction> {
        debug!(val_id = val_id, "Validating transaction with gateway");

        let response = self
            .client
            .get(&self.validation_url)
            .query(&[
                ("val_id", val_id),
                ("store_id", &self.settings.sslcommerz.store_id),
                ("store_passwd", &self.settings.sslcommerz.store_password),
            ])
            .send()
            .await
            .map_err(map_request_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::RequestFailed(format!("HTTP {}: {}", status, body)).into());
        }

        let raw: Value = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

        let parsed: ValidationResponse = serde_json::from_value(raw.clone())
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

        if parsed.status != "VALID" && parsed.status != "VALIDATED" {
            warn!(val_id = val_id, status = %parsed.status, "Gateway validation failed");
            return Err(GatewayError::ValidationFailed.into());
        }

        Ok(ValidatedTransaction {
            transaction_id: parsed.tran_id,
            amount: parsed.amount,
            currency: parsed.currency_type,
            card_type: parsed.card_type,
            raw,
        })
    }

    /// Verify that the amount reported by the gateway matches the workshop fee
    pub fn verify_amount(received: &str, expected: Decimal) -> bool {
        match Decimal::from_str(received) {
            Ok(amount) => amount == expected,
            Err(_) => false,
        }
    }
}

fn map_request_error(e: reqwest::Error) -> WorkshopHubError {
    if e.is_timeout() {
        GatewayError::Timeout.into()
    } else if e.is_connect() {
        GatewayError::ServiceUnavailable.into()
    } else {
        GatewayError::RequestFailed(e.to_string()).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_amount_matches_regardless_of_scale() {
        let expected = Decimal::from_str("200.00").unwrap();
        assert!(SslCommerzClient::verify_amount("200.00", expected));
        assert!(SslCommerzClient::verify_amount("200", expected));
        assert!(SslCommerzClient::verify_amount("200.0000", expected));
    }

    #[test]
    fn test_verify_amount_rejects_mismatch() {
        let expected = Decimal::from_str("200.00").unwrap();
        assert!(!SslCommerzClient::verify_amount("199.99", expected));
        assert!(!SslCommerzClient::verify_amount("2000", expected));
        assert!(!SslCommerzClient::verify_amount("not-a-number", expected));
    }

    #[test]
    fn test_initiate_response_parsing() {
        let raw = serde_json::json!({
            "status": "SUCCESS",
            "GatewayPageURL": "https://sandbox.sslcommerz.com/EasyCheckOut/test",
            "sessionkey": "ABCDEF"
        });
        let parsed: InitiateResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(parsed.status, "SUCCESS");
        assert!(parsed.gateway_page_url.is_some());
        assert!(parsed.failedreason.is_none());
    }

    #[test]
    fn test_failed_initiate_response_parsing() {
        let raw = serde_json::json!({
            "status": "FAILED",
            "failedreason": "Store Credential Error Or Store is De-active"
        });
        let parsed: InitiateResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(parsed.status, "FAILED");
        assert_eq!(
            parsed.failedreason.as_deref(),
            Some("Store Credential Error Or Store is De-active")
        );
    }
}
