//! Integration tests for the SSLCommerz gateway client
//!
//! These run against a local mock server; no real gateway traffic.

use assert_matches::assert_matches;
use rust_decimal::Decimal;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use WorkshopHub::config::Settings;
use WorkshopHub::services::sslcommerz::{InitiateParams, SslCommerzClient};
use WorkshopHub::utils::errors::{GatewayError, WorkshopHubError};

fn test_settings() -> Settings {
    let mut settings = Settings::default();
    settings.sslcommerz.store_id = "teststore".to_string();
    settings.sslcommerz.store_password = "testpass".to_string();
    settings.sslcommerz.timeout_seconds = 5;
    settings
}

fn test_client(server: &MockServer) -> SslCommerzClient {
    SslCommerzClient::with_endpoints(
        test_settings(),
        format!("{}/gwprocess/v4/api.php", server.uri()),
        format!("{}/validator/api/validationserverAPI.php", server.uri()),
    )
    .expect("client")
}

fn initiate_params() -> InitiateParams {
    InitiateParams {
        transaction_id: "TXN-REG-20251210-AB12C-1A2B3C4D".to_string(),
        amount: Decimal::new(20000, 2),
        currency: "BDT".to_string(),
        student_name: "Ayesha Rahman".to_string(),
        email: "ayesha@example.com".to_string(),
        school_name: "St. Joseph International School".to_string(),
        contact_number: "01712345678".to_string(),
        product_name: "PROJECT DISPLAY & PRESENTATION Workshop".to_string(),
        registration_number: "REG-20251210-AB12C".to_string(),
        workshop_id: 1,
        success_url: "http://127.0.0.1:8000/payment/success".to_string(),
        fail_url: "http://127.0.0.1:8000/payment/fail".to_string(),
        cancel_url: "http://127.0.0.1:8000/payment/cancel".to_string(),
    }
}

#[tokio::test]
async fn test_initiate_payment_returns_checkout_url() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/gwprocess/v4/api.php"))
        .and(body_string_contains("store_id=teststore"))
        .and(body_string_contains("tran_id=TXN-REG-20251210-AB12C-1A2B3C4D"))
        .and(body_string_contains("value_a=REG-20251210-AB12C"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "SUCCESS",
            "sessionkey": "ABCDEF0123456789",
            "GatewayPageURL": "https://sandbox.sslcommerz.com/EasyCheckOut/testsession"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let session = client.initiate_payment(&initiate_params()).await.unwrap();

    assert_eq!(
        session.gateway_url,
        "https://sandbox.sslcommerz.com/EasyCheckOut/testsession"
    );
    assert_eq!(session.raw["sessionkey"], "ABCDEF0123456789");
}

#[tokio::test]
async fn test_initiate_payment_rejected_by_gateway() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/gwprocess/v4/api.php"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "FAILED",
            "failedreason": "Store Credential Error Or Store is De-active"
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let err = client.initiate_payment(&initiate_params()).await.unwrap_err();

    assert_matches!(
        err,
        WorkshopHubError::Gateway(GatewayError::InitiationRejected(reason))
            if reason.contains("Store Credential")
    );
}

#[tokio::test]
async fn test_initiate_payment_without_credentials_fails_locally() {
    let server = MockServer::start().await;
    // No mock mounted: the client must not even reach the server

    let client = SslCommerzClient::with_endpoints(
        Settings::default(),
        format!("{}/gwprocess/v4/api.php", server.uri()),
        format!("{}/validator/api/validationserverAPI.php", server.uri()),
    )
    .expect("client");

    let err = client.initiate_payment(&initiate_params()).await.unwrap_err();
    assert_matches!(
        err,
        WorkshopHubError::Gateway(GatewayError::RequestFailed(_))
    );
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_validate_payment_accepts_valid_statuses() {
    for status in ["VALID", "VALIDATED"] {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/validator/api/validationserverAPI.php"))
            .and(query_param("val_id", "VAL123"))
            .and(query_param("store_id", "teststore"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": status,
                "tran_id": "TXN-REG-20251210-AB12C-1A2B3C4D",
                "amount": "200.00",
                "currency_type": "BDT",
                "card_type": "VISA-Dutch Bangla"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let validated = client.validate_payment("VAL123").await.unwrap();

        assert_eq!(validated.amount.as_deref(), Some("200.00"));
        assert_eq!(
            validated.transaction_id.as_deref(),
            Some("TXN-REG-20251210-AB12C-1A2B3C4D")
        );
    }
}

#[tokio::test]
async fn test_validate_payment_rejects_invalid_transaction() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/validator/api/validationserverAPI.php"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "INVALID_TRANSACTION"
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let err = client.validate_payment("VAL999").await.unwrap_err();

    assert_matches!(
        err,
        WorkshopHubError::Gateway(GatewayError::ValidationFailed)
    );
}

#[tokio::test]
async fn test_gateway_http_error_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/gwprocess/v4/api.php"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let err = client.initiate_payment(&initiate_params()).await.unwrap_err();

    assert_matches!(
        err,
        WorkshopHubError::Gateway(GatewayError::RequestFailed(msg)) if msg.contains("500")
    );
}
