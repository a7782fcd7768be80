//! End-to-end registration and payment lifecycle tests
//!
//! These run against a per-test PostgreSQL database provisioned by sqlx from
//! `DATABASE_URL`, with the payment gateway served by a local mock. They
//! exercise the status machine the handlers sit on top of: free vs pending
//! registrations, gateway confirmation, callback replays and retry guards.

use assert_matches::assert_matches;
use rust_decimal::Decimal;
use sqlx::PgPool;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use WorkshopHub::config::Settings;
use WorkshopHub::database::DatabaseService;
use WorkshopHub::models::payment::{CreatePaymentRequest, PaymentMethod};
use WorkshopHub::models::workshop::CreateWorkshopRequest;
use WorkshopHub::models::{School, Workshop};
use WorkshopHub::services::registration::{NewRegistration, PaymentRedirect};
use WorkshopHub::services::sslcommerz::SslCommerzClient;
use WorkshopHub::services::ServiceFactory;
use WorkshopHub::utils::errors::{GatewayError, WorkshopHubError};

struct FlowContext {
    db: DatabaseService,
    services: ServiceFactory,
    gateway_server: MockServer,
    school: School,
}

impl FlowContext {
    async fn new(pool: PgPool) -> Self {
        let gateway_server = MockServer::start().await;

        let mut settings = Settings::default();
        settings.sslcommerz.store_id = "teststore".to_string();
        settings.sslcommerz.store_password = "testpass".to_string();
        settings.sslcommerz.timeout_seconds = 5;

        let gateway = SslCommerzClient::with_endpoints(
            settings.clone(),
            format!("{}/gwprocess/v4/api.php", gateway_server.uri()),
            format!(
                "{}/validator/api/validationserverAPI.php",
                gateway_server.uri()
            ),
        )
        .expect("gateway client");

        let db = DatabaseService::new(pool);
        let services =
            ServiceFactory::with_gateway(db.clone(), settings, gateway).expect("services");

        let school = db
            .schools
            .create_or_get("St. Joseph International School")
            .await
            .expect("school");

        Self {
            db,
            services,
            gateway_server,
            school,
        }
    }

    async fn create_workshop(&self, name: &str, fee: Decimal) -> Workshop {
        self.db
            .workshops
            .create(CreateWorkshopRequest {
                name: name.to_string(),
                description: String::new(),
                workshop_date: "15 December 2025".to_string(),
                time_slot: "9:45 AM - 12:30 PM".to_string(),
                duration: "2 hours 45 minutes".to_string(),
                venue: "New building".to_string(),
                organizer: String::new(),
                fee,
                capacity: 50,
                is_active: true,
            })
            .await
            .expect("workshop")
    }

    fn form(&self, email: &str) -> NewRegistration {
        NewRegistration {
            student_name: "Ayesha Rahman".to_string(),
            grade: 9,
            school_id: self.school.id,
            contact_number: "01712345678".to_string(),
            email: email.to_string(),
        }
    }

    async fn mock_initiate_success(&self) {
        Mock::given(method("POST"))
            .and(path("/gwprocess/v4/api.php"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "SUCCESS",
                "sessionkey": "ABCDEF0123456789",
                "GatewayPageURL": "https://sandbox.sslcommerz.com/EasyCheckOut/testsession"
            })))
            .mount(&self.gateway_server)
            .await;
    }

    async fn mock_validation(&self, val_id: &str, amount: &str, expected_calls: u64) {
        Mock::given(method("GET"))
            .and(path("/validator/api/validationserverAPI.php"))
            .and(query_param("val_id", val_id))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "VALID",
                "amount": amount,
                "currency_type": "BDT",
                "card_type": "VISA-Dutch Bangla"
            })))
            .expect(expected_calls)
            .mount(&self.gateway_server)
            .await;
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn test_free_registration_confirmed_without_payment_row(pool: PgPool) {
    let ctx = FlowContext::new(pool).await;
    let workshop = ctx.create_workshop("PHYSICS OLYMPIAD Workshop", Decimal::ZERO).await;

    let registration = ctx
        .services
        .registration_service
        .submit_registration(workshop.id, ctx.form("ayesha@example.com"))
        .await
        .unwrap();

    assert_eq!(registration.payment_status, "free");
    assert!(registration.is_confirmed());

    let payment = ctx
        .db
        .payments
        .find_by_registration_id(registration.id)
        .await
        .unwrap();
    assert!(payment.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_paid_registration_pending_until_payment_completes(pool: PgPool) {
    let ctx = FlowContext::new(pool).await;
    let workshop = ctx
        .create_workshop("ARDUINO ROBOTICS BOOTCAMP", Decimal::new(20000, 2))
        .await;
    ctx.mock_initiate_success().await;
    ctx.mock_validation("VAL123", "200.00", 1).await;

    let registration = ctx
        .services
        .registration_service
        .submit_registration(workshop.id, ctx.form("ayesha@example.com"))
        .await
        .unwrap();
    assert_eq!(registration.payment_status, "pending");
    assert!(!registration.is_confirmed());

    let redirect = ctx
        .services
        .registration_service
        .initiate_payment(registration.id)
        .await
        .unwrap();
    assert_matches!(redirect, PaymentRedirect::Checkout(url) if url.contains("EasyCheckOut"));

    let payment = ctx
        .db
        .payments
        .find_by_registration_id(registration.id)
        .await
        .unwrap()
        .expect("payment row created");
    assert_eq!(payment.payment_status, "pending");

    let confirmed = ctx
        .services
        .registration_service
        .confirm_payment("VAL123", &payment.transaction_id, "200.00")
        .await
        .unwrap();
    assert!(!confirmed.replayed);

    let registration = ctx
        .db
        .registrations
        .find_by_id(registration.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(registration.payment_status, "completed");

    let payment = ctx
        .db
        .payments
        .find_by_registration_id(registration.id)
        .await
        .unwrap()
        .unwrap();
    assert!(payment.is_completed());
    assert!(payment.completed_at.is_some());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_success_callback_replay_is_a_noop(pool: PgPool) {
    let ctx = FlowContext::new(pool).await;
    let workshop = ctx
        .create_workshop("ARDUINO ROBOTICS BOOTCAMP", Decimal::new(20000, 2))
        .await;
    ctx.mock_initiate_success().await;
    // The validator must be consulted exactly once; the replay short-circuits
    ctx.mock_validation("VAL123", "200.00", 1).await;

    let registration = ctx
        .services
        .registration_service
        .submit_registration(workshop.id, ctx.form("ayesha@example.com"))
        .await
        .unwrap();
    ctx.services
        .registration_service
        .initiate_payment(registration.id)
        .await
        .unwrap();
    let payment = ctx
        .db
        .payments
        .find_by_registration_id(registration.id)
        .await
        .unwrap()
        .unwrap();

    let first = ctx
        .services
        .registration_service
        .confirm_payment("VAL123", &payment.transaction_id, "200.00")
        .await
        .unwrap();
    assert!(!first.replayed);
    let completed_at = ctx
        .db
        .payments
        .find_by_registration_id(registration.id)
        .await
        .unwrap()
        .unwrap()
        .completed_at;

    let replay = ctx
        .services
        .registration_service
        .confirm_payment("VAL123", &payment.transaction_id, "200.00")
        .await
        .unwrap();
    assert!(replay.replayed);
    assert_eq!(replay.registration_id, registration.id);

    // No state change on replay
    let payment = ctx
        .db
        .payments
        .find_by_registration_id(registration.id)
        .await
        .unwrap()
        .unwrap();
    assert!(payment.is_completed());
    assert_eq!(payment.completed_at, completed_at);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_email_rejected_for_same_workshop(pool: PgPool) {
    let ctx = FlowContext::new(pool).await;
    let workshop = ctx.create_workshop("PHYSICS OLYMPIAD Workshop", Decimal::ZERO).await;

    ctx.services
        .registration_service
        .submit_registration(workshop.id, ctx.form("ayesha@example.com"))
        .await
        .unwrap();

    let err = ctx
        .services
        .registration_service
        .submit_registration(workshop.id, ctx.form("ayesha@example.com"))
        .await
        .unwrap_err();
    assert_matches!(err, WorkshopHubError::DuplicateRegistration);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_amount_mismatch_marks_payment_failed(pool: PgPool) {
    let ctx = FlowContext::new(pool).await;
    let workshop = ctx
        .create_workshop("ARDUINO ROBOTICS BOOTCAMP", Decimal::new(20000, 2))
        .await;
    ctx.mock_initiate_success().await;
    ctx.mock_validation("VAL123", "199.99", 1).await;

    let registration = ctx
        .services
        .registration_service
        .submit_registration(workshop.id, ctx.form("ayesha@example.com"))
        .await
        .unwrap();
    ctx.services
        .registration_service
        .initiate_payment(registration.id)
        .await
        .unwrap();
    let payment = ctx
        .db
        .payments
        .find_by_registration_id(registration.id)
        .await
        .unwrap()
        .unwrap();

    let err = ctx
        .services
        .registration_service
        .confirm_payment("VAL123", &payment.transaction_id, "199.99")
        .await
        .unwrap_err();
    assert_matches!(
        err,
        WorkshopHubError::Gateway(GatewayError::AmountMismatch { .. })
    );

    let payment = ctx
        .db
        .payments
        .find_by_registration_id(registration.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(payment.payment_status, "failed");
    let registration = ctx
        .db
        .registrations
        .find_by_id(registration.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(registration.payment_status, "failed");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_completed_payment_survives_retry_race(pool: PgPool) {
    let ctx = FlowContext::new(pool).await;
    let workshop = ctx
        .create_workshop("ARDUINO ROBOTICS BOOTCAMP", Decimal::new(20000, 2))
        .await;
    ctx.mock_initiate_success().await;
    ctx.mock_validation("VAL123", "200.00", 1).await;

    let registration = ctx
        .services
        .registration_service
        .submit_registration(workshop.id, ctx.form("ayesha@example.com"))
        .await
        .unwrap();
    ctx.services
        .registration_service
        .initiate_payment(registration.id)
        .await
        .unwrap();
    let payment = ctx
        .db
        .payments
        .find_by_registration_id(registration.id)
        .await
        .unwrap()
        .unwrap();
    ctx.services
        .registration_service
        .confirm_payment("VAL123", &payment.transaction_id, "200.00")
        .await
        .unwrap();

    // An upsert racing past the service's status check must not touch the
    // completed row
    let replaced = ctx
        .db
        .payments
        .create_or_replace(CreatePaymentRequest {
            registration_id: registration.id,
            transaction_id: "TXN-REG-RACE-DEADBEEF".to_string(),
            amount: workshop.fee,
            currency: "BDT".to_string(),
            payment_method: PaymentMethod::SslCommerz,
            gateway_data: None,
        })
        .await
        .unwrap();
    assert!(replaced.is_none());

    let payment = ctx
        .db
        .payments
        .find_by_registration_id(registration.id)
        .await
        .unwrap()
        .unwrap();
    assert!(payment.is_completed());
    assert_ne!(payment.transaction_id, "TXN-REG-RACE-DEADBEEF");

    // And the service reports the registration as settled
    let redirect = ctx
        .services
        .registration_service
        .initiate_payment(registration.id)
        .await
        .unwrap();
    assert_matches!(redirect, PaymentRedirect::AlreadyConfirmed);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_failed_payment_can_be_retried(pool: PgPool) {
    let ctx = FlowContext::new(pool).await;
    let workshop = ctx
        .create_workshop("ARDUINO ROBOTICS BOOTCAMP", Decimal::new(20000, 2))
        .await;
    ctx.mock_initiate_success().await;

    let registration = ctx
        .services
        .registration_service
        .submit_registration(workshop.id, ctx.form("ayesha@example.com"))
        .await
        .unwrap();
    ctx.services
        .registration_service
        .initiate_payment(registration.id)
        .await
        .unwrap();
    let first = ctx
        .db
        .payments
        .find_by_registration_id(registration.id)
        .await
        .unwrap()
        .unwrap();

    ctx.services
        .registration_service
        .fail_payment(&first.transaction_id)
        .await
        .unwrap();

    // Retry reuses the single payment row with a fresh transaction id
    ctx.services
        .registration_service
        .initiate_payment(registration.id)
        .await
        .unwrap();
    let second = ctx
        .db
        .payments
        .find_by_registration_id(registration.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(second.payment_status, "pending");
    assert_ne!(second.transaction_id, first.transaction_id);
}
