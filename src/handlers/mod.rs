//! HTTP request handlers
//!
//! Route handlers for the public registration flow, payment gateway
//! callbacks, receipts and the admin endpoints. The router and shared
//! application state live here.

pub mod admin;
pub mod forms;
pub mod payment;
pub mod receipt;
pub mod registration;
pub mod workshops;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::middleware::from_fn_with_state;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{extract::State, Router};
use tera::Tera;
use tower_http::trace::TraceLayer;

use crate::config::Settings;
use crate::database::{self, DatabasePool, DatabaseService};
use crate::services::ServiceFactory;
use crate::utils::errors::Result;

/// Shared application state injected into every handler
#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub pool: DatabasePool,
    pub db: DatabaseService,
    pub services: ServiceFactory,
    pub templates: Tera,
}

impl AppState {
    pub fn new(
        settings: Settings,
        pool: DatabasePool,
        db: DatabaseService,
        services: ServiceFactory,
    ) -> Result<Self> {
        let templates = Tera::new("templates/**/*.html")?;
        Ok(Self {
            settings,
            pool,
            db,
            services,
            templates,
        })
    }
}

/// Build the application router
pub fn build_router(state: Arc<AppState>) -> Router {
    let admin_routes = Router::new()
        .route("/admin/dashboard", get(admin::dashboard))
        .route("/admin/registrations", get(admin::list_registrations))
        .route("/admin/registrations/export", get(admin::export_registrations))
        .route("/admin/workshops", get(admin::list_workshops))
        .route("/admin/workshops/export", get(admin::export_workshops))
        .route("/admin/payments", get(admin::list_payments))
        .route("/admin/payments/export", get(admin::export_payments))
        .layer(from_fn_with_state(state.clone(), crate::middleware::require_admin));

    Router::new()
        .route("/", get(workshops::workshop_list))
        .route(
            "/register/{workshop_id}",
            get(registration::registration_form).post(registration::submit_registration),
        )
        .route(
            "/registration/success/{registration_id}",
            get(registration::registration_success),
        )
        .route(
            "/payment/confirm/{registration_id}",
            get(payment::payment_confirmation).post(payment::initiate_payment),
        )
        .route("/payment/success", post(payment::ipn_success))
        .route("/payment/fail", post(payment::ipn_fail))
        .route("/payment/cancel", post(payment::ipn_cancel))
        .route(
            "/payment/success/{registration_id}",
            get(payment::payment_success_page),
        )
        .route("/receipt/view/{registration_id}", get(receipt::view_receipt))
        .route(
            "/receipt/download/{registration_id}",
            get(receipt::download_receipt),
        )
        .route("/health", get(health))
        .merge(admin_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness endpoint: process up and database reachable
async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match database::health_check(&state.pool).await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(_) => (StatusCode::SERVICE_UNAVAILABLE, "database unavailable"),
    }
}
