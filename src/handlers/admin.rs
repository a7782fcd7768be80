//! Admin endpoints: dashboard statistics, registration listing, Excel export
//!
//! These return JSON (and xlsx for the export) rather than HTML; the admin
//! frontend is served separately and authenticates with a bearer token.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::database::{
    PaymentExportRow, PaymentFilter, RegistrationExportRow, RegistrationFilter, WorkshopExportRow,
    WorkshopStats,
};
use crate::handlers::AppState;
use crate::models::registration::PaymentStatus;
use crate::models::Registration;
use crate::services::export::{
    payments_to_xlsx, registrations_to_xlsx, workshops_to_xlsx, XLSX_CONTENT_TYPE,
};
use crate::utils::errors::{Result, WorkshopHubError};
use crate::utils::logging::log_admin_action;

const DEFAULT_PAGE_SIZE: i64 = 100;
const EXPORT_LIMIT: i64 = 50_000;

/// Query parameters shared by the listing and export endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrationQuery {
    pub workshop_id: Option<i64>,
    pub status: Option<String>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

fn parse_status(status: Option<&str>) -> Result<Option<PaymentStatus>> {
    match status.filter(|s| !s.is_empty()) {
        Some(value) => Ok(Some(PaymentStatus::parse(value).ok_or_else(|| {
            WorkshopHubError::InvalidInput(format!("Unknown payment status: {}", value))
        })?)),
        None => Ok(None),
    }
}

impl RegistrationQuery {
    fn into_filter(self, default_limit: i64) -> Result<RegistrationFilter> {
        let payment_status = parse_status(self.status.as_deref())?;

        Ok(RegistrationFilter {
            workshop_id: self.workshop_id,
            payment_status,
            search: self.search.filter(|s| !s.trim().is_empty()),
            limit: self.limit.unwrap_or(default_limit).clamp(1, EXPORT_LIMIT),
            offset: self.offset.unwrap_or(0).max(0),
        })
    }
}

/// Query parameters for the payment listing and export endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PaymentQuery {
    fn into_filter(self, default_limit: i64) -> Result<PaymentFilter> {
        Ok(PaymentFilter {
            payment_status: parse_status(self.status.as_deref())?,
            limit: self.limit.unwrap_or(default_limit).clamp(1, EXPORT_LIMIT),
            offset: self.offset.unwrap_or(0).max(0),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub total_registrations: i64,
    pub completed_payments: i64,
    pub pending_payments: i64,
    pub free_registrations: i64,
    pub active_workshops: i64,
    pub total_revenue: rust_decimal::Decimal,
    pub workshop_stats: Vec<WorkshopStats>,
    pub recent_registrations: Vec<Registration>,
}

/// GET /admin/dashboard: aggregate statistics
pub async fn dashboard(State(state): State<Arc<AppState>>) -> Result<Json<DashboardResponse>> {
    log_admin_action("dashboard_viewed", None);

    let total_registrations = state.db.registrations.count().await?;
    let completed_payments = state
        .db
        .registrations
        .count_by_status(PaymentStatus::Completed)
        .await?;
    let pending_payments = state
        .db
        .registrations
        .count_by_status(PaymentStatus::Pending)
        .await?;
    let free_registrations = state
        .db
        .registrations
        .count_by_status(PaymentStatus::Free)
        .await?;
    let active_workshops = state.db.workshops.count_active().await?;
    let total_revenue = state.db.payments.total_revenue().await?;
    let workshop_stats = state.db.registrations.workshop_stats().await?;
    let recent_registrations = state.db.registrations.recent(10).await?;

    Ok(Json(DashboardResponse {
        total_registrations,
        completed_payments,
        pending_payments,
        free_registrations,
        active_workshops,
        total_revenue,
        workshop_stats,
        recent_registrations,
    }))
}

/// GET /admin/registrations: filtered registration listing
pub async fn list_registrations(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RegistrationQuery>,
) -> Result<Json<Vec<RegistrationExportRow>>> {
    let filter = query.into_filter(DEFAULT_PAGE_SIZE)?;
    let rows = state.db.registrations.list_filtered(&filter).await?;
    Ok(Json(rows))
}

/// GET /admin/registrations/export: Excel download of the filtered listing
pub async fn export_registrations(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RegistrationQuery>,
) -> Result<Response> {
    let mut filter = query.into_filter(EXPORT_LIMIT)?;
    filter.offset = 0;
    let rows = state.db.registrations.list_filtered(&filter).await?;

    log_admin_action("registrations_exported", Some(&rows.len().to_string()));

    let bytes = registrations_to_xlsx(&rows)?;
    Ok(xlsx_download("workshop_registrations", bytes))
}

/// GET /admin/workshops: all workshops with registration counts
pub async fn list_workshops(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<WorkshopExportRow>>> {
    let rows = state.db.workshops.list_with_counts().await?;
    Ok(Json(rows))
}

/// GET /admin/workshops/export: Excel download of the workshop listing
pub async fn export_workshops(State(state): State<Arc<AppState>>) -> Result<Response> {
    let rows = state.db.workshops.list_with_counts().await?;

    log_admin_action("workshops_exported", Some(&rows.len().to_string()));

    let bytes = workshops_to_xlsx(&rows)?;
    Ok(xlsx_download("workshops", bytes))
}

/// GET /admin/payments: filtered payment listing
pub async fn list_payments(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PaymentQuery>,
) -> Result<Json<Vec<PaymentExportRow>>> {
    let filter = query.into_filter(DEFAULT_PAGE_SIZE)?;
    let rows = state.db.payments.list_filtered(&filter).await?;
    Ok(Json(rows))
}

/// GET /admin/payments/export: Excel download of the filtered payment listing
pub async fn export_payments(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PaymentQuery>,
) -> Result<Response> {
    let mut filter = query.into_filter(EXPORT_LIMIT)?;
    filter.offset = 0;
    let rows = state.db.payments.list_filtered(&filter).await?;

    log_admin_action("payments_exported", Some(&rows.len().to_string()));

    let bytes = payments_to_xlsx(&rows)?;
    Ok(xlsx_download("payments", bytes))
}

fn xlsx_download(prefix: &str, bytes: Vec<u8>) -> Response {
    let filename = format!("{}_{}.xlsx", prefix, Utc::now().format("%Y%m%d_%H%M%S"));

    let headers = [
        (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        ),
    ];

    (headers, bytes).into_response()
}
