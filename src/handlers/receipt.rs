//! Receipt viewing and PDF download

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Response};
use tera::Context;
use tracing::info;

use crate::handlers::workshops::WorkshopView;
use crate::handlers::AppState;
use crate::services::receipt::{generate_receipt_pdf, receipt_filename};
use crate::utils::errors::Result;

/// GET /receipt/view/{registration_id}: HTML receipt page
pub async fn view_receipt(
    State(state): State<Arc<AppState>>,
    Path(registration_id): Path<i64>,
) -> Result<Html<String>> {
    let data = state
        .services
        .registration_service
        .receipt_data(registration_id)
        .await?;

    let mut context = Context::new();
    context.insert("page_title", "Registration Receipt");
    context.insert("registration", &data.registration);
    context.insert("workshop", &WorkshopView::build(&data.workshop, 0));
    context.insert("school_name", &data.school_name);
    context.insert("payment", &data.payment);
    context.insert("site", &state.settings.site);

    let body = state.templates.render("receipt.html", &context)?;
    Ok(Html(body))
}

/// GET /receipt/download/{registration_id}: PDF receipt download
pub async fn download_receipt(
    State(state): State<Arc<AppState>>,
    Path(registration_id): Path<i64>,
) -> Result<Response> {
    let data = state
        .services
        .registration_service
        .receipt_data(registration_id)
        .await?;

    let bytes = generate_receipt_pdf(&data, &state.settings)?;
    let filename = receipt_filename(&data.registration);

    info!(
        registration_number = %data.registration.registration_number,
        "Receipt PDF generated"
    );

    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        ),
    ];

    Ok((headers, bytes).into_response())
}
