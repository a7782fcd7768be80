//! Payment confirmation and gateway callback handlers
//!
//! The IPN endpoints are called server-to-server by SSLCommerz and therefore
//! accept plain form posts. Whatever happens there, the browser ends up on a
//! page of ours via redirect, mirroring the gateway's hosted-checkout flow.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;
use tera::Context;
use tracing::{error, warn};

use crate::handlers::workshops::WorkshopView;
use crate::handlers::AppState;
use crate::services::registration::PaymentRedirect;
use crate::utils::errors::{Result, WorkshopHubError};

/// Fields of interest on the gateway's IPN callbacks; everything else in the
/// post body is ignored
#[derive(Debug, Clone, Deserialize)]
pub struct IpnPayload {
    #[serde(default)]
    pub val_id: Option<String>,
    #[serde(default)]
    pub tran_id: Option<String>,
    #[serde(default)]
    pub amount: Option<String>,
}

/// GET /payment/confirm/{registration_id}: review page before checkout
pub async fn payment_confirmation(
    State(state): State<Arc<AppState>>,
    Path(registration_id): Path<i64>,
) -> Result<Response> {
    let registration = state
        .db
        .registrations
        .find_by_id(registration_id)
        .await?
        .ok_or(WorkshopHubError::RegistrationNotFound { registration_id })?;
    let workshop = state
        .db
        .workshops
        .find_by_id(registration.workshop_id)
        .await?
        .ok_or(WorkshopHubError::WorkshopNotFound {
            workshop_id: registration.workshop_id,
        })?;

    // Nothing to pay: free workshop or already completed
    if workshop.is_free() || registration.is_confirmed() {
        let target = format!("/registration/success/{}", registration.id);
        return Ok(Redirect::to(&target).into_response());
    }

    let body = render_confirmation(&state, registration_id, None).await?;
    Ok(body.into_response())
}

/// POST /payment/confirm/{registration_id}: initiate the gateway session
pub async fn initiate_payment(
    State(state): State<Arc<AppState>>,
    Path(registration_id): Path<i64>,
) -> Result<Response> {
    match state
        .services
        .registration_service
        .initiate_payment(registration_id)
        .await
    {
        Ok(PaymentRedirect::Checkout(url)) => Ok(Redirect::to(&url).into_response()),
        Ok(PaymentRedirect::AlreadyConfirmed) => {
            let target = format!("/registration/success/{}", registration_id);
            Ok(Redirect::to(&target).into_response())
        }
        Err(WorkshopHubError::Gateway(err)) => {
            warn!(registration_id = registration_id, error = %err, "Payment initiation failed");
            let message = format!("Payment initiation failed: {}", err);
            let body = render_confirmation(&state, registration_id, Some(&message)).await?;
            Ok(body.into_response())
        }
        Err(err) => Err(err),
    }
}

/// POST /payment/success: IPN success callback from the gateway
pub async fn ipn_success(
    State(state): State<Arc<AppState>>,
    Form(payload): Form<IpnPayload>,
) -> Redirect {
    let (Some(val_id), Some(tran_id)) = (payload.val_id.as_deref(), payload.tran_id.as_deref())
    else {
        warn!("IPN success callback missing val_id or tran_id");
        return Redirect::to("/");
    };

    let amount = payload.amount.as_deref().unwrap_or_default();
    match state
        .services
        .registration_service
        .confirm_payment(val_id, tran_id, amount)
        .await
    {
        Ok(confirmed) => Redirect::to(&format!("/payment/success/{}", confirmed.registration_id)),
        Err(err) => {
            error!(tran_id = tran_id, error = %err, "IPN success processing failed");
            Redirect::to("/")
        }
    }
}

/// POST /payment/fail: IPN fail callback
pub async fn ipn_fail(
    State(state): State<Arc<AppState>>,
    Form(payload): Form<IpnPayload>,
) -> Redirect {
    if let Some(tran_id) = payload.tran_id.as_deref() {
        if let Err(err) = state.services.registration_service.fail_payment(tran_id).await {
            error!(tran_id = tran_id, error = %err, "IPN fail processing failed");
        }
    }
    Redirect::to("/")
}

/// POST /payment/cancel: IPN cancel callback
pub async fn ipn_cancel(
    State(state): State<Arc<AppState>>,
    Form(payload): Form<IpnPayload>,
) -> Redirect {
    if let Some(tran_id) = payload.tran_id.as_deref() {
        if let Err(err) = state
            .services
            .registration_service
            .cancel_payment(tran_id)
            .await
        {
            error!(tran_id = tran_id, error = %err, "IPN cancel processing failed");
        }
    }
    Redirect::to("/")
}

/// GET /payment/success/{registration_id}: paid registration success page
pub async fn payment_success_page(
    State(state): State<Arc<AppState>>,
    Path(registration_id): Path<i64>,
) -> Result<Html<String>> {
    let registration = state
        .db
        .registrations
        .find_by_id(registration_id)
        .await?
        .ok_or(WorkshopHubError::RegistrationNotFound { registration_id })?;
    let workshop = state
        .db
        .workshops
        .find_by_id(registration.workshop_id)
        .await?
        .ok_or(WorkshopHubError::WorkshopNotFound {
            workshop_id: registration.workshop_id,
        })?;
    let payment = state
        .db
        .payments
        .find_by_registration_id(registration_id)
        .await?;

    let mut context = Context::new();
    context.insert("page_title", "Registration Successful");
    context.insert("registration", &registration);
    context.insert("workshop", &WorkshopView::build(&workshop, 0));
    context.insert("payment", &payment);
    context.insert("site", &state.settings.site);

    let body = state.templates.render("payment_success.html", &context)?;
    Ok(Html(body))
}

async fn render_confirmation(
    state: &AppState,
    registration_id: i64,
    error_message: Option<&str>,
) -> Result<Html<String>> {
    let registration = state
        .db
        .registrations
        .find_by_id(registration_id)
        .await?
        .ok_or(WorkshopHubError::RegistrationNotFound { registration_id })?;
    let workshop = state
        .db
        .workshops
        .find_by_id(registration.workshop_id)
        .await?
        .ok_or(WorkshopHubError::WorkshopNotFound {
            workshop_id: registration.workshop_id,
        })?;

    let mut context = Context::new();
    context.insert("page_title", "Payment Confirmation");
    context.insert("registration", &registration);
    context.insert("workshop", &WorkshopView::build(&workshop, 0));
    context.insert("error_message", &error_message);
    context.insert("site", &state.settings.site);

    let body = state.templates.render("payment_confirmation.html", &context)?;
    Ok(Html(body))
}
