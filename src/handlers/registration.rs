//! Registration form handlers

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use tera::Context;
use tracing::info;

use crate::handlers::forms::{validate_registration_form, FieldError, RegistrationForm};
use crate::handlers::workshops::WorkshopView;
use crate::handlers::AppState;
use crate::models::Workshop;
use crate::utils::errors::{Result, WorkshopHubError};

/// GET /register/{workshop_id}: show the registration form
pub async fn registration_form(
    State(state): State<Arc<AppState>>,
    Path(workshop_id): Path<i64>,
) -> Result<Html<String>> {
    let workshop = state
        .db
        .workshops
        .find_active_by_id(workshop_id)
        .await?
        .ok_or(WorkshopHubError::WorkshopNotFound { workshop_id })?;

    render_form(&state, &workshop, None, &[], None).await
}

/// POST /register/{workshop_id}: validate and create the registration
pub async fn submit_registration(
    State(state): State<Arc<AppState>>,
    Path(workshop_id): Path<i64>,
    Form(form): Form<RegistrationForm>,
) -> Result<Response> {
    let workshop = state
        .db
        .workshops
        .find_active_by_id(workshop_id)
        .await?
        .ok_or(WorkshopHubError::WorkshopNotFound { workshop_id })?;

    let validated = match validate_registration_form(&form) {
        Ok(validated) => validated,
        Err(errors) => {
            let body = render_form(&state, &workshop, Some(&form), &errors, None).await?;
            return Ok(body.into_response());
        }
    };

    let registration = match state
        .services
        .registration_service
        .submit_registration(workshop_id, validated)
        .await
    {
        Ok(registration) => registration,
        Err(
            err @ (WorkshopHubError::DuplicateRegistration
            | WorkshopHubError::WorkshopFull
            | WorkshopHubError::WorkshopClosed),
        ) => {
            let message = user_message(&err);
            let body = render_form(&state, &workshop, Some(&form), &[], Some(message)).await?;
            return Ok(body.into_response());
        }
        Err(err) => return Err(err),
    };

    info!(
        registration_number = %registration.registration_number,
        workshop_id = workshop_id,
        "Registration submitted"
    );

    let target = if workshop.is_free() {
        format!("/registration/success/{}", registration.id)
    } else {
        format!("/payment/confirm/{}", registration.id)
    };

    Ok(Redirect::to(&target).into_response())
}

/// GET /registration/success/{registration_id}: free workshop success page
pub async fn registration_success(
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

    let mut context = Context::new();
    context.insert("page_title", "Registration Successful");
    context.insert("registration", &registration);
    context.insert("workshop", &WorkshopView::build(&workshop, 0));
    context.insert("site", &state.settings.site);

    let body = state.templates.render("registration_success.html", &context)?;
    Ok(Html(body))
}

fn user_message(err: &WorkshopHubError) -> &'static str {
    match err {
        WorkshopHubError::DuplicateRegistration => {
            "This email is already registered for this workshop. \
             Please use a different email or contact support."
        }
        WorkshopHubError::WorkshopFull => "This workshop is already full.",
        WorkshopHubError::WorkshopClosed => "This workshop is not accepting registrations.",
        _ => "Registration failed. Please try again.",
    }
}

async fn render_form(
    state: &AppState,
    workshop: &Workshop,
    form: Option<&RegistrationForm>,
    errors: &[FieldError],
    form_error: Option<&str>,
) -> Result<Html<String>> {
    let schools = state.db.schools.list_active().await?;

    let mut context = Context::new();
    context.insert("page_title", &format!("Register for {}", workshop.name));
    context.insert("workshop", &WorkshopView::build(workshop, 0));
    context.insert("schools", &schools);
    context.insert("errors", errors);
    context.insert("form_error", &form_error);
    if let Some(form) = form {
        context.insert("form", form);
    }
    context.insert("site", &state.settings.site);

    let body = state.templates.render("register.html", &context)?;
    Ok(Html(body))
}
