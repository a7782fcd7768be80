//! Public workshop listing

use std::sync::Arc;

use axum::extract::State;
use axum::response::Html;
use serde::Serialize;
use tera::Context;

use crate::handlers::AppState;
use crate::models::Workshop;
use crate::utils::errors::Result;
use crate::utils::helpers::format_fee;

/// Workshop fields prepared for template rendering
#[derive(Debug, Clone, Serialize)]
pub struct WorkshopView {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub workshop_date: String,
    pub time_slot: String,
    pub duration: String,
    pub venue: String,
    pub organizer: String,
    pub fee_display: String,
    pub is_free: bool,
    pub available_slots: i64,
}

impl WorkshopView {
    pub fn build(workshop: &Workshop, confirmed: i64) -> Self {
        Self {
            id: workshop.id,
            name: workshop.name.clone(),
            description: workshop.description.clone(),
            workshop_date: workshop.workshop_date.clone(),
            time_slot: workshop.time_slot.clone(),
            duration: workshop.duration.clone(),
            venue: workshop.venue.clone(),
            organizer: workshop.organizer.clone(),
            fee_display: format_fee(workshop.fee),
            is_free: workshop.is_free(),
            available_slots: (workshop.capacity as i64 - confirmed).max(0),
        }
    }
}

/// GET /: all active workshops, ordered by date
pub async fn workshop_list(State(state): State<Arc<AppState>>) -> Result<Html<String>> {
    let workshops = state.db.workshops.list_active().await?;

    let mut views = Vec::with_capacity(workshops.len());
    for workshop in &workshops {
        let confirmed = state
            .db
            .workshops
            .count_confirmed_registrations(workshop.id)
            .await?;
        views.push(WorkshopView::build(workshop, confirmed));
    }

    let mut context = Context::new();
    context.insert("page_title", "Titanium Science Club Workshops");
    context.insert("workshops", &views);
    context.insert("site", &state.settings.site);

    let body = state.templates.render("workshop_list.html", &context)?;
    Ok(Html(body))
}
