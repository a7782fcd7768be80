//! Admin authentication middleware
//!
//! Protects the /admin endpoints with a bearer token from configuration.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{debug, warn};

use crate::handlers::AppState;
use crate::utils::errors::WorkshopHubError;

/// Reject requests without a valid admin bearer token
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, WorkshopHubError> {
    let configured = &state.settings.admin.token;
    if configured.is_empty() {
        warn!("Admin endpoints disabled: no admin token configured");
        return Err(WorkshopHubError::PermissionDenied(
            "Admin access is not configured".to_string(),
        ));
    }

    let presented = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match presented {
        Some(token) if token == configured => {
            debug!("Admin authentication successful");
            Ok(next.run(request).await)
        }
        _ => {
            warn!("Unauthorized admin access attempt");
            Err(WorkshopHubError::PermissionDenied(
                "Admin token required".to_string(),
            ))
        }
    }
}
