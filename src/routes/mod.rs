//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! The record forms and dashboard that embed the layout editor call into
//! these endpoints. Everything under `/api/facilities/{id}` goes through the
//! facility's floor manager; `/api/layouts` reads the remote tier directly.

pub mod floors;

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

use axum::Router;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, patch, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::error::ErrorCode;
use crate::services::floor::{FloorError, ValidationError};
use crate::services::layout::LayoutError;
use crate::state::AppState;

/// Full API router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/api/facilities/{id}/floors", get(floors::list_floors).post(floors::add_floor))
        .route(
            "/api/facilities/{id}/floors/{floor}",
            patch(floors::rename_floor).delete(floors::delete_floor),
        )
        .route("/api/facilities/{id}/floors/{floor}/activate", post(floors::activate_floor))
        .route(
            "/api/facilities/{id}/floors/{floor}/layout",
            get(floors::get_layout).put(floors::save_layout),
        )
        .route("/api/layouts", get(floors::list_layouts))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

// =============================================================================
// ERRORS
// =============================================================================

/// JSON error body: `{ "error": code, "message": text }`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.code, "message": self.message });
        (self.status, Json(body)).into_response()
    }
}

pub(crate) fn floor_error_to_status(err: &FloorError) -> StatusCode {
    match err {
        FloorError::Validation(ValidationError::UnknownFloor(_)) => StatusCode::NOT_FOUND,
        FloorError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        FloorError::Declined(_) => StatusCode::CONFLICT,
        FloorError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<FloorError> for ApiError {
    fn from(err: FloorError) -> Self {
        let status = floor_error_to_status(&err);
        if status.is_server_error() {
            error!(error = %err, "floor operation failed");
        }
        Self { status, code: err.error_code(), message: err.to_string() }
    }
}

impl From<LayoutError> for ApiError {
    fn from(err: LayoutError) -> Self {
        error!(error = %err, "layout operation failed");
        Self { status: StatusCode::INTERNAL_SERVER_ERROR, code: err.error_code(), message: err.to_string() }
    }
}
