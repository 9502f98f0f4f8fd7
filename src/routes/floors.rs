//! Floor and layout routes.

#[cfg(test)]
#[path = "floors_test.rs"]
mod tests;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use canvas::confirm::Preconfirmed;
use canvas::doc::LayoutElement;
use canvas::templates::DEFAULT_TEMPLATE_ID;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::routes::ApiError;
use crate::services::floor::{FloorManager, manager_for};
use crate::services::layout::{FloorInfo, LayoutSnapshot, SaveReceipt};
use crate::services::remote::LayoutRecord;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FloorsResponse {
    pub facility_id: Uuid,
    pub active_floor: i32,
    pub has_unsaved_changes: bool,
    pub floors: Vec<FloorInfo>,
}

fn to_response(manager: &FloorManager) -> FloorsResponse {
    FloorsResponse {
        facility_id: manager.facility_id(),
        active_floor: manager.active_floor(),
        has_unsaved_changes: manager.has_unsaved_changes(),
        floors: manager.list_floors(),
    }
}

/// Confirmation collected by the client before a destructive call.
#[derive(Debug, Default, Deserialize)]
pub struct ConfirmQuery {
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Deserialize)]
pub struct RenameFloorBody {
    pub number: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveLayoutBody {
    #[serde(default)]
    pub template_id: Option<String>,
    #[serde(default)]
    pub elements: Vec<LayoutElement>,
}

/// `GET /api/facilities/:id/floors`: floors in ascending order.
pub async fn list_floors(
    State(state): State<AppState>,
    Path(facility_id): Path<Uuid>,
) -> Result<Json<FloorsResponse>, ApiError> {
    let shared = manager_for(&state.facilities, &state.layouts, facility_id).await?;
    let manager = shared.lock().await;
    Ok(Json(to_response(&manager)))
}

/// `POST /api/facilities/:id/floors`: append a floor and make it active.
pub async fn add_floor(
    State(state): State<AppState>,
    Path(facility_id): Path<Uuid>,
    Query(query): Query<ConfirmQuery>,
) -> Result<(StatusCode, Json<FloorsResponse>), ApiError> {
    let shared = manager_for(&state.facilities, &state.layouts, facility_id).await?;
    let mut manager = shared.lock().await;
    manager.add_floor(&mut Preconfirmed(query.confirm)).await?;
    Ok((StatusCode::CREATED, Json(to_response(&manager))))
}

/// `PATCH /api/facilities/:id/floors/:floor`: renumber a floor.
pub async fn rename_floor(
    State(state): State<AppState>,
    Path((facility_id, floor)): Path<(Uuid, i32)>,
    Json(body): Json<RenameFloorBody>,
) -> Result<Json<FloorsResponse>, ApiError> {
    let shared = manager_for(&state.facilities, &state.layouts, facility_id).await?;
    let mut manager = shared.lock().await;
    manager.rename_floor_number(floor, body.number).await?;
    Ok(Json(to_response(&manager)))
}

/// `DELETE /api/facilities/:id/floors/:floor`: delete a floor and its layout.
pub async fn delete_floor(
    State(state): State<AppState>,
    Path((facility_id, floor)): Path<(Uuid, i32)>,
    Query(query): Query<ConfirmQuery>,
) -> Result<Json<FloorsResponse>, ApiError> {
    let shared = manager_for(&state.facilities, &state.layouts, facility_id).await?;
    let mut manager = shared.lock().await;
    manager.delete_floor(floor, &mut Preconfirmed(query.confirm)).await?;
    Ok(Json(to_response(&manager)))
}

/// `POST /api/facilities/:id/floors/:floor/activate`: switch the active floor.
pub async fn activate_floor(
    State(state): State<AppState>,
    Path((facility_id, floor)): Path<(Uuid, i32)>,
    Query(query): Query<ConfirmQuery>,
) -> Result<Json<FloorsResponse>, ApiError> {
    let shared = manager_for(&state.facilities, &state.layouts, facility_id).await?;
    let mut manager = shared.lock().await;
    manager.switch_active_floor(floor, &mut Preconfirmed(query.confirm)).await?;
    Ok(Json(to_response(&manager)))
}

/// `GET /api/facilities/:id/floors/:floor/layout`: stored layout, or `null`.
pub async fn get_layout(
    State(state): State<AppState>,
    Path((facility_id, floor)): Path<(Uuid, i32)>,
) -> Result<Json<Option<LayoutSnapshot>>, ApiError> {
    Ok(Json(state.layouts.get_layout(facility_id, floor).await?))
}

/// `PUT /api/facilities/:id/floors/:floor/layout`: replace and persist a
/// floor's elements.
pub async fn save_layout(
    State(state): State<AppState>,
    Path((facility_id, floor)): Path<(Uuid, i32)>,
    Json(body): Json<SaveLayoutBody>,
) -> Result<Json<SaveReceipt>, ApiError> {
    let template_id = body.template_id.as_deref().unwrap_or(DEFAULT_TEMPLATE_ID);
    let shared = manager_for(&state.facilities, &state.layouts, facility_id).await?;
    let mut manager = shared.lock().await;
    let receipt = manager.save_floor(floor, template_id, body.elements).await?;
    Ok(Json(receipt))
}

/// `GET /api/layouts`: every remote layout, most recent first.
pub async fn list_layouts(State(state): State<AppState>) -> Result<Json<Vec<LayoutRecord>>, ApiError> {
    Ok(Json(state.layouts.list_all_layouts().await?))
}
