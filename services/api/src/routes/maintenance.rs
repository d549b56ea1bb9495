//! Maintenance endpoints

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use permissions::Capability;

use super::ensure_machine_in_scope;
use crate::{
    caller::Caller,
    error::{ApiError, ApiResult},
    models::{
        Page,
        maintenance::{MaintenancePayload, MaintenanceQuery},
    },
    query::Pagination,
    scope::Scope,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/maintenance", get(list_maintenance).post(create_maintenance))
        .route(
            "/maintenance/:id",
            get(get_maintenance)
                .put(update_maintenance)
                .delete(delete_maintenance),
        )
}

/// List maintenance records of the machines in the caller's scope
pub async fn list_maintenance(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Query(query): Query<MaintenanceQuery>,
) -> ApiResult<impl IntoResponse> {
    caller.require(Capability::ViewMaintenance)?;

    let pagination = Pagination::new(query.page, query.limit);
    let (records, total) = state
        .maintenance_repository
        .list(&query, caller.record_scope(), pagination)
        .await
        .map_err(|e| ApiError::from_repository(e, "list maintenance"))?;

    Ok(Json(Page::new(records, pagination, total)))
}

pub async fn get_maintenance(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    caller.require(Capability::ViewMaintenance)?;

    let record = state
        .maintenance_repository
        .get_by_id(id, caller.record_scope())
        .await
        .map_err(|e| ApiError::from_repository(e, "load maintenance"))?
        .ok_or_else(not_found)?;

    Ok(Json(record))
}

pub async fn create_maintenance(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(payload): Json<MaintenancePayload>,
) -> ApiResult<impl IntoResponse> {
    caller.require(Capability::CreateMaintenance)?;
    let payload = payload.validated().map_err(ApiError::BadRequest)?;
    let user_id = caller.user_id().ok_or(ApiError::Unauthorized)?;

    ensure_machine_in_scope(&state, &caller, payload.machine_id).await?;

    let id = state
        .maintenance_repository
        .create(&payload, user_id)
        .await
        .map_err(|e| ApiError::from_repository(e, "create maintenance"))?;

    let record = state
        .maintenance_repository
        .get_by_id(id, Scope::All)
        .await
        .map_err(|e| ApiError::from_repository(e, "load maintenance"))?
        .ok_or(ApiError::InternalServerError)?;

    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn update_maintenance(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<i64>,
    Json(payload): Json<MaintenancePayload>,
) -> ApiResult<impl IntoResponse> {
    caller.require(Capability::EditMaintenance)?;
    let payload = payload.validated().map_err(ApiError::BadRequest)?;

    let scope = caller.record_scope();
    state
        .maintenance_repository
        .get_by_id(id, scope)
        .await
        .map_err(|e| ApiError::from_repository(e, "load maintenance"))?
        .ok_or_else(not_found)?;

    ensure_machine_in_scope(&state, &caller, payload.machine_id).await?;

    let updated = state
        .maintenance_repository
        .update(id, &payload)
        .await
        .map_err(|e| ApiError::from_repository(e, "update maintenance"))?;
    if !updated {
        return Err(not_found());
    }

    let record = state
        .maintenance_repository
        .get_by_id(id, Scope::All)
        .await
        .map_err(|e| ApiError::from_repository(e, "load maintenance"))?
        .ok_or(ApiError::InternalServerError)?;

    Ok(Json(record))
}

pub async fn delete_maintenance(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    caller.require(Capability::EditMaintenance)?;

    state
        .maintenance_repository
        .get_by_id(id, caller.record_scope())
        .await
        .map_err(|e| ApiError::from_repository(e, "load maintenance"))?
        .ok_or_else(not_found)?;

    let deleted = state
        .maintenance_repository
        .delete(id)
        .await
        .map_err(|e| ApiError::from_repository(e, "delete maintenance"))?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found())
    }
}

fn not_found() -> ApiError {
    ApiError::NotFound("Maintenance record not found".to_string())
}
