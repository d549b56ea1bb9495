//! Machine endpoints

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use permissions::Capability;
use tracing::info;

use crate::{
    caller::Caller,
    error::{ApiError, ApiResult},
    models::{
        Page,
        machine::{MachinePayload, MachineQuery, MachineView},
    },
    query::Pagination,
    scope::Scope,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/machines", get(list_machines).post(create_machine))
        .route(
            "/machines/:id",
            get(get_machine).put(update_machine).delete(delete_machine),
        )
}

/// List machines. Anonymous visitors get the public projection.
pub async fn list_machines(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Query(query): Query<MachineQuery>,
) -> ApiResult<impl IntoResponse> {
    caller.require(Capability::ViewMachines)?;

    let pagination = Pagination::new(query.page, query.limit);
    let (machines, total) = state
        .machine_repository
        .list(&query, caller.machine_scope(), pagination)
        .await
        .map_err(|e| ApiError::from_repository(e, "list machines"))?;

    let authenticated = caller.principal.is_authenticated();
    let page = Page::new(machines, pagination, total)
        .map(|machine| MachineView::for_caller(machine, authenticated));

    Ok(Json(page))
}

/// Get a machine by ID
pub async fn get_machine(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    caller.require(Capability::ViewMachines)?;

    let machine = state
        .machine_repository
        .get_by_id(id, caller.machine_scope())
        .await
        .map_err(|e| ApiError::from_repository(e, "load machine"))?
        .ok_or_else(|| ApiError::NotFound("Machine not found".to_string()))?;

    Ok(Json(MachineView::for_caller(
        machine,
        caller.principal.is_authenticated(),
    )))
}

/// Create a machine
pub async fn create_machine(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(payload): Json<MachinePayload>,
) -> ApiResult<impl IntoResponse> {
    caller.require(Capability::CreateMachine)?;
    let payload = payload.validated().map_err(ApiError::BadRequest)?;

    let id = state
        .machine_repository
        .create(&payload)
        .await
        .map_err(|e| ApiError::from_repository(e, "create machine"))?;

    info!("Machine {} created as {}", payload.serial_number, id);

    let machine = state
        .machine_repository
        .get_by_id(id, Scope::All)
        .await
        .map_err(|e| ApiError::from_repository(e, "load machine"))?
        .ok_or(ApiError::InternalServerError)?;

    Ok((StatusCode::CREATED, Json(MachineView::Detailed(machine))))
}

/// Replace a machine
pub async fn update_machine(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<i64>,
    Json(payload): Json<MachinePayload>,
) -> ApiResult<impl IntoResponse> {
    caller.require(Capability::EditMachine)?;
    let payload = payload.validated().map_err(ApiError::BadRequest)?;

    let updated = state
        .machine_repository
        .update(id, &payload)
        .await
        .map_err(|e| ApiError::from_repository(e, "update machine"))?;
    if !updated {
        return Err(ApiError::NotFound("Machine not found".to_string()));
    }

    let machine = state
        .machine_repository
        .get_by_id(id, Scope::All)
        .await
        .map_err(|e| ApiError::from_repository(e, "load machine"))?
        .ok_or(ApiError::InternalServerError)?;

    Ok(Json(MachineView::Detailed(machine)))
}

/// Delete a machine with its maintenance and complaint records
pub async fn delete_machine(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    caller.require(Capability::EditMachine)?;

    let deleted = state
        .machine_repository
        .delete(id)
        .await
        .map_err(|e| ApiError::from_repository(e, "delete machine"))?;

    if deleted {
        info!("Machine {} deleted", id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Machine not found".to_string()))
    }
}
